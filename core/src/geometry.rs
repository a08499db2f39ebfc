//! Integer geometry helpers: windows, discs, and rounded distances.
//!
//! Windows store absolute, inclusive edges. `right` and `bottom` are the last
//! column and row covered by the window, never extents measured from `left`
//! and `top`.

use crate::Point;

/// Number of Newton refinement passes applied by [`quick_sqrt`].
const SQRT_PASSES: usize = 4;

/// Axis-aligned rectangle with inclusive, absolute edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Window {
    /// Leftmost column covered by the window.
    pub left: i32,
    /// Topmost row covered by the window.
    pub top: i32,
    /// Rightmost column covered by the window.
    pub right: i32,
    /// Bottom row covered by the window.
    pub bottom: i32,
}

impl Window {
    /// Creates a window from its four inclusive edges.
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Builds a `view_width` by `view_height` viewport centred on `center`.
    ///
    /// The viewport is shifted so it stays inside a `map_width` by
    /// `map_height` map. When the map is smaller than the viewport the window
    /// covers the whole map instead.
    #[must_use]
    pub fn centered(
        center: Point,
        view_width: i32,
        view_height: i32,
        map_width: i32,
        map_height: i32,
    ) -> Self {
        let (left, right) = centered_span(center.x(), view_width, map_width);
        let (top, bottom) = centered_span(center.y(), view_height, map_height);
        Self::new(left, top, right, bottom)
    }

    /// Reports whether the point lies inside the window, edges included.
    #[must_use]
    pub const fn within(&self, point: Point) -> bool {
        if point.x() < self.left || point.x() > self.right {
            return false;
        }
        if point.y() < self.top || point.y() > self.bottom {
            return false;
        }
        true
    }

    /// Reports whether the two windows share at least one cell.
    #[must_use]
    pub fn overlap(&self, other: &Window) -> bool {
        let width_overlap = self.right.min(other.right) >= self.left.max(other.left);
        let height_overlap = self.bottom.min(other.bottom) >= self.top.max(other.top);
        width_overlap && height_overlap
    }
}

fn centered_span(center: i32, view: i32, map: i32) -> (i32, i32) {
    if map <= 0 || view <= 0 {
        return (0, -1);
    }
    if view >= map {
        return (0, map - 1);
    }

    let start = (center - view / 2).clamp(0, map - view);
    (start, start + view - 1)
}

/// Bounding window of the disc of `radius` around `origin`.
///
/// The left and top edges are clamped at zero; the right and bottom edges are
/// left unclamped because the map size is unknown here.
#[must_use]
pub fn circle(origin: Point, radius: i32) -> Window {
    Window {
        left: (origin.x() - radius).max(0),
        top: (origin.y() - radius).max(0),
        right: origin.x() + radius,
        bottom: origin.y() + radius,
    }
}

/// Euclidean distance between two points rounded to the nearest integer.
#[must_use]
pub fn distance(p: Point, q: Point) -> i32 {
    let dx = i64::from(q.x()) - i64::from(p.x());
    let dy = i64::from(q.y()) - i64::from(p.y());
    let squared = u64::try_from(dx * dx + dy * dy).unwrap_or(u64::MAX);
    i32::try_from(quick_sqrt(squared)).unwrap_or(i32::MAX)
}

/// Rounded square root computed with a fixed number of Newton passes.
///
/// The first guess is the smallest power of two at or above the root, which
/// keeps the relative error below one and lets four passes converge for every
/// squared distance a map of a few hundred cells can produce.
#[must_use]
pub fn quick_sqrt(value: u64) -> u64 {
    if value == 0 {
        return 0;
    }

    let bits = u64::BITS - value.leading_zeros();
    let target = value as f64;
    let mut estimate = f64::from(2_u32).powi(((bits + 1) / 2) as i32);
    for _ in 0..SQRT_PASSES {
        estimate = (estimate + target / estimate) / 2.0;
    }
    estimate.round() as u64
}
