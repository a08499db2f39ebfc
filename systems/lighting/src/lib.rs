#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure lighting queries over the light registry.
//!
//! Nothing here touches the world directly. Callers hand in the registry
//! slice and the visible window, which keeps every query safe to run against
//! a read-only view while the simulation is between frames.

pub mod vision;

use duskgrid_core::{circle, distance, DayCycle, LightSource, Point, Window};

pub use vision::{sense_value, Sense};

/// Light level at a point together with the phase it was computed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LightBlock {
    /// Day/night phase the renderer should tint with.
    pub cycle: DayCycle,
    /// Strongest contribution of any visible light source.
    pub lumen: i32,
}

/// Contribution of a light at `origin` to `target`.
///
/// Returns the rounded distance itself when the target lies within `radius`,
/// and zero otherwise.
#[must_use]
pub fn light_at(origin: Point, target: Point, radius: i32) -> i32 {
    let dist = distance(origin, target);
    if dist <= radius {
        dist
    } else {
        0
    }
}

/// Light level at `point` considering only lights whose disc overlaps `visible`.
#[must_use]
pub fn light_value(
    point: Point,
    visible: &Window,
    lights: &[LightSource],
    cycle: DayCycle,
) -> LightBlock {
    let lumen = lights
        .iter()
        .filter(|light| circle(light.position, light.radius).overlap(visible))
        .map(|light| light_at(light.position, point, light.radius))
        .max()
        .unwrap_or(0);
    LightBlock { cycle, lumen }
}

/// Position of the light closest to `point`, first in registry order on ties.
#[must_use]
pub fn nearest_light(lights: &[LightSource], point: Point) -> Option<Point> {
    lights
        .iter()
        .min_by_key(|light| distance(light.position, point))
        .map(|light| light.position)
}
