//! Directional field of view.

use std::f64::consts::PI;

use duskgrid_core::{distance, Direction, Point};

/// Targets farther than this many cells are always sensed at reduced strength.
const SIGHT_RANGE: i32 = 15;

/// Cells between the observer and the apex of its vision arc.
const APEX_OFFSET: i32 = 2;

const ARC_MIN: f64 = PI / 8.0;
const ARC_MAX: f64 = 7.0 * PI / 8.0;

/// How strongly an observer perceives a target cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sense {
    /// Inside the vision arc and within sight range.
    Full,
    /// Outside the arc or too far away.
    Reduced,
}

impl Sense {
    /// Brightness multiplier applied when drawing the target.
    #[must_use]
    pub const fn intensity(self) -> f32 {
        match self {
            Self::Full => 1.0,
            Self::Reduced => 0.75,
        }
    }
}

/// Visibility of `target` for an observer standing at `observer` and facing `facing`.
///
/// The arc opens from a point two cells ahead of the observer. Its bearing is
/// measured with the facing direction at a quarter turn, so every facing
/// gets the same open cone of three quarters of a half turn.
#[must_use]
pub fn sense_value(target: Point, observer: Point, facing: Direction) -> Sense {
    if distance(target, observer) > SIGHT_RANGE {
        return Sense::Reduced;
    }

    let (dx, dy) = facing.unit();
    let apex = observer.offset(dx * APEX_OFFSET, dy * APEX_OFFSET);
    let vx = f64::from(target.x() - apex.x());
    let vy = f64::from(target.y() - apex.y());

    let ahead = vx * f64::from(dx) + vy * f64::from(dy);
    let across = vx * f64::from(-dy) + vy * f64::from(dx);
    let bearing = ahead.atan2(across);

    if bearing > ARC_MIN && bearing < ARC_MAX {
        Sense::Full
    } else {
        Sense::Reduced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBSERVER: Point = Point::new(10, 10);

    #[test]
    fn straight_ahead_is_fully_visible() {
        assert_eq!(
            sense_value(Point::new(10, 5), OBSERVER, Direction::North),
            Sense::Full
        );
        assert_eq!(
            sense_value(Point::new(15, 10), OBSERVER, Direction::East),
            Sense::Full
        );
        assert_eq!(
            sense_value(Point::new(10, 14), OBSERVER, Direction::South),
            Sense::Full
        );
        assert_eq!(
            sense_value(Point::new(4, 10), OBSERVER, Direction::West),
            Sense::Full
        );
    }

    #[test]
    fn behind_and_beside_are_reduced() {
        assert_eq!(
            sense_value(Point::new(10, 12), OBSERVER, Direction::North),
            Sense::Reduced
        );
        assert_eq!(
            sense_value(Point::new(14, 8), OBSERVER, Direction::North),
            Sense::Reduced
        );
        assert_eq!(
            sense_value(OBSERVER, OBSERVER, Direction::East),
            Sense::Reduced
        );
    }

    #[test]
    fn arc_is_wider_than_a_straight_line() {
        assert_eq!(
            sense_value(Point::new(12, 4), OBSERVER, Direction::North),
            Sense::Full
        );
        assert_eq!(
            sense_value(Point::new(16, 8), OBSERVER, Direction::East),
            Sense::Full
        );
    }

    #[test]
    fn distant_targets_are_reduced_even_when_ahead() {
        assert_eq!(
            sense_value(Point::new(10, -10), OBSERVER, Direction::North),
            Sense::Reduced
        );
        assert_eq!(Sense::Full.intensity(), 1.0);
        assert_eq!(Sense::Reduced.intensity(), 0.75);
    }
}
