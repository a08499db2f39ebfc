#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Duskgrid engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems react to. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::{fmt, ops::Add};

use serde::{Deserialize, Serialize};

pub mod clock;
pub mod geometry;

pub use clock::{DayCycle, WorldClock};
pub use geometry::{circle, distance, quick_sqrt, Window};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the world clock by a single tick.
    Tick,
    /// Requests that a character advance a single step in the specified direction.
    Move {
        /// Identifier of the character attempting to move.
        character: CharacterId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that a character try each direction in order until one step succeeds.
    Wander {
        /// Identifier of the wandering character.
        character: CharacterId,
        /// Directions to attempt, in priority order.
        directions: [Direction; 4],
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the world clock advanced.
    TimeAdvanced {
        /// Value of the tick counter after advancing.
        tick: u64,
    },
    /// Confirms that a character moved between two cells.
    CharacterMoved {
        /// Identifier of the character that moved.
        character: CharacterId,
        /// Cell the character occupied before moving.
        from: Point,
        /// Cell the character occupies after the move.
        to: Point,
    },
    /// Reports that a step was refused. The character still faces `direction`.
    MoveRejected {
        /// Identifier of the character whose step was refused.
        character: CharacterId,
        /// Direction the character attempted and now faces.
        direction: Direction,
        /// Specific reason the step failed.
        reason: MoveRejection,
    },
}

/// Reasons a single step may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveRejection {
    /// No character with the provided identifier exists.
    UnknownCharacter,
    /// The proposed cell lies outside the grid.
    OffGrid,
    /// Another character occupies the proposed cell.
    Occupied,
    /// Something in the proposed cell refuses passage.
    Impassable,
}

/// Integer grid coordinate. `x` grows eastward and `y` grows southward.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    /// Creates a new point from its components.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the point displaced by the provided delta.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Returns the neighbouring point one step away in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.unit();
        self.offset(dx, dy)
    }

    /// Computes the Manhattan distance between two points.
    #[must_use]
    pub const fn manhattan_distance(self, other: Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        self.offset(rhs.x, rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal directions available to characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit displacement `(dx, dy)` of a single step.
    #[must_use]
    pub const fn unit(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "North",
            Self::East => "East",
            Self::South => "South",
            Self::West => "West",
        };
        f.write_str(name)
    }
}

/// Closed set of things that may occupy a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// First floor variant.
    FloorA,
    /// Second floor variant.
    FloorB,
    /// Loose rock; walkable.
    Rock,
    /// Solid obstacle that blocks movement.
    Obstacle,
    /// The controllable character.
    Player,
    /// An autonomous character.
    Enemy,
    /// A stationary light source.
    LightSource,
}

impl EntityKind {
    /// Reports whether entities of this kind let other things through by default.
    #[must_use]
    pub const fn passable_by_default(self) -> bool {
        match self {
            Self::FloorA | Self::FloorB | Self::Rock | Self::LightSource => true,
            Self::Obstacle | Self::Player | Self::Enemy => false,
        }
    }
}

/// Stable identity reported by every entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    index: u32,
    kind: EntityKind,
}

impl Identity {
    /// Creates an identity from its numeric index and kind.
    #[must_use]
    pub const fn new(index: u32, kind: EntityKind) -> Self {
        Self { index, kind }
    }

    /// Numeric index of the entity. Higher indices draw on top.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Kind of the entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }
}

/// Unique identifier assigned to a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(u32);

impl CharacterId {
    /// Creates a new character identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Role a character plays in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The single controllable character.
    Player,
    /// An autonomous character driven by the wander policy.
    Npc,
}

impl Role {
    /// Entity kind used to identify characters with this role.
    #[must_use]
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Player => EntityKind::Player,
            Self::Npc => EntityKind::Enemy,
        }
    }
}

/// Radius of effect of a standard light source, in cells.
pub const TORCH_RADIUS: i32 = 4;

/// Stationary light source captured when the map is generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LightSource {
    /// Cell holding the light.
    pub position: Point,
    /// Radius of effect measured in cells.
    pub radius: i32,
}

impl LightSource {
    /// Creates a light source at `position` with the standard torch radius.
    #[must_use]
    pub const fn torch(position: Point) -> Self {
        Self {
            position,
            radius: TORCH_RADIUS,
        }
    }
}

/// Read-only passability contract consumed by path searches.
pub trait Traversable {
    /// Reports whether the point lies on the grid.
    fn contains(&self, point: Point) -> bool;

    /// Reports whether the requester may enter the point. Off-grid points never pass.
    fn passable(&self, point: Point) -> bool;

    /// On-grid, passable neighbours of `point` in north, east, south, west order.
    fn neighbours(&self, point: Point) -> NeighborIter {
        let mut neighbors = NeighborIter::default();
        for direction in Direction::ALL {
            let candidate = point.step(direction);
            if self.contains(candidate) && self.passable(candidate) {
                neighbors.push(candidate);
            }
        }
        neighbors
    }
}

/// Fixed-capacity iterator over up to four neighbouring points.
#[derive(Clone, Debug, Default)]
pub struct NeighborIter {
    buffer: [Option<Point>; 4],
    len: usize,
    cursor: usize,
}

impl NeighborIter {
    fn push(&mut self, point: Point) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(point);
            self.len += 1;
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Point;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, EntityKind, Point, Traversable};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Point::new(0, 0);
        let destination = Point::new(3, 4);
        assert_eq!(origin.manhattan_distance(destination), 7);
        assert_eq!(destination.manhattan_distance(origin), 7);
    }

    #[test]
    fn steps_follow_screen_axes() {
        let origin = Point::new(5, 5);
        assert_eq!(origin.step(Direction::North), Point::new(5, 4));
        assert_eq!(origin.step(Direction::East), Point::new(6, 5));
        assert_eq!(origin.step(Direction::South), Point::new(5, 6));
        assert_eq!(origin.step(Direction::West), Point::new(4, 5));
        assert_eq!(origin + Point::new(-2, 3), Point::new(3, 8));
    }

    #[test]
    fn direction_names_are_capitalised() {
        let names: Vec<String> = Direction::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["North", "East", "South", "West"]);
    }

    struct Strip {
        wall: Point,
    }

    impl Traversable for Strip {
        fn contains(&self, point: Point) -> bool {
            (0..3).contains(&point.x()) && (0..3).contains(&point.y())
        }

        fn passable(&self, point: Point) -> bool {
            point != self.wall
        }
    }

    #[test]
    fn neighbours_skip_walls_and_edges() {
        let strip = Strip {
            wall: Point::new(1, 0),
        };

        let centre: Vec<Point> = strip.neighbours(Point::new(1, 1)).collect();
        assert_eq!(
            centre,
            [Point::new(2, 1), Point::new(1, 2), Point::new(0, 1)]
        );

        let corner: Vec<Point> = strip.neighbours(Point::new(0, 0)).collect();
        assert_eq!(corner, [Point::new(0, 1)]);
    }

    #[test]
    fn only_walkable_kinds_pass_by_default() {
        assert!(EntityKind::FloorA.passable_by_default());
        assert!(EntityKind::FloorB.passable_by_default());
        assert!(EntityKind::Rock.passable_by_default());
        assert!(EntityKind::LightSource.passable_by_default());
        assert!(!EntityKind::Obstacle.passable_by_default());
        assert!(!EntityKind::Player.passable_by_default());
        assert!(!EntityKind::Enemy.passable_by_default());
    }
}
