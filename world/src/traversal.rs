//! Passability view of the grid as seen by a single mover.

use duskgrid_core::{Point, Traversable};

use crate::{Entity, GridMap};

/// Read-only view that answers passability questions for one mover.
#[derive(Clone, Copy, Debug)]
pub struct Traversal<'a> {
    grid: &'a GridMap,
    mover: Entity,
}

impl<'a> Traversal<'a> {
    /// Captures a view of `grid` evaluated against `mover`.
    #[must_use]
    pub const fn new(grid: &'a GridMap, mover: Entity) -> Self {
        Self { grid, mover }
    }
}

impl Traversable for Traversal<'_> {
    fn contains(&self, point: Point) -> bool {
        self.grid.contains(point)
    }

    fn passable(&self, point: Point) -> bool {
        self.grid.can_pass(point, &self.mover)
    }
}
