#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shortest 4-connected routes over any [`Traversable`] grid.

use std::{
    cmp::Reverse,
    collections::{BTreeSet, BinaryHeap, HashMap},
};

use duskgrid_core::{Point, Traversable};

/// Frontier entry ordered by estimated total cost, then by remaining estimate.
type FrontierEntry = Reverse<(u32, u32, u32, Point)>;

/// A* search with reusable scratch buffers.
#[derive(Clone, Debug, Default)]
pub struct Pathfinder {
    frontier: BinaryHeap<FrontierEntry>,
    best_cost: HashMap<Point, u32>,
    came_from: HashMap<Point, Point>,
}

impl Pathfinder {
    /// Creates a pathfinder with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells of a shortest route from `start` to `goal`, both included.
    ///
    /// Only the cells entered along the way are checked for passability, so
    /// the requester's own cell never blocks the search. Returns `{start}`
    /// when the endpoints coincide and an empty set when no route exists or
    /// an endpoint lies off the grid.
    pub fn find<T>(&mut self, grid: &T, start: Point, goal: Point) -> BTreeSet<Point>
    where
        T: Traversable + ?Sized,
    {
        if !grid.contains(start) || !grid.contains(goal) {
            return BTreeSet::new();
        }
        if start == goal {
            return BTreeSet::from([start]);
        }

        self.reset();
        let estimate = start.manhattan_distance(goal);
        let _ = self.best_cost.insert(start, 0);
        self.frontier.push(Reverse((estimate, estimate, 0, start)));

        while let Some(Reverse((_, _, cost, current))) = self.frontier.pop() {
            if current == goal {
                return self.reconstruct(start, goal);
            }

            if self
                .best_cost
                .get(&current)
                .is_some_and(|&best| cost > best)
            {
                continue;
            }

            let next_cost = cost.saturating_add(1);
            for neighbour in grid.neighbours(current) {
                let improved = self
                    .best_cost
                    .get(&neighbour)
                    .map_or(true, |&known| next_cost < known);
                if !improved {
                    continue;
                }

                let _ = self.best_cost.insert(neighbour, next_cost);
                let _ = self.came_from.insert(neighbour, current);
                let remaining = neighbour.manhattan_distance(goal);
                self.frontier.push(Reverse((
                    next_cost.saturating_add(remaining),
                    remaining,
                    next_cost,
                    neighbour,
                )));
            }
        }

        BTreeSet::new()
    }

    fn reset(&mut self) {
        self.frontier.clear();
        self.best_cost.clear();
        self.came_from.clear();
    }

    fn reconstruct(&self, start: Point, goal: Point) -> BTreeSet<Point> {
        let mut route = BTreeSet::new();
        let mut cursor = goal;
        let _ = route.insert(cursor);
        while cursor != start {
            match self.came_from.get(&cursor) {
                Some(&previous) => cursor = previous,
                None => unreachable!("route to {goal} lost its predecessor at {cursor}"),
            }
            let _ = route.insert(cursor);
        }
        route
    }
}
