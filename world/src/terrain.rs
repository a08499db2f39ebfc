//! Terrain generators consumed by world construction.

use std::fmt;

use duskgrid_core::{EntityKind, TORCH_RADIUS};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{Entity, Light, Terrain, WorldError};

/// Source of the entity placed in each freshly generated cell.
pub trait TerrainGenerator {
    /// Produces the entity for the next cell, in row-major order.
    fn random_entity(&mut self) -> Entity;
}

/// Entry of a weighted terrain table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainWeight {
    entity: Entity,
    weight: u32,
}

impl TerrainWeight {
    /// Weighs an arbitrary entity.
    #[must_use]
    pub const fn new(entity: Entity, weight: u32) -> Self {
        Self { entity, weight }
    }

    /// Weighs the standard entity of `kind`: a torch for light sources and
    /// terrain with the kind's default passability otherwise.
    #[must_use]
    pub const fn of_kind(kind: EntityKind, weight: u32) -> Self {
        let entity = match kind {
            EntityKind::LightSource => Entity::Light(Light::new(TORCH_RADIUS)),
            _ => Entity::Terrain(Terrain::of_kind(kind)),
        };
        Self::new(entity, weight)
    }

    /// Relative weight of the entry.
    #[must_use]
    pub const fn weight(&self) -> u32 {
        self.weight
    }
}

/// Terrain table used by the standard world: mostly floor, some rock, rare
/// obstacles and lights.
#[must_use]
pub fn default_table() -> Vec<TerrainWeight> {
    vec![
        TerrainWeight::of_kind(EntityKind::FloorA, 400),
        TerrainWeight::of_kind(EntityKind::FloorB, 250),
        TerrainWeight::of_kind(EntityKind::Rock, 50),
        TerrainWeight::of_kind(EntityKind::Obstacle, 5),
        TerrainWeight::of_kind(EntityKind::LightSource, 1),
    ]
}

/// Terrain table without obstacles or lights.
#[must_use]
pub fn open_table() -> Vec<TerrainWeight> {
    vec![
        TerrainWeight::of_kind(EntityKind::FloorA, 400),
        TerrainWeight::of_kind(EntityKind::FloorB, 250),
        TerrainWeight::of_kind(EntityKind::Rock, 50),
    ]
}

type Roller = Box<dyn FnMut(u32) -> u32 + Send>;

/// Weighted random picker over a terrain table.
pub struct WeightedTerrain {
    entries: Vec<TerrainWeight>,
    total: u32,
    roller: Roller,
}

impl WeightedTerrain {
    /// Builds a picker seeded for reproducible maps.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyTerrainTable`] when the weights sum to zero.
    pub fn new(table: Vec<TerrainWeight>, seed: u64) -> Result<Self, WorldError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::with_roller(table, move |total| rng.gen_range(0..total))
    }

    /// Builds a picker whose rolls come from `roller`.
    ///
    /// The roller receives the total weight and must return a value below it.
    /// Tests use this to replace randomness with a fixed sequence.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyTerrainTable`] when the weights sum to zero.
    pub fn with_roller<F>(table: Vec<TerrainWeight>, roller: F) -> Result<Self, WorldError>
    where
        F: FnMut(u32) -> u32 + Send + 'static,
    {
        let mut total: u32 = 0;
        let mut entries = Vec::with_capacity(table.len());
        for entry in table {
            if entry.weight == 0 {
                continue;
            }
            total = total.saturating_add(entry.weight);
            entries.push(TerrainWeight::new(entry.entity, total));
        }

        if total == 0 {
            return Err(WorldError::EmptyTerrainTable);
        }

        Ok(Self {
            entries,
            total,
            roller: Box::new(roller),
        })
    }

    /// Sum of all weights in the table.
    #[must_use]
    pub const fn total_weight(&self) -> u32 {
        self.total
    }

    /// Entity selected by a roll in `0..total_weight()`.
    ///
    /// # Panics
    ///
    /// Panics when the roll is outside the table.
    #[must_use]
    pub fn pick(&self, roll: u32) -> Entity {
        match self.entries.iter().find(|entry| roll < entry.weight) {
            Some(entry) => entry.entity,
            None => unreachable!("terrain roll {roll} exceeds total weight {}", self.total),
        }
    }
}

impl TerrainGenerator for WeightedTerrain {
    fn random_entity(&mut self) -> Entity {
        let roll = (self.roller)(self.total);
        self.pick(roll)
    }
}

impl fmt::Debug for WeightedTerrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedTerrain")
            .field("entries", &self.entries)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

/// Generator that replays a fixed sequence of entities, cycling at the end.
#[derive(Clone, Debug)]
pub struct ScriptedTerrain {
    sequence: Vec<Entity>,
    cursor: usize,
}

impl ScriptedTerrain {
    /// Creates a generator replaying `sequence`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyTerrainTable`] when the sequence is empty.
    pub fn new(sequence: Vec<Entity>) -> Result<Self, WorldError> {
        if sequence.is_empty() {
            return Err(WorldError::EmptyTerrainTable);
        }
        Ok(Self {
            sequence,
            cursor: 0,
        })
    }

    /// Generator that fills every cell with terrain of `kind`.
    #[must_use]
    pub fn uniform(kind: EntityKind) -> Self {
        Self {
            sequence: vec![TerrainWeight::of_kind(kind, 1).entity],
            cursor: 0,
        }
    }

    /// Builds a generator from a text layout, one character per cell.
    ///
    /// `#` is an obstacle, `*` a light, `,` the second floor variant, `^`
    /// rock, and anything else the first floor variant. Rows are read top to
    /// bottom; whitespace-only lines are skipped.
    #[must_use]
    pub fn from_layout(layout: &str) -> Self {
        let sequence: Vec<Entity> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .flat_map(str::chars)
            .map(|symbol| {
                let kind = match symbol {
                    '#' => EntityKind::Obstacle,
                    '*' => EntityKind::LightSource,
                    ',' => EntityKind::FloorB,
                    '^' => EntityKind::Rock,
                    _ => EntityKind::FloorA,
                };
                TerrainWeight::of_kind(kind, 1).entity
            })
            .collect();

        if sequence.is_empty() {
            return Self::uniform(EntityKind::FloorA);
        }
        Self {
            sequence,
            cursor: 0,
        }
    }
}

impl TerrainGenerator for ScriptedTerrain {
    fn random_entity(&mut self) -> Entity {
        let entity = self.sequence[self.cursor % self.sequence.len()];
        self.cursor = self.cursor.wrapping_add(1);
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(entity: Entity) -> EntityKind {
        entity.identify().kind()
    }

    #[test]
    fn weights_accumulate_into_thresholds() {
        let table = vec![
            TerrainWeight::of_kind(EntityKind::FloorA, 3),
            TerrainWeight::of_kind(EntityKind::Rock, 7),
        ];
        let picker = WeightedTerrain::with_roller(table, |_| 0).expect("valid table");

        assert_eq!(picker.total_weight(), 10);
        assert_eq!(kind_of(picker.pick(0)), EntityKind::FloorA);
        assert_eq!(kind_of(picker.pick(2)), EntityKind::FloorA);
        assert_eq!(kind_of(picker.pick(3)), EntityKind::Rock);
        assert_eq!(kind_of(picker.pick(9)), EntityKind::Rock);
    }

    #[test]
    fn roller_override_drives_selection() {
        let mut rolls = vec![9_u32, 0, 4].into_iter();
        let table = vec![
            TerrainWeight::of_kind(EntityKind::FloorA, 3),
            TerrainWeight::of_kind(EntityKind::Obstacle, 7),
        ];
        let mut picker =
            WeightedTerrain::with_roller(table, move |_| rolls.next().unwrap_or(0)).expect("table");

        let kinds: Vec<EntityKind> = (0..3).map(|_| kind_of(picker.random_entity())).collect();
        assert_eq!(
            kinds,
            [EntityKind::Obstacle, EntityKind::FloorA, EntityKind::Obstacle]
        );
    }

    #[test]
    fn zero_weight_tables_are_rejected() {
        assert_eq!(
            WeightedTerrain::new(Vec::new(), 7).unwrap_err(),
            WorldError::EmptyTerrainTable
        );
        let zeroed = vec![TerrainWeight::of_kind(EntityKind::FloorA, 0)];
        assert_eq!(
            WeightedTerrain::new(zeroed, 7).unwrap_err(),
            WorldError::EmptyTerrainTable
        );
        assert_eq!(
            ScriptedTerrain::new(Vec::new()).unwrap_err(),
            WorldError::EmptyTerrainTable
        );
    }

    #[test]
    fn seeded_pickers_repeat() {
        let mut first = WeightedTerrain::new(default_table(), 11).expect("table");
        let mut second = WeightedTerrain::new(default_table(), 11).expect("table");

        for _ in 0..500 {
            assert_eq!(first.random_entity(), second.random_entity());
        }
    }

    #[test]
    fn light_entries_become_torches() {
        let torch = TerrainWeight::of_kind(EntityKind::LightSource, 1);
        assert_eq!(torch.entity, Entity::Light(Light::new(TORCH_RADIUS)));
        assert_eq!(open_table().len(), 3);
        assert_eq!(
            default_table().iter().map(TerrainWeight::weight).sum::<u32>(),
            706
        );
    }

    #[test]
    fn layout_replays_in_row_major_order() {
        let mut scripted = ScriptedTerrain::from_layout(
            "
            .#
            *,
            ",
        );

        let kinds: Vec<EntityKind> = (0..5).map(|_| kind_of(scripted.random_entity())).collect();
        assert_eq!(
            kinds,
            [
                EntityKind::FloorA,
                EntityKind::Obstacle,
                EntityKind::LightSource,
                EntityKind::FloorB,
                EntityKind::FloorA,
            ]
        );
    }
}
