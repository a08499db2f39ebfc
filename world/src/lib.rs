#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Duskgrid.

mod characters;
mod grid;
mod terrain;
mod traversal;

use duskgrid_core::{
    CharacterId, Command, Direction, Event, LightSource, MoveRejection, Point, Role, WorldClock,
};
use thiserror::Error;
use tracing::{debug, info};

use characters::CharacterRegistry;

pub use characters::Character;
pub use grid::{CellStack, CharacterRef, Entity, GridMap, Light, Terrain};
pub use terrain::{
    default_table, open_table, ScriptedTerrain, TerrainGenerator, TerrainWeight, WeightedTerrain,
};
pub use traversal::Traversal;

/// Side length of the standard square world.
pub const DEFAULT_WORLD_SIZE: u32 = 200;

/// Start cell of the NPC in the default layout.
pub const DEFAULT_NPC_START: Point = Point::new(10, 10);

/// Errors that can occur when constructing a world.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The terrain table offers nothing to place.
    #[error("terrain table must contain at least one entry with positive weight")]
    EmptyTerrainTable,
    /// One of the requested dimensions is zero.
    #[error("world dimensions must be positive, got {width}x{height}")]
    EmptyGrid {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// A character start cell lies outside the map.
    #[error("{role:?} start {point} lies outside the {width}x{height} map")]
    StartOutOfBounds {
        /// Role of the misplaced character.
        role: Role,
        /// Requested start cell.
        point: Point,
        /// Number of columns in the map.
        width: u32,
        /// Number of rows in the map.
        height: u32,
    },
    /// Two characters were asked to start on the same cell.
    #[error("more than one character starts at {point}")]
    StartOccupied {
        /// Contested start cell.
        point: Point,
    },
}

/// Start cells for the characters populated at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentLayout {
    player: Option<Point>,
    npcs: Vec<Point>,
}

impl AgentLayout {
    /// Layout with the player in the middle of the map and no NPCs.
    #[must_use]
    pub const fn centered() -> Self {
        Self {
            player: None,
            npcs: Vec::new(),
        }
    }

    /// Places the player at an explicit cell instead of the map centre.
    #[must_use]
    pub fn with_player(mut self, start: Point) -> Self {
        self.player = Some(start);
        self
    }

    /// Adds an NPC starting at `start`.
    #[must_use]
    pub fn with_npc(mut self, start: Point) -> Self {
        self.npcs.push(start);
        self
    }

    fn player_start(&self, width: u32, height: u32) -> Point {
        self.player.unwrap_or_else(|| {
            Point::new(
                i32::try_from(width / 2).unwrap_or(i32::MAX),
                i32::try_from(height / 2).unwrap_or(i32::MAX),
            )
        })
    }
}

impl Default for AgentLayout {
    fn default() -> Self {
        Self::centered().with_npc(DEFAULT_NPC_START)
    }
}

/// Represents the authoritative Duskgrid world state.
#[derive(Debug)]
pub struct World {
    grid: GridMap,
    lights: Vec<LightSource>,
    characters: CharacterRegistry,
    player: CharacterId,
    clock: WorldClock,
}

impl World {
    /// Generates a `width` by `height` map and populates it with characters.
    ///
    /// The generator is consulted once per cell in row-major order. Light
    /// sources it yields are recorded in the light registry.
    ///
    /// # Errors
    ///
    /// Returns an error for empty dimensions or start cells that fall outside
    /// the map or collide.
    pub fn new<G>(
        height: u32,
        width: u32,
        generator: &mut G,
        layout: &AgentLayout,
    ) -> Result<Self, WorldError>
    where
        G: TerrainGenerator + ?Sized,
    {
        if width == 0 || height == 0 {
            return Err(WorldError::EmptyGrid { width, height });
        }

        let (grid, lights) = generate_map(height, width, generator);
        let player_start = layout.player_start(width, height);
        let mut starts: Vec<(Role, Point)> = vec![(Role::Player, player_start)];
        starts.extend(layout.npcs.iter().map(|point| (Role::Npc, *point)));

        for (index, &(role, point)) in starts.iter().enumerate() {
            if !grid.contains(point) {
                return Err(WorldError::StartOutOfBounds {
                    role,
                    point,
                    width,
                    height,
                });
            }
            if starts[..index].iter().any(|(_, earlier)| *earlier == point) {
                return Err(WorldError::StartOccupied { point });
            }
        }

        let mut world = Self {
            grid,
            lights,
            characters: CharacterRegistry::new(),
            player: CharacterId::new(0),
            clock: WorldClock::new(),
        };
        for (role, point) in starts {
            let id = world.characters.spawn(role, point);
            if role == Role::Player {
                world.player = id;
            }
            if let Some(character) = world.characters.get(id) {
                world.grid.add_entity(point, character.entity());
            }
        }

        info!(
            width,
            height,
            lights = world.lights.len(),
            npcs = layout.npcs.len(),
            "generated world map"
        );
        Ok(world)
    }

    /// Standard 200 by 200 world with obstacles, lights, and one NPC.
    ///
    /// # Errors
    ///
    /// Propagates construction errors; none occur with the built-in table.
    pub fn standard(seed: u64) -> Result<Self, WorldError> {
        let mut terrain = WeightedTerrain::new(default_table(), seed)?;
        Self::new(
            DEFAULT_WORLD_SIZE,
            DEFAULT_WORLD_SIZE,
            &mut terrain,
            &AgentLayout::default(),
        )
    }

    /// Standard-sized world without obstacles or lights.
    ///
    /// # Errors
    ///
    /// Propagates construction errors; none occur with the built-in table.
    pub fn open(seed: u64) -> Result<Self, WorldError> {
        let mut terrain = WeightedTerrain::new(open_table(), seed)?;
        Self::new(
            DEFAULT_WORLD_SIZE,
            DEFAULT_WORLD_SIZE,
            &mut terrain,
            &AgentLayout::default(),
        )
    }

    /// Moves a character one step and reports whether it advanced.
    ///
    /// The character turns toward `direction` even when the step is refused.
    pub fn move_character(&mut self, character: CharacterId, direction: Direction) -> bool {
        self.step(character, direction).is_ok()
    }

    /// Replaces the terrain of a cell for scenario setup.
    ///
    /// Characters and lights standing in the cell stay where they are, so the
    /// character arena and light registry keep matching the grid. Returns
    /// `false` when the point is off-grid.
    pub fn set_terrain(&mut self, point: Point, terrain: Terrain) -> bool {
        self.grid.replace_terrain(point, terrain)
    }

    fn step(
        &mut self,
        character: CharacterId,
        direction: Direction,
    ) -> Result<(Point, Point), MoveRejection> {
        let (from, mover, identity) = self
            .characters
            .face(character, direction)
            .map(|turned| (turned.location(), turned.entity(), turned.identity()))
            .ok_or(MoveRejection::UnknownCharacter)?;
        let proposed = from.step(direction);

        if !self.grid.contains(proposed) {
            return Err(MoveRejection::OffGrid);
        }

        if let Some(other) = self.characters.occupant_at(proposed, character) {
            if !other.entity().passable(&mover) {
                return Err(MoveRejection::Occupied);
            }
        }

        if !self.grid.can_pass(proposed, &mover) {
            return Err(MoveRejection::Impassable);
        }

        let Some(entity) = self.grid.remove_entity(from, identity) else {
            unreachable!("character {} is missing from its cell {from}", character.get());
        };
        self.grid.add_entity(proposed, entity);
        self.characters.relocate(character, proposed);
        Ok((from, proposed))
    }

    fn wander(
        &mut self,
        character: CharacterId,
        directions: [Direction; 4],
        out_events: &mut Vec<Event>,
    ) {
        for direction in directions {
            if let Ok((from, to)) = self.step(character, direction) {
                debug!(
                    character = character.get(),
                    %direction,
                    "npc moved"
                );
                out_events.push(Event::CharacterMoved {
                    character,
                    from,
                    to,
                });
                return;
            }
        }
        debug!(character = character.get(), "npc boxed in, staying put");
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => {
            let tick = world.clock.tick();
            out_events.push(Event::TimeAdvanced { tick });
        }
        Command::Move {
            character,
            direction,
        } => match world.step(character, direction) {
            Ok((from, to)) => out_events.push(Event::CharacterMoved {
                character,
                from,
                to,
            }),
            Err(reason) => {
                debug!(character = character.get(), %direction, ?reason, "move rejected");
                out_events.push(Event::MoveRejected {
                    character,
                    direction,
                    reason,
                });
            }
        },
        Command::Wander {
            character,
            directions,
        } => world.wander(character, directions, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use duskgrid_core::{CharacterId, DayCycle, LightSource, Role};

    use super::{Character, GridMap, Traversal, World};

    /// Provides read-only access to the grid of cell stacks.
    #[must_use]
    pub fn grid(world: &World) -> &GridMap {
        &world.grid
    }

    /// The designated player character.
    ///
    /// # Panics
    ///
    /// Panics if the player record is missing, which construction rules out.
    #[must_use]
    pub fn player(world: &World) -> &Character {
        match world.characters.get(world.player) {
            Some(character) => character,
            None => unreachable!("world constructed without a player"),
        }
    }

    /// Looks up a character by identifier.
    #[must_use]
    pub fn character(world: &World, id: CharacterId) -> Option<&Character> {
        world.characters.get(id)
    }

    /// Iterator over every character in identifier order.
    pub fn characters(world: &World) -> impl Iterator<Item = &Character> {
        world.characters.iter()
    }

    /// Identifiers of every non-player character in identifier order.
    #[must_use]
    pub fn npcs(world: &World) -> Vec<CharacterId> {
        world
            .characters
            .iter()
            .filter(|character| character.role() == Role::Npc)
            .map(Character::id)
            .collect()
    }

    /// Light sources captured when the map was generated.
    #[must_use]
    pub fn lights(world: &World) -> &[LightSource] {
        &world.lights
    }

    /// Current day/night phase and progress through it.
    #[must_use]
    pub fn phase(world: &World) -> (DayCycle, u8) {
        world.clock.phase()
    }

    /// Ticks elapsed since the world was created.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.clock.ticks()
    }

    /// Passability view of the grid for the given character.
    #[must_use]
    pub fn traversal(world: &World, id: CharacterId) -> Option<Traversal<'_>> {
        let character = world.characters.get(id)?;
        Some(Traversal::new(&world.grid, character.entity()))
    }

    /// Passability view of the grid for the player.
    #[must_use]
    pub fn player_traversal(world: &World) -> Traversal<'_> {
        Traversal::new(&world.grid, player(world).entity())
    }
}

fn generate_map<G>(height: u32, width: u32, generator: &mut G) -> (GridMap, Vec<LightSource>)
where
    G: TerrainGenerator + ?Sized,
{
    let mut lights = Vec::new();
    let mut rows = Vec::with_capacity(usize::try_from(height).unwrap_or(0));
    for row in 0..height {
        let mut cells = Vec::with_capacity(usize::try_from(width).unwrap_or(0));
        for column in 0..width {
            let entity = generator.random_entity();
            if let Entity::Light(light) = entity {
                lights.push(LightSource {
                    position: Point::new(
                        i32::try_from(column).unwrap_or(i32::MAX),
                        i32::try_from(row).unwrap_or(i32::MAX),
                    ),
                    radius: light.radius(),
                });
            }
            cells.push(CellStack::from_entities(vec![entity]));
        }
        rows.push(cells);
    }
    (GridMap::from_rows(rows), lights)
}
