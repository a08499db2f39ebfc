//! Character arena and identifier allocation.

use std::collections::BTreeMap;

use duskgrid_core::{CharacterId, Direction, Identity, Point, Role};

use crate::{CharacterRef, Entity};

/// Identifier handed to the first spawned character. Lower identity indices
/// belong to terrain and lights, so characters always draw on top of them.
const FIRST_CHARACTER_ID: u32 = 16;

/// Authoritative record of a single character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Character {
    id: CharacterId,
    role: Role,
    facing: Direction,
    location: Point,
}

impl Character {
    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> CharacterId {
        self.id
    }

    /// Whether the character is the player or an NPC.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Direction the character last attempted to move in.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Cell the character currently occupies.
    #[must_use]
    pub const fn location(&self) -> Point {
        self.location
    }

    /// Identity reported by the character's grid entry.
    #[must_use]
    pub const fn identity(&self) -> Identity {
        Identity::new(self.id.get(), self.role.kind())
    }

    /// Entity stored in the grid for this character.
    #[must_use]
    pub const fn entity(&self) -> Entity {
        Entity::Character(CharacterRef::new(self.id, self.role))
    }
}

/// Registry that stores characters and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct CharacterRegistry {
    entries: BTreeMap<CharacterId, Character>,
    next_id: CharacterId,
}

impl CharacterRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: CharacterId::new(FIRST_CHARACTER_ID),
        }
    }

    /// Registers a new character facing north at `location`.
    pub(crate) fn spawn(&mut self, role: Role, location: Point) -> CharacterId {
        let id = self.next_id;
        self.next_id = CharacterId::new(id.get().saturating_add(1));
        let character = Character {
            id,
            role,
            facing: Direction::North,
            location,
        };
        let _ = self.entries.insert(id, character);
        id
    }

    pub(crate) fn get(&self, id: CharacterId) -> Option<&Character> {
        self.entries.get(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Character> {
        self.entries.values()
    }

    /// Turns the character toward `direction`.
    pub(crate) fn face(&mut self, id: CharacterId, direction: Direction) -> Option<&Character> {
        let character = self.entries.get_mut(&id)?;
        character.facing = direction;
        Some(character)
    }

    pub(crate) fn relocate(&mut self, id: CharacterId, location: Point) {
        if let Some(character) = self.entries.get_mut(&id) {
            character.location = location;
        }
    }

    /// Character other than `except` standing on `point`, if any.
    pub(crate) fn occupant_at(&self, point: Point, except: CharacterId) -> Option<&Character> {
        self.entries
            .values()
            .find(|character| character.id != except && character.location == point)
    }
}
