//! Dense grid of entity stacks and the entity variants that fill it.

use duskgrid_core::{CharacterId, EntityKind, Identity, Point, Role};

static EMPTY_STACK: CellStack = CellStack {
    entities: Vec::new(),
};

/// Immutable piece of terrain. Its position is the cell that holds it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Terrain {
    identity: Identity,
    passable: bool,
}

impl Terrain {
    /// Creates a terrain entity with an explicit passability flag.
    #[must_use]
    pub const fn new(identity: Identity, passable: bool) -> Self {
        Self { identity, passable }
    }

    /// Creates terrain of `kind` using the kind's default passability.
    #[must_use]
    pub const fn of_kind(kind: EntityKind) -> Self {
        Self::new(Identity::new(0, kind), kind.passable_by_default())
    }
}

/// Stationary light source stored in a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Light {
    identity: Identity,
    radius: i32,
}

impl Light {
    /// Identity index shared by every light source.
    pub const INDEX: u32 = 10;

    /// Creates a light with the provided radius of effect.
    #[must_use]
    pub const fn new(radius: i32) -> Self {
        Self {
            identity: Identity::new(Self::INDEX, EntityKind::LightSource),
            radius,
        }
    }

    /// Radius of effect measured in cells.
    #[must_use]
    pub const fn radius(&self) -> i32 {
        self.radius
    }
}

/// Back-reference from a cell to a character stored in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterRef {
    id: CharacterId,
    role: Role,
}

impl CharacterRef {
    /// Creates a reference to the character with the provided identifier.
    #[must_use]
    pub const fn new(id: CharacterId, role: Role) -> Self {
        Self { id, role }
    }

    /// Identifier of the referenced character.
    #[must_use]
    pub const fn id(&self) -> CharacterId {
        self.id
    }

    /// Role of the referenced character.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

/// Anything that can occupy a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// Floor, rock, or obstacle.
    Terrain(Terrain),
    /// A player or non-player character.
    Character(CharacterRef),
    /// A light source.
    Light(Light),
}

impl Entity {
    /// Stable identity of the entity.
    #[must_use]
    pub const fn identify(&self) -> Identity {
        match self {
            Self::Terrain(terrain) => terrain.identity,
            Self::Character(character) => {
                Identity::new(character.id.get(), character.role.kind())
            }
            Self::Light(light) => light.identity,
        }
    }

    /// Reports whether `mover` may enter a cell holding this entity.
    #[must_use]
    pub const fn passable(&self, _mover: &Entity) -> bool {
        match self {
            Self::Terrain(terrain) => terrain.passable,
            Self::Character(_) => false,
            Self::Light(_) => true,
        }
    }
}

impl From<Terrain> for Entity {
    fn from(terrain: Terrain) -> Self {
        Self::Terrain(terrain)
    }
}

impl From<Light> for Entity {
    fn from(light: Light) -> Self {
        Self::Light(light)
    }
}

/// Ordered entities sharing a single grid cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellStack {
    entities: Vec<Entity>,
}

impl CellStack {
    /// Creates an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Creates a stack holding the provided entities in insertion order.
    #[must_use]
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Iterator over the entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Number of entities in the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Reports whether the stack holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity a renderer should draw: the highest identity index, earliest on ties.
    #[must_use]
    pub fn top(&self) -> Option<&Entity> {
        self.entities.iter().reduce(|best, candidate| {
            if candidate.identify().index() > best.identify().index() {
                candidate
            } else {
                best
            }
        })
    }

    /// Reports whether every entity in the stack lets `mover` through.
    #[must_use]
    pub fn passable_for(&self, mover: &Entity) -> bool {
        self.entities.iter().all(|entity| entity.passable(mover))
    }

    fn replace_terrain(&mut self, terrain: Terrain) {
        self.entities.retain(|entity| !matches!(entity, Entity::Terrain(_)));
        self.entities.insert(0, Entity::Terrain(terrain));
    }

    fn push(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    fn remove_first(&mut self, identity: Identity) -> Option<Entity> {
        let position = self
            .entities
            .iter()
            .position(|entity| entity.identify() == identity)?;
        Some(self.entities.remove(position))
    }
}

/// Fixed-size, row-major grid of cell stacks.
#[derive(Clone, Debug)]
pub struct GridMap {
    width: u32,
    height: u32,
    cells: Vec<CellStack>,
}

impl GridMap {
    /// Creates a grid of empty stacks.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![CellStack::new(); capacity],
        }
    }

    /// Creates a grid from rows of stacks.
    ///
    /// # Panics
    ///
    /// Panics when the rows differ in length; a ragged grid cannot be repaired.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<CellStack>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        for (row_index, row) in rows.iter().enumerate() {
            assert_eq!(
                row.len(),
                width,
                "grid row {row_index} has {} cells, expected {width}",
                row.len()
            );
        }

        Self {
            width: u32::try_from(width).unwrap_or(u32::MAX),
            height: u32::try_from(height).unwrap_or(u32::MAX),
            cells: rows.into_iter().flatten().collect(),
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the point lies on the grid.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.index(point).is_some()
    }

    /// Entities stored at the point; empty when the point is off-grid.
    #[must_use]
    pub fn at(&self, point: Point) -> &CellStack {
        self.index(point)
            .and_then(|index| self.cells.get(index))
            .unwrap_or(&EMPTY_STACK)
    }

    /// Replaces the contents of a cell. Off-grid points are ignored.
    pub fn set_cell(&mut self, point: Point, stack: CellStack) {
        if let Some(slot) = self.slot_mut(point) {
            *slot = stack;
        }
    }

    /// Appends an entity to a cell. Off-grid points are ignored.
    pub fn add_entity(&mut self, point: Point, entity: Entity) {
        if let Some(slot) = self.slot_mut(point) {
            slot.push(entity);
        }
    }

    /// Removes the first entity in the cell whose identity matches.
    pub fn remove_entity(&mut self, point: Point, identity: Identity) -> Option<Entity> {
        self.slot_mut(point)?.remove_first(identity)
    }

    /// Swaps the terrain under a cell, keeping characters and lights in place.
    /// Returns `false` for off-grid points.
    pub(crate) fn replace_terrain(&mut self, point: Point, terrain: Terrain) -> bool {
        match self.slot_mut(point) {
            Some(slot) => {
                slot.replace_terrain(terrain);
                true
            }
            None => false,
        }
    }

    /// Reports whether `mover` may enter the point. Off-grid points never pass.
    #[must_use]
    pub fn can_pass(&self, point: Point, mover: &Entity) -> bool {
        match self.index(point).and_then(|index| self.cells.get(index)) {
            Some(stack) => stack.passable_for(mover),
            None => false,
        }
    }

    /// Iterator over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[CellStack]> {
        let width = usize::try_from(self.width).unwrap_or(usize::MAX).max(1);
        self.cells.chunks(width)
    }

    fn slot_mut(&mut self, point: Point) -> Option<&mut CellStack> {
        let index = self.index(point)?;
        self.cells.get_mut(index)
    }

    fn index(&self, point: Point) -> Option<usize> {
        let column = u32::try_from(point.x()).ok()?;
        let row = u32::try_from(point.y()).ok()?;
        if column < self.width && row < self.height {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Entity {
        Terrain::of_kind(EntityKind::FloorA).into()
    }

    fn obstacle() -> Entity {
        Terrain::of_kind(EntityKind::Obstacle).into()
    }

    fn walker() -> Entity {
        Entity::Character(CharacterRef::new(CharacterId::new(40), Role::Npc))
    }

    #[test]
    fn out_of_bounds_reads_are_empty() {
        let grid = GridMap::new(3, 2);

        assert!(grid.at(Point::new(-1, 0)).is_empty());
        assert!(grid.at(Point::new(3, 0)).is_empty());
        assert!(grid.at(Point::new(0, 2)).is_empty());
        assert!(!grid.can_pass(Point::new(0, -1), &walker()));
        assert!(!grid.contains(Point::new(3, 1)));
        assert!(grid.contains(Point::new(2, 1)));
    }

    #[test]
    fn can_pass_requires_every_occupant_to_agree() {
        let mut grid = GridMap::new(2, 1);
        let open = Point::new(0, 0);
        let blocked = Point::new(1, 0);
        grid.add_entity(open, floor());
        grid.add_entity(open, Light::new(4).into());
        grid.add_entity(blocked, floor());
        grid.add_entity(blocked, obstacle());

        assert!(grid.can_pass(open, &walker()));
        assert!(!grid.can_pass(blocked, &walker()));
    }

    #[test]
    fn remove_entity_takes_only_the_first_match() {
        let mut grid = GridMap::new(1, 1);
        let cell = Point::new(0, 0);
        grid.add_entity(cell, floor());
        grid.add_entity(cell, obstacle());
        grid.add_entity(cell, floor());

        let removed = grid.remove_entity(cell, floor().identify());

        assert_eq!(removed, Some(floor()));
        assert_eq!(
            grid.at(cell).iter().copied().collect::<Vec<_>>(),
            vec![obstacle(), floor()]
        );
        assert_eq!(grid.remove_entity(cell, walker().identify()), None);
        assert_eq!(grid.remove_entity(Point::new(5, 5), floor().identify()), None);
    }

    #[test]
    fn set_cell_replaces_stack_and_ignores_off_grid() {
        let mut grid = GridMap::new(2, 2);
        grid.set_cell(Point::new(1, 1), CellStack::from_entities(vec![obstacle()]));
        grid.set_cell(Point::new(9, 9), CellStack::from_entities(vec![floor()]));

        assert_eq!(grid.at(Point::new(1, 1)).len(), 1);
        assert!(!grid.can_pass(Point::new(1, 1), &walker()));
        assert_eq!(grid.rows().map(<[CellStack]>::len).sum::<usize>(), 4);
    }

    #[test]
    fn top_prefers_highest_identity_index() {
        let stack = CellStack::from_entities(vec![floor(), Light::new(4).into(), walker()]);
        assert_eq!(stack.top(), Some(&walker()));

        let tied = CellStack::from_entities(vec![floor(), obstacle()]);
        assert_eq!(tied.top(), Some(&floor()));

        assert_eq!(CellStack::new().top(), None);
    }

    #[test]
    fn characters_block_and_lights_pass() {
        assert!(!walker().passable(&walker()));
        assert!(Entity::from(Light::new(2)).passable(&walker()));
        assert_eq!(Light::new(7).radius(), 7);
        assert_eq!(
            walker().identify(),
            Identity::new(40, EntityKind::Enemy)
        );
    }

    #[test]
    fn replace_terrain_keeps_other_occupants() {
        let mut grid = GridMap::new(2, 1);
        let cell = Point::new(0, 0);
        grid.add_entity(cell, floor());
        grid.add_entity(cell, Light::new(4).into());
        grid.add_entity(cell, walker());

        assert!(grid.replace_terrain(cell, Terrain::of_kind(EntityKind::Obstacle)));
        assert!(!grid.replace_terrain(Point::new(5, 0), Terrain::of_kind(EntityKind::Rock)));

        assert_eq!(
            grid.at(cell).iter().copied().collect::<Vec<_>>(),
            vec![obstacle(), Light::new(4).into(), walker()]
        );
    }

    #[test]
    fn from_rows_keeps_row_major_layout() {
        let rows = vec![
            vec![CellStack::from_entities(vec![floor()]), CellStack::new()],
            vec![CellStack::new(), CellStack::from_entities(vec![obstacle()])],
        ];
        let grid = GridMap::from_rows(rows);

        assert_eq!((grid.width(), grid.height()), (2, 2));
        assert!(grid.can_pass(Point::new(0, 0), &walker()));
        assert!(!grid.can_pass(Point::new(1, 1), &walker()));
    }

    #[test]
    #[should_panic(expected = "grid row 1 has 1 cells, expected 2")]
    fn from_rows_rejects_ragged_rows() {
        let _ = GridMap::from_rows(vec![
            vec![CellStack::new(), CellStack::new()],
            vec![CellStack::new()],
        ]);
    }
}
