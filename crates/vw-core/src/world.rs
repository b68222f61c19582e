use std::collections::BTreeSet;

use crate::entity::{Entity, EntityId, EntityKind};
use crate::error::{CoreError, CoreResult};
use crate::point::Point;

/// A background tile. The core only stores it; renderers give it pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Background {
    /// Sprite key of the tile.
    pub name: String,
}

impl Background {
    /// A tile drawn with sprite `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The spatial world: a `num_rows x num_cols` grid of background tiles, an
/// occupancy grid holding at most one entity per cell, and the entity arena.
///
/// An entity is live iff it sits in exactly one in-bounds cell. Removed
/// entities stay in the arena, parked at [`Point::OFF_GRID`].
#[derive(Debug, Clone)]
pub struct WorldModel {
    num_rows: usize,
    num_cols: usize,
    background: Vec<Background>,
    occupancy: Vec<Option<EntityId>>,
    arena: Vec<Entity>,
    live: BTreeSet<EntityId>,
}

impl WorldModel {
    /// An empty world with every cell set to `default_background`.
    ///
    /// # Panics
    ///
    /// If `num_rows * num_cols` overflows. Use [`try_new`](Self::try_new) for
    /// dimensions that come from outside the program.
    pub fn new(num_rows: usize, num_cols: usize, default_background: Background) -> Self {
        let cells = num_rows * num_cols;
        Self::with_cells(num_rows, num_cols, cells, default_background)
    }

    /// Like [`new`](Self::new), but refuses dimensions whose cell count
    /// overflows or whose coordinates would not fit in a [`Point`].
    pub fn try_new(
        num_rows: usize,
        num_cols: usize,
        default_background: Background,
    ) -> CoreResult<Self> {
        let too_large = CoreError::GridTooLarge {
            rows: num_rows,
            cols: num_cols,
        };
        if i32::try_from(num_rows).is_err() || i32::try_from(num_cols).is_err() {
            return Err(too_large);
        }
        let cells = num_rows.checked_mul(num_cols).ok_or(too_large)?;
        Ok(Self::with_cells(num_rows, num_cols, cells, default_background))
    }

    fn with_cells(
        num_rows: usize,
        num_cols: usize,
        cells: usize,
        default_background: Background,
    ) -> Self {
        Self {
            num_rows,
            num_cols,
            background: vec![default_background; cells],
            occupancy: vec![None; cells],
            arena: Vec::new(),
            live: BTreeSet::new(),
        }
    }

    /// Number of rows (the `y` extent).
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns (the `x` extent).
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// `true` if `pos` lies on the grid.
    pub fn within_bounds(&self, pos: Point) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.num_cols
            && (pos.y as usize) < self.num_rows
    }

    fn index(&self, pos: Point) -> Option<usize> {
        self.within_bounds(pos)
            .then(|| pos.y as usize * self.num_cols + pos.x as usize)
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// `true` if `pos` is in bounds and holds an entity.
    pub fn is_occupied(&self, pos: Point) -> bool {
        self.occupant(pos).is_some()
    }

    /// Place an entity, refusing occupied cells.
    ///
    /// Entities outside the grid are accepted without error but never become
    /// live: they get an arena slot and nothing else.
    pub fn try_add_entity(&mut self, entity: Entity) -> CoreResult<EntityId> {
        if self.is_occupied(entity.position) {
            return Err(CoreError::OccupiedPosition(entity.position));
        }
        Ok(self.add_entity(entity))
    }

    /// Place an entity without checking its cell first.
    ///
    /// Used for spawns whose caller already picked a free cell. If the cell
    /// turns out to be taken, the previous occupant is removed.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.arena.len() as u32);
        let pos = entity.position;
        self.arena.push(entity);

        if let Some(idx) = self.index(pos) {
            if let Some(previous) = self.occupancy[idx] {
                tracing::warn!(%previous, %id, %pos, "placement displaced an occupant");
                self.remove_at(pos);
            }
            self.occupancy[idx] = Some(id);
            self.live.insert(id);
        }
        id
    }

    /// Move a live entity to `pos`, displacing whatever is there.
    ///
    /// No-op when `pos` is off the grid or equal to the current cell. Returns
    /// the displaced occupant, which has been removed from the world.
    pub fn move_entity(&mut self, id: EntityId, pos: Point) -> Option<EntityId> {
        let old = self.entity(id)?.position;
        if !self.within_bounds(pos) || pos == old || !self.is_live(id) {
            return None;
        }

        if let Some(idx) = self.index(old) {
            self.occupancy[idx] = None;
        }
        let evicted = self.remove_at(pos);
        if let Some(idx) = self.index(pos) {
            self.occupancy[idx] = Some(id);
        }
        if let Some(entity) = self.arena.get_mut(id.0 as usize) {
            entity.position = pos;
        }
        evicted
    }

    /// Take an entity off the grid and out of the live set.
    ///
    /// Returns `false` if it was not live. The record stays in the arena at
    /// [`Point::OFF_GRID`].
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        let pos = entity.position;
        if self.occupant(pos) == Some(id) {
            self.remove_at(pos).is_some()
        } else {
            false
        }
    }

    fn remove_at(&mut self, pos: Point) -> Option<EntityId> {
        let idx = self.index(pos)?;
        let id = self.occupancy[idx].take()?;
        self.live.remove(&id);
        if let Some(entity) = self.arena.get_mut(id.0 as usize) {
            entity.position = Point::OFF_GRID;
        }
        Some(id)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// The entity at `pos`, if any.
    pub fn occupant(&self, pos: Point) -> Option<EntityId> {
        self.index(pos).and_then(|idx| self.occupancy[idx])
    }

    /// The record behind `id`, live or not.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.arena.get(id.0 as usize)
    }

    /// Mutable access to the record behind `id`. Position stays owned by the grid.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.arena.get_mut(id.0 as usize)
    }

    /// `true` if `id` currently occupies a cell.
    pub fn is_live(&self, id: EntityId) -> bool {
        self.live.contains(&id)
    }

    /// Live entities in creation order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.live
            .iter()
            .filter_map(|id| self.arena.get(id.0 as usize).map(|e| (*id, e)))
    }

    /// Number of live entities.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Every entity ever added, including removed ones.
    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }

    // -----------------------------------------------------------------------
    // Spatial queries
    // -----------------------------------------------------------------------

    /// First free in-bounds cell in the square of radius `reach` around `pos`,
    /// scanned row by row (`dy` outer, `dx` inner, both from `-reach` to `reach`).
    ///
    /// A negative reach finds nothing. A reach wider than the grid is cut to
    /// the grid's larger side, past which every cell is out of bounds anyway.
    pub fn find_open_around(&self, pos: Point, reach: i32) -> Option<Point> {
        if reach < 0 || !self.within_bounds(pos) {
            return None;
        }
        let extent = i32::try_from(self.num_rows.max(self.num_cols)).unwrap_or(i32::MAX);
        let reach = reach.min(extent);
        (-reach..=reach)
            .flat_map(|dy| (-reach..=reach).map(move |dx| pos.offset(dx, dy)))
            .find(|p| self.within_bounds(*p) && !self.is_occupied(*p))
    }

    /// The live entity of `kind` closest to `pos` by Manhattan distance.
    /// Ties go to the oldest entity.
    pub fn find_nearest(&self, pos: Point, kind: EntityKind) -> Option<EntityId> {
        self.entities()
            .filter(|(_, e)| e.kind == kind)
            .min_by_key(|(id, e)| (e.position.manhattan(pos), *id))
            .map(|(id, _)| id)
    }

    // -----------------------------------------------------------------------
    // Background
    // -----------------------------------------------------------------------

    /// Replace the tile at `pos`. Ignored off the grid.
    pub fn set_background(&mut self, pos: Point, background: Background) {
        if let Some(idx) = self.index(pos) {
            self.background[idx] = background;
        }
    }

    /// The tile at `pos`, if on the grid.
    pub fn background(&self, pos: Point) -> Option<&Background> {
        self.index(pos).map(|idx| &self.background[idx])
    }
}
