//! World state management.
//!
//! The world owns every cell (keyed by node id), the per-kind id lists, the
//! spatial index and the players. Everything outside the cell store refers to
//! cells by id only.
//!
//! Despawned cells stay in the store flagged `REMOVED` (with their killer)
//! until [`World::drain_events`] reports them; they are unreachable from the
//! index, the kind lists and their owner from the moment of removal.

mod collide;
mod players;
mod update;

use crate::Color;
use crate::collision::circle_contact;
use crate::config::Config;
use crate::entity::{Cell, CellKind, EntityId, KindMask, mother_cell, virus};
use crate::geometry::Rect;
use crate::player::{Player, PlayerId, PlayerState, PlayerSummary};
use crate::spatial::{QuadTree, QuadTreeStats};
use glam::Vec2;
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Ids of one kind's live cells, with O(1) removal.
#[derive(Debug, Default)]
struct KindList {
    ids: Vec<EntityId>,
    pos: HashMap<EntityId, usize>,
}

impl KindList {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            pos: HashMap::with_capacity(capacity),
        }
    }

    fn push(&mut self, id: EntityId) {
        if !self.pos.contains_key(&id) {
            self.pos.insert(id, self.ids.len());
            self.ids.push(id);
        }
    }

    fn remove(&mut self, id: EntityId) -> bool {
        let Some(pos) = self.pos.remove(&id) else {
            return false;
        };
        let last_pos = self.ids.len() - 1;
        if pos != last_pos {
            let swapped_id = self.ids[last_pos];
            self.ids.swap(pos, last_pos);
            self.pos.insert(swapped_id, pos);
        }
        self.ids.pop();
        true
    }

    #[inline]
    fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Live population per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCounts {
    pub player_cells: usize,
    pub food: usize,
    pub viruses: usize,
    pub ejected: usize,
    pub mother_cells: usize,
    pub players: usize,
}

impl CellCounts {
    pub fn total(&self) -> usize {
        self.player_cells + self.food + self.viruses + self.ejected + self.mother_cells
    }
}

/// What happened to cells since the last drain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// `(eaten, eater)` pairs.
    pub eaten: Vec<(EntityId, EntityId)>,
    /// Every despawned cell, eaten or not.
    pub removed: Vec<EntityId>,
}

/// The simulation world.
#[derive(Debug)]
pub struct World {
    config: Config,
    bounds: Rect,
    quadtree: QuadTree<EntityId>,
    cells: HashMap<EntityId, Cell>,
    player_cells: KindList,
    food: KindList,
    viruses: KindList,
    ejected: KindList,
    mother_cells: KindList,
    players: HashMap<PlayerId, Player>,
    tick_count: u64,
    next_node_id: u32,
    events: TickEvents,
}

impl World {
    /// Create an empty world. `config` must already be validated.
    pub fn new(config: Config) -> Self {
        let bounds = Rect::new(0.0, 0.0, config.border.width, config.border.height);
        Self {
            quadtree: QuadTree::new(bounds, config.quadtree.capacity, config.quadtree.max_depth),
            bounds,
            cells: HashMap::with_capacity(2048),
            player_cells: KindList::with_capacity(256),
            food: KindList::with_capacity(config.food.min_amount),
            viruses: KindList::with_capacity(config.virus.max_amount),
            ejected: KindList::with_capacity(256),
            mother_cells: KindList::with_capacity(16),
            players: HashMap::new(),
            tick_count: 0,
            next_node_id: 1,
            events: TickEvents::default(),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Swap in new tunables. Every rule reads them at use time; the border and
    /// spatial index layout keep the values they were built with.
    pub fn reload_config(&mut self, config: Config) {
        if config.border != self.config.border || config.quadtree != self.config.quadtree {
            info!("Border and quadtree settings take effect on restart");
        }
        self.config = config;
        info!("Configuration reloaded");
    }

    /// The play area, centered on the origin.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// A cell by id, including cells removed since the last drain.
    #[inline]
    pub fn cell(&self, id: EntityId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    #[inline]
    pub fn is_live(&self, id: EntityId) -> bool {
        self.live_cell(id).is_some()
    }

    #[inline]
    fn live_cell(&self, id: EntityId) -> Option<&Cell> {
        self.cells.get(&id).filter(|cell| !cell.is_removed())
    }

    #[inline]
    fn live_cell_mut(&mut self, id: EntityId) -> Option<&mut Cell> {
        self.cells.get_mut(&id).filter(|cell| !cell.is_removed())
    }

    /// Every live cell.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values().filter(|cell| !cell.is_removed())
    }

    /// Ids of the live cells of `kind`.
    #[inline]
    pub fn ids(&self, kind: CellKind) -> &[EntityId] {
        &self.list(kind).ids
    }

    fn list(&self, kind: CellKind) -> &KindList {
        match kind {
            CellKind::Player => &self.player_cells,
            CellKind::Food => &self.food,
            CellKind::Virus => &self.viruses,
            CellKind::Ejected => &self.ejected,
            CellKind::MotherCell => &self.mother_cells,
        }
    }

    fn list_mut(&mut self, kind: CellKind) -> &mut KindList {
        match kind {
            CellKind::Player => &mut self.player_cells,
            CellKind::Food => &mut self.food,
            CellKind::Virus => &mut self.viruses,
            CellKind::Ejected => &mut self.ejected,
            CellKind::MotherCell => &mut self.mother_cells,
        }
    }

    #[inline]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn counts(&self) -> CellCounts {
        CellCounts {
            player_cells: self.player_cells.len(),
            food: self.food.len(),
            viruses: self.viruses.len(),
            ejected: self.ejected.len(),
            mother_cells: self.mother_cells.len(),
            players: self.players.len(),
        }
    }

    #[inline]
    pub fn index_stats(&self) -> QuadTreeStats {
        self.quadtree.stats()
    }

    /// Live cells whose bounds intersect `rect`.
    pub fn query_range(&self, rect: &Rect) -> Vec<&Cell> {
        self.quadtree
            .query_range(rect)
            .into_iter()
            .filter_map(|id| self.live_cell(id))
            .collect()
    }

    /// Next free node id. Wraps past `u32::MAX` to 1 and skips ids still in use.
    fn next_id(&mut self) -> EntityId {
        loop {
            let id = self.next_node_id;
            self.next_node_id = self.next_node_id.wrapping_add(1);
            if self.next_node_id == 0 {
                self.next_node_id = 1;
            }
            if !self.cells.contains_key(&id) {
                return id;
            }
        }
    }

    fn default_radius(&self, kind: CellKind) -> f32 {
        match kind {
            CellKind::Player => self.config.player.start_radius,
            CellKind::Food => self.config.food.radius,
            CellKind::Virus => self.config.virus.radius,
            CellKind::Ejected => self.config.eject.radius,
            CellKind::MotherCell => self.config.mother.radius,
        }
    }

    fn default_color(kind: CellKind) -> Color {
        match kind {
            CellKind::Virus => virus::VIRUS_COLOR,
            CellKind::MotherCell => mother_cell::MOTHER_COLOR,
            CellKind::Player | CellKind::Food | CellKind::Ejected => Color::random(),
        }
    }

    /// A random point inside the border.
    pub fn random_position(&self) -> Vec2 {
        let mut rng = rand::rng();
        Vec2::new(
            rng.random_range(self.bounds.left()..self.bounds.right()),
            rng.random_range(self.bounds.bottom()..self.bounds.top()),
        )
    }

    /// Spawn a cell of `kind`. Missing arguments fall back to the kind's defaults
    /// and a random position.
    ///
    /// Kinds with a spawn-avoid mask retry random positions while the candidate
    /// overlaps a masked kind, at most as many times as the kind's population.
    /// The last candidate is used regardless.
    pub fn spawn(
        &mut self,
        kind: CellKind,
        position: Option<Vec2>,
        radius: Option<f32>,
        color: Option<Color>,
    ) -> EntityId {
        let radius = radius.unwrap_or_else(|| self.default_radius(kind));
        let color = color.unwrap_or_else(|| Self::default_color(kind));
        let id = self.next_id();
        let mut cell = Cell::new(id, kind, Vec2::ZERO, radius, color, self.tick_count);
        let position = self.safe_position(kind, cell.avoid_spawn_mask(), position, radius);
        cell.set_position(position);
        self.insert_cell(cell)
    }

    /// Spawn a cell owned by `owner` with safe placement. `None` if the player does not exist.
    pub fn spawn_player_cell(
        &mut self,
        owner: PlayerId,
        position: Option<Vec2>,
        radius: Option<f32>,
    ) -> Option<EntityId> {
        let color = self.players.get(&owner)?.color;
        let radius = radius.unwrap_or(self.config.player.start_radius);
        let id = self.next_id();
        let mut cell = Cell::new(id, CellKind::Player, Vec2::ZERO, radius, color, self.tick_count);
        let position = self.safe_position(CellKind::Player, cell.avoid_spawn_mask(), position, radius);
        cell.set_position(position);
        cell.set_owner(Some(owner));
        cell.set_creator(owner);
        Some(self.insert_cell(cell))
    }

    fn safe_position(&self, kind: CellKind, avoid: KindMask, hint: Option<Vec2>, radius: f32) -> Vec2 {
        let mut position = hint.unwrap_or_else(|| self.random_position());
        if avoid.is_empty() {
            return position;
        }
        let attempts = self.list(kind).len();
        for _ in 0..attempts {
            if !self.is_blocked(position, radius, avoid) {
                return position;
            }
            position = self.random_position();
        }
        position
    }

    fn is_blocked(&self, position: Vec2, radius: f32, avoid: KindMask) -> bool {
        let range = Rect::square(position, radius * 2.0);
        self.quadtree.query_range(&range).into_iter().any(|id| {
            self.live_cell(id).is_some_and(|other| {
                avoid.contains(other.kind().mask())
                    && circle_contact(position, radius, other.position(), other.radius()).is_some()
            })
        })
    }

    /// Index a constructed cell and hand it to its kind list and owner.
    pub(crate) fn insert_cell(&mut self, mut cell: Cell) -> EntityId {
        let id = cell.node_id();
        cell.clamp_to(&self.bounds);
        cell.mark_spatial_synced();
        cell.collidable = Some(self.quadtree.insert(cell.bound(), id));

        self.list_mut(cell.kind()).push(id);
        if let Some(player) = cell.owner().and_then(|owner| self.players.get_mut(&owner)) {
            player.cells.push(id);
        }
        self.cells.insert(id, cell);
        id
    }

    /// Remove a cell from the index, its kind list and its owner, then run the
    /// kind's despawn hook.
    ///
    /// Despawning a cell that is not indexed is logged and ignored.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let Some(cell) = self.cells.get_mut(&id) else {
            error!("Despawn of unknown cell {}", id);
            return false;
        };
        let Some(key) = cell.collidable else {
            error!("Despawn of cell {} that is not indexed", id);
            return false;
        };
        if self.quadtree.remove(key).is_none() {
            error!("Cell {} had a stale index handle", id);
        }

        cell.mark_removed();
        let kind = cell.kind();
        let owner = cell.owner();
        let position = cell.position();

        self.list_mut(kind).remove(id);
        self.events.removed.push(id);
        self.on_despawned(kind, id, owner, position);
        true
    }

    fn on_despawned(&mut self, kind: CellKind, id: EntityId, owner: Option<PlayerId>, position: Vec2) {
        match kind {
            CellKind::Food => {
                if self.food.len() < self.config.food.min_amount {
                    self.spawn(CellKind::Food, None, None, None);
                }
            }
            CellKind::Virus => {
                if self.viruses.len() < self.config.virus.min_amount {
                    self.spawn(CellKind::Virus, None, None, None);
                }
            }
            CellKind::MotherCell => {
                if self.mother_cells.len() < self.config.mother.min_amount {
                    self.spawn(CellKind::MotherCell, None, None, None);
                }
            }
            CellKind::Ejected => {}
            CellKind::Player => {
                if let Some(owner) = owner {
                    self.release_player_cell(owner, id, position);
                }
            }
        }
    }

    /// Drop a cell from its owner. The last cell kills a connected owner and
    /// destroys a disconnected one.
    fn release_player_cell(&mut self, owner: PlayerId, id: EntityId, position: Vec2) {
        let Some(player) = self.players.get_mut(&owner) else {
            return;
        };
        player.remove_cell(id);
        if !player.cells.is_empty() {
            return;
        }
        player.last_center = position;

        let state = player.state;
        match state {
            PlayerState::Disconnected => {
                let target = player.target;
                self.players.remove(&owner);
                self.release_minions(owner, target);
                info!("Player {} left the world", owner);
            }
            PlayerState::Playing => {
                player.state = PlayerState::Dead;
                info!("Player {} ({}) died", owner, player.name);
            }
            PlayerState::Dead | PlayerState::Freeroam | PlayerState::Spectating => {}
        }
    }

    /// Despawn every live cell of `kind`. Returns how many were removed.
    pub fn despawn_kind(&mut self, kind: CellKind) -> usize {
        let ids = self.list(kind).ids.clone();
        ids.into_iter().filter(|&id| self.despawn(id)).count()
    }

    pub fn set_position(&mut self, id: EntityId, position: Vec2) -> bool {
        let bounds = self.bounds;
        let Some(cell) = self.live_cell_mut(id) else {
            return false;
        };
        cell.set_position(position);
        cell.clamp_to(&bounds);
        self.update_spatial_bound(id);
        true
    }

    pub fn set_radius(&mut self, id: EntityId, radius: f32) -> bool {
        let Some(cell) = self.live_cell_mut(id) else {
            return false;
        };
        cell.set_radius(radius.max(0.0));
        self.update_spatial_bound(id);
        true
    }

    pub fn set_mass(&mut self, id: EntityId, mass: f32) -> bool {
        let Some(cell) = self.live_cell_mut(id) else {
            return false;
        };
        cell.set_mass(mass);
        self.update_spatial_bound(id);
        true
    }

    pub fn set_color(&mut self, id: EntityId, color: Color) -> bool {
        let Some(cell) = self.live_cell_mut(id) else {
            return false;
        };
        cell.set_color(color);
        true
    }

    /// Re-sync a cell's index bound if its position or radius changed.
    pub fn update_spatial_bound(&mut self, id: EntityId) {
        let Some(cell) = self.live_cell_mut(id) else {
            return;
        };
        if !cell.spatial_dirty() {
            return;
        }
        let Some(key) = cell.collidable else {
            return;
        };
        let bound = cell.bound();
        cell.mark_spatial_synced();
        self.quadtree.update(key, bound);
    }

    /// Spawn every floor-maintained kind up to its floor.
    pub fn fill(&mut self) {
        let floors = [
            (CellKind::Food, self.config.food.min_amount),
            (CellKind::Virus, self.config.virus.min_amount),
            (CellKind::MotherCell, self.config.mother.min_amount),
        ];
        for (kind, floor) in floors {
            while self.list(kind).len() < floor {
                self.spawn(kind, None, None, None);
            }
        }
        let counts = self.counts();
        info!(
            "World filled: {} food, {} viruses, {} mother cells",
            counts.food, counts.viruses, counts.mother_cells
        );
    }

    /// Take this tick's eat/removal records and drop removed cells from the store.
    pub fn drain_events(&mut self) -> TickEvents {
        self.cells.retain(|_, cell| !cell.is_removed());
        std::mem::take(&mut self.events)
    }

    /// Mark every cell as seen by viewers.
    pub fn clear_sync_flags(&mut self) {
        for cell in self.cells.values_mut() {
            cell.clear_needs_sync();
        }
    }

    /// Sum of the player's cell masses.
    pub fn player_score(&self, id: PlayerId) -> f32 {
        self.players.get(&id).map_or(0.0, |player| {
            player
                .cells
                .iter()
                .filter_map(|&cell| self.live_cell(cell))
                .map(Cell::mass)
                .sum()
        })
    }

    /// Mean position of the player's cells, or where the last one died.
    pub fn player_center(&self, id: PlayerId) -> Option<Vec2> {
        let player = self.players.get(&id)?;
        let positions: Vec<Vec2> = player
            .cells
            .iter()
            .filter_map(|&cell| self.live_cell(cell))
            .map(Cell::position)
            .collect();
        if positions.is_empty() {
            return Some(player.last_center);
        }
        Some(positions.iter().sum::<Vec2>() / positions.len() as f32)
    }

    pub fn player_summary(&self, id: PlayerId) -> Option<PlayerSummary> {
        let player = self.players.get(&id)?;
        Some(PlayerSummary {
            id,
            name: player.name.clone(),
            state: player.state,
            score: self.player_score(id),
            center: self.player_center(id).unwrap_or(player.last_center),
            cells: player.cells.clone(),
        })
    }

    fn player_cell_count(&self, id: PlayerId) -> usize {
        self.players.get(&id).map_or(0, |player| player.cells.len())
    }

    fn log_cell_event(&self, what: &str, id: EntityId) {
        if let Some(cell) = self.cells.get(&id) {
            debug!(
                "{} {} #{} at ({:.1}, {:.1}) r={:.1}",
                what,
                cell.kind().name(),
                id,
                cell.position().x,
                cell.position().y,
                cell.radius()
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entity::CellState;

    /// Small, quiet world: no growth, no floors unless a test sets them.
    pub(crate) fn test_config() -> Config {
        let mut config = Config::default();
        config.border.width = 2000.0;
        config.border.height = 2000.0;
        config.food.min_amount = 0;
        config.food.growth_chance = 0.0;
        config.virus.min_amount = 0;
        config.mother.min_amount = 0;
        config.quadtree.capacity = 4;
        config
    }

    #[test]
    fn test_next_id_wraps_and_skips_live() {
        let mut world = World::new(test_config());
        let first = world.spawn(CellKind::Food, Some(Vec2::ZERO), None, None);
        assert_eq!(first, 1);

        world.next_node_id = u32::MAX;
        assert_eq!(world.next_id(), u32::MAX);
        // 0 is reserved and 1 is still alive.
        assert_eq!(world.next_id(), 2);
    }

    #[test]
    fn test_spawn_indexes_cell() {
        let mut world = World::new(test_config());
        let id = world.spawn(CellKind::Food, Some(Vec2::new(100.0, 50.0)), Some(12.0), None);

        let cell = world.cell(id).unwrap();
        assert_eq!(cell.position(), Vec2::new(100.0, 50.0));
        assert_eq!(cell.radius(), 12.0);
        assert_eq!(world.ids(CellKind::Food), &[id]);
        assert_eq!(world.index_stats().objects, 1);

        let found = world.query_range(&Rect::square(Vec2::new(100.0, 50.0), 4.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].node_id(), id);
    }

    #[test]
    fn test_spawn_clamps_hint_inside_border() {
        let mut world = World::new(test_config());
        let id = world.spawn(CellKind::Food, Some(Vec2::new(5000.0, 0.0)), Some(10.0), None);
        assert_eq!(world.cell(id).unwrap().position().x, 995.0);
    }

    #[test]
    fn test_spawn_avoidance_terminates_when_crowded() {
        let mut config = test_config();
        config.border.width = 400.0;
        config.border.height = 400.0;
        let mut world = World::new(config);

        // Blanket the whole map with viruses.
        for x in -2..=2 {
            for y in -2..=2 {
                world.spawn(CellKind::Virus, Some(Vec2::new(x as f32 * 80.0, y as f32 * 80.0)), None, None);
            }
        }
        let before = world.counts().viruses;
        let id = world.spawn(CellKind::Virus, Some(Vec2::ZERO), None, None);

        assert!(world.is_live(id));
        assert_eq!(world.counts().viruses, before + 1);
        assert!(world.bounds().contains_point(world.cell(id).unwrap().position()));
    }

    #[test]
    fn test_spawn_avoidance_moves_off_blocked_hint() {
        let mut world = World::new(test_config());
        world.spawn(CellKind::Virus, Some(Vec2::ZERO), None, None);
        world.spawn(CellKind::Virus, Some(Vec2::new(600.0, 600.0)), None, None);

        // One retry per live virus; a random point is almost surely free.
        let id = world.spawn(CellKind::Virus, Some(Vec2::new(10.0, 0.0)), None, None);
        let position = world.cell(id).unwrap().position();
        assert_ne!(position, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_despawn_is_idempotent() {
        let mut world = World::new(test_config());
        let id = world.spawn(CellKind::Food, Some(Vec2::ZERO), None, None);
        let other = world.spawn(CellKind::Food, Some(Vec2::new(50.0, 0.0)), None, None);

        assert!(world.despawn(id));
        let counts = world.counts();
        let stats = world.index_stats();

        assert!(!world.despawn(id));
        assert!(!world.despawn(9999));
        assert_eq!(world.counts(), counts);
        assert_eq!(world.index_stats(), stats);
        assert!(world.is_live(other));

        let cell = world.cell(id).unwrap();
        assert!(cell.state().contains(CellState::REMOVED));
        assert!(!world.ids(CellKind::Food).contains(&id));
        assert!(world.query_range(&world.bounds()).iter().all(|c| c.node_id() != id));
    }

    #[test]
    fn test_despawn_respawns_below_floor() {
        let mut config = test_config();
        config.food.min_amount = 3;
        let mut world = World::new(config);
        world.fill();
        assert_eq!(world.counts().food, 3);

        let victim = world.ids(CellKind::Food)[0];
        world.despawn(victim);
        assert_eq!(world.counts().food, 3);
        assert!(!world.ids(CellKind::Food).contains(&victim));
    }

    #[test]
    fn test_despawn_kind() {
        let mut world = World::new(test_config());
        for i in 0..5 {
            world.spawn(CellKind::Ejected, Some(Vec2::new(i as f32 * 100.0, 0.0)), None, None);
        }
        world.spawn(CellKind::Food, None, None, None);
        assert_eq!(world.despawn_kind(CellKind::Ejected), 5);
        assert_eq!(world.counts().ejected, 0);
        assert_eq!(world.counts().food, 1);
        assert_eq!(world.drain_events().removed.len(), 5);
    }

    #[test]
    fn test_drain_events_purges_tombstones() {
        let mut world = World::new(test_config());
        let id = world.spawn(CellKind::Food, None, None, None);
        world.despawn(id);
        assert!(world.cell(id).is_some());

        let events = world.drain_events();
        assert_eq!(events.removed, vec![id]);
        assert!(world.cell(id).is_none());
        assert!(world.drain_events().removed.is_empty());
    }

    #[test]
    fn test_setters_resync_index() {
        let mut world = World::new(test_config());
        let id = world.spawn(CellKind::Food, Some(Vec2::new(-500.0, -500.0)), None, None);

        assert!(world.set_position(id, Vec2::new(500.0, 500.0)));
        assert!(world.query_range(&Rect::square(Vec2::new(-500.0, -500.0), 10.0)).is_empty());
        assert_eq!(world.query_range(&Rect::square(Vec2::new(500.0, 500.0), 10.0)).len(), 1);

        assert!(world.set_mass(id, 25.0));
        assert_eq!(world.cell(id).unwrap().radius(), 50.0);
        assert_eq!(world.query_range(&Rect::square(Vec2::new(540.0, 500.0), 2.0)).len(), 1);

        assert!(world.set_radius(id, 10.0));
        assert_eq!(world.cell(id).unwrap().mass(), 1.0);

        world.despawn(id);
        assert!(!world.set_position(id, Vec2::ZERO));
    }

    #[test]
    fn test_player_score_and_center() {
        let mut world = World::new(test_config());
        world.add_player(1);
        let a = world.spawn_player_cell(1, Some(Vec2::new(-100.0, 0.0)), Some(20.0)).unwrap();
        let b = world.spawn_player_cell(1, Some(Vec2::new(300.0, 0.0)), Some(40.0)).unwrap();
        world.set_position(b, Vec2::new(100.0, 0.0));

        assert!((world.player_score(1) - 20.0).abs() < 1e-4);
        assert_eq!(world.player_center(1), Some(Vec2::ZERO));

        world.despawn(a);
        world.despawn(b);
        assert_eq!(world.player_center(1), Some(Vec2::new(100.0, 0.0)));
        assert_eq!(world.player_score(1), 0.0);
    }
}
