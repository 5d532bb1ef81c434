//! Base cell record and common functionality.

use super::{ejected_mass, food, mother_cell, player_cell, virus};
use crate::collision::{mass_to_radius, radius_to_mass};
use crate::geometry::Rect;
use crate::player::PlayerId;
use crate::spatial::ObjectKey;
use crate::Color;
use bitflags::bitflags;
use glam::Vec2;

/// Unique node id of a cell. 0 means "no id".
pub type EntityId = u32;

/// Cell kind.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Player = 0,
    Food = 1,
    Virus = 2,
    Ejected = 3,
    MotherCell = 4,
}

impl CellKind {
    /// Every kind, in per-tick update order.
    pub const ALL: [CellKind; 5] = [
        CellKind::Food,
        CellKind::Virus,
        CellKind::Ejected,
        CellKind::MotherCell,
        CellKind::Player,
    ];

    #[inline]
    pub fn mask(self) -> KindMask {
        match self {
            CellKind::Player => KindMask::PLAYER,
            CellKind::Food => KindMask::FOOD,
            CellKind::Virus => KindMask::VIRUS,
            CellKind::Ejected => KindMask::EJECTED,
            CellKind::MotherCell => KindMask::MOTHER_CELL,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CellKind::Player => "player",
            CellKind::Food => "food",
            CellKind::Virus => "virus",
            CellKind::Ejected => "ejected",
            CellKind::MotherCell => "mother",
        }
    }
}

bitflags! {
    /// Set of cell kinds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KindMask: u8 {
        const PLAYER = 1 << 0;
        const FOOD = 1 << 1;
        const VIRUS = 1 << 2;
        const EJECTED = 1 << 3;
        const MOTHER_CELL = 1 << 4;
    }
}

bitflags! {
    /// Static classification, fixed by kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellTraits: u8 {
        const SPIKED = 1 << 0;
        const AGITATED = 1 << 1;
    }
}

bitflags! {
    /// Dynamic state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellState: u8 {
        const REMOVED = 1 << 0;
        const NEEDS_SYNC = 1 << 1;
        const IGNORE_SELF_COLLISION = 1 << 2;
    }
}

/// A cell of any kind.
#[derive(Debug, Clone)]
pub struct Cell {
    node_id: EntityId,
    kind: CellKind,
    radius: f32,
    mass: f32,
    position: Vec2,
    /// Unit direction of the current impulse.
    direction: Vec2,
    /// Remaining distance of the current impulse.
    acceleration: f32,
    color: Color,
    traits: CellTraits,
    state: CellState,
    eat_mask: KindMask,
    avoid_spawn_mask: KindMask,
    creator_id: u32,
    killer_id: EntityId,
    owner: Option<PlayerId>,
    birth_tick: u64,
    cached_target: Option<Vec2>,
    pub(crate) collidable: Option<ObjectKey>,
    synced: (Vec2, f32),
}

impl Cell {
    pub fn new(node_id: EntityId, kind: CellKind, position: Vec2, radius: f32, color: Color, tick: u64) -> Self {
        let (eat_mask, avoid_spawn_mask, traits) = match kind {
            CellKind::Player => (player_cell::EAT_MASK, player_cell::AVOID_SPAWN_MASK, player_cell::TRAITS),
            CellKind::Food => (food::EAT_MASK, food::AVOID_SPAWN_MASK, food::TRAITS),
            CellKind::Virus => (virus::EAT_MASK, virus::AVOID_SPAWN_MASK, virus::TRAITS),
            CellKind::Ejected => (ejected_mass::EAT_MASK, ejected_mass::AVOID_SPAWN_MASK, ejected_mass::TRAITS),
            CellKind::MotherCell => (mother_cell::EAT_MASK, mother_cell::AVOID_SPAWN_MASK, mother_cell::TRAITS),
        };
        Self {
            node_id,
            kind,
            radius,
            mass: radius_to_mass(radius),
            position,
            direction: Vec2::ZERO,
            acceleration: 0.0,
            color,
            traits,
            state: CellState::NEEDS_SYNC,
            eat_mask,
            avoid_spawn_mask,
            creator_id: 0,
            killer_id: 0,
            owner: None,
            birth_tick: tick,
            cached_target: None,
            collidable: None,
            synced: (position, radius),
        }
    }

    #[inline]
    pub fn node_id(&self) -> EntityId {
        self.node_id
    }

    #[inline]
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    #[inline]
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn traits(&self) -> CellTraits {
        self.traits
    }

    #[inline]
    pub fn state(&self) -> CellState {
        self.state
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.state.contains(CellState::REMOVED)
    }

    #[inline]
    pub fn eat_mask(&self) -> KindMask {
        self.eat_mask
    }

    #[inline]
    pub fn avoid_spawn_mask(&self) -> KindMask {
        self.avoid_spawn_mask
    }

    #[inline]
    pub fn can_eat(&self, kind: CellKind) -> bool {
        self.eat_mask.contains(kind.mask())
    }

    /// Id of the cell or player that produced this one (0 if none).
    #[inline]
    pub fn creator_id(&self) -> u32 {
        self.creator_id
    }

    /// Id of the cell that ate this one (0 while alive).
    #[inline]
    pub fn killer_id(&self) -> EntityId {
        self.killer_id
    }

    #[inline]
    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    #[inline]
    pub fn birth_tick(&self) -> u64 {
        self.birth_tick
    }

    #[inline]
    pub fn age(&self, current_tick: u64) -> u64 {
        current_tick.saturating_sub(self.birth_tick)
    }

    /// Target remembered when the owner disconnected.
    #[inline]
    pub fn cached_target(&self) -> Option<Vec2> {
        self.cached_target
    }

    /// Square bound used by the spatial index.
    #[inline]
    pub fn bound(&self) -> Rect {
        Rect::square(self.position, self.radius * 2.0)
    }

    /// Removed cells are never mutated. Trips in debug builds, skips the write in release.
    #[inline]
    fn writable(&self) -> bool {
        debug_assert!(!self.is_removed(), "mutating removed cell {}", self.node_id);
        !self.is_removed()
    }

    pub(crate) fn set_radius(&mut self, radius: f32) {
        if self.writable() {
            self.radius = radius;
            self.mass = radius_to_mass(radius);
            self.state.insert(CellState::NEEDS_SYNC);
        }
    }

    pub(crate) fn set_mass(&mut self, mass: f32) {
        if self.writable() {
            self.mass = mass.max(0.0);
            self.radius = mass_to_radius(self.mass);
            self.state.insert(CellState::NEEDS_SYNC);
        }
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        if self.writable() {
            self.position = position;
            self.state.insert(CellState::NEEDS_SYNC);
        }
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        if self.writable() {
            self.color = color;
            self.state.insert(CellState::NEEDS_SYNC);
        }
    }

    /// Start coasting `distance` units along `direction`.
    pub(crate) fn set_impulse(&mut self, direction: Vec2, distance: f32) {
        if self.writable() {
            let direction = direction.normalize_or_zero();
            self.direction = if direction == Vec2::ZERO { Vec2::X } else { direction };
            self.acceleration = distance.max(0.0);
        }
    }

    pub(crate) fn set_creator(&mut self, creator_id: u32) {
        if self.writable() {
            self.creator_id = creator_id;
        }
    }

    pub(crate) fn set_owner(&mut self, owner: Option<PlayerId>) {
        if self.writable() {
            self.owner = owner;
        }
    }

    pub(crate) fn set_cached_target(&mut self, target: Option<Vec2>) {
        if self.writable() {
            self.cached_target = target;
        }
    }

    /// Restart the age clock (a split resets remerge timers).
    pub(crate) fn restart_age(&mut self, tick: u64) {
        if self.writable() {
            self.birth_tick = tick;
        }
    }

    pub(crate) fn set_ignore_self_collision(&mut self, ignore: bool) {
        if self.writable() {
            self.state.set(CellState::IGNORE_SELF_COLLISION, ignore);
        }
    }

    /// Flag the cell as consumed by `killer`.
    pub(crate) fn mark_eaten(&mut self, killer: EntityId) {
        if self.writable() && self.killer_id == 0 {
            self.killer_id = killer;
        }
    }

    pub(crate) fn mark_removed(&mut self) {
        self.state.insert(CellState::REMOVED);
        self.collidable = None;
    }

    /// Clamp the position inside `bounds`, reflecting the impulse direction
    /// on every clamped axis.
    pub(crate) fn clamp_to(&mut self, bounds: &Rect) {
        let (position, clamped_x, clamped_y) = bounds.clamp_point(self.position, self.radius / 2.0);
        if clamped_x {
            self.direction.x = -self.direction.x;
        }
        if clamped_y {
            self.direction.y = -self.direction.y;
        }
        self.set_position(position);
    }

    /// One deceleration step: travel `fraction` of the remaining impulse.
    /// Returns false if the cell was not coasting.
    pub(crate) fn decelerate(&mut self, fraction: f32, min_acceleration: f32, bounds: &Rect) -> bool {
        if self.acceleration <= 0.0 || !self.writable() {
            return false;
        }
        let step = self.acceleration * fraction;
        self.acceleration -= step;
        if self.acceleration < min_acceleration {
            self.acceleration = 0.0;
        }
        self.set_position(self.position + self.direction * step);
        self.clamp_to(bounds);
        true
    }

    /// Whether position or radius changed since the index last saw them.
    #[inline]
    pub(crate) fn spatial_dirty(&self) -> bool {
        self.synced != (self.position, self.radius)
    }

    pub(crate) fn mark_spatial_synced(&mut self) {
        self.synced = (self.position, self.radius);
    }

    /// Whether viewers have not seen the latest position, size or color.
    #[inline]
    pub fn needs_sync(&self) -> bool {
        self.state.contains(CellState::NEEDS_SYNC)
    }

    pub(crate) fn clear_needs_sync(&mut self) {
        self.state.remove(CellState::NEEDS_SYNC);
    }
}
