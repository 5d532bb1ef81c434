//! Player aggregate.

use crate::entity::EntityId;
use crate::Color;
use glam::Vec2;

pub type PlayerId = u32;

/// Player lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// Connected, no cells.
    #[default]
    Dead,
    /// Controlling at least one cell.
    Playing,
    /// Spectating with a free camera.
    Freeroam,
    /// Spectating the top player.
    Spectating,
    /// Connection closed; cells keep coasting toward the last target.
    Disconnected,
}

/// A parsed player command delivered by the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SetTarget(Vec2),
    Split,
    Eject,
    Spawn(String),
    Spectate,
    Disconnect,
}

/// A connected (or minion) player.
#[derive(Debug, Clone)]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) name: String,
    pub(crate) cells: Vec<EntityId>,
    pub(crate) target: Vec2,
    pub(crate) state: PlayerState,
    /// Set for minions: the player whose target they follow.
    pub(crate) controller: Option<PlayerId>,
    pub(crate) color: Color,
    pub(crate) last_eject_tick: Option<u64>,
    pub(crate) last_center: Vec2,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            name: String::new(),
            cells: Vec::new(),
            target: Vec2::ZERO,
            state: PlayerState::Dead,
            controller: None,
            color: Color::random(),
            last_eject_tick: None,
            last_center: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn cells(&self) -> &[EntityId] {
        &self.cells
    }

    #[inline]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    #[inline]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    #[inline]
    pub fn controller(&self) -> Option<PlayerId> {
        self.controller
    }

    #[inline]
    pub fn is_minion(&self) -> bool {
        self.controller.is_some()
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Whether an eject at `tick` respects `cooldown`. Records the tick if so.
    pub(crate) fn try_eject(&mut self, tick: u64, cooldown: u64) -> bool {
        if let Some(last) = self.last_eject_tick {
            if tick.saturating_sub(last) < cooldown {
                return false;
            }
        }
        self.last_eject_tick = Some(tick);
        true
    }

    pub(crate) fn remove_cell(&mut self, id: EntityId) -> bool {
        match self.cells.iter().position(|&c| c == id) {
            Some(pos) => {
                self.cells.swap_remove(pos);
                true
            }
            None => false,
        }
    }
}

/// Read-only summary of a player for the view layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub state: PlayerState,
    /// Sum of cell masses.
    pub score: f32,
    /// Arithmetic mean of cell positions, or the last known center.
    pub center: Vec2,
    pub cells: Vec<EntityId>,
}
