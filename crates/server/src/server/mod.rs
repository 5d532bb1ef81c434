//! Game server plumbing: the command queue feeding the world and the
//! per-tick update published to viewers.
//!
//! Transports and consoles never touch the [`World`](crate::World). They push
//! [`Command`]s through a [`CommandQueue`]; the game loop drains the queue at
//! the start of every tick.

use crate::Color;
use crate::config::Config;
use crate::entity::{CellKind, CellTraits, EntityId};
use crate::player::{Intent, PlayerId, PlayerSummary};
use glam::Vec2;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::mpsc;

pub mod game;

pub use game::{Game, run_game_loop};

/// Administrative commands issued from a console.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorCommand {
    Spawn {
        kind: CellKind,
        position: Option<Vec2>,
        radius: Option<f32>,
        color: Option<Color>,
    },
    Despawn(EntityId),
    DespawnKind(CellKind),
    SetPosition(EntityId, Vec2),
    SetMass(EntityId, f32),
    SetRadius(EntityId, f32),
    SetColor(EntityId, Color),
    KillPlayer(PlayerId),
    AddMinion { controller: PlayerId },
    /// Log population and index statistics.
    Status,
}

/// Everything that can be queued for the game loop.
#[derive(Debug, Clone)]
pub enum Command {
    Connect { id: PlayerId },
    Intent { player: PlayerId, intent: Intent },
    Operator(OperatorCommand),
    ReloadConfig(Box<Config>),
}

/// Cloneable handle for submitting commands to the game loop.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    tx: mpsc::UnboundedSender<Command>,
    next_player_id: Arc<AtomicU32>,
}

/// Create a command queue and the receiving end owned by the game.
pub fn command_queue() -> (CommandQueue, mpsc::UnboundedReceiver<Command>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let queue = CommandQueue {
        tx,
        next_player_id: Arc::new(AtomicU32::new(1)),
    };
    (queue, rx)
}

impl CommandQueue {
    /// Allocate a fresh player id.
    pub fn next_player_id(&self) -> PlayerId {
        self.next_player_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Allocate an id and queue its connection. Returns the id.
    pub fn connect(&self) -> PlayerId {
        let id = self.next_player_id();
        self.send(Command::Connect { id });
        id
    }

    pub fn intent(&self, player: PlayerId, intent: Intent) {
        self.send(Command::Intent { player, intent });
    }

    pub fn operator(&self, command: OperatorCommand) {
        self.send(Command::Operator(command));
    }

    pub fn reload_config(&self, config: Config) {
        self.send(Command::ReloadConfig(Box::new(config)));
    }

    /// Queue a command. Commands sent after the game stopped are dropped.
    pub fn send(&self, command: Command) {
        let _ = self.tx.send(command);
    }
}

/// Cell data for world updates.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldCell {
    pub node_id: EntityId,
    pub kind: CellKind,
    pub position: Vec2,
    pub radius: f32,
    pub color: Color,
    pub spiked: bool,
    pub agitated: bool,
    pub owner: Option<PlayerId>,
    /// Position, size or color changed since the previous update.
    pub changed: bool,
}

impl From<&crate::Cell> for WorldCell {
    fn from(cell: &crate::Cell) -> Self {
        Self {
            node_id: cell.node_id(),
            kind: cell.kind(),
            position: cell.position(),
            radius: cell.radius(),
            color: cell.color(),
            spiked: cell.traits().contains(CellTraits::SPIKED),
            agitated: cell.traits().contains(CellTraits::AGITATED),
            owner: cell.owner(),
            changed: cell.needs_sync(),
        }
    }
}

/// World state update broadcast (sent every tick).
#[derive(Debug, Clone, Default)]
pub struct WorldUpdate {
    pub tick: u64,
    /// All live cells.
    pub cells: Vec<WorldCell>,
    /// Cells that were eaten this tick: (eaten_id, eater_id).
    pub eaten: Vec<(EntityId, EntityId)>,
    /// Cells that were removed this tick.
    pub removed: Vec<EntityId>,
    pub players: Vec<PlayerSummary>,
}
