//! Game state and main loop.

use super::{Command, CommandQueue, OperatorCommand, WorldCell, WorldUpdate};
use crate::config::Config;
use crate::world::World;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::{debug, info, warn};

/// Ticks between performance log lines.
const STATS_INTERVAL: u64 = 400;

/// The single writer of the world.
pub struct Game {
    world: World,
    commands: mpsc::UnboundedReceiver<Command>,
    queue: CommandQueue,
    updates: broadcast::Sender<WorldUpdate>,
    /// Smoothed tick duration in milliseconds.
    pub update_time_avg: f64,
}

impl Game {
    /// Build the world and fill it to its population floors.
    pub fn new(config: Config, queue: CommandQueue, commands: mpsc::UnboundedReceiver<Command>) -> Self {
        let mut world = World::new(config);
        info!("Initial world spawn...");
        world.fill();

        let (updates, _) = broadcast::channel(16);
        Self {
            world,
            commands,
            queue,
            updates,
            update_time_avg: 0.0,
        }
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// A handle for queuing commands to this game.
    pub fn queue(&self) -> CommandQueue {
        self.queue.clone()
    }

    /// Receive every [`WorldUpdate`] published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WorldUpdate> {
        self.updates.subscribe()
    }

    /// Apply every queued command. Returns how many were applied.
    pub fn drain_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.commands.try_recv() {
            self.apply(command);
            applied += 1;
        }
        applied
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Connect { id } => {
                self.world.add_player(id);
            }
            Command::Intent { player, intent } => {
                debug!("Player {} intent {:?}", player, intent);
                self.world.apply_intent(player, intent);
            }
            Command::Operator(command) => self.apply_operator(command),
            Command::ReloadConfig(config) => match config.validate() {
                Ok(()) => self.world.reload_config(*config),
                Err(e) => warn!("Rejected config reload: {}", e),
            },
        }
    }

    fn apply_operator(&mut self, command: OperatorCommand) {
        let world = &mut self.world;
        match command {
            OperatorCommand::Spawn {
                kind,
                position,
                radius,
                color,
            } => {
                let id = world.spawn(kind, position, radius, color);
                info!("Spawned {} #{}", kind.name(), id);
            }
            OperatorCommand::Despawn(id) => {
                world.despawn(id);
            }
            OperatorCommand::DespawnKind(kind) => {
                let removed = world.despawn_kind(kind);
                info!("Despawned {} {} cells", removed, kind.name());
            }
            OperatorCommand::SetPosition(id, position) => {
                world.set_position(id, position);
            }
            OperatorCommand::SetMass(id, mass) => {
                world.set_mass(id, mass);
            }
            OperatorCommand::SetRadius(id, radius) => {
                world.set_radius(id, radius);
            }
            OperatorCommand::SetColor(id, color) => {
                world.set_color(id, color);
            }
            OperatorCommand::KillPlayer(id) => {
                let removed = world.kill_player(id);
                info!("Killed player {} ({} cells)", id, removed);
            }
            OperatorCommand::AddMinion { controller } => {
                let id = self.queue.next_player_id();
                if !world.add_minion(id, controller) {
                    warn!("Cannot add minion: no player {}", controller);
                }
            }
            OperatorCommand::Status => {
                let counts = world.counts();
                let stats = world.index_stats();
                info!(
                    "Tick {}: {} players, {} cells ({} player, {} food, {} virus, {} ejected, {} mother), index {} nodes depth {}",
                    world.tick_count(),
                    counts.players,
                    counts.total(),
                    counts.player_cells,
                    counts.food,
                    counts.viruses,
                    counts.ejected,
                    counts.mother_cells,
                    stats.nodes,
                    stats.depth
                );
            }
        }
    }

    /// Run one tick: apply queued commands, advance the world and build the update.
    pub fn tick(&mut self) -> WorldUpdate {
        let start = std::time::Instant::now();
        self.drain_commands();
        self.world.update();
        let events = self.world.drain_events();

        let update = WorldUpdate {
            tick: self.world.tick_count(),
            cells: self.world.cells().map(WorldCell::from).collect(),
            eaten: events.eaten,
            removed: events.removed,
            players: self
                .world
                .players()
                .filter_map(|player| self.world.player_summary(player.id()))
                .collect(),
        };
        self.world.clear_sync_flags();

        if self.world.tick_count() % STATS_INTERVAL == 0 {
            debug!(
                "Tick {}: {:.3}ms (avg {:.3}ms), {} cells",
                update.tick,
                start.elapsed().as_secs_f64() * 1000.0,
                self.update_time_avg,
                update.cells.len()
            );
        }
        update
    }

    /// Send an update to every subscriber. No subscribers is not an error.
    pub fn publish(&self, update: WorldUpdate) {
        let _ = self.updates.send(update);
    }
}

/// Drive `game` at the configured tick rate until the task is dropped.
///
/// While no players exist the world is not updated; commands are still drained
/// so connections wake it up.
pub async fn run_game_loop(mut game: Game) {
    let tick_interval_ms = game.world().config().server.tick_interval_ms;
    let start = Instant::now() + Duration::from_millis(tick_interval_ms);
    let mut ticker = interval_at(start, Duration::from_millis(tick_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        if game.world().counts().players == 0 {
            game.drain_commands();
            if game.world().counts().players == 0 {
                sleep(Duration::from_millis((tick_interval_ms * 4).max(100))).await;
                continue;
            }
        }

        let tick_start = std::time::Instant::now();
        let update = game.tick();
        let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;
        game.update_time_avg = game.update_time_avg * 0.5 + tick_ms * 0.5;

        let tick_budget = game.world().config().server.tick_interval_ms as f64 * 0.9;
        if tick_ms > tick_budget {
            warn!(
                "Slow tick #{}: {:.3}ms (budget: {:.1}ms) - {} players, {} cells total",
                update.tick,
                tick_ms,
                tick_budget,
                update.players.len(),
                update.cells.len()
            );
        }

        game.publish(update);
    }
}
