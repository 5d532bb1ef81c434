//! Player-facing operations: connect, spawn, split, eject, spectate, pop.

use super::World;
use crate::collision::{mass_to_radius, radius_to_mass};
use crate::entity::{Cell, CellKind, EntityId, player_cell};
use crate::player::{Intent, Player, PlayerId, PlayerState};
use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;
use tracing::{debug, info};

impl World {
    /// Register a connected player. Returns false if the id is taken.
    pub fn add_player(&mut self, id: PlayerId) -> bool {
        if self.players.contains_key(&id) {
            return false;
        }
        self.players.insert(id, Player::new(id));
        info!("Player {} connected", id);
        true
    }

    /// Add a bot that follows `controller`'s target and spawn it.
    pub fn add_minion(&mut self, id: PlayerId, controller: PlayerId) -> bool {
        let Some(name) = self.players.get(&controller).map(|p| p.name.clone()) else {
            return false;
        };
        if self.players.contains_key(&id) {
            return false;
        }
        let mut minion = Player::new(id);
        minion.controller = Some(controller);
        self.players.insert(id, minion);
        info!("Minion {} added for player {}", id, controller);
        self.spawn_player(id, format!("{}'s minion", name))
    }

    /// Detach every minion of `controller` and drop the ones with no cells left.
    /// The rest disconnect with their cells heading for `target`, the
    /// controller's last target.
    pub(crate) fn release_minions(&mut self, controller: PlayerId, target: Vec2) {
        let minions: Vec<PlayerId> = self
            .players
            .values()
            .filter(|player| player.controller == Some(controller))
            .map(Player::id)
            .collect();
        for id in minions {
            let Some(minion) = self.players.get_mut(&id) else {
                continue;
            };
            minion.controller = None;
            minion.state = PlayerState::Disconnected;
            minion.target = target;
            let cells = minion.cells.clone();
            if cells.is_empty() {
                self.players.remove(&id);
            }
            for cell_id in cells {
                if let Some(cell) = self.live_cell_mut(cell_id) {
                    cell.set_cached_target(Some(target));
                }
            }
        }
    }

    pub fn apply_intent(&mut self, id: PlayerId, intent: Intent) {
        match intent {
            Intent::SetTarget(target) => self.set_target(id, target),
            Intent::Split => {
                self.split_player(id);
            }
            Intent::Eject => {
                self.eject(id);
            }
            Intent::Spawn(name) => {
                self.spawn_player(id, name);
            }
            Intent::Spectate => {
                self.toggle_spectate(id);
            }
            Intent::Disconnect => self.disconnect(id),
        }
    }

    pub fn set_target(&mut self, id: PlayerId, target: Vec2) {
        if let Some(player) = self.players.get_mut(&id) {
            player.target = target;
        }
    }

    /// Where the player's cells should move: the controller's target for
    /// minions, the player's own otherwise.
    pub(crate) fn movement_target(&self, id: PlayerId) -> Option<Vec2> {
        let player = self.players.get(&id)?;
        match player.controller {
            Some(controller) => self.players.get(&controller).map(Player::target),
            None => Some(player.target),
        }
    }

    /// Put a dead or spectating player into the world with one starting cell.
    pub fn spawn_player(&mut self, id: PlayerId, name: String) -> bool {
        let Some(player) = self.players.get_mut(&id) else {
            return false;
        };
        if matches!(player.state, PlayerState::Playing | PlayerState::Disconnected) {
            return false;
        }
        if !name.is_empty() {
            player.name = name;
        }

        let radius = self.config.player.start_radius;
        if self.spawn_player_cell(id, None, Some(radius)).is_none() {
            return false;
        }
        if let Some(player) = self.players.get_mut(&id) {
            player.state = PlayerState::Playing;
            info!("Player {} spawned as {:?}", id, player.name);
        }
        true
    }

    /// Split every cell with enough mass toward the player's target.
    /// Returns the number of new cells.
    pub fn split_player(&mut self, id: PlayerId) -> usize {
        let Some(player) = self.players.get(&id) else {
            return 0;
        };
        if player.state != PlayerState::Playing {
            return 0;
        }
        let target = player.target;
        let cells = player.cells.clone();
        let min_split_mass = self.config.player.min_split_mass;

        let mut created = 0;
        for cell_id in cells {
            let Some(cell) = self.live_cell(cell_id) else {
                continue;
            };
            if cell.mass() < min_split_mass {
                continue;
            }
            let direction = target - cell.position();
            let mass = cell.mass() / 2.0;
            if self.split_cell(cell_id, direction, mass).is_some() {
                created += 1;
            }
        }
        debug!("Player {} split into {} new cells", id, created);
        created
    }

    /// Split `fragment_mass` off a player cell as a new cell launched along
    /// `direction`. The parent's remerge clock restarts.
    ///
    /// Refused when the owner is at the cell limit or either half would fall
    /// below the minimum radius.
    pub(crate) fn split_cell(&mut self, cell_id: EntityId, direction: Vec2, fragment_mass: f32) -> Option<EntityId> {
        let config = self.config.player;
        let tick = self.tick_count;
        let cell = self.live_cell(cell_id)?;
        let owner = cell.owner()?;
        if self.player_cell_count(owner) >= config.max_cells {
            return None;
        }
        let parent_mass = cell.mass() - fragment_mass;
        let fragment_radius = mass_to_radius(fragment_mass);
        if fragment_radius < config.min_radius || mass_to_radius(parent_mass) < config.min_radius {
            return None;
        }
        let position = cell.position();
        let color = cell.color();

        if let Some(parent) = self.live_cell_mut(cell_id) {
            parent.set_mass(parent_mass);
            parent.restart_age(tick);
        }
        self.update_spatial_bound(cell_id);

        let id = self.next_id();
        let mut fragment = Cell::new(id, CellKind::Player, position, fragment_radius, color, tick);
        fragment.set_owner(Some(owner));
        fragment.set_creator(owner);
        fragment.set_impulse(direction, player_cell::split_impulse(fragment_radius, config.split_speed));
        Some(self.insert_cell(fragment))
    }

    /// Shoot a blob of mass from every cell heavy enough, respecting the cooldown.
    /// Returns the number of blobs.
    pub fn eject(&mut self, id: PlayerId) -> usize {
        let tick = self.tick_count;
        let eject = self.config.eject;
        let min_eject_mass = self.config.player.min_eject_mass;

        let Some(player) = self.players.get_mut(&id) else {
            return 0;
        };
        if player.state != PlayerState::Playing || !player.try_eject(tick, eject.cooldown) {
            return 0;
        }
        let target = player.target;
        let cells = player.cells.clone();
        let loss = radius_to_mass(eject.radius_loss);
        let mut rng = rand::rng();

        let mut ejected = 0;
        for cell_id in cells {
            let Some(cell) = self.live_cell(cell_id) else {
                continue;
            };
            if cell.mass() < min_eject_mass || cell.mass() <= loss {
                continue;
            }
            let remaining = cell.mass() - loss;
            let position = cell.position();
            let color = cell.color();

            let mut direction = (target - position).normalize_or_zero();
            if direction == Vec2::ZERO {
                direction = Vec2::X;
            }
            if eject.spread > 0.0 {
                direction = Vec2::from_angle(rng.random_range(-eject.spread..eject.spread)).rotate(direction);
            }

            self.set_mass(cell_id, remaining);
            let origin = position + direction * mass_to_radius(remaining);
            let blob_id = self.next_id();
            let mut blob = Cell::new(blob_id, CellKind::Ejected, origin, eject.radius, color, tick);
            blob.set_creator(cell_id);
            blob.set_impulse(direction, eject.speed);
            self.insert_cell(blob);
            ejected += 1;
        }
        ejected
    }

    /// Dead players start spectating; spectators toggle free-roam.
    pub fn toggle_spectate(&mut self, id: PlayerId) -> Option<PlayerState> {
        let player = self.players.get_mut(&id)?;
        player.state = match player.state {
            PlayerState::Dead | PlayerState::Freeroam => PlayerState::Spectating,
            PlayerState::Spectating => PlayerState::Freeroam,
            state @ (PlayerState::Playing | PlayerState::Disconnected) => state,
        };
        Some(player.state)
    }

    /// The connection closed. Cells keep drifting toward the last target until
    /// they die; a player with no cells is dropped right away.
    pub fn disconnect(&mut self, id: PlayerId) {
        let Some(player) = self.players.get_mut(&id) else {
            return;
        };
        player.state = PlayerState::Disconnected;
        let target = player.target;
        let cells = player.cells.clone();

        if cells.is_empty() {
            self.players.remove(&id);
            self.release_minions(id, target);
        } else {
            for cell_id in cells {
                if let Some(cell) = self.live_cell_mut(cell_id) {
                    cell.set_cached_target(Some(target));
                }
            }
        }
        info!("Player {} disconnected", id);
    }

    /// Despawn every cell of the player. Returns how many were removed.
    pub fn kill_player(&mut self, id: PlayerId) -> usize {
        let Some(player) = self.players.get(&id) else {
            return 0;
        };
        let cells = player.cells.clone();
        cells.into_iter().filter(|&cell| self.despawn(cell)).count()
    }

    /// Burst a player cell that swallowed a virus into fragments flung in
    /// random directions.
    pub(crate) fn pop(&mut self, cell_id: EntityId) {
        let virus = self.config.virus;
        let Some(cell) = self.live_cell(cell_id) else {
            return;
        };
        let Some(owner) = cell.owner() else {
            return;
        };
        let cells_left = virus.max_cells.saturating_sub(self.player_cell_count(owner));
        let fragments = player_cell::pop_split_masses(cell.mass(), cells_left, virus.split_min);

        let mut rng = rand::rng();
        let mut created = 0;
        for mass in fragments {
            let angle = rng.random::<f32>() * TAU;
            if self.split_cell(cell_id, Vec2::from_angle(angle), mass).is_some() {
                created += 1;
            }
        }
        debug!("Cell {} popped into {} fragments", cell_id, created);
    }
}
