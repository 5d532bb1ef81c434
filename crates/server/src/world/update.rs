//! Per-tick update.

use super::World;
use crate::collision::{circle_contact, squashes};
use crate::entity::{Cell, CellKind, CellState, EntityId, food, player_cell};
use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

impl World {
    /// Advance the simulation by one tick.
    ///
    /// Kinds are visited in [`CellKind::ALL`] order over a snapshot of each
    /// kind's ids, so cells spawned during the tick wait for the next one and
    /// cells removed during the tick are skipped.
    pub fn update(&mut self) {
        self.tick_count += 1;
        for kind in CellKind::ALL {
            let ids = self.ids(kind).to_vec();
            for id in ids {
                self.update_cell(id);
            }
        }
    }

    fn update_cell(&mut self, id: EntityId) {
        let Some(kind) = self.live_cell(id).map(Cell::kind) else {
            return;
        };

        match kind {
            CellKind::Food => self.update_food(id),
            CellKind::Player => self.update_player_cell(id),
            CellKind::Virus | CellKind::Ejected | CellKind::MotherCell => {}
        }

        if self.live_cell(id).is_some_and(|cell| cell.acceleration() > 0.0) {
            self.collide_neighbors(id);
            let physics = self.config.physics;
            let bounds = self.bounds;
            if let Some(cell) = self.live_cell_mut(id) {
                cell.decelerate(physics.deceleration, physics.min_acceleration, &bounds);
            }
            self.update_spatial_bound(id);
        }

        if kind == CellKind::Player {
            self.collide_neighbors(id);
        }
    }

    fn update_food(&mut self, id: EntityId) {
        let config = self.config.food;
        let roll = rand::rng().random::<f32>();
        let grew = self
            .live_cell_mut(id)
            .is_some_and(|cell| food::grow(cell, &config, roll));
        if grew {
            self.update_spatial_bound(id);
        }
    }

    fn update_player_cell(&mut self, id: EntityId) {
        let tick = self.tick_count;
        let player = self.config.player;
        let tick_interval_ms = self.config.server.tick_interval_ms;
        let ticks_per_second = self.config.server.ticks_per_second();
        let bounds = self.bounds;

        let Some(cell) = self.live_cell(id) else {
            return;
        };
        let merge_ready =
            cell.age(tick) >= player_cell::remerge_ticks(cell.radius(), player.remerge_time, ticks_per_second);
        let target = cell
            .cached_target()
            .or_else(|| cell.owner().and_then(|owner| self.movement_target(owner)));

        if let Some(cell) = self.live_cell_mut(id) {
            cell.set_ignore_self_collision(merge_ready);

            if let Some(target) = target {
                let delta = target - cell.position();
                let distance = delta.length();
                if distance >= 1.0 {
                    let step = player_cell::speed(cell.radius(), player.speed, tick_interval_ms).min(distance);
                    cell.set_position(cell.position() + delta / distance * step);
                    cell.clamp_to(&bounds);
                }
            }

            if tick % ticks_per_second == 0 && cell.mass() >= player.min_split_mass {
                let radius = player_cell::decayed_radius(cell.radius(), player.decay_rate, player.min_radius);
                if radius < cell.radius() {
                    cell.set_radius(radius);
                }
            }
        }
        self.update_spatial_bound(id);

        self.auto_split(id);
        if merge_ready {
            self.merge_siblings(id);
        }
    }

    /// Split an oversized cell in a random direction, or cap it when the
    /// owner has no room for another cell.
    fn auto_split(&mut self, id: EntityId) {
        let player = self.config.player;
        let Some(cell) = self.live_cell(id) else {
            return;
        };
        if cell.mass() <= player.max_mass {
            return;
        }
        let mass = cell.mass();
        let has_room = cell
            .owner()
            .is_some_and(|owner| self.player_cell_count(owner) < player.max_cells);

        if has_room {
            let angle = rand::rng().random::<f32>() * TAU;
            self.split_cell(id, Vec2::from_angle(angle), mass / 2.0);
        }
        if self.live_cell(id).is_some_and(|cell| cell.mass() > player.max_mass) {
            self.set_mass(id, player.max_mass);
        }
    }

    /// Absorb merge-ready siblings that sit deep enough inside this cell.
    fn merge_siblings(&mut self, id: EntityId) {
        let overlap_factor = self.config.physics.eat_overlap_factor;
        let Some(cell) = self.live_cell(id) else {
            return;
        };
        let Some(owner) = cell.owner() else {
            return;
        };
        let neighbors = self.quadtree.query_range(&cell.bound());

        for other in neighbors {
            if other == id {
                continue;
            }
            let Some(cell) = self.live_cell(id) else {
                return;
            };
            let Some(sibling) = self.live_cell(other) else {
                continue;
            };
            if sibling.kind() != CellKind::Player
                || sibling.owner() != Some(owner)
                || !sibling.state().contains(CellState::IGNORE_SELF_COLLISION)
            {
                continue;
            }
            // The larger cell absorbs; ties go to the lower id.
            if sibling.radius() > cell.radius() || (sibling.radius() == cell.radius() && other < id) {
                continue;
            }
            let Some(contact) = circle_contact(cell.position(), cell.radius(), sibling.position(), sibling.radius())
            else {
                continue;
            };
            if squashes(cell.radius(), sibling.radius(), contact.distance_sq, overlap_factor) {
                self.consume(id, other);
            }
        }
    }

    /// Run the pair rules between `id` and every indexed neighbor.
    pub(crate) fn collide_neighbors(&mut self, id: EntityId) {
        let Some(cell) = self.live_cell(id) else {
            return;
        };
        let neighbors = self.quadtree.query_range(&cell.bound());
        for other in neighbors {
            if !self.is_live(id) {
                break;
            }
            if other != id {
                self.handle_collision(id, other);
            }
        }
    }
}
