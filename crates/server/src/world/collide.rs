//! Pair rules: sibling handling, eating and rigid separation.

use super::World;
use crate::collision::{Predator, circle_contact, resolve_roles, separation, squashes};
use crate::entity::{Cell, CellKind, CellState, EntityId, ejected_mass, virus};
use crate::player::PlayerId;
use glam::Vec2;
use tracing::debug;

impl World {
    /// Resolve one overlapping pair.
    ///
    /// Order of checks:
    /// 1. both cells live and overlapping
    /// 2. ejected mass ignores its creator for a few ticks
    /// 3. siblings (same kind and creator) separate or pass through, never eat
    /// 4. the larger cell eats the smaller one if its eat mask allows and the
    ///    smaller one sits deep enough inside it
    pub fn handle_collision(&mut self, a_id: EntityId, b_id: EntityId) {
        if a_id == b_id {
            return;
        }
        let (Some(a), Some(b)) = (self.live_cell(a_id), self.live_cell(b_id)) else {
            return;
        };
        let Some(contact) = circle_contact(a.position(), a.radius(), b.position(), b.radius()) else {
            return;
        };

        let tick = self.tick_count;
        let grace = self.config.eject.self_collision_ticks;
        if ejected_mass::in_creator_grace(a, b, tick, grace) || ejected_mass::in_creator_grace(b, a, tick, grace) {
            return;
        }

        if a.creator_id() != 0 && a.creator_id() == b.creator_id() && a.kind() == b.kind() {
            match a.kind() {
                CellKind::Ejected => {
                    let b_resting = b.acceleration() <= 0.0;
                    self.resolve_collision(a_id, b_id);
                    let impulse = self.config.physics.chain_impulse;
                    if b_resting && impulse > 0.0 {
                        if let Some(b) = self.live_cell_mut(b_id) {
                            b.set_impulse(contact.delta, impulse);
                        }
                    }
                }
                CellKind::Player => {
                    let ignore_ticks = self.config.player.collision_ignore_ticks;
                    let passes_through = [a, b].iter().any(|cell| {
                        cell.age(tick) < ignore_ticks || cell.state().contains(CellState::IGNORE_SELF_COLLISION)
                    });
                    if !passes_through {
                        self.resolve_collision(a_id, b_id);
                    }
                }
                CellKind::Food | CellKind::Virus | CellKind::MotherCell => {}
            }
            return;
        }

        let Some(predator) = resolve_roles(a.radius(), b.radius(), self.config.physics.eat_size_multiplier) else {
            return;
        };
        let (pred_id, pred, prey_id, prey) = match predator {
            Predator::First => (a_id, a, b_id, b),
            Predator::Second => (b_id, b, a_id, a),
        };
        if !pred.can_eat(prey.kind()) || prey.is_removed() {
            return;
        }
        if squashes(pred.radius(), prey.radius(), contact.distance_sq, self.config.physics.eat_overlap_factor) {
            self.consume(pred_id, prey_id);
        }
    }

    /// `pred_id` eats `prey_id`: mass moves over, the prey is stamped with its
    /// killer and despawned, then the predator's eat hook runs.
    pub(crate) fn consume(&mut self, pred_id: EntityId, prey_id: EntityId) {
        let (Some(pred), Some(prey)) = (self.live_cell(pred_id), self.live_cell(prey_id)) else {
            return;
        };
        let pred_kind = pred.kind();
        let prey_kind = prey.kind();
        let prey_mass = prey.mass();
        let prey_direction = prey.direction();
        // Minions are fed to their controller without handing over mass.
        let no_gain = prey_kind == CellKind::Player
            && prey_mass < self.config.player.minion_food_mass
            && self.is_minion_of(prey.owner(), pred.owner());

        if let Some(prey) = self.live_cell_mut(prey_id) {
            prey.mark_eaten(pred_id);
        }
        self.events.eaten.push((prey_id, pred_id));
        self.log_cell_event("Eaten", prey_id);
        self.despawn(prey_id);

        if !no_gain {
            if let Some(pred) = self.live_cell_mut(pred_id) {
                pred.set_mass(pred.mass() + prey_mass);
            }
            self.update_spatial_bound(pred_id);
        }

        match (pred_kind, prey_kind) {
            (CellKind::Player, CellKind::Virus | CellKind::MotherCell) => self.pop(pred_id),
            (CellKind::Virus, CellKind::Ejected) => self.feed_virus(pred_id, prey_direction),
            _ => {}
        }
    }

    fn is_minion_of(&self, prey_owner: Option<PlayerId>, pred_owner: Option<PlayerId>) -> bool {
        let (Some(prey_owner), Some(pred_owner)) = (prey_owner, pred_owner) else {
            return false;
        };
        self.players
            .get(&prey_owner)
            .is_some_and(|player| player.controller == Some(pred_owner))
    }

    /// An overfed virus resets its size and shoots a new virus along the
    /// direction of the mass that fed it.
    fn feed_virus(&mut self, virus_id: EntityId, direction: Vec2) {
        let config = self.config.virus;
        let Some(cell) = self.live_cell(virus_id) else {
            return;
        };
        if !virus::is_overfed(cell, &config) {
            return;
        }
        let position = cell.position();
        self.set_radius(virus_id, config.radius);

        if self.viruses.len() >= config.max_amount {
            return;
        }
        let id = self.next_id();
        let mut shot = Cell::new(id, CellKind::Virus, position, config.radius, virus::VIRUS_COLOR, self.tick_count);
        shot.set_creator(virus_id);
        shot.set_impulse(direction, config.eject_speed);
        self.insert_cell(shot);
        debug!("Virus {} shot virus {}", virus_id, id);
    }

    /// Push two overlapping cells apart until they touch, heavier cell moving less.
    pub(crate) fn resolve_collision(&mut self, a_id: EntityId, b_id: EntityId) {
        let (Some(a), Some(b)) = (self.live_cell(a_id), self.live_cell(b_id)) else {
            return;
        };
        let Some(contact) = circle_contact(a.position(), a.radius(), b.position(), b.radius()) else {
            return;
        };
        let (push_a, push_b) = separation(&contact, a.mass(), b.mass());
        let bounds = self.bounds;

        for (id, push) in [(a_id, push_a), (b_id, push_b)] {
            if let Some(cell) = self.live_cell_mut(id) {
                cell.set_position(cell.position() + push);
                cell.clamp_to(&bounds);
            }
            self.update_spatial_bound(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_config;
    use super::*;
    use crate::player::PlayerState;

    #[test]
    fn test_player_eats_food_and_conserves_mass() {
        let mut world = World::new(test_config());
        let eater = world.spawn(CellKind::Player, Some(Vec2::ZERO), Some(40.0), None);
        let food = world.spawn(CellKind::Food, Some(Vec2::new(5.0, 0.0)), Some(10.0), None);
        let total = world.cell(eater).unwrap().mass() + world.cell(food).unwrap().mass();

        world.handle_collision(food, eater);

        assert!(!world.is_live(food));
        assert_eq!(world.cell(food).unwrap().killer_id(), eater);
        assert!((world.cell(eater).unwrap().mass() - total).abs() < 1e-4);
        assert_eq!(world.counts().food, 0);

        let events = world.drain_events();
        assert_eq!(events.eaten, vec![(food, eater)]);
        assert_eq!(events.removed, vec![food]);
    }

    #[test]
    fn test_no_eat_below_size_ratio() {
        let mut world = World::new(test_config());
        let a = world.spawn(CellKind::Player, Some(Vec2::ZERO), Some(40.0), None);
        let b = world.spawn(CellKind::Player, Some(Vec2::new(300.0, 0.0)), Some(36.0), None);
        world.set_position(b, Vec2::new(1.0, 0.0));

        world.handle_collision(a, b);
        assert!(world.is_live(a) && world.is_live(b));
    }

    #[test]
    fn test_no_eat_without_deep_overlap() {
        let mut world = World::new(test_config());
        let eater = world.spawn(CellKind::Player, Some(Vec2::ZERO), Some(40.0), None);
        // Overlapping, but 40 - 10/3 < 45.
        let food = world.spawn(CellKind::Food, Some(Vec2::new(45.0, 0.0)), Some(10.0), None);

        world.handle_collision(eater, food);
        assert!(world.is_live(food));
    }

    #[test]
    fn test_virus_does_not_eat_player() {
        let mut world = World::new(test_config());
        let virus = world.spawn(CellKind::Virus, Some(Vec2::ZERO), Some(100.0), None);
        let player = world.spawn(CellKind::Player, Some(Vec2::new(500.0, 0.0)), Some(30.0), None);
        world.set_position(player, Vec2::new(10.0, 0.0));

        world.handle_collision(virus, player);
        assert!(world.is_live(player));
    }

    #[test]
    fn test_player_pops_on_virus() {
        let mut world = World::new(test_config());
        world.add_player(1);
        world.spawn_player(1, String::new());
        let cell = world.player(1).unwrap().cells()[0];
        world.set_radius(cell, 200.0);
        world.set_position(cell, Vec2::ZERO);
        let virus = world.spawn(CellKind::Virus, Some(Vec2::new(600.0, 600.0)), Some(100.0), None);
        world.set_position(virus, Vec2::new(20.0, 0.0));
        let total = world.player_score(1) + world.cell(virus).unwrap().mass();

        world.handle_collision(cell, virus);

        assert!(!world.is_live(virus));
        let player = world.player(1).unwrap();
        assert!(player.cells().len() > 1);
        assert!(player.cells().len() <= world.config().virus.max_cells);
        assert!((world.player_score(1) - total).abs() < 1e-2);
    }

    #[test]
    fn test_overfed_virus_shoots() {
        let mut config = test_config();
        config.virus.max_radius = 105.0;
        let mut world = World::new(config);
        let virus = world.spawn(CellKind::Virus, Some(Vec2::ZERO), Some(104.0), None);
        let ejected = world.spawn(CellKind::Ejected, Some(Vec2::new(10.0, 0.0)), None, None);
        if let Some(cell) = world.live_cell_mut(ejected) {
            cell.set_impulse(Vec2::Y, 50.0);
        }

        world.handle_collision(virus, ejected);

        assert_eq!(world.cell(virus).unwrap().radius(), 100.0);
        assert_eq!(world.counts().viruses, 2);
        let shot = world.ids(CellKind::Virus).iter().copied().find(|&id| id != virus).unwrap();
        let shot = world.cell(shot).unwrap();
        assert_eq!(shot.creator_id(), virus);
        assert_eq!(shot.direction(), Vec2::Y);
        assert_eq!(shot.acceleration(), world.config().virus.eject_speed);
    }

    #[test]
    fn test_ejected_ignores_creator_during_grace() {
        let mut world = World::new(test_config());
        let eater = world.spawn(CellKind::Player, Some(Vec2::ZERO), Some(100.0), None);
        let mut shot = Cell::new(world.next_id(), CellKind::Ejected, Vec2::ZERO, 36.0, crate::Color::default(), 0);
        shot.set_creator(eater);
        let shot = world.insert_cell(shot);

        world.handle_collision(eater, shot);
        assert!(world.is_live(shot));

        world.tick_count = world.config().eject.self_collision_ticks;
        world.handle_collision(eater, shot);
        assert!(!world.is_live(shot));
    }

    #[test]
    fn test_young_siblings_pass_through() {
        let mut world = World::new(test_config());
        world.add_player(1);
        let a = world.spawn_player_cell(1, Some(Vec2::ZERO), Some(40.0)).unwrap();
        let b = world.spawn_player_cell(1, Some(Vec2::new(300.0, 0.0)), Some(40.0)).unwrap();
        world.set_position(b, Vec2::new(10.0, 0.0));

        world.handle_collision(a, b);
        assert_eq!(world.cell(a).unwrap().position(), Vec2::ZERO);
        assert_eq!(world.cell(b).unwrap().position(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_old_siblings_separate_and_never_eat() {
        let mut world = World::new(test_config());
        world.add_player(1);
        let a = world.spawn_player_cell(1, Some(Vec2::ZERO), Some(80.0)).unwrap();
        let b = world.spawn_player_cell(1, Some(Vec2::new(500.0, 0.0)), Some(30.0)).unwrap();
        world.set_position(b, Vec2::new(5.0, 0.0));
        world.tick_count = world.config().player.collision_ignore_ticks;

        world.handle_collision(a, b);

        let (a, b) = (world.cell(a).unwrap(), world.cell(b).unwrap());
        assert!(!a.is_removed() && !b.is_removed());
        let distance = a.position().distance(b.position());
        assert!((distance - 110.0).abs() < 1e-2);
        assert_eq!(world.player(1).unwrap().state(), PlayerState::Dead);
    }

    #[test]
    fn test_resting_ejected_sibling_gets_chain_impulse() {
        let mut world = World::new(test_config());
        let mut cells = Vec::new();
        for x in [0.0, 20.0] {
            let mut cell = Cell::new(world.next_id(), CellKind::Ejected, Vec2::new(x, 0.0), 36.0, crate::Color::default(), 0);
            cell.set_creator(99);
            cells.push(world.insert_cell(cell));
        }

        world.handle_collision(cells[0], cells[1]);

        let moved = world.cell(cells[1]).unwrap();
        assert_eq!(moved.direction(), Vec2::X);
        assert_eq!(moved.acceleration(), world.config().physics.chain_impulse);
        let distance = world.cell(cells[0]).unwrap().position().distance(moved.position());
        assert!((distance - 72.0).abs() < 1e-2);
    }

    #[test]
    fn test_minion_feeds_controller_without_mass() {
        let mut world = World::new(test_config());
        world.add_player(1);
        world.spawn_player(1, String::new());
        assert!(world.add_minion(2, 1));
        let owner_cell = world.player(1).unwrap().cells()[0];
        let minion_cell = world.player(2).unwrap().cells()[0];
        world.set_radius(owner_cell, 80.0);
        world.set_position(owner_cell, Vec2::ZERO);
        world.set_position(minion_cell, Vec2::new(5.0, 0.0));
        let before = world.cell(owner_cell).unwrap().mass();

        world.handle_collision(owner_cell, minion_cell);

        assert!(!world.is_live(minion_cell));
        assert_eq!(world.cell(owner_cell).unwrap().mass(), before);
    }
}
