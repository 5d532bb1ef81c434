//! End-to-end world scenarios through the public API.

use arena::entity::CellKind;
use arena::{Config, PlayerState, Rect, World};
use glam::Vec2;

fn quiet_config() -> Config {
    let mut config = Config::default();
    config.border.width = 3000.0;
    config.border.height = 3000.0;
    config.food.min_amount = 0;
    config.food.growth_chance = 0.0;
    config.virus.min_amount = 0;
    config.mother.min_amount = 0;
    config
}

#[test]
fn food_is_eaten_and_replaced() {
    let mut config = quiet_config();
    config.food.min_amount = 1;
    let mut world = World::new(config);
    let food = world.spawn(CellKind::Food, Some(Vec2::new(5.0, 0.0)), None, None);
    let eater = world.spawn(CellKind::Player, Some(Vec2::ZERO), Some(40.0), None);

    world.update();

    assert!(!world.is_live(food));
    assert_eq!(world.cell(food).unwrap().killer_id(), eater);
    assert!((world.cell(eater).unwrap().mass() - 17.0).abs() < 1e-3);
    // The floor brought a fresh pellet back.
    assert_eq!(world.counts().food, 1);
    assert_ne!(world.ids(CellKind::Food)[0], food);

    let events = world.drain_events();
    assert_eq!(events.eaten, vec![(food, eater)]);
    assert!(events.removed.contains(&food));
}

#[test]
fn split_siblings_pass_through_then_separate() {
    let mut world = World::new(quiet_config());
    world.add_player(1);
    assert!(world.spawn_player(1, "splitter".into()));
    let parent = world.player(1).unwrap().cells()[0];
    world.set_radius(parent, 100.0);
    world.set_position(parent, Vec2::ZERO);
    world.set_target(1, Vec2::new(1000.0, 0.0));

    assert_eq!(world.split_player(1), 1);
    let cells = world.player(1).unwrap().cells().to_vec();
    let child = cells[1];

    // Fresh siblings ignore each other.
    let before = (world.cell(parent).unwrap().position(), world.cell(child).unwrap().position());
    world.handle_collision(parent, child);
    assert_eq!(
        (world.cell(parent).unwrap().position(), world.cell(child).unwrap().position()),
        before
    );

    // Hold the cells still and let the grace window run out.
    world.set_target(1, Vec2::ZERO);
    for _ in 0..world.config().player.collision_ignore_ticks + 5 {
        world.update();
    }
    world.set_position(child, world.cell(parent).unwrap().position() + Vec2::new(10.0, 0.0));
    world.handle_collision(parent, child);

    let (a, b) = (world.cell(parent).unwrap(), world.cell(child).unwrap());
    assert!(world.is_live(parent) && world.is_live(child));
    let distance = a.position().distance(b.position());
    assert!((distance - (a.radius() + b.radius())).abs() < 1e-2);
    assert_eq!(world.player(1).unwrap().state(), PlayerState::Playing);
}

#[test]
fn last_cell_eaten_kills_player() {
    let mut world = World::new(quiet_config());
    world.add_player(1);
    world.spawn_player(1, String::new());
    let victim = world.player(1).unwrap().cells()[0];
    world.set_position(victim, Vec2::new(5.0, 0.0));
    let hunter = world.spawn(CellKind::Player, Some(Vec2::new(800.0, 800.0)), Some(120.0), None);
    world.set_position(hunter, Vec2::ZERO);

    world.handle_collision(hunter, victim);

    let player = world.player(1).unwrap();
    assert_eq!(player.state(), PlayerState::Dead);
    assert!(player.cells().is_empty());
    assert_eq!(world.player_center(1), Some(Vec2::new(5.0, 0.0)));
    assert_eq!(world.cell(victim).unwrap().killer_id(), hunter);
}

#[test]
fn crowded_spawn_terminates() {
    let mut config = quiet_config();
    config.border.width = 500.0;
    config.border.height = 500.0;
    config.virus.min_amount = 40;
    let mut world = World::new(config);

    world.fill();

    assert_eq!(world.counts().viruses, 40);
    let bounds = world.bounds();
    assert!(world.cells().all(|cell| bounds.contains_point(cell.position())));
}

#[test]
fn index_tracks_moving_cells() {
    let mut world = World::new(quiet_config());
    let mut moving = Vec::new();
    for i in 0..20 {
        let id = world.spawn(CellKind::Ejected, Some(Vec2::new(i as f32 * 50.0 - 500.0, 0.0)), None, None);
        moving.push(id);
    }
    world.add_player(1);
    world.spawn_player(1, String::new());
    world.set_target(1, Vec2::new(0.0, 1000.0));

    for _ in 0..50 {
        world.update();
    }

    let stats = world.index_stats();
    assert_eq!(stats.objects, world.counts().total());
    for cell in world.cells() {
        let found = world.query_range(&Rect::square(cell.position(), 1.0));
        assert!(found.iter().any(|other| other.node_id() == cell.node_id()));
    }
}

#[test]
fn despawn_twice_changes_nothing() {
    let mut world = World::new(quiet_config());
    let id = world.spawn(CellKind::MotherCell, None, None, None);
    assert!(world.despawn(id));
    let counts = world.counts();
    assert!(!world.despawn(id));
    assert_eq!(world.counts(), counts);
    assert_eq!(world.drain_events().removed, vec![id]);
}
