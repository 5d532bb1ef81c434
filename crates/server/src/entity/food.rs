//! Food pellet.

use super::cell::{Cell, CellTraits, KindMask};
use crate::collision::mass_to_radius;
use crate::config::FoodConfig;

pub const EAT_MASK: KindMask = KindMask::empty();
pub const AVOID_SPAWN_MASK: KindMask = KindMask::empty();
pub const TRAITS: CellTraits = CellTraits::empty();

/// Growth lottery: with `growth_chance`, gain one unit of mass up to `max_radius`.
///
/// `roll` is a uniform sample in `[0, 1)`. Returns true if the pellet grew.
pub fn grow(cell: &mut Cell, config: &FoodConfig, roll: f32) -> bool {
    if roll >= config.growth_chance || cell.radius() >= config.max_radius {
        return false;
    }
    cell.set_radius(mass_to_radius(cell.mass() + 1.0).min(config.max_radius));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CellKind;
    use crate::Color;
    use glam::Vec2;

    #[test]
    fn test_growth_lottery() {
        let config = FoodConfig {
            radius: 10.0,
            max_radius: 15.0,
            min_amount: 0,
            growth_chance: 0.5,
        };
        let mut food = Cell::new(1, CellKind::Food, Vec2::ZERO, 10.0, Color::default(), 0);

        assert!(!grow(&mut food, &config, 0.7));
        assert_eq!(food.mass(), 1.0);

        assert!(grow(&mut food, &config, 0.1));
        assert!((food.mass() - 2.0).abs() < 1e-5);

        // Capped at the max radius.
        while grow(&mut food, &config, 0.0) {}
        assert_eq!(food.radius(), 15.0);
    }

    #[test]
    fn test_zero_chance_never_grows() {
        let config = FoodConfig {
            growth_chance: 0.0,
            ..FoodConfig::default()
        };
        let mut food = Cell::new(1, CellKind::Food, Vec2::ZERO, 10.0, Color::default(), 0);
        assert!(!grow(&mut food, &config, 0.0));
    }
}
