//! Player cell.

use super::cell::{CellTraits, KindMask};

/// Player cells may eat every kind.
pub const EAT_MASK: KindMask = KindMask::all();
pub const AVOID_SPAWN_MASK: KindMask = KindMask::PLAYER.union(KindMask::VIRUS).union(KindMask::MOTHER_CELL);
pub const TRAITS: CellTraits = CellTraits::empty();

/// Split impulse distance for a fresh fragment of `radius`.
#[inline]
pub fn split_impulse(radius: f32, split_speed: f32) -> f32 {
    split_speed * radius.powf(0.0122)
}

/// Movement per tick. Bigger cells are slower.
///
/// Formula: `2.2 * radius^-0.439 * 40 * (speed / 30)`, scaled to the tick length.
#[inline]
pub fn speed(radius: f32, player_speed: f32, tick_interval_ms: u64) -> f32 {
    let base_speed = 2.2 * radius.powf(-0.439) * 40.0;
    base_speed * (player_speed / 30.0) * (tick_interval_ms as f32 / 40.0)
}

/// Ticks after birth before a cell may remerge with its siblings.
#[inline]
pub fn remerge_ticks(radius: f32, remerge_time: f32, ticks_per_second: u64) -> u64 {
    (remerge_time.max(radius * 0.2) * ticks_per_second as f32) as u64
}

/// One second of decay: `radius * sqrt(1 - rate)`, never below `min_radius`.
#[inline]
pub fn decayed_radius(radius: f32, decay_rate: f32, min_radius: f32) -> f32 {
    (radius * (1.0 - decay_rate).sqrt()).max(min_radius)
}

/// Fragment masses for a cell of `cell_mass` popped with room for `cells_left`
/// more cells. Fragments are split off the original cell, which keeps the rest.
///
/// Two regimes:
/// - too little mass to give every slot `split_min`: a power-of-two fragment
///   count, each fragment an equal share with the original;
/// - otherwise a greedy halving walk over half the mass, switching to an even
///   fill once the remainder would drop below `split_min` per slot.
pub fn pop_split_masses(cell_mass: f32, cells_left: usize, split_min: f32) -> Vec<f32> {
    let mut splits = Vec::new();
    if cells_left == 0 {
        return splits;
    }

    if cell_mass / (cells_left as f32) < split_min {
        let mut split_count: usize = 2;
        let mut split_mass = cell_mass / split_count as f32;
        while split_mass > split_min && 2 * split_count < cells_left {
            split_count *= 2;
            split_mass = cell_mass / split_count as f32;
        }
        let share = cell_mass / (split_count + 1) as f32;
        splits.resize(split_count, share);
        return splits;
    }

    let mut mass_left = cell_mass / 2.0;
    let mut split_mass = cell_mass / 2.0;
    // Signed: the even fill can take it below zero.
    let mut remaining = cells_left as i64;

    while remaining > 0 {
        remaining -= 1;

        // With no slots left the quotient is +inf and the fill is skipped.
        if mass_left / (remaining as f32) < split_min {
            split_mass = mass_left / remaining as f32;
            while remaining > 0 {
                remaining -= 1;
                splits.push(split_mass);
            }
        }

        while split_mass >= mass_left && remaining > 0 {
            split_mass /= 2.0;
        }
        splits.push(split_mass);
        mass_left -= split_mass;
    }

    splits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_masses(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn test_pop_small_cell_doubles_fragment_count() {
        // 100 / 15 < 36: counts go 2 -> 4 (25 <= 36 stops), shares of 100 / 5.
        assert_masses(&pop_split_masses(100.0, 15, 36.0), &[20.0; 4]);
        // 60 / 15 < 36 and 30 <= 36 already: two fragments of 20.
        assert_masses(&pop_split_masses(60.0, 15, 36.0), &[20.0, 20.0]);
    }

    #[test]
    fn test_pop_large_cell_halves_greedily() {
        assert_masses(&pop_split_masses(1000.0, 3, 36.0), &[250.0, 125.0, 125.0]);
    }

    #[test]
    fn test_pop_switches_to_even_fill() {
        // 100 / 3 < 36 on the first slot: three even fills plus the tail push.
        let third = 100.0 / 3.0;
        assert_masses(&pop_split_masses(200.0, 4, 36.0), &[third; 4]);
    }

    #[test]
    fn test_pop_respects_budget() {
        for cells_left in 1..16 {
            for mass in [40.0, 150.0, 900.0, 5000.0, 22500.0] {
                let splits = pop_split_masses(mass, cells_left, 36.0);
                assert!(splits.len() <= cells_left.max(2), "{mass} {cells_left} {splits:?}");
                assert!(splits.iter().all(|&m| m > 0.0));
            }
        }
        assert!(pop_split_masses(500.0, 0, 36.0).is_empty());
    }

    #[test]
    fn test_speed_decreases_with_radius() {
        let small = speed(30.0, 30.0, 40);
        let large = speed(300.0, 30.0, 40);
        assert!(small > large);
        assert!((speed(30.0, 60.0, 40) - small * 2.0).abs() < 1e-4);
        assert!((speed(30.0, 30.0, 20) - small / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_remerge_ticks() {
        assert_eq!(remerge_ticks(50.0, 30.0, 25), 750);
        // Big cells wait longer: 0.2 * 500 = 100 seconds.
        assert_eq!(remerge_ticks(500.0, 30.0, 25), 2500);
    }

    #[test]
    fn test_decay_floor() {
        assert_eq!(decayed_radius(30.0, 0.5, 30.0), 30.0);
        let r = decayed_radius(100.0, 0.19, 30.0);
        assert!((r - 90.0).abs() < 1e-3);
    }
}
