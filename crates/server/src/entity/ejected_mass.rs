//! Ejected mass.

use super::cell::{Cell, CellKind, CellTraits, KindMask};

pub const EAT_MASK: KindMask = KindMask::empty();
pub const AVOID_SPAWN_MASK: KindMask = KindMask::empty();
pub const TRAITS: CellTraits = CellTraits::empty();

/// Whether `ejected` is still too young to interact with the cell that ejected it.
#[inline]
pub fn in_creator_grace(ejected: &Cell, other: &Cell, tick: u64, grace_ticks: u64) -> bool {
    ejected.kind() == CellKind::Ejected
        && ejected.creator_id() == other.node_id()
        && ejected.age(tick) < grace_ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use glam::Vec2;

    #[test]
    fn test_creator_grace_window() {
        let source = Cell::new(4, CellKind::Player, Vec2::ZERO, 50.0, Color::default(), 0);
        let stranger = Cell::new(5, CellKind::Player, Vec2::ZERO, 50.0, Color::default(), 0);
        let mut ejected = Cell::new(9, CellKind::Ejected, Vec2::ZERO, 36.0, Color::default(), 10);
        ejected.set_creator(4);

        assert!(in_creator_grace(&ejected, &source, 12, 15));
        assert!(!in_creator_grace(&ejected, &source, 25, 15));
        assert!(!in_creator_grace(&ejected, &stranger, 12, 15));
    }
}
