//! Virus cell.

use super::cell::{Cell, CellTraits, KindMask};
use crate::config::VirusConfig;
use crate::Color;

/// Default virus color (green).
pub const VIRUS_COLOR: Color = Color::new(51, 255, 51);

/// Viruses feed on ejected mass.
pub const EAT_MASK: KindMask = KindMask::EJECTED;
pub const AVOID_SPAWN_MASK: KindMask = KindMask::PLAYER.union(KindMask::VIRUS).union(KindMask::MOTHER_CELL);
pub const TRAITS: CellTraits = CellTraits::SPIKED;

/// A virus fed past its max radius splits off a new one.
#[inline]
pub fn is_overfed(cell: &Cell, config: &VirusConfig) -> bool {
    cell.radius() > config.max_radius
}
