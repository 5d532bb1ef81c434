//! Mother cell.
//!
//! A stationary, spiked cell kept at a population floor. Eating one pops the
//! eater just like a virus does.

use super::cell::{CellTraits, KindMask};
use crate::Color;

/// Default mother cell color.
pub const MOTHER_COLOR: Color = Color::new(206, 99, 99);

pub const EAT_MASK: KindMask = KindMask::empty();
pub const AVOID_SPAWN_MASK: KindMask = KindMask::PLAYER.union(KindMask::VIRUS).union(KindMask::MOTHER_CELL);
pub const TRAITS: CellTraits = CellTraits::SPIKED;
