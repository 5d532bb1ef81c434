//! Game entities (cells).
//!
//! Every kind shares the [`Cell`] record. Kind modules hold the per-kind
//! masks, constants and pure behavior; the world dispatches to them with an
//! exhaustive `match` on [`CellKind`].

mod cell;
pub mod ejected_mass;
pub mod food;
pub mod mother_cell;
pub mod player_cell;
pub mod virus;

pub use cell::{Cell, CellKind, CellState, CellTraits, EntityId, KindMask};
