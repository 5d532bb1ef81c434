//! Cell arena simulation core.
//!
//! This crate contains:
//! - The spatial index (`spatial`)
//! - Cell entities and per-kind behavior (`entity`)
//! - The world: spawn/despawn, tick update and collision rules (`world`)
//! - The single-writer command queue and game loop (`server`)

pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod player;
pub mod server;
pub mod spatial;
pub mod world;

pub use config::Config;
pub use entity::{Cell, CellKind, EntityId};
pub use error::ConfigError;
pub use geometry::Rect;
pub use player::{Intent, Player, PlayerId, PlayerState, PlayerSummary};
pub use world::World;

use rand::Rng;

/// RGB color used for cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Generate a random, reasonably bright color.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self::new(
            rng.random_range(50..=255),
            rng.random_range(50..=255),
            rng.random_range(50..=255),
        )
    }
}
