//! Simulation configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub border: BorderConfig,
    #[serde(default)]
    pub quadtree: QuadTreeConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub virus: VirusConfig,
    #[serde(default)]
    pub eject: EjectConfig,
    #[serde(default)]
    pub mother: MotherConfig,
}

impl Config {
    /// Load configuration from `path`, writing the defaults there if the file does not exist.
    ///
    /// The result is validated before it is returned.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        let config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(io_err)?;
            toml::from_str(&contents)?
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?).map_err(io_err)?;
            default_config
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, reason })
            }
        }
        fn positive(value: f32, field: &'static str) -> Result<(), ConfigError> {
            check(value.is_finite() && value > 0.0, field, "must be a positive number")
        }
        fn probability(value: f32, field: &'static str) -> Result<(), ConfigError> {
            check((0.0..=1.0).contains(&value), field, "must be within [0, 1]")
        }

        check(self.server.tick_interval_ms > 0, "server.tick_interval_ms", "must be non-zero")?;
        positive(self.border.width, "border.width")?;
        positive(self.border.height, "border.height")?;

        check(self.quadtree.capacity > 0, "quadtree.capacity", "must be non-zero")?;

        check(
            self.physics.eat_size_multiplier >= 1.0,
            "physics.eat_size_multiplier",
            "must be at least 1",
        )?;
        check(
            (0.0..1.0).contains(&self.physics.eat_overlap_factor),
            "physics.eat_overlap_factor",
            "must be within [0, 1)",
        )?;
        check(
            self.physics.deceleration > 0.0 && self.physics.deceleration <= 1.0,
            "physics.deceleration",
            "must be within (0, 1]",
        )?;
        positive(self.physics.min_acceleration, "physics.min_acceleration")?;
        check(
            self.physics.chain_impulse >= 0.0,
            "physics.chain_impulse",
            "must not be negative",
        )?;

        positive(self.player.start_radius, "player.start_radius")?;
        positive(self.player.min_radius, "player.min_radius")?;
        positive(self.player.max_mass, "player.max_mass")?;
        positive(self.player.min_split_mass, "player.min_split_mass")?;
        positive(self.player.min_eject_mass, "player.min_eject_mass")?;
        positive(self.player.speed, "player.speed")?;
        check(self.player.max_cells > 0, "player.max_cells", "must be non-zero")?;
        check(
            (0.0..1.0).contains(&self.player.decay_rate),
            "player.decay_rate",
            "must be within [0, 1)",
        )?;
        check(
            self.player.remerge_time >= 0.0,
            "player.remerge_time",
            "must not be negative",
        )?;

        positive(self.food.radius, "food.radius")?;
        check(
            self.food.max_radius >= self.food.radius,
            "food.max_radius",
            "must not be smaller than food.radius",
        )?;
        probability(self.food.growth_chance, "food.growth_chance")?;

        positive(self.virus.radius, "virus.radius")?;
        check(
            self.virus.max_radius >= self.virus.radius,
            "virus.max_radius",
            "must not be smaller than virus.radius",
        )?;
        check(
            self.virus.max_amount >= self.virus.min_amount,
            "virus.max_amount",
            "must not be smaller than virus.min_amount",
        )?;
        positive(self.virus.split_min, "virus.split_min")?;

        positive(self.eject.radius, "eject.radius")?;
        positive(self.eject.radius_loss, "eject.radius_loss")?;
        check(self.eject.spread >= 0.0, "eject.spread", "must not be negative")?;

        positive(self.mother.radius, "mother.radius")?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            border: BorderConfig::default(),
            quadtree: QuadTreeConfig::default(),
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
            food: FoodConfig::default(),
            virus: VirusConfig::default(),
            eject: EjectConfig::default(),
            mother: MotherConfig::default(),
        }
    }
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server name used in logs.
    #[serde(default = "default_name")]
    pub name: String,
    /// Tick interval in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

impl ServerConfig {
    /// Number of ticks in one second of simulated time (at least 1).
    #[inline]
    pub fn ticks_per_second(&self) -> u64 {
        (1000 / self.tick_interval_ms.max(1)).max(1)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            tick_interval_ms: default_tick_interval(),
        }
    }
}

fn default_name() -> String {
    "Cell Arena".to_string()
}
fn default_tick_interval() -> u64 {
    40
}

/// World border configuration. The play area is centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BorderConfig {
    #[serde(default = "default_border_size")]
    pub width: f32,
    #[serde(default = "default_border_size")]
    pub height: f32,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            width: default_border_size(),
            height: default_border_size(),
        }
    }
}

fn default_border_size() -> f32 {
    14142.0
}

/// Spatial index tuning.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct QuadTreeConfig {
    /// Objects a leaf holds before it subdivides.
    #[serde(default = "default_quadtree_capacity")]
    pub capacity: usize,
    /// Deepest level a node may subdivide to.
    #[serde(default = "default_quadtree_max_depth")]
    pub max_depth: u32,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            capacity: default_quadtree_capacity(),
            max_depth: default_quadtree_max_depth(),
        }
    }
}

fn default_quadtree_capacity() -> usize {
    64
}
fn default_quadtree_max_depth() -> u32 {
    8
}

/// Collision and movement constants.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PhysicsConfig {
    /// A predator's radius must be at least this many times the prey's.
    #[serde(default = "default_eat_size_multiplier")]
    pub eat_size_multiplier: f32,
    /// Fraction of the prey radius that may stick out of the predator when eaten.
    #[serde(default = "default_eat_overlap_factor")]
    pub eat_overlap_factor: f32,
    /// Fraction of the remaining acceleration travelled each tick.
    #[serde(default = "default_deceleration")]
    pub deceleration: f32,
    /// Acceleration below this is dropped to zero.
    #[serde(default = "default_min_acceleration")]
    pub min_acceleration: f32,
    /// Impulse given to a resting ejected sibling when pushed.
    #[serde(default = "default_chain_impulse")]
    pub chain_impulse: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            eat_size_multiplier: default_eat_size_multiplier(),
            eat_overlap_factor: default_eat_overlap_factor(),
            deceleration: default_deceleration(),
            min_acceleration: default_min_acceleration(),
            chain_impulse: default_chain_impulse(),
        }
    }
}

fn default_eat_size_multiplier() -> f32 {
    1.15
}
fn default_eat_overlap_factor() -> f32 {
    1.0 / 3.0
}
fn default_deceleration() -> f32 {
    0.1
}
fn default_min_acceleration() -> f32 {
    1.0
}
fn default_chain_impulse() -> f32 {
    20.0
}

/// Player configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_start_radius")]
    pub start_radius: f32,
    /// Decay never shrinks a cell below this radius.
    #[serde(default = "default_player_min_radius")]
    pub min_radius: f32,
    /// Cells above this mass auto-split (or are capped when out of cells).
    #[serde(default = "default_player_max_mass")]
    pub max_mass: f32,
    #[serde(default = "default_player_min_split_mass")]
    pub min_split_mass: f32,
    #[serde(default = "default_player_min_eject_mass")]
    pub min_eject_mass: f32,
    #[serde(default = "default_player_max_cells")]
    pub max_cells: usize,
    #[serde(default = "default_player_speed")]
    pub speed: f32,
    /// Fraction of mass lost per second of decay.
    #[serde(default = "default_player_decay_rate")]
    pub decay_rate: f32,
    /// Base remerge delay in seconds.
    #[serde(default = "default_player_remerge_time")]
    pub remerge_time: f32,
    #[serde(default = "default_player_split_speed")]
    pub split_speed: f32,
    /// Freshly split siblings ignore each other for this many ticks.
    #[serde(default = "default_player_collision_ignore_ticks")]
    pub collision_ignore_ticks: u64,
    /// Minion fragments below this mass give their controller nothing.
    #[serde(default = "default_player_minion_food_mass")]
    pub minion_food_mass: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_radius: default_player_start_radius(),
            min_radius: default_player_min_radius(),
            max_mass: default_player_max_mass(),
            min_split_mass: default_player_min_split_mass(),
            min_eject_mass: default_player_min_eject_mass(),
            max_cells: default_player_max_cells(),
            speed: default_player_speed(),
            decay_rate: default_player_decay_rate(),
            remerge_time: default_player_remerge_time(),
            split_speed: default_player_split_speed(),
            collision_ignore_ticks: default_player_collision_ignore_ticks(),
            minion_food_mass: default_player_minion_food_mass(),
        }
    }
}

fn default_player_start_radius() -> f32 {
    30.0
}
fn default_player_min_radius() -> f32 {
    30.0
}
fn default_player_max_mass() -> f32 {
    22500.0
}
fn default_player_min_split_mass() -> f32 {
    36.0
}
fn default_player_min_eject_mass() -> f32 {
    36.0
}
fn default_player_max_cells() -> usize {
    16
}
fn default_player_speed() -> f32 {
    30.0
}
fn default_player_decay_rate() -> f32 {
    0.002
}
fn default_player_remerge_time() -> f32 {
    30.0
}
fn default_player_split_speed() -> f32 {
    780.0
}
fn default_player_collision_ignore_ticks() -> u64 {
    13
}
fn default_player_minion_food_mass() -> f32 {
    100.0
}

/// Food configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FoodConfig {
    #[serde(default = "default_food_radius")]
    pub radius: f32,
    #[serde(default = "default_food_max_radius")]
    pub max_radius: f32,
    /// Population floor.
    #[serde(default = "default_food_min_amount")]
    pub min_amount: usize,
    /// Per-tick chance of gaining one unit of mass.
    #[serde(default = "default_food_growth_chance")]
    pub growth_chance: f32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            radius: default_food_radius(),
            max_radius: default_food_max_radius(),
            min_amount: default_food_min_amount(),
            growth_chance: default_food_growth_chance(),
        }
    }
}

fn default_food_radius() -> f32 {
    10.0
}
fn default_food_max_radius() -> f32 {
    20.0
}
fn default_food_min_amount() -> usize {
    1500
}
fn default_food_growth_chance() -> f32 {
    0.002
}

/// Virus configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct VirusConfig {
    #[serde(default = "default_virus_radius")]
    pub radius: f32,
    #[serde(default = "default_virus_max_radius")]
    pub max_radius: f32,
    /// Population floor.
    #[serde(default = "default_virus_min_amount")]
    pub min_amount: usize,
    /// Feeding stops producing new viruses at this population.
    #[serde(default = "default_virus_max_amount")]
    pub max_amount: usize,
    #[serde(default = "default_virus_eject_speed")]
    pub eject_speed: f32,
    /// Maximum total cells a player can have after being popped.
    #[serde(default = "default_virus_max_cells")]
    pub max_cells: usize,
    /// Minimum mass per popped fragment. Higher values produce fewer, larger pieces.
    #[serde(default = "default_virus_split_min")]
    pub split_min: f32,
}

impl Default for VirusConfig {
    fn default() -> Self {
        Self {
            radius: default_virus_radius(),
            max_radius: default_virus_max_radius(),
            min_amount: default_virus_min_amount(),
            max_amount: default_virus_max_amount(),
            eject_speed: default_virus_eject_speed(),
            max_cells: default_virus_max_cells(),
            split_min: default_virus_split_min(),
        }
    }
}

fn default_virus_radius() -> f32 {
    100.0
}
fn default_virus_max_radius() -> f32 {
    141.4
}
fn default_virus_min_amount() -> usize {
    50
}
fn default_virus_max_amount() -> usize {
    100
}
fn default_virus_eject_speed() -> f32 {
    780.0
}
fn default_virus_max_cells() -> usize {
    16
}
fn default_virus_split_min() -> f32 {
    36.0
}

/// Ejected mass configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct EjectConfig {
    #[serde(default = "default_eject_radius")]
    pub radius: f32,
    /// The ejecting cell loses the mass of a cell with this radius.
    #[serde(default = "default_eject_radius_loss")]
    pub radius_loss: f32,
    #[serde(default = "default_eject_speed")]
    pub speed: f32,
    /// Minimum ticks between two ejects of the same player.
    #[serde(default = "default_eject_cooldown")]
    pub cooldown: u64,
    /// Random angular spread in radians.
    #[serde(default = "default_eject_spread")]
    pub spread: f32,
    /// Ticks during which ejected mass ignores the cell that ejected it.
    #[serde(default = "default_eject_self_collision_ticks")]
    pub self_collision_ticks: u64,
}

impl Default for EjectConfig {
    fn default() -> Self {
        Self {
            radius: default_eject_radius(),
            radius_loss: default_eject_radius_loss(),
            speed: default_eject_speed(),
            cooldown: default_eject_cooldown(),
            spread: default_eject_spread(),
            self_collision_ticks: default_eject_self_collision_ticks(),
        }
    }
}

fn default_eject_radius() -> f32 {
    36.056
}
fn default_eject_radius_loss() -> f32 {
    41.231
}
fn default_eject_speed() -> f32 {
    780.0
}
fn default_eject_cooldown() -> u64 {
    2
}
fn default_eject_spread() -> f32 {
    0.3
}
fn default_eject_self_collision_ticks() -> u64 {
    15
}

/// Mother cell configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MotherConfig {
    #[serde(default = "default_mother_radius")]
    pub radius: f32,
    /// Population floor (0 disables mother cells).
    #[serde(default)]
    pub min_amount: usize,
}

impl Default for MotherConfig {
    fn default() -> Self {
        Self {
            radius: default_mother_radius(),
            min_amount: 0,
        }
    }
}

fn default_mother_radius() -> f32 {
    149.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [border]
            width = 2000.0

            [food]
            min_amount = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.border.width, 2000.0);
        assert_eq!(config.border.height, default_border_size());
        assert_eq!(config.food.min_amount, 10);
        assert_eq!(config.food.radius, default_food_radius());
        assert_eq!(config.virus, VirusConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.quadtree.capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "quadtree.capacity", .. })
        ));

        let mut config = Config::default();
        config.physics.eat_size_multiplier = 0.9;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.border.width = -5.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.food.growth_chance = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.virus.min_amount = 200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ticks_per_second() {
        let mut server = ServerConfig::default();
        assert_eq!(server.ticks_per_second(), 25);
        server.tick_interval_ms = 5000;
        assert_eq!(server.ticks_per_second(), 1);
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
