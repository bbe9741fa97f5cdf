//! Universe configuration: every tunable constant of generation, flocking
//! and the player, with defaults matching the shipped game feel.
//!
//! All structs deserialize with `#[serde(default)]`, so a JSON file only has
//! to name the values it changes:
//!
//! ```
//! use starflock_logic::config::UniverseConfig;
//!
//! let config = UniverseConfig::from_json(r#"{ "seed": 7, "window_radius": 1 }"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.sector_size, 600.0);
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical simulation rate the tick-based constants are tuned for.
pub const TICKS_PER_SECOND: u64 = 60;

/// Largest accepted window radius; the window then spans 33x33 sectors.
pub const MAX_WINDOW_RADIUS: i32 = 16;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Inclusive `[min, max]` range for a random draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f64,
    pub max: f64,
}

impl FloatRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(invalid(field, "bounds must be finite"));
        }
        if self.min > self.max {
            return Err(invalid(
                field,
                format!("min {} is greater than max {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

fn check_probability(field: &'static str, p: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is not a probability", p)))
    }
}

fn check_positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v > 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{} must be positive", v)))
    }
}

/// Top-level configuration for one universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Single integer fixing the whole deterministic universe.
    pub seed: u64,
    /// Side length of one square sector, in world units.
    pub sector_size: f64,
    /// Chebyshev radius (in sectors) of the eagerly materialized window.
    pub window_radius: i32,
    /// Nominal number of cached sectors.
    pub sector_cache_capacity: usize,
    /// Nominal number of cached flocks.
    pub flock_cache_capacity: usize,
    pub generation: GenerationConfig,
    pub flock: FlockConfig,
    pub player: PlayerConfig,
    pub rewards: RewardConfig,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            sector_size: 600.0,
            window_radius: 2,
            sector_cache_capacity: 100,
            flock_cache_capacity: 10,
            generation: GenerationConfig::default(),
            flock: FlockConfig::default(),
            player: PlayerConfig::default(),
            rewards: RewardConfig::default(),
        }
    }
}

impl UniverseConfig {
    /// Default configuration with a different seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Distance within which any agent keeps its flock cached.
    pub fn flock_proximity_radius(&self) -> f64 {
        self.sector_size * 0.5 * f64::from(self.window_radius)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("sector_size", self.sector_size)?;
        if self.window_radius < 0 {
            return Err(invalid("window_radius", "must not be negative"));
        }
        if self.window_radius > MAX_WINDOW_RADIUS {
            return Err(invalid(
                "window_radius",
                format!("{} exceeds the maximum of {}", self.window_radius, MAX_WINDOW_RADIUS),
            ));
        }
        if self.sector_cache_capacity == 0 {
            return Err(invalid("sector_cache_capacity", "must be at least 1"));
        }
        if self.flock_cache_capacity == 0 {
            return Err(invalid("flock_cache_capacity", "must be at least 1"));
        }
        self.generation.validate()?;
        self.flock.validate()?;
        self.player.validate()?;
        self.rewards.validate()
    }
}

/// Procedural generation of stars, bodies and flock placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// A sector holds a star iff `|noise| <= occupancy_threshold`.
    pub occupancy_threshold: f64,
    pub star_radius: FloatRange,
    /// Upper bound (inclusive) on bodies drawn per star.
    pub max_bodies: u8,
    pub body_radius: FloatRange,
    /// Super-linear exponent applied to the orbit index when spacing bodies.
    pub orbit_spacing_power: f64,
    /// Bodies whose orbit would exceed this are discarded.
    pub max_orbit_radius: f64,
    /// Angular speed magnitude, radians per tick.
    pub body_speed: FloatRange,
    pub retrograde_chance: f64,
    pub reward_growth_chance: f64,
    /// Ticks between a reward pickup and regrowth.
    pub reward_regen_ticks: FloatRange,
    pub flock_chance: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let tps = TICKS_PER_SECOND as f64;
        Self {
            occupancy_threshold: 0.33,
            star_radius: FloatRange::new(20.0, 100.0),
            max_bodies: 6,
            body_radius: FloatRange::new(5.0, 30.0),
            orbit_spacing_power: 1.5,
            max_orbit_radius: 600.0,
            body_speed: FloatRange::new(PI / 36000.0, PI / 3600.0),
            retrograde_chance: 0.25,
            reward_growth_chance: 0.1,
            reward_regen_ticks: FloatRange::new(tps * 60.0, tps * 600.0),
            flock_chance: 0.5,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("generation.occupancy_threshold", self.occupancy_threshold)?;
        self.star_radius.check("generation.star_radius")?;
        self.body_radius.check("generation.body_radius")?;
        self.body_speed.check("generation.body_speed")?;
        self.reward_regen_ticks.check("generation.reward_regen_ticks")?;
        if self.body_radius.min <= 0.0 {
            return Err(invalid("generation.body_radius", "radii must be positive"));
        }
        if self.orbit_spacing_power < 1.0 {
            return Err(invalid(
                "generation.orbit_spacing_power",
                "spacing must not shrink outward",
            ));
        }
        check_positive("generation.max_orbit_radius", self.max_orbit_radius)?;
        check_probability("generation.retrograde_chance", self.retrograde_chance)?;
        check_probability("generation.reward_growth_chance", self.reward_growth_chance)?;
        check_probability("generation.flock_chance", self.flock_chance)
    }
}

/// Ranges for per-flock behaviour parameters plus shared behaviour weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    pub max_speed: FloatRange,
    pub max_force: FloatRange,
    pub agent_radius: f64,
    pub perception: FloatRange,
    pub alignment: FloatRange,
    pub cohesion: FloatRange,
    pub separation: f64,
    /// Exploration radius as a multiple of the sector size.
    pub explore_factor: FloatRange,
    /// Signed player affinity: positive approaches, negative avoids.
    pub player_affinity: FloatRange,
    pub curiosity_rate: FloatRange,
    /// Agents per flock, `[min, max)`.
    pub agent_count: FloatRange,
    /// Obstacle repulsion as a multiple of the flock's max force.
    pub obstacle_factor: f64,
    pub delivery_weight: f64,
    pub wander_weight: f64,
    /// Multiplier on positive affinity for curious agents and friends.
    pub friend_boost: f64,
    /// Multiplier on affinity while an agent carries a reward.
    pub carrying_factor: f64,
    /// Fraction of acceleration kept after integration (0 resets it).
    pub acceleration_decay: f64,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            max_speed: FloatRange::new(0.5, 4.0),
            max_force: FloatRange::new(0.01, 0.1),
            agent_radius: 15.0,
            perception: FloatRange::new(50.0, 200.0),
            alignment: FloatRange::new(0.1, 1.0),
            cohesion: FloatRange::new(0.1, 1.0),
            separation: 2.0,
            explore_factor: FloatRange::new(1.0, 10.0),
            player_affinity: FloatRange::new(-1.0, 1.0),
            curiosity_rate: FloatRange::new(0.0, 0.1),
            agent_count: FloatRange::new(1.0, 20.0),
            obstacle_factor: 3.0,
            delivery_weight: 2.0,
            wander_weight: 0.1,
            friend_boost: 1.5,
            carrying_factor: 0.1,
            acceleration_decay: 0.0,
        }
    }
}

impl FlockConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.max_speed.check("flock.max_speed")?;
        self.max_force.check("flock.max_force")?;
        self.perception.check("flock.perception")?;
        self.alignment.check("flock.alignment")?;
        self.cohesion.check("flock.cohesion")?;
        self.explore_factor.check("flock.explore_factor")?;
        self.player_affinity.check("flock.player_affinity")?;
        self.curiosity_rate.check("flock.curiosity_rate")?;
        self.agent_count.check("flock.agent_count")?;
        check_positive("flock.agent_radius", self.agent_radius)?;
        if self.explore_factor.min <= 0.0 {
            return Err(invalid("flock.explore_factor", "must be positive"));
        }
        if self.agent_count.min < 1.0 {
            return Err(invalid("flock.agent_count", "a flock needs at least one agent"));
        }
        check_probability("flock.acceleration_decay", self.acceleration_decay)
    }
}

/// The user-controlled agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub radius: f64,
    pub max_speed: f64,
    pub max_force: f64,
    /// Distance below which the player decelerates toward its target.
    pub slow_radius: f64,
    /// Fuel spent per tick of active steering.
    pub fuel_rate: f64,
    pub refuel_amount: f64,
    pub obstacle_factor: f64,
    pub max_rewards: u32,
    /// Start position, local to the origin sector.
    pub start_x: f64,
    pub start_y: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            max_speed: 5.0,
            max_force: 0.9,
            slow_radius: 300.0,
            // Two minutes of continuous thrust on a full tank.
            fuel_rate: 1.0 / (TICKS_PER_SECOND as f64 * 60.0 * 2.0),
            refuel_amount: 1.0,
            obstacle_factor: 2.0,
            max_rewards: 6,
            start_x: 300.0,
            start_y: 300.0,
        }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("player.radius", self.radius)?;
        check_positive("player.max_speed", self.max_speed)?;
        check_positive("player.max_force", self.max_force)?;
        check_positive("player.slow_radius", self.slow_radius)?;
        if !(0.0..=1.0).contains(&self.fuel_rate) {
            return Err(invalid("player.fuel_rate", "must lie in [0, 1]"));
        }
        if self.refuel_amount < 0.0 {
            return Err(invalid("player.refuel_amount", "must not be negative"));
        }
        Ok(())
    }
}

/// Reward tokens carried between bodies, the player and flocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub token_radius: f64,
    /// Extra reach around a body within which its reward can be collected.
    pub pickup_distance: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            token_radius: 3.0,
            pickup_distance: 10.0,
        }
    }
}

impl RewardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("rewards.token_radius", self.token_radius)?;
        if self.pickup_distance < 0.0 {
            return Err(invalid("rewards.pickup_distance", "must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        UniverseConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = UniverseConfig::from_json(
            r#"{ "seed": 9, "generation": { "max_bodies": 3 }, "player": { "max_rewards": 2 } }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.generation.max_bodies, 3);
        assert_eq!(config.generation.occupancy_threshold, 0.33);
        assert_eq!(config.player.max_rewards, 2);
        assert_eq!(config.player.radius, 10.0);
    }

    #[test]
    fn test_parse_error() {
        let err = UniverseConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut config = UniverseConfig::default();
        config.generation.star_radius = FloatRange::new(100.0, 20.0);
        let err = config.validate().unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "generation.star_radius"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_probability_and_sizes() {
        let mut config = UniverseConfig::default();
        config.generation.flock_chance = 1.5;
        assert!(config.validate().is_err());

        let mut config = UniverseConfig::default();
        config.sector_size = 0.0;
        assert!(config.validate().is_err());

        let mut config = UniverseConfig::default();
        config.flock_cache_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_proximity_radius() {
        let config = UniverseConfig::default();
        assert_eq!(config.flock_proximity_radius(), 600.0);
    }

    #[test]
    fn test_error_display_names_field() {
        let mut config = UniverseConfig::default();
        config.window_radius = -1;
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("window_radius"), "{}", msg);
    }

    #[test]
    fn test_rejects_oversized_window() {
        let mut config = UniverseConfig::default();
        config.window_radius = MAX_WINDOW_RADIUS;
        assert!(config.validate().is_ok());

        let err = UniverseConfig::from_json(r#"{ "window_radius": 2000000000 }"#).unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "window_radius"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
