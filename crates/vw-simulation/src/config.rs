use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Largest accepted [`RulesConfig::ore_reach`].
pub const MAX_ORE_REACH: i32 = 64;

/// Tunables for the per-kind activity rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Radius of the square a vein searches for a free cell.
    pub ore_reach: i32,
    /// A blob acts this many times faster than the ore it came from.
    pub blob_period_scale: u64,
    /// Lower bound (inclusive) of a new blob's animation period.
    pub blob_animation_min: u64,
    /// Upper bound (exclusive) of a new blob's animation period.
    pub blob_animation_max: u64,
    /// Lower bound (inclusive) of a new ore's corruption period.
    pub ore_corrupt_min: u64,
    /// Upper bound (exclusive) of a new ore's corruption period.
    pub ore_corrupt_max: u64,
    /// How long a quake lives.
    pub quake_action_period: u64,
    /// Delay between quake animation frames.
    pub quake_animation_period: u64,
    /// Number of quake animation frames; 0 animates forever.
    pub quake_animation_repeat: u32,
    /// Appended to an ore's name to name its blob.
    pub blob_id_suffix: String,
    /// Prepended to a vein's name to name the ore it spawns.
    pub ore_id_prefix: String,
    /// Name given to every quake.
    pub quake_id: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            ore_reach: 1,
            blob_period_scale: 4,
            blob_animation_min: 50,
            blob_animation_max: 150,
            ore_corrupt_min: 20_000,
            ore_corrupt_max: 30_000,
            quake_action_period: 1_100,
            quake_animation_period: 100,
            quake_animation_repeat: 10,
            blob_id_suffix: " -- blob".to_string(),
            ore_id_prefix: "ore -- ".to_string(),
            quake_id: "quake".to_string(),
        }
    }
}

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Multiplier applied to every scheduling delay.
    pub time_scale: f64,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Upper bound on events dispatched by one `advance_to` call.
    pub max_dispatch_per_advance: usize,
    /// Per-kind rule constants.
    pub rules: RulesConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            max_events: 0,
            max_dispatch_per_advance: 1_000_000,
            rules: RulesConfig::default(),
        }
    }
}

impl RulesConfig {
    /// Check values that the type alone cannot rule out.
    pub fn validate(&self) -> SimResult<()> {
        if !(0..=MAX_ORE_REACH).contains(&self.ore_reach) {
            return Err(SimError::InvalidConfig(format!(
                "ore_reach must be between 0 and {MAX_ORE_REACH}, got {}",
                self.ore_reach
            )));
        }
        Ok(())
    }
}

impl SimConfig {
    /// Check the whole configuration, rules included.
    pub fn validate(&self) -> SimResult<()> {
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "time_scale must be a non-negative number, got {}",
                self.time_scale
            )));
        }
        self.rules.validate()
    }

    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the delay multiplier. Negative values are treated as zero.
    pub fn with_time_scale(mut self, scale: f64) -> Self {
        self.time_scale = scale.max(0.0);
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Set the per-call dispatch cap. Zero is raised to one.
    pub fn with_max_dispatch_per_advance(mut self, max: usize) -> Self {
        self.max_dispatch_per_advance = max.max(1);
        self
    }

    /// Replace the rule constants.
    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }
}
