//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_num_passes() -> u32 {
    defaults::num_passes()
}
fn d_sims_per_leaf() -> u32 {
    defaults::sims_per_leaf()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_rollout_threads() -> usize {
    defaults::rollout_threads()
}
fn d_seed() -> u64 {
    defaults::seed()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsSection,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
        }
    }
}

/// MCTS search budget and rollout settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsSection {
    #[serde(default = "d_num_passes")]
    pub num_passes: u32,
    #[serde(default = "d_sims_per_leaf")]
    pub sims_per_leaf: u32,
    #[serde(default = "d_exploration")]
    pub exploration: f64,
    /// Rollout worker threads (0 = rayon's global pool)
    #[serde(default = "d_rollout_threads")]
    pub rollout_threads: usize,
    /// Rollout seed (0 = draw one at startup)
    #[serde(default = "d_seed")]
    pub seed: u64,
}

/// A configured rollout seed, where 0 means draw one from entropy.
pub fn rollout_seed(seed: u64) -> Option<u64> {
    (seed != 0).then_some(seed)
}

impl MctsSection {
    /// Configured seed, or `None` when it should come from entropy.
    pub fn rollout_seed(&self) -> Option<u64> {
        rollout_seed(self.seed)
    }
}

impl Default for MctsSection {
    fn default() -> Self {
        Self {
            num_passes: defaults::num_passes(),
            sims_per_leaf: defaults::sims_per_leaf(),
            exploration: defaults::exploration(),
            rollout_threads: defaults::rollout_threads(),
            seed: defaults::seed(),
        }
    }
}
