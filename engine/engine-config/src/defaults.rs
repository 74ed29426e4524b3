//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file lives at the workspace root and is embedded at compile
//! time, so the binary never needs it on disk.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    num_passes: u32,
    sims_per_leaf: u32,
    exploration: f64,
    rollout_threads: usize,
    seed: u64,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// MCTS
pub fn num_passes() -> u32 {
    DEFAULTS.mcts.num_passes
}
pub fn sims_per_leaf() -> u32 {
    DEFAULTS.mcts.sims_per_leaf
}
pub fn exploration() -> f64 {
    DEFAULTS.mcts.exploration
}
pub fn rollout_threads() -> usize {
    DEFAULTS.mcts.rollout_threads
}
/// 0 means "draw a seed at startup"
pub fn seed() -> u64 {
    DEFAULTS.mcts.seed
}
