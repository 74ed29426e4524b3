//! Configuration for the play binary
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, rollout_seed, CentralConfig};
use mcts::MctsConfig;
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_passes() -> u32 {
    CENTRAL_CONFIG.mcts.num_passes
}

fn default_sims() -> u32 {
    CENTRAL_CONFIG.mcts.sims_per_leaf
}

fn default_exploration() -> f64 {
    CENTRAL_CONFIG.mcts.exploration
}

fn default_threads() -> usize {
    CENTRAL_CONFIG.mcts.rollout_threads
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.mcts.seed
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

#[derive(Parser, Debug, Clone)]
#[command(name = "play")]
#[command(about = "Play Connect Four against a Monte Carlo tree search")]
#[command(
    long_about = "Interactive Connect Four. The engine thinks before every turn and
reports its win-rate estimate for each column. Enter a column to play it,
-1 to let the engine choose, 'reset' for a new game or 'quit' to exit.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Search passes per turn
    #[arg(long, default_value_t = default_passes())]
    pub passes: u32,

    /// Random rollouts per simulated node
    #[arg(long, default_value_t = default_sims())]
    pub sims: u32,

    /// UCB exploration constant
    #[arg(long, default_value_t = default_exploration())]
    pub exploration: f64,

    /// Rollout worker threads (0 = one per core)
    #[arg(long, default_value_t = default_threads())]
    pub threads: usize,

    /// Rollout seed (0 = random)
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.passes == 0 {
            return Err(anyhow!("passes must be greater than 0"));
        }

        if self.sims == 0 {
            return Err(anyhow!("sims must be greater than 0"));
        }

        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(anyhow!(
                "exploration must be a non-negative number, got {}",
                self.exploration
            ));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    /// Search settings for the engine.
    pub fn mcts_config(&self) -> MctsConfig {
        let mut config = MctsConfig::default()
            .with_passes(self.passes)
            .with_sims_per_leaf(self.sims)
            .with_exploration(self.exploration)
            .with_rollout_threads(self.threads);
        config.seed = rollout_seed(self.seed);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            passes: 100,
            sims: 10,
            exploration: 2.0,
            threads: 0,
            seed: 0,
            log_level: "info".into(),
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_passes() {
        let mut cfg = base_config();
        cfg.passes = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("passes"));
    }

    #[test]
    fn validate_rejects_zero_sims() {
        let mut cfg = base_config();
        cfg.sims = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("sims"));
    }

    #[test]
    fn validate_rejects_bad_exploration() {
        let mut cfg = base_config();
        cfg.exploration = -1.0;
        assert!(cfg.validate().is_err());

        cfg.exploration = f64::NAN;
        assert!(cfg.validate().is_err());

        cfg.exploration = 0.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "nope".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn mcts_config_carries_settings() {
        let mut cfg = base_config();
        cfg.threads = 3;
        let mcts = cfg.mcts_config();
        assert_eq!(mcts.num_passes, 100);
        assert_eq!(mcts.sims_per_leaf, 10);
        assert_eq!(mcts.rollout_threads, 3);
        assert_eq!(mcts.seed, None);

        cfg.seed = 8;
        assert_eq!(cfg.mcts_config().seed, Some(8));
    }

    #[test]
    fn parses_cli_flags() {
        let cfg = Config::parse_from([
            "play",
            "--passes",
            "12",
            "--sims",
            "3",
            "--exploration",
            "1.5",
            "--threads",
            "2",
            "--seed",
            "77",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cfg.passes, 12);
        assert_eq!(cfg.sims, 3);
        assert!((cfg.exploration - 1.5).abs() < f64::EPSILON);
        assert_eq!(cfg.threads, 2);
        assert_eq!(cfg.seed, 77);
        assert_eq!(cfg.log_level, "debug");
        assert!(cfg.validate().is_ok());
    }
}
