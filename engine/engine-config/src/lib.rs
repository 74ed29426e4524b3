//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared by
//! the search engine and the `play` binary.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`DROPLINE_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! DROPLINE_<SECTION>_<KEY>=value
//!
//! Examples:
//!     DROPLINE_COMMON_LOG_LEVEL=debug
//!     DROPLINE_MCTS_NUM_PASSES=5000
//!     DROPLINE_MCTS_ROLLOUT_THREADS=4
//!     DROPLINE_MCTS_SEED=42
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_PATH_ENV, CONFIG_SEARCH_PATHS,
};
pub use structs::*;
