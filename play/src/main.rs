//! Play - interactive Connect Four against the dropline search engine
//!
//! Each turn the engine:
//! 1. Runs a batch of MCTS passes on the current position
//! 2. Prints the board and its win-rate estimate for every column
//! 3. Reads a move from stdin (a column, `-1` for the engine's pick,
//!    `reset` or `quit`)
//!
//! The search tree follows the game, so work from earlier turns is reused.

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod config;
mod repl;
mod session;

use crate::config::Config;
use crate::session::GameSession;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so they never interleave with the board on stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    // Parse configuration
    let config = Config::parse();
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.log_level)?;
    info!(
        passes = config.passes,
        sims = config.sims,
        exploration = config.exploration,
        threads = config.threads,
        "Starting play"
    );

    let mut session = GameSession::new(config.mcts_config())?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    repl::run(&mut session, stdin.lock(), stdout.lock())
}
