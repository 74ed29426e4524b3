//! Core traits and types for the dropline game engine
//!
//! This crate provides the contract the search engine consumes:
//! - `BoardEngine`: mutable board with winner detection, legal moves, apply and undo
//! - `Player`: the two alternating sides
//! - `Outcome`: a finished game classified from one player's perspective
//! - `BoardError`: precondition and desynchronisation failures

pub mod board;
pub mod outcome;
pub mod player;

// Re-export main types for convenience
pub use board::{BoardEngine, BoardError};
pub use outcome::Outcome;
pub use player::Player;
