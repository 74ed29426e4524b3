//! Board contract consumed by the search engine
//!
//! The search treats a board as a scratch buffer: it clones the live
//! position, mutates the clone while descending the tree, and undoes every
//! mutation on the way back. Implementations only need to provide the four
//! rule operations plus the width and piece count.

use std::fmt::Debug;

use thiserror::Error;

use crate::player::Player;

/// Errors raised by board mutation.
///
/// `ColumnOutOfRange` and `ColumnFull` are precondition violations on apply.
/// `ColumnEmpty` and `WrongPlayer` on undo mean the apply/undo stack has been
/// broken and the board no longer matches the caller's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("column {column} is out of range (width {width})")]
    ColumnOutOfRange { column: u8, width: usize },

    #[error("column {0} is full")]
    ColumnFull(u8),

    #[error("column {0} is empty, nothing to undo")]
    ColumnEmpty(u8),

    #[error("top of column {column} belongs to {found}, expected {expected}")]
    WrongPlayer {
        column: u8,
        expected: Player,
        found: Player,
    },
}

/// Mutable vertical-drop board.
///
/// # Contract
///
/// * `legal_moves` returns columns in ascending order. The search relies on
///   this order for its deterministic tie-break.
/// * `apply_move` followed by `undo_move` with the same column and player
///   restores the board exactly.
/// * `undo_move` only ever removes the most recent piece in a column (LIFO
///   per column).
///
/// Boards are shared read-only across rollout worker threads, hence the
/// `Send + Sync` bound; each rollout mutates its own clone.
pub trait BoardEngine: Clone + Send + Sync + Debug {
    /// Player with four in a row (row, column or either diagonal), if any.
    fn winner(&self) -> Option<Player>;

    /// Columns that can still take a piece, in ascending order.
    fn legal_moves(&self) -> Vec<u8>;

    /// Drop a piece for `player` into the lowest open cell of `column`.
    fn apply_move(&mut self, column: u8, player: Player) -> Result<(), BoardError>;

    /// Remove the highest piece in `column`, which must belong to `player`.
    fn undo_move(&mut self, column: u8, player: Player) -> Result<(), BoardError>;

    /// Number of columns.
    fn width(&self) -> usize;

    /// Pieces on the board.
    fn pieces(&self) -> usize;

    /// True when the game is decided or drawn.
    fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.legal_moves().is_empty()
    }

    /// Side to move, assuming Red opened and play alternated.
    fn side_to_move(&self) -> Player {
        if self.pieces() % 2 == 0 {
            Player::Red
        } else {
            Player::Yellow
        }
    }
}
