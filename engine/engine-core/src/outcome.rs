//! Classification of finished games.

use crate::player::Player;

/// Result of a finished game, seen from one player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win,
    Tie,
    Loss,
}

impl Outcome {
    /// Classify a terminal position's winner relative to `perspective`.
    ///
    /// # Returns
    /// * `Win` if `perspective` won
    /// * `Tie` if nobody won (the board filled up)
    /// * `Loss` if the other player won
    ///
    /// # Example
    /// ```
    /// use engine_core::{Outcome, Player};
    ///
    /// assert_eq!(Outcome::classify(Some(Player::Red), Player::Red), Outcome::Win);
    /// assert_eq!(Outcome::classify(Some(Player::Red), Player::Yellow), Outcome::Loss);
    /// assert_eq!(Outcome::classify(None, Player::Yellow), Outcome::Tie);
    /// ```
    #[inline]
    pub fn classify(winner: Option<Player>, perspective: Player) -> Outcome {
        match winner {
            Some(p) if p == perspective => Outcome::Win,
            Some(_) => Outcome::Loss,
            None => Outcome::Tie,
        }
    }
}
