//! Game session management
//!
//! Keeps the live board, the persistent search tree and the side to move in
//! step, so every move played is committed to both.

use anyhow::{anyhow, Context, Result};
use engine_core::{BoardEngine, Player};
use games_connect4::Connect4Board;
use mcts::{MctsConfig, MctsSearch, SearchSummary};
use tracing::{debug, info};

/// The engine's pick when asked to move.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMove {
    pub column: u8,
    /// `None` if the column was never simulated
    pub win_rate: Option<f64>,
    pub visits: u64,
}

/// A game session tracking the current position
pub struct GameSession {
    board: Connect4Board,
    search: MctsSearch,
    /// Side to move; Red opens every game
    to_move: Player,
    /// Games started in this session, counting the current one
    games: u32,
}

impl GameSession {
    pub fn new(config: MctsConfig) -> Result<Self> {
        let search = MctsSearch::new(config).context("failed to create search")?;
        Ok(Self {
            board: Connect4Board::new(),
            search,
            to_move: Player::Red,
            games: 1,
        })
    }

    pub fn board(&self) -> &Connect4Board {
        &self.board
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    #[allow(dead_code)]
    pub fn search(&self) -> &MctsSearch {
        &self.search
    }

    /// Run one search step on the current position.
    pub fn think(&mut self) -> Result<SearchSummary> {
        self.search
            .think(&self.board)
            .context("search failed on the current position")
    }

    pub fn is_legal(&self, column: u8) -> bool {
        self.board.legal_moves().contains(&column)
    }

    /// Play `column` for the side to move.
    pub fn play(&mut self, column: u8) -> Result<()> {
        if !self.is_legal(column) {
            return Err(anyhow!("column {} is not a legal move", column));
        }

        let reclaimed = self.search.commit_move(&self.board, column)?;
        self.board
            .apply_move(column, self.to_move)
            .with_context(|| format!("failed to drop {} in column {}", self.to_move, column))?;

        debug!(
            player = %self.to_move,
            column,
            reclaimed,
            pieces = self.board.pieces(),
            "Move played"
        );
        self.to_move = self.to_move.opponent();
        Ok(())
    }

    /// Play the engine's preferred column for the side to move.
    pub fn play_best(&mut self) -> Result<BestMove> {
        let best = {
            let (column, node) = self
                .search
                .best_move()
                .ok_or_else(|| anyhow!("the engine has no move to suggest"))?;
            BestMove {
                column,
                win_rate: (node.visits > 0).then(|| node.win_rate()),
                visits: node.visits,
            }
        };
        self.play(best.column)?;
        Ok(best)
    }

    /// `Some(winner)` once the game has ended, where `None` means a draw.
    pub fn result(&self) -> Option<Option<Player>> {
        self.board
            .is_terminal()
            .then(|| self.board.winner())
    }

    /// Clear the board and the search tree.
    pub fn new_game(&mut self) {
        self.board = Connect4Board::new();
        self.to_move = Player::Red;
        self.search.reset();
        self.games += 1;
        info!(game = self.games, "Starting new game");
    }
}
