//! MCTS search implementation.
//!
//! Each pass runs the four phases against a scratch copy of the live board:
//! 1. Selection: descend by UCB score, replaying moves on the scratch board
//! 2. Expansion: add children, or re-queue a terminal leaf
//! 3. Simulation: random rollouts from each returned node
//! 4. Backpropagation: add the rollout counts up to the root
//!
//! The tree persists between turns. [`MctsSearch::commit_move`] re-roots it
//! at the move actually played so earlier work carries over.

use std::time::{Duration, Instant};

use engine_core::{BoardEngine, BoardError, Player};
use thiserror::Error;
use tracing::{debug, error, trace};

use crate::config::MctsConfig;
use crate::node::MctsNode;
use crate::rollout::RolloutSimulator;
use crate::tree::MctsTree;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid move: {0}")]
    InvalidMove(#[source] BoardError),

    #[error("Column {column} is not a legal move from the current position")]
    IllegalMove { column: u8 },

    #[error("Board and search tree are out of sync: {0}")]
    Desync(#[source] BoardError),

    #[error("Game is already over")]
    GameOver,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Failed to build rollout thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result of one think step.
#[derive(Debug, Clone)]
pub struct SearchSummary {
    /// Passes run in this step
    pub passes: u32,

    /// Root visits after the step, including earlier turns
    pub root_visits: u64,

    /// Wall-clock time spent
    pub elapsed: Duration,

    /// Win rate per root child in move order, `None` if unvisited
    pub win_rates: Vec<(u8, Option<f64>)>,
}

/// Result of a one-shot search from a fresh tree.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Column with the best win rate
    pub column: u8,

    /// Win rate of that column for the side to move
    pub win_rate: f64,

    /// Rollouts counted under that column
    pub visits: u64,

    pub summary: SearchSummary,
}

/// A move applied to a scratch board that is taken back when dropped.
///
/// Call [`undo`](Self::undo) on the normal path to surface desync errors.
/// Dropping the guard on an early return restores the board on a
/// best-effort basis and logs any failure.
struct AppliedMove<'b, B: BoardEngine> {
    board: &'b mut B,
    column: u8,
    player: Player,
    undone: bool,
}

impl<'b, B: BoardEngine> AppliedMove<'b, B> {
    fn apply(board: &'b mut B, column: u8, player: Player) -> Result<Self, SearchError> {
        board
            .apply_move(column, player)
            .map_err(SearchError::InvalidMove)?;
        Ok(Self {
            board,
            column,
            player,
            undone: false,
        })
    }

    fn board(&self) -> &B {
        self.board
    }

    fn undo(mut self) -> Result<(), SearchError> {
        self.undone = true;
        self.board
            .undo_move(self.column, self.player)
            .map_err(SearchError::Desync)
    }
}

impl<B: BoardEngine> Drop for AppliedMove<'_, B> {
    fn drop(&mut self) {
        if self.undone {
            return;
        }
        if let Err(e) = self.board.undo_move(self.column, self.player) {
            error!(
                column = self.column,
                player = %self.player,
                error = %e,
                "Failed to take back move while unwinding"
            );
        }
    }
}

/// Persistent MCTS search state.
#[derive(Debug)]
pub struct MctsSearch {
    tree: MctsTree,
    simulator: RolloutSimulator,
    config: MctsConfig,
}

impl MctsSearch {
    /// Create a search with a fresh tree.
    pub fn new(config: MctsConfig) -> Result<Self, SearchError> {
        let simulator = RolloutSimulator::from_config(&config)?;
        debug!(
            seed = simulator.seed(),
            threads = config.rollout_threads,
            exploration = config.exploration,
            "Created MCTS search"
        );
        Ok(Self {
            tree: MctsTree::new(),
            simulator,
            config,
        })
    }

    /// Run `n_passes` passes from `board`, with `n_sims_per_leaf` rollouts
    /// for each node expansion returns.
    ///
    /// `board` must be the position the tree's root represents. It is never
    /// mutated; each pass works on a private copy.
    pub fn evaluate<B: BoardEngine>(
        &mut self,
        board: &B,
        n_passes: u32,
        n_sims_per_leaf: u32,
    ) -> Result<SearchSummary, SearchError> {
        if board.is_terminal() || self.tree.get(self.tree.root()).terminal {
            return Err(SearchError::GameOver);
        }
        self.check_side_to_move(board)?;

        let start = Instant::now();
        for _ in 0..n_passes {
            self.run_pass(board, n_sims_per_leaf)?;
        }

        let summary = SearchSummary {
            passes: n_passes,
            root_visits: self.tree.root_visits(),
            elapsed: start.elapsed(),
            win_rates: self.tree.root_win_rates(),
        };

        debug!(
            passes = n_passes,
            sims_per_leaf = n_sims_per_leaf,
            root_visits = summary.root_visits,
            nodes = self.tree.len(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Search step complete"
        );

        Ok(summary)
    }

    /// Run one search step with the configured pass and rollout counts.
    pub fn think<B: BoardEngine>(&mut self, board: &B) -> Result<SearchSummary, SearchError> {
        self.evaluate(board, self.config.num_passes, self.config.sims_per_leaf)
    }

    /// The root's children are moves for the side to move on `board`.
    fn check_side_to_move<B: BoardEngine>(&self, board: &B) -> Result<(), SearchError> {
        let expected = self.tree.get(self.tree.root()).player.opponent();
        let actual = board.side_to_move();
        if actual != expected {
            return Err(SearchError::InvalidState(format!(
                "tree expects {} to move but the board has {} to move ({} pieces)",
                expected,
                actual,
                board.pieces()
            )));
        }
        Ok(())
    }

    /// Run a single select -> expand -> simulate -> backpropagate pass.
    fn run_pass<B: BoardEngine>(&mut self, board: &B, n_sims: u32) -> Result<(), SearchError> {
        let mut scratch = board.clone();

        let leaf = self.tree.select(&mut scratch, self.config.exploration)?;
        let targets = self.tree.expand(leaf, &mut scratch)?;

        for target in targets {
            let (column, player) = {
                let node = self.tree.get(target);
                (node.column, node.player)
            };

            let applied = AppliedMove::apply(&mut scratch, column, player)?;
            let stats = self.simulator.simulate(applied.board(), n_sims, player)?;
            self.tree.backpropagate(target, stats);
            applied.undo()?;

            trace!(
                node = target.0,
                column,
                wins = stats.wins,
                ties = stats.ties,
                losses = stats.losses,
                "Simulated node"
            );
        }

        Ok(())
    }

    /// Re-root at `column`, played from `board`. Returns the number of
    /// nodes reclaimed.
    pub fn commit_move<B: BoardEngine>(
        &mut self,
        board: &B,
        column: u8,
    ) -> Result<usize, SearchError> {
        self.check_side_to_move(board)?;
        self.tree.commit_move(board, column)
    }

    /// Discard the tree and start from a fresh root.
    pub fn reset(&mut self) {
        debug!(nodes = self.tree.len(), "Resetting search tree");
        self.tree.reset();
    }

    /// Root child with the best win rate.
    pub fn best_move(&self) -> Option<(u8, &MctsNode)> {
        self.tree.best_move()
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }
}

/// Convenience function to run a single search from a fresh tree.
///
/// `board` must have the first player to move, otherwise this fails with
/// [`SearchError::InvalidState`].
pub fn run_mcts<B: BoardEngine>(
    board: &B,
    config: MctsConfig,
) -> Result<SearchResult, SearchError> {
    let mut search = MctsSearch::new(config)?;
    let summary = search.think(board)?;
    let (column, node) = search
        .best_move()
        .ok_or_else(|| SearchError::InvalidState("root has no children".to_string()))?;

    Ok(SearchResult {
        column,
        win_rate: node.win_rate(),
        visits: node.visits,
        summary,
    })
}
