//! Monte Carlo Tree Search (MCTS) with parallel random rollouts.
//!
//! This crate searches any board implementing the `engine-core`
//! [`BoardEngine`](engine_core::BoardEngine) contract. It needs no
//! evaluation function: positions are scored by playing random games to the
//! end.
//!
//! # Overview
//!
//! Each search pass has four phases:
//!
//! 1. **Selection**: descend from the root by UCB score until reaching a
//!    node without children
//! 2. **Expansion**: add a child per legal move. If any child ends the game,
//!    only those are simulated. A terminal leaf is simulated once per board
//!    column instead of being expanded
//! 3. **Simulation**: run a batch of random rollouts from each returned node
//!    across a rayon pool
//! 4. **Backpropagation**: add the batch's wins, ties and losses to the node
//!    and its ancestors, swapping wins and losses at each level
//!
//! The tree is kept between turns. Committing the move actually played
//! re-roots the tree so the relevant subtree's statistics carry over.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::{BoardEngine, Player};
//! use games_connect4::Connect4Board;
//! use mcts::{MctsConfig, MctsSearch};
//!
//! let mut board = Connect4Board::new();
//! let mut search = MctsSearch::new(MctsConfig::for_testing()).unwrap();
//!
//! let summary = search.evaluate(&board, 20, 4).unwrap();
//! assert!(summary.root_visits > 0);
//!
//! let (column, _) = search.best_move().unwrap();
//! search.commit_move(&board, column).unwrap();
//! board.apply_move(column, Player::Red).unwrap();
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `num_passes`: passes per think step (default: 1000)
//! - `sims_per_leaf`: rollouts per simulated node (default: 20)
//! - `exploration`: UCB exploration constant (default: 2.0)
//! - `rollout_threads`: dedicated pool size, 0 for rayon's global pool
//! - `seed`: rollout seed, `None` for entropy
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MctsSearch                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  MctsTree   │  │ BoardEngine │  │  RolloutSimulator   │  │
//! │  │  (arena)    │  │  (scratch)  │  │  (rayon + ChaCha)   │  │
//! │  └──────┬──────┘  └──────┬──────┘  └──────────┬──────────┘  │
//! │         │                │                    │             │
//! │         ▼                ▼                    ▼             │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │            select → expand → simulate →              │   │
//! │  │                     backpropagate                    │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod node;
pub mod rollout;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::MctsConfig;
pub use node::{MctsNode, NodeId};
pub use rollout::{rollout, RolloutSimulator, RolloutStats};
pub use search::{run_mcts, MctsSearch, SearchError, SearchResult, SearchSummary};
pub use tree::{MctsTree, TreeStats};
