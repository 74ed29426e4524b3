//! MCTS configuration parameters.

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Select/expand/simulate/backpropagate passes per think step.
    pub num_passes: u32,

    /// Random playouts run for each node returned by expansion.
    pub sims_per_leaf: u32,

    /// Exploration constant in the upper-confidence score.
    /// Higher values favour rarely visited children.
    pub exploration: f64,

    /// Worker threads for rollouts. 0 uses rayon's global pool.
    pub rollout_threads: usize,

    /// Seed for rollout randomness. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_passes: 1000,
            sims_per_leaf: 20,
            exploration: 2.0,
            rollout_threads: 0,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Create a fast, deterministic config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_passes: 50,
            sims_per_leaf: 8,
            exploration: 2.0,
            rollout_threads: 2,
            seed: Some(42),
        }
    }

    /// Builder pattern: set number of passes.
    pub fn with_passes(mut self, n: u32) -> Self {
        self.num_passes = n;
        self
    }

    /// Builder pattern: set rollouts per expanded node.
    pub fn with_sims_per_leaf(mut self, n: u32) -> Self {
        self.sims_per_leaf = n;
        self
    }

    /// Builder pattern: set exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: set rollout thread count.
    pub fn with_rollout_threads(mut self, threads: usize) -> Self {
        self.rollout_threads = threads;
        self
    }

    /// Builder pattern: set rollout seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
