//! Random-playout evaluation.
//!
//! A rollout copies the board and plays uniformly random legal moves until
//! somebody connects four or the board fills. The simulator runs batches of
//! rollouts across a rayon pool and sums their outcomes.
//!
//! Rollout `i` of a simulator draws from its own ChaCha20 stream `i` under the
//! simulator's seed, so its result depends only on `(seed, i)`. Summing is
//! associative and commutative, so any split of a stream range into
//! sub-ranges adds up to the same totals regardless of thread scheduling.

use std::ops::{Add, AddAssign, Range};

use engine_core::{BoardEngine, BoardError, Outcome, Player};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::trace;

use crate::config::MctsConfig;
use crate::search::SearchError;

/// Outcome counts from one player's perspective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RolloutStats {
    pub wins: u64,
    pub ties: u64,
    pub losses: u64,
}

impl RolloutStats {
    pub fn new(wins: u64, ties: u64, losses: u64) -> Self {
        Self { wins, ties, losses }
    }

    /// A single rollout's contribution.
    pub fn from_outcome(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => Self::new(1, 0, 0),
            Outcome::Tie => Self::new(0, 1, 0),
            Outcome::Loss => Self::new(0, 0, 1),
        }
    }

    /// Number of rollouts counted.
    #[inline]
    pub fn total(&self) -> u64 {
        self.wins + self.ties + self.losses
    }

    /// The same counts from the opponent's perspective.
    #[inline]
    pub fn swapped(self) -> Self {
        Self {
            wins: self.losses,
            ties: self.ties,
            losses: self.wins,
        }
    }
}

impl Add for RolloutStats {
    type Output = RolloutStats;

    fn add(self, rhs: RolloutStats) -> RolloutStats {
        RolloutStats {
            wins: self.wins + rhs.wins,
            ties: self.ties + rhs.ties,
            losses: self.losses + rhs.losses,
        }
    }
}

impl AddAssign for RolloutStats {
    fn add_assign(&mut self, rhs: RolloutStats) {
        *self = *self + rhs;
    }
}

/// Play one random game to completion on a private copy of `board`.
///
/// `player` is the side that just moved, so the opponent plays first. The
/// result is classified from `player`'s perspective. A board that is already
/// decided returns its outcome without drawing from `rng`.
pub fn rollout<B, R>(board: &B, player: Player, rng: &mut R) -> Result<Outcome, BoardError>
where
    B: BoardEngine,
    R: Rng,
{
    let mut scratch = board.clone();
    let mut mover = player.opponent();

    loop {
        if let Some(winner) = scratch.winner() {
            return Ok(Outcome::classify(Some(winner), player));
        }
        let moves = scratch.legal_moves();
        if moves.is_empty() {
            return Ok(Outcome::Tie);
        }

        let column = moves[rng.gen_range(0..moves.len())];
        scratch.apply_move(column, mover)?;
        mover = mover.opponent();
    }
}

/// RNG for one rollout stream.
fn stream_rng(seed: u64, stream: u64) -> ChaCha20Rng {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

/// Parallel rollout runner.
pub struct RolloutSimulator {
    seed: u64,
    /// First stream not yet handed out
    next_stream: u64,
    /// Dedicated pool, or `None` for rayon's global pool
    pool: Option<ThreadPool>,
}

impl std::fmt::Debug for RolloutSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RolloutSimulator")
            .field("seed", &self.seed)
            .field("next_stream", &self.next_stream)
            .field(
                "threads",
                &self.pool.as_ref().map(|p| p.current_num_threads()),
            )
            .finish()
    }
}

impl RolloutSimulator {
    /// Create a simulator. `threads == 0` uses rayon's global pool.
    pub fn new(seed: u64, threads: usize) -> Result<Self, SearchError> {
        let pool = if threads > 0 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("rollout-{}", i))
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self {
            seed,
            next_stream: 0,
            pool,
        })
    }

    /// Create a simulator from search config, drawing a seed if none is set.
    pub fn from_config(config: &MctsConfig) -> Result<Self, SearchError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::new(seed, config.rollout_threads)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rollouts run so far through `simulate`.
    pub fn streams_used(&self) -> u64 {
        self.next_stream
    }

    /// Run `n_sims` fresh rollouts from `board`, counted for `player`.
    pub fn simulate<B: BoardEngine>(
        &mut self,
        board: &B,
        n_sims: u32,
        player: Player,
    ) -> Result<RolloutStats, SearchError> {
        let start = self.next_stream;
        let end = start + u64::from(n_sims);
        self.next_stream = end;
        self.simulate_streams(board, player, start..end)
    }

    /// Run the rollouts with the given stream ids.
    ///
    /// Does not advance the stream counter, so the same range always yields
    /// the same totals.
    pub fn simulate_streams<B: BoardEngine>(
        &self,
        board: &B,
        player: Player,
        streams: Range<u64>,
    ) -> Result<RolloutStats, SearchError> {
        let seed = self.seed;
        let batch = streams.clone();
        let run = move || {
            batch
                .into_par_iter()
                .map(|stream| {
                    let mut rng = stream_rng(seed, stream);
                    rollout(board, player, &mut rng).map(RolloutStats::from_outcome)
                })
                .try_reduce(RolloutStats::default, |a, b| Ok(a + b))
        };

        let stats = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
        .map_err(SearchError::InvalidMove)?;

        trace!(
            first_stream = streams.start,
            count = streams.end - streams.start,
            wins = stats.wins,
            ties = stats.ties,
            losses = stats.losses,
            "Rollout batch complete"
        );

        Ok(stats)
    }
}
