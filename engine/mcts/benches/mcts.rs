//! MCTS benchmarks for performance profiling.
//!
//! Run with: `cargo bench -p mcts`
//!
//! These benchmarks measure:
//! - Full search steps with varying pass counts
//! - Rollout batches on a single thread vs the global pool
//! - Search from different game phases (opening, midgame, forced win)
//! - Tree operations (selection, backpropagation, re-rooting)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use engine_core::Player;
use games_connect4::Connect4Board;
use mcts::{MctsConfig, MctsSearch, MctsTree, RolloutSimulator, RolloutStats};

fn config(passes: u32) -> MctsConfig {
    MctsConfig::for_testing()
        .with_passes(passes)
        .with_sims_per_leaf(8)
        .with_rollout_threads(0)
}

// =============================================================================
// Full Search Benchmarks
// =============================================================================

fn bench_search_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_search_passes");
    group.sample_size(20);

    for passes in [25u32, 50, 100, 200] {
        group.throughput(Throughput::Elements(passes as u64));
        group.bench_with_input(BenchmarkId::new("opening", passes), &passes, |b, &passes| {
            let board = Connect4Board::new();

            b.iter(|| {
                let mut search = MctsSearch::new(config(passes)).unwrap();
                black_box(search.think(&board).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_game_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_game_phases");
    group.sample_size(20);
    let passes = 100u32;

    let positions = [
        ("opening", vec![]),
        ("midgame", vec![3, 3, 2, 4, 4, 2, 5, 1]),
        // Red can complete the bottom row at column 3
        ("forced_win", vec![0, 0, 1, 1, 2, 6]),
    ];

    for (name, moves) in positions {
        let board = Connect4Board::from_moves(&moves).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut search = MctsSearch::new(config(passes)).unwrap();
                black_box(search.think(&board).unwrap())
            });
        });
    }

    group.finish();
}

// =============================================================================
// Rollout Benchmarks
// =============================================================================

fn bench_rollouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_rollouts");
    let board = Connect4Board::new();
    let batch = 512u64;

    group.throughput(Throughput::Elements(batch));
    for threads in [1usize, 0] {
        let label = if threads == 0 { "global_pool" } else { "single_thread" };
        let sim = RolloutSimulator::new(42, threads).unwrap();
        group.bench_function(label, |b| {
            b.iter(|| black_box(sim.simulate_streams(&board, Player::Yellow, 0..batch).unwrap()));
        });
    }

    group.finish();
}

// =============================================================================
// Tree Operation Benchmarks
// =============================================================================

fn bench_tree_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_tree_ops");

    // Benchmark node allocation
    group.bench_function("allocate_node", |b| {
        b.iter(|| {
            let mut tree = MctsTree::new();
            for i in 0..100u8 {
                tree.add_child(tree.root(), i % 7);
            }
            black_box(tree.len())
        });
    });

    // Benchmark child selection (UCB calculation)
    group.bench_function("select_child", |b| {
        let mut tree = MctsTree::new();
        for i in 0..7u8 {
            let child_id = tree.add_child(tree.root(), i);
            let wins = u64::from(i) * 3;
            tree.backpropagate(child_id, RolloutStats::new(wins, 2, 30 - wins));
        }

        b.iter(|| black_box(tree.select_child(tree.root(), 2.0)));
    });

    // Benchmark backpropagation
    group.bench_function("backpropagate_depth_8", |b| {
        b.iter_batched(
            || {
                let mut tree = MctsTree::new();
                let mut parent = tree.root();
                for i in 0..8u8 {
                    parent = tree.add_child(parent, i % 7);
                }
                (tree, parent)
            },
            |(mut tree, leaf)| {
                tree.backpropagate(leaf, RolloutStats::new(5, 1, 2));
                black_box(tree)
            },
            criterion::BatchSize::SmallInput,
        );
    });

    // Benchmark re-rooting after a searched turn
    group.bench_function("commit_move", |b| {
        let board = Connect4Board::new();
        let mut searched = MctsSearch::new(config(200)).unwrap();
        searched.think(&board).unwrap();
        let column = searched.best_move().map(|(c, _)| c).unwrap();

        b.iter_batched(
            || {
                let mut search = MctsSearch::new(config(200)).unwrap();
                search.think(&board).unwrap();
                search
            },
            |mut search| black_box(search.commit_move(&board, column).unwrap()),
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_search_passes,
    bench_game_phases,
    bench_rollouts,
    bench_tree_operations,
);
criterion_main!(benches);
