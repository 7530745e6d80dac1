//! MCTS benchmarks for performance profiling.
//!
//! Run with: `cargo bench -p mcts`
//!
//! These benchmarks measure:
//! - Full MCTS search with varying simulation counts
//! - Search from different game phases (opening, midgame, one shot from victory)
//! - Board size scaling
//! - Tree operations (selection, backpropagation, policy extraction)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use games_battleship::{Battleship, BoardConfig, BoardState, Orientation, Polarity};
use mcts::{MctsConfig, MctsSearch, MctsTree, UniformEvaluator};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn standard_game() -> Battleship {
    Battleship::new(BoardConfig::default()).unwrap()
}

fn opening(game: &Battleship, seed: u64) -> BoardState {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    game.initialize(&mut rng, Polarity::Positive).unwrap().state
}

/// Fire a fixed sequence of shots, alternating sides like a real game would.
fn play_shots(game: &Battleship, seed: u64, shots: &[usize]) -> BoardState {
    let mut state = opening(game, seed);
    let mut polarity = Polarity::Positive;
    for &action in shots {
        if !game.apply_action(&mut state, action, polarity).unwrap().extra_turn() {
            polarity = polarity.opponent();
        }
    }
    game.flip_perspective(state, polarity)
}

// =============================================================================
// Full MCTS Search Benchmarks
// =============================================================================

fn bench_mcts_search_simulations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_search_simulations");
    let game = standard_game();
    let evaluator = UniformEvaluator::new();
    let state = opening(&game, 42);

    for sims in [50, 100, 200, 400, 800] {
        group.throughput(Throughput::Elements(sims as u64));
        group.bench_with_input(BenchmarkId::new("5x5", sims), &sims, |b, &sims| {
            let config = MctsConfig::for_training().with_simulations(sims);

            b.iter(|| {
                let mut rng = ChaCha20Rng::seed_from_u64(42);
                let mut search =
                    MctsSearch::new(&game, &evaluator, config.clone(), state.clone()).unwrap();
                black_box(search.run(&mut rng).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_mcts_game_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_game_phases");
    let game = standard_game();
    let evaluator = UniformEvaluator::new();
    let config = MctsConfig::for_testing().with_simulations(200);

    let phases = [
        ("opening", opening(&game, 42)),
        ("midgame", play_shots(&game, 42, &[0, 24, 6, 18, 12, 7, 3, 21])),
        ("near_terminal", {
            let mut state = BoardState::new(5);
            game.place_ship(&mut state, Polarity::Negative, 0, 0, 3, Orientation::Horizontal)
                .unwrap();
            game.place_ship(&mut state, Polarity::Negative, 4, 3, 2, Orientation::Horizontal)
                .unwrap();
            game.place_ship(&mut state, Polarity::Positive, 2, 0, 3, Orientation::Vertical)
                .unwrap();
            game.place_ship(&mut state, Polarity::Positive, 1, 4, 2, Orientation::Vertical)
                .unwrap();
            for action in [0, 1, 2, 23] {
                game.apply_action(&mut state, action, Polarity::Positive).unwrap();
            }
            state
        }),
    ];

    for (name, state) in phases {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut rng = ChaCha20Rng::seed_from_u64(42);
                let mut search =
                    MctsSearch::new(&game, &evaluator, config.clone(), state.clone()).unwrap();
                black_box(search.run(&mut rng).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_board_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_board_sizes");
    let evaluator = UniformEvaluator::new();
    let config = MctsConfig::for_training().with_simulations(200);

    for (size, ships) in [(5, vec![3, 2]), (7, vec![4, 3, 2]), (10, vec![5, 4, 3, 3, 2])] {
        let game = Battleship::new(BoardConfig::new(size, ships)).unwrap();
        let state = opening(&game, 7);

        group.bench_with_input(BenchmarkId::new("size", size), &size, |b, _| {
            b.iter(|| {
                let mut rng = ChaCha20Rng::seed_from_u64(7);
                let mut search =
                    MctsSearch::new(&game, &evaluator, config.clone(), state.clone()).unwrap();
                black_box(search.run(&mut rng).unwrap())
            });
        });
    }

    group.finish();
}

// =============================================================================
// Tree Operation Benchmarks
// =============================================================================

fn bench_tree_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_tree_ops");
    let board = BoardState::new(5);

    group.bench_function("allocate_node", |b| {
        b.iter(|| {
            let mut tree = MctsTree::new(board.clone());
            for i in 0..100usize {
                tree.add_child(tree.root(), i % 25, 0.04, board.clone(), false, 0.0);
            }
            black_box(tree.len())
        });
    });

    group.bench_function("select_child", |b| {
        let mut tree = MctsTree::new(board.clone());

        for i in 0..25usize {
            let child_id = tree.add_child(
                tree.root(),
                i,
                (i as f32 + 1.0) / 325.0,
                board.clone(),
                false,
                0.0,
            );
            let child = tree.get_mut(child_id);
            child.visit_count = (i as u32 + 1) * 10;
            child.value_sum = (i as f32 - 12.0) * 0.05 * child.visit_count as f32;
        }
        tree.get_mut(tree.root()).visit_count = 3250;

        b.iter(|| black_box(tree.select_child(tree.root(), 2.0)));
    });

    group.bench_function("backpropagate_depth_5", |b| {
        b.iter_batched(
            || {
                let mut tree = MctsTree::new(board.clone());
                let mut parent = tree.root();
                for i in 0..5 {
                    parent = tree.add_child(
                        parent,
                        i,
                        0.5,
                        board.clone(),
                        i == 4,
                        if i == 4 { -1.0 } else { 0.0 },
                    );
                }
                (tree, parent)
            },
            |(mut tree, leaf)| {
                tree.backpropagate(leaf, -1.0);
                black_box(tree)
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("root_policy", |b| {
        let mut tree = MctsTree::new(board.clone());
        for i in 0..25usize {
            let child_id = tree.add_child(tree.root(), i, 0.04, board.clone(), false, 0.0);
            tree.get_mut(child_id).visit_count = (i as u32 + 1) * 8;
        }

        b.iter(|| black_box(tree.root_policy(25, 1.0)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_mcts_search_simulations,
    bench_mcts_game_phases,
    bench_board_sizes,
    bench_tree_operations,
);
criterion_main!(benches);
