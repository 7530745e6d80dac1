//! MCTS search implementation.
//!
//! One search answers one decision:
//! 1. Root: query the oracle, blend its policy with Dirichlet noise, mask and
//!    expand
//! 2. Selection: descend by PUCT score to a node without children
//! 3. Expansion + Evaluation: terminal leaves yield their negated outcome,
//!    others are expanded with the oracle's masked policy and valued by it
//! 4. Backpropagation: add the value to every node on the path, negating it
//!    at each level
//!
//! The tree is thrown away afterwards; nothing is reused across moves.

use std::time::Instant;

use games_battleship::{Battleship, BoardState, GameError, Polarity};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::MctsConfig;
use crate::evaluator::{EvalResult, Evaluator, EvaluatorError};
use crate::node::NodeId;
use crate::tree::MctsTree;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid MCTS configuration: {0}")]
    InvalidConfig(String),

    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("State is {actual}x{actual} but the engine plays {expected}x{expected}")]
    StateMismatch { expected: usize, actual: usize },

    #[error("Cannot search from a terminal state")]
    TerminalState,

    #[error("No legal moves available")]
    NoLegalMoves,
}

/// Timing and work counters for one search.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Wall time of the whole search (microseconds)
    pub total_time_us: u64,
    /// Time spent descending the tree (microseconds)
    pub selection_time_us: u64,
    /// Time spent inside the evaluator (microseconds)
    pub inference_time_us: u64,
    /// Time spent creating children (microseconds)
    pub expansion_time_us: u64,
    /// Time spent in backpropagation (microseconds)
    pub backprop_time_us: u64,
    /// Evaluator calls, root included
    pub evaluations: u32,
    /// Child nodes created
    pub nodes_created: u32,
    /// Simulations that ended on a terminal node
    pub terminal_hits: u32,
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Visit distribution over every cell: child visits divided by the sum of
    /// child visits. Cells without a child get 0.
    pub policy: Vec<f32>,

    /// Mean value at the root, from the mover's point of view
    pub value: f32,

    /// Number of simulations performed
    pub simulations: u32,

    pub stats: SearchStats,
}

impl SearchResult {
    /// Pick a move from the visit distribution.
    ///
    /// Temperature 0 takes the most visited cell (first on ties); otherwise
    /// the distribution is raised to `1 / temperature` and sampled.
    pub fn select_action(&self, temperature: f32, rng: &mut ChaCha20Rng) -> Result<usize, SearchError> {
        if temperature < 1e-6 {
            let mut best: Option<(usize, f32)> = None;
            for (action, &p) in self.policy.iter().enumerate() {
                match best {
                    Some((_, best_p)) if p <= best_p => {}
                    _ if p > 0.0 => best = Some((action, p)),
                    _ => {}
                }
            }
            return best.map(|(a, _)| a).ok_or(SearchError::NoLegalMoves);
        }

        if temperature == 1.0 {
            return sample_action(&self.policy, rng);
        }

        let mut scaled: Vec<f32> = self
            .policy
            .iter()
            .map(|&p| p.powf(1.0 / temperature))
            .collect();
        let total: f32 = scaled.iter().sum();
        if !(total > 0.0 && total.is_finite()) {
            return Err(SearchError::NoLegalMoves);
        }
        for p in &mut scaled {
            *p /= total;
        }
        sample_action(&scaled, rng)
    }
}

/// MCTS search state.
pub struct MctsSearch<'a, E: Evaluator> {
    tree: MctsTree,
    game: &'a Battleship,
    evaluator: &'a E,
    config: MctsConfig,
    num_actions: usize,
    stats: SearchStats,
}

impl<'a, E: Evaluator> MctsSearch<'a, E> {
    /// Create a new MCTS search from a neutral-perspective state.
    pub fn new(
        game: &'a Battleship,
        evaluator: &'a E,
        config: MctsConfig,
        state: BoardState,
    ) -> Result<Self, SearchError> {
        config.validate()?;

        if state.size() != game.size() {
            return Err(SearchError::StateMismatch {
                expected: game.size(),
                actual: state.size(),
            });
        }
        if game.is_terminal(&state).is_terminal {
            return Err(SearchError::TerminalState);
        }

        let mut tree = MctsTree::new(state);
        let root = tree.root();
        tree.get_mut(root).visit_count = 1;

        Ok(Self {
            tree,
            game,
            evaluator,
            config,
            num_actions: game.num_actions(),
            stats: SearchStats::default(),
        })
    }

    /// Run the MCTS search for the configured number of simulations.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<SearchResult, SearchError> {
        let start = Instant::now();

        if !self.tree.get(self.tree.root()).is_expanded() {
            self.expand_root(rng)?;
        }

        for _ in 0..self.config.num_simulations {
            self.simulate()?;
        }

        let policy = self.tree.root_policy(self.num_actions, 1.0);
        let root = self.tree.get(self.tree.root());
        self.stats.total_time_us = start.elapsed().as_micros() as u64;

        debug!(
            simulations = self.config.num_simulations,
            nodes = self.tree.len(),
            root_value = root.mean_value(),
            evaluations = self.stats.evaluations,
            "MCTS search complete"
        );

        Ok(SearchResult {
            policy,
            value: root.mean_value(),
            simulations: self.config.num_simulations,
            stats: self.stats.clone(),
        })
    }

    /// Query the oracle at the root, blend in Dirichlet noise, mask and expand.
    /// The root's oracle value is not used.
    fn expand_root(&mut self, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        let root_id = self.tree.root();
        let eval = self.evaluate(root_id)?;

        let mut policy = eval.policy;
        if self.config.uses_noise() {
            let noise = dirichlet_noise(self.num_actions, self.config.dirichlet_alpha, rng)?;
            let eps = self.config.dirichlet_epsilon;
            for (p, n) in policy.iter_mut().zip(noise) {
                *p = (1.0 - eps) * *p + eps * n;
            }
        }

        let priors = self
            .game
            .mask_and_renormalize(&policy, &self.tree.get(root_id).state)?;
        self.expand_node(root_id, &priors)
    }

    /// Run a single simulation (select -> expand -> evaluate -> backpropagate).
    fn simulate(&mut self) -> Result<(), SearchError> {
        let select_start = Instant::now();
        let (leaf_id, depth) = self.select();
        self.stats.selection_time_us += select_start.elapsed().as_micros() as u64;

        let leaf = self.tree.get(leaf_id);
        let value = if leaf.is_terminal {
            self.stats.terminal_hits += 1;
            leaf.terminal_value
        } else {
            let eval = self.evaluate(leaf_id)?;
            let priors = self
                .game
                .mask_and_renormalize(&eval.policy, &self.tree.get(leaf_id).state)?;
            self.expand_node(leaf_id, &priors)?;
            eval.value
        };

        let backprop_start = Instant::now();
        self.tree.backpropagate(leaf_id, value);
        self.stats.backprop_time_us += backprop_start.elapsed().as_micros() as u64;

        trace!(leaf = leaf_id.0, depth, value, "MCTS simulation complete");
        Ok(())
    }

    /// Descend by PUCT score until reaching a node without children.
    /// Returns the leaf and its depth.
    fn select(&self) -> (NodeId, u32) {
        let mut current = self.tree.root();
        let mut depth = 0;

        while self.tree.get(current).is_expanded() {
            match self.tree.select_child(current, self.config.c_puct) {
                Some(child_id) => {
                    current = child_id;
                    depth += 1;
                }
                None => break,
            }
        }

        (current, depth)
    }

    /// Encode a node's state, call the oracle and check its answer.
    fn evaluate(&mut self, node_id: NodeId) -> Result<EvalResult, SearchError> {
        let obs = self.game.encode_observation(&self.tree.get(node_id).state);

        let start = Instant::now();
        let eval = self.evaluator.evaluate(&obs)?;
        self.stats.inference_time_us += start.elapsed().as_micros() as u64;
        self.stats.evaluations += 1;

        eval.validate(self.num_actions)?;
        Ok(eval)
    }

    /// Add one child per action with nonzero prior.
    ///
    /// Each child fires at its cell as +1 and is then flipped so that the
    /// opponent moves next. The turn alternates in the tree even after a hit.
    fn expand_node(&mut self, node_id: NodeId, priors: &[f32]) -> Result<(), SearchError> {
        let start = Instant::now();
        let state = self.tree.get(node_id).state.clone();

        for (action, &prior) in priors.iter().enumerate() {
            if prior <= 0.0 {
                continue;
            }

            let mut child_state = state.clone();
            self.game
                .apply_action(&mut child_state, action, Polarity::Positive)?;
            let child_state = self.game.flip_perspective(child_state, Polarity::Negative);

            // The outcome is seen from the side that just fired, so the child
            // (the opponent to move) stores it negated.
            let termination = self.game.is_terminal(&child_state);
            self.tree.add_child(
                node_id,
                action,
                prior,
                child_state,
                termination.is_terminal,
                -termination.value,
            );
            self.stats.nodes_created += 1;
        }

        self.stats.expansion_time_us += start.elapsed().as_micros() as u64;
        Ok(())
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }
}

/// Sample an action from a probability distribution.
pub fn sample_action(policy: &[f32], rng: &mut ChaCha20Rng) -> Result<usize, SearchError> {
    let r: f32 = rng.gen();
    let mut cumsum = 0.0;

    for (i, &p) in policy.iter().enumerate() {
        cumsum += p;
        if r < cumsum {
            return Ok(i);
        }
    }

    // Fallback to last non-zero action (handles floating point issues)
    for (i, &p) in policy.iter().enumerate().rev() {
        if p > 0.0 {
            return Ok(i);
        }
    }

    Err(SearchError::NoLegalMoves)
}

/// Generate Dirichlet-distributed noise using Gamma variates.
pub fn dirichlet_noise(n: usize, alpha: f32, rng: &mut ChaCha20Rng) -> Result<Vec<f32>, SearchError> {
    use rand_distr::{Distribution, Gamma};

    let gamma = Gamma::new(alpha as f64, 1.0)
        .map_err(|e| SearchError::InvalidConfig(format!("dirichlet_alpha {alpha}: {e}")))?;
    let mut samples: Vec<f32> = (0..n).map(|_| gamma.sample(rng) as f32).collect();

    let sum: f32 = samples.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        for s in &mut samples {
            *s /= sum;
        }
    } else if n > 0 {
        // Every variate underflowed; fall back to a flat draw.
        samples.fill(1.0 / n as f32);
    }

    Ok(samples)
}

/// Convenience function to run a single MCTS search.
pub fn run_mcts<E: Evaluator>(
    game: &Battleship,
    evaluator: &E,
    config: MctsConfig,
    state: BoardState,
    rng: &mut ChaCha20Rng,
) -> Result<SearchResult, SearchError> {
    let mut search = MctsSearch::new(game, evaluator, config, state)?;
    search.run(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{FnEvaluator, UniformEvaluator};
    use games_battleship::{BoardConfig, Orientation, Plane};
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn game(size: usize, ships: Vec<usize>) -> Battleship {
        Battleship::new(BoardConfig::new(size, ships)).unwrap()
    }

    fn fresh_state(game: &Battleship, seed: u64) -> BoardState {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        game.initialize(&mut rng, Polarity::Positive).unwrap().state
    }

    fn assert_legal_distribution(game: &Battleship, state: &BoardState, policy: &[f32]) {
        assert_eq!(policy.len(), game.num_actions());
        let sum: f32 = policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4, "policy sums to {sum}");
        for (action, &p) in policy.iter().enumerate() {
            assert!(p >= 0.0);
            if state.plane(Polarity::Positive, Plane::Attempts)[action] {
                assert_eq!(p, 0.0, "mass on attempted cell {action}");
            }
        }
    }

    /// 3x3 board where +1 has hit (0, 0) of the 2-cell ship at (0, 0)-(0, 1).
    fn one_shot_from_victory() -> (Battleship, BoardState) {
        let game = game(3, vec![2]);
        let mut state = BoardState::new(3);
        game.place_ship(&mut state, Polarity::Negative, 0, 0, 2, Orientation::Horizontal)
            .unwrap();
        game.place_ship(&mut state, Polarity::Positive, 2, 0, 2, Orientation::Horizontal)
            .unwrap();
        game.apply_action(&mut state, 0, Polarity::Positive).unwrap();
        (game, state)
    }

    #[test]
    fn test_single_simulation_yields_legal_distribution() {
        let game = game(5, vec![3, 2]);
        let mut state = fresh_state(&game, 1);
        // Four shots cannot sink five ship cells
        for action in [0, 6, 12, 24] {
            game.apply_action(&mut state, action, Polarity::Positive).unwrap();
        }

        let config = MctsConfig::for_testing().with_simulations(1);
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let result = run_mcts(&game, &UniformEvaluator::new(), config, state.clone(), &mut rng).unwrap();

        assert_eq!(result.simulations, 1);
        assert_legal_distribution(&game, &state, &result.policy);
        // One visited child carries all the mass
        assert_eq!(result.policy.iter().filter(|&&p| p > 0.0).count(), 1);
    }

    #[test]
    fn test_search_distribution_is_normalized_and_legal() {
        let game = game(5, vec![3, 2]);
        let config = MctsConfig::for_training().with_simulations(64);

        for seed in 0..5 {
            let mut state = fresh_state(&game, seed);
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            for _ in 0..6 {
                let legal = game.legal_actions(&state, Polarity::Positive);
                let action = legal[rng.gen_range(0..legal.len())];
                game.apply_action(&mut state, action, Polarity::Positive).unwrap();
            }
            if game.is_terminal(&state).is_terminal {
                continue;
            }

            let result =
                run_mcts(&game, &UniformEvaluator::new(), config.clone(), state.clone(), &mut rng)
                    .unwrap();
            assert_legal_distribution(&game, &state, &result.policy);
        }
    }

    #[test]
    fn test_root_noise_respects_mask() {
        let game = game(4, vec![2]);
        let mut state = BoardState::new(4);
        game.place_ship(&mut state, Polarity::Negative, 3, 2, 2, Orientation::Horizontal)
            .unwrap();
        game.place_ship(&mut state, Polarity::Positive, 0, 0, 2, Orientation::Vertical)
            .unwrap();
        for action in [1, 5, 9, 14] {
            game.apply_action(&mut state, action, Polarity::Positive).unwrap();
        }

        // Pure noise at the root
        let config = MctsConfig::for_testing()
            .with_simulations(8)
            .with_dirichlet(0.3, 1.0);

        for seed in 0..20 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let evaluator = UniformEvaluator::new();
            let mut search = MctsSearch::new(&game, &evaluator, config.clone(), state.clone()).unwrap();
            let result = search.run(&mut rng).unwrap();

            let tree = search.tree();
            let root = tree.get(tree.root());
            let mut prior_sum = 0.0;
            for &(action, child) in &root.children {
                assert!(!state.plane(Polarity::Positive, Plane::Attempts)[action]);
                prior_sum += tree.get(child).prior;
            }
            assert!((prior_sum - 1.0).abs() < 1e-4);
            assert_legal_distribution(&game, &state, &result.policy);
        }
    }

    #[test]
    fn test_root_noise_changes_priors() {
        let game = game(4, vec![2]);
        let state = fresh_state(&game, 3);
        let evaluator = UniformEvaluator::new();

        let root_priors = |epsilon: f32, seed: u64| {
            let config = MctsConfig::for_testing()
                .with_simulations(4)
                .with_dirichlet(0.3, epsilon);
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mut search = MctsSearch::new(&game, &evaluator, config, state.clone()).unwrap();
            search.run(&mut rng).unwrap();
            let tree = search.tree();
            tree.get(tree.root())
                .children
                .iter()
                .map(|&(action, child)| (action, tree.get(child).prior))
                .collect::<Vec<_>>()
        };

        for seed in 0..5 {
            let clean = root_priors(0.0, seed);
            let noisy = root_priors(0.25, seed);
            assert_eq!(clean.len(), 16);
            assert_eq!(noisy.len(), 16);
            for &(_, prior) in &clean {
                assert!((prior - 1.0 / 16.0).abs() < 1e-6);
            }
            assert!(
                clean
                    .iter()
                    .zip(&noisy)
                    .any(|(a, b)| a.0 == b.0 && (a.1 - b.1).abs() > 1e-4),
                "noise left the root priors untouched for seed {seed}"
            );
        }
    }

    #[test]
    fn test_root_visit_preset_and_evaluation_count() {
        let game = game(5, vec![3, 2]);
        let state = fresh_state(&game, 8);

        let calls = AtomicUsize::new(0);
        let evaluator = FnEvaluator(|obs: &games_battleship::Observation| {
            calls.fetch_add(1, Ordering::SeqCst);
            UniformEvaluator::new().evaluate(obs)
        });

        let config = MctsConfig::for_testing().with_simulations(1);
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let mut search = MctsSearch::new(&game, &evaluator, config, state).unwrap();
        let result = search.run(&mut rng).unwrap();

        // Root query plus one leaf query; a single shot cannot end the game.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.stats.evaluations, 2);

        let tree = search.tree();
        let root = tree.get(tree.root());
        assert_eq!(root.visit_count, 2);
        assert_eq!(root.children.len(), 25);
    }

    #[test]
    fn test_finds_winning_shot() {
        let (game, state) = one_shot_from_victory();
        assert!(state.get(Polarity::Positive, Plane::Hits, 0, 0));

        let config = MctsConfig::for_evaluation().with_simulations(200);
        let evaluator = UniformEvaluator::new();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let mut search = MctsSearch::new(&game, &evaluator, config, state).unwrap();
        let result = search.run(&mut rng).unwrap();

        let tree = search.tree();
        let root = tree.get(tree.root());
        let winning_child = root
            .children
            .iter()
            .find(|(action, _)| *action == 1)
            .map(|(_, id)| tree.get(*id))
            .unwrap();

        assert!(winning_child.is_terminal);
        assert!((winning_child.terminal_value - (-1.0)).abs() < 1e-6);
        assert_eq!(tree.best_action().map(|(a, _)| a), Some(1));
        assert!(result.policy[1] > 0.5, "got {}", result.policy[1]);
        assert!(result.value > 0.0);
        assert!(result.stats.terminal_hits > 0);
        assert_eq!(result.select_action(0.0, &mut rng).unwrap(), 1);
    }

    #[test]
    fn test_malformed_oracle_is_fatal() {
        let game = game(3, vec![2]);
        let state = fresh_state(&game, 0);
        let config = MctsConfig::for_testing();
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        let short = FnEvaluator(|_: &games_battleship::Observation| {
            Ok::<_, EvaluatorError>(EvalResult {
                policy: vec![0.25; 4],
                value: 0.0,
            })
        });
        let err = run_mcts(&game, &short, config.clone(), state.clone(), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SearchError::Evaluator(EvaluatorError::PolicyShape { expected: 9, actual: 4 })
        ));

        let nan_value = FnEvaluator(|_: &games_battleship::Observation| {
            Ok::<_, EvaluatorError>(EvalResult {
                policy: vec![1.0; 9],
                value: f32::NAN,
            })
        });
        let err = run_mcts(&game, &nan_value, config.clone(), state.clone(), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SearchError::Evaluator(EvaluatorError::ValueOutOfRange(_))
        ));

        let logits = FnEvaluator(|_: &games_battleship::Observation| {
            let mut policy = vec![-0.5; 9];
            policy[0] = 6.0;
            Ok::<_, EvaluatorError>(EvalResult { policy, value: 0.0 })
        });
        let err = run_mcts(&game, &logits, config.clone(), state.clone(), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SearchError::Evaluator(EvaluatorError::NegativePolicy { index: 1, .. })
        ));

        let failing = FnEvaluator(|_: &games_battleship::Observation| {
            Err::<EvalResult, _>(EvaluatorError::EvaluationFailed("offline".to_string()))
        });
        let err = run_mcts(&game, &failing, config, state, &mut rng).unwrap_err();
        assert!(matches!(err, SearchError::Evaluator(EvaluatorError::EvaluationFailed(_))));
    }

    #[test]
    fn test_zero_legal_mass_is_fatal() {
        let game = game(3, vec![2]);
        let mut state = fresh_state(&game, 0);
        game.apply_action(&mut state, 4, Polarity::Positive).unwrap();

        // Everything on the one cell already fired at
        let stubborn = FnEvaluator(|_: &games_battleship::Observation| {
            let mut policy = vec![0.0; 9];
            policy[4] = 1.0;
            Ok::<_, EvaluatorError>(EvalResult { policy, value: 0.0 })
        });

        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let err = run_mcts(&game, &stubborn, MctsConfig::for_testing(), state, &mut rng).unwrap_err();
        assert!(matches!(err, SearchError::Game(GameError::ZeroLegalMass)));
    }

    #[test]
    fn test_rejects_terminal_and_mismatched_states() {
        let (game, mut state) = one_shot_from_victory();
        game.apply_action(&mut state, 1, Polarity::Positive).unwrap();
        assert!(game.is_terminal(&state).is_terminal);

        let evaluator = UniformEvaluator::new();
        let result = MctsSearch::new(&game, &evaluator, MctsConfig::for_testing(), state);
        assert!(matches!(result, Err(SearchError::TerminalState)));

        let result = MctsSearch::new(&game, &evaluator, MctsConfig::for_testing(), BoardState::new(4));
        assert!(matches!(
            result,
            Err(SearchError::StateMismatch { expected: 3, actual: 4 })
        ));

        let result = MctsSearch::new(
            &game,
            &evaluator,
            MctsConfig::for_testing().with_simulations(0),
            fresh_state(&game, 1),
        );
        assert!(matches!(result, Err(SearchError::InvalidConfig(_))));
    }

    #[test]
    fn test_search_is_seed_deterministic() {
        let game = game(5, vec![3, 2]);
        let state = fresh_state(&game, 4);
        let config = MctsConfig::for_training().with_simulations(32);
        let evaluator = UniformEvaluator::new();

        let a = run_mcts(&game, &evaluator, config.clone(), state.clone(), &mut ChaCha20Rng::seed_from_u64(9)).unwrap();
        let b = run_mcts(&game, &evaluator, config, state, &mut ChaCha20Rng::seed_from_u64(9)).unwrap();
        assert_eq!(a.policy, b.policy);
    }

    #[test]
    fn test_select_action_temperatures() {
        let result = SearchResult {
            policy: vec![0.0, 0.2, 0.5, 0.3],
            value: 0.0,
            simulations: 10,
            stats: SearchStats::default(),
        };
        let mut rng = ChaCha20Rng::seed_from_u64(1);

        assert_eq!(result.select_action(0.0, &mut rng).unwrap(), 2);
        for _ in 0..100 {
            assert_ne!(result.select_action(1.0, &mut rng).unwrap(), 0);
            assert_ne!(result.select_action(0.5, &mut rng).unwrap(), 0);
        }

        let empty = SearchResult {
            policy: vec![0.0; 4],
            ..result
        };
        assert!(matches!(
            empty.select_action(0.0, &mut rng),
            Err(SearchError::NoLegalMoves)
        ));
    }

    #[test]
    fn test_sample_action() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let policy = vec![0.0, 0.5, 0.3, 0.2, 0.0];

        let mut counts = [0u32; 5];
        for _ in 0..1000 {
            let action = sample_action(&policy, &mut rng).unwrap();
            counts[action] += 1;
        }

        // Action 0 and 4 should never be selected
        assert_eq!(counts[0], 0);
        assert_eq!(counts[4], 0);

        // ~500, ~300, ~200
        assert!(counts[1] > counts[2]);
        assert!(counts[2] > counts[3]);
    }

    #[test]
    fn test_dirichlet_noise() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let noise = dirichlet_noise(25, 0.3, &mut rng).unwrap();

        let sum: f32 = noise.iter().sum();
        assert!((sum - 1.0).abs() < 0.01);
        for &n in &noise {
            assert!(n >= 0.0);
        }

        assert!(dirichlet_noise(5, 0.0, &mut rng).is_err());
    }
}
