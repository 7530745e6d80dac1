//! Monte Carlo Tree Search (MCTS) for AlphaZero-style Battleship self-play.
//!
//! # Overview
//!
//! Every search starts from a *neutral* board, i.e. one where the side to
//! move is +1, and builds a fresh tree by running simulations:
//!
//! 1. **Selection**: descend the tree by PUCT score, balancing the oracle's
//!    prior against observed values
//! 2. **Expansion**: at a leaf, add one child per cell with nonzero masked
//!    prior; each child fires at its cell and flips the board to the opponent
//! 3. **Evaluation**: ask the [`Evaluator`] (the oracle) for a policy and a
//!    value, or use the negated outcome if the leaf is terminal
//! 4. **Backpropagation**: update visit counts and value sums along the path,
//!    negating the value at each level
//!
//! The root additionally gets Dirichlet noise mixed into its prior.
//!
//! # Usage
//!
//! ```rust
//! use games_battleship::{Battleship, BoardConfig, Polarity};
//! use mcts::{run_mcts, MctsConfig, UniformEvaluator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let game = Battleship::new(BoardConfig::new(5, vec![3, 2])).unwrap();
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let deployment = game.initialize(&mut rng, Polarity::Positive).unwrap();
//!
//! let config = MctsConfig::for_training().with_simulations(32);
//! let result = run_mcts(&game, &UniformEvaluator::new(), config, deployment.state, &mut rng).unwrap();
//!
//! let action = result.select_action(1.0, &mut rng).unwrap();
//! println!("Fire at {action}, policy: {:?}", result.policy);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `num_simulations`: Number of simulations per search (default: 100)
//! - `c_puct`: Exploration constant `C` (default: 2.0)
//! - `dirichlet_alpha` / `dirichlet_epsilon`: Root noise (default: 0.3 / 0.25)
//! - `temperature`: Move selection from the visit distribution (1.0 = proportional, 0.0 = greedy)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        MctsSearch                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌─────────────┐   ┌────────────────┐   │
//! │  │  MctsTree  │   │ Battleship  │   │   Evaluator    │   │
//! │  │  (arena)   │   │ (rules)     │   │ (policy/value) │   │
//! │  └─────┬──────┘   └──────┬──────┘   └───────┬────────┘   │
//! │        ▼                 ▼                  ▼            │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │     select → expand → evaluate → backpropagate     │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod evaluator;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::MctsConfig;
pub use evaluator::{EvalResult, Evaluator, EvaluatorError, FnEvaluator, UniformEvaluator};
pub use node::{MctsNode, NodeId};
pub use search::{
    dirichlet_noise, run_mcts, sample_action, MctsSearch, SearchError, SearchResult, SearchStats,
};
pub use tree::{MctsTree, TreeStats};
