//! Action selection policies for arena play and baselines

use anyhow::{anyhow, Result};
use games_battleship::{Battleship, BoardState, Polarity};
use mcts::{run_mcts, Evaluator, MctsConfig};
use rand::prelude::*;
use rand_chacha::ChaCha20Rng;

/// Trait for action selection policies.
///
/// `state` is always neutral: the policy plays +1.
pub trait Policy: Send {
    /// Pick a cell to fire at
    fn select_action(&mut self, game: &Battleship, state: &BoardState) -> Result<usize>;

    /// Short label for logs and reports
    fn name(&self) -> &str;
}

/// Random policy that fires at a uniformly chosen untried cell.
#[derive(Debug)]
pub struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn select_action(&mut self, game: &Battleship, state: &BoardState) -> Result<usize> {
        game.legal_actions(state, Polarity::Positive)
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| anyhow!("No legal actions left on the board"))
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Policy that runs a full PUCT search for every decision.
pub struct MctsPolicy<E: Evaluator> {
    evaluator: E,
    config: MctsConfig,
    rng: ChaCha20Rng,
}

impl<E: Evaluator> std::fmt::Debug for MctsPolicy<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MctsPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E: Evaluator> MctsPolicy<E> {
    pub fn new(evaluator: E, config: MctsConfig, seed: u64) -> Self {
        Self {
            evaluator,
            config,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl<E: Evaluator> Policy for MctsPolicy<E> {
    /// Temperature 0 takes the most visited cell; anything else samples the
    /// visit distribution raised to `1 / temperature`.
    fn select_action(&mut self, game: &Battleship, state: &BoardState) -> Result<usize> {
        let result = run_mcts(
            game,
            &self.evaluator,
            self.config.clone(),
            state.clone(),
            &mut self.rng,
        )?;
        Ok(result.select_action(self.config.temperature, &mut self.rng)?)
    }

    fn name(&self) -> &str {
        "mcts"
    }
}
