//! Evaluator trait for position evaluation.
//!
//! The evaluator (the oracle) maps an encoded observation to a policy over
//! all `size²` cells and a scalar value for the side to move. In training it
//! is a neural network living outside this crate; for tests and baselines we
//! provide a uniform evaluator.

use games_battleship::Observation;
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Policy has {actual} entries, expected {expected}")]
    PolicyShape { expected: usize, actual: usize },

    #[error("Policy entry {index} is not finite ({value})")]
    NonFinitePolicy { index: usize, value: f32 },

    #[error("Policy entry {index} is negative ({value}); expected probabilities, not logits")]
    NegativePolicy { index: usize, value: f32 },

    #[error("Value {0} is not a finite number in [-1, 1]")]
    ValueOutOfRange(f32),
}

/// Result of evaluating a game state.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalResult {
    /// Non-negative policy over every cell, row-major. It does not need to be
    /// masked or normalized; the search does both. Logits must go through a
    /// softmax first.
    pub policy: Vec<f32>,

    /// Value estimate for the side to move.
    /// Range: -1.0 (certain loss) to +1.0 (certain win).
    pub value: f32,
}

impl EvalResult {
    /// Check the shape and range of an oracle answer.
    pub fn validate(&self, num_actions: usize) -> Result<(), EvaluatorError> {
        if self.policy.len() != num_actions {
            return Err(EvaluatorError::PolicyShape {
                expected: num_actions,
                actual: self.policy.len(),
            });
        }
        if let Some((index, &value)) = self
            .policy
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite())
        {
            return Err(EvaluatorError::NonFinitePolicy { index, value });
        }
        if let Some((index, &value)) = self.policy.iter().enumerate().find(|(_, p)| **p < 0.0) {
            return Err(EvaluatorError::NegativePolicy { index, value });
        }
        if !self.value.is_finite() || !(-1.0..=1.0).contains(&self.value) {
            return Err(EvaluatorError::ValueOutOfRange(self.value));
        }
        Ok(())
    }
}

/// Trait for position evaluators.
///
/// Implementations must be reentrant: episodes running on different threads
/// share one evaluator through `&self`.
pub trait Evaluator: Send + Sync {
    /// Evaluate a single neutral-perspective observation.
    fn evaluate(&self, obs: &Observation) -> Result<EvalResult, EvaluatorError>;

    /// Batch evaluate multiple observations.
    /// Default implementation calls evaluate() in a loop.
    fn evaluate_batch(&self, observations: &[&Observation]) -> Result<Vec<EvalResult>, EvaluatorError> {
        observations.iter().map(|obs| self.evaluate(obs)).collect()
    }
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, obs: &Observation) -> Result<EvalResult, EvaluatorError> {
        (**self).evaluate(obs)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for std::sync::Arc<E> {
    fn evaluate(&self, obs: &Observation) -> Result<EvalResult, EvaluatorError> {
        (**self).evaluate(obs)
    }
}

/// Uniform evaluator: equal mass on every cell and a neutral value.
/// Masking is left to the search.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, obs: &Observation) -> Result<EvalResult, EvaluatorError> {
        let num_actions = obs.size() * obs.size();
        if num_actions == 0 {
            return Err(EvaluatorError::EvaluationFailed(
                "observation has an empty board".to_string(),
            ));
        }
        Ok(EvalResult {
            policy: vec![1.0 / num_actions as f32; num_actions],
            value: 0.0,
        })
    }
}

/// Adapter turning a closure into an [`Evaluator`].
///
/// Handy for plugging in an external model callback.
#[derive(Clone)]
pub struct FnEvaluator<F>(pub F);

impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&Observation) -> Result<EvalResult, EvaluatorError> + Send + Sync,
{
    fn evaluate(&self, obs: &Observation) -> Result<EvalResult, EvaluatorError> {
        (self.0)(obs)
    }
}

impl<F> std::fmt::Debug for FnEvaluator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEvaluator").finish_non_exhaustive()
    }
}
