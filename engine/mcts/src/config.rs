//! MCTS configuration parameters.

use crate::search::SearchError;

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Number of simulations to run per search. Must be at least 1.
    pub num_simulations: u32,

    /// Exploration constant `C` of the PUCT formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    pub c_puct: f32,

    /// Dirichlet concentration for the root noise.
    pub dirichlet_alpha: f32,

    /// Fraction of the root prior that comes from Dirichlet noise.
    /// 0.25 means 75% oracle prior + 25% noise. 0.0 disables noise.
    pub dirichlet_epsilon: f32,

    /// Temperature used by callers that pick a move from the visit distribution.
    /// 1.0 = sample proportional to visit counts
    /// 0.0 = always pick most-visited (argmax)
    pub temperature: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 100,
            c_puct: 2.0,
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.25,
            temperature: 1.0,
        }
    }
}

impl MctsConfig {
    /// Create config for self-play (with exploration noise).
    pub fn for_training() -> Self {
        Self::default()
    }

    /// Create config for evaluation (no noise, greedy selection).
    pub fn for_evaluation() -> Self {
        Self {
            dirichlet_epsilon: 0.0,
            temperature: 0.0,
            ..Self::default()
        }
    }

    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 16,
            c_puct: 2.0,
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.0,
            temperature: 0.0,
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set c_puct exploration constant.
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    /// Builder pattern: set the root noise parameters.
    pub fn with_dirichlet(mut self, alpha: f32, epsilon: f32) -> Self {
        self.dirichlet_alpha = alpha;
        self.dirichlet_epsilon = epsilon;
        self
    }

    /// Builder pattern: set temperature.
    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    /// Whether the root prior is blended with Dirichlet noise.
    #[inline]
    pub fn uses_noise(&self) -> bool {
        self.dirichlet_epsilon > 0.0
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.num_simulations == 0 {
            return Err(SearchError::InvalidConfig(
                "num_simulations must be at least 1".to_string(),
            ));
        }
        if !self.c_puct.is_finite() || self.c_puct < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "c_puct must be a finite non-negative number, got {}",
                self.c_puct
            )));
        }
        if !(0.0..=1.0).contains(&self.dirichlet_epsilon) {
            return Err(SearchError::InvalidConfig(format!(
                "dirichlet_epsilon must be within [0, 1], got {}",
                self.dirichlet_epsilon
            )));
        }
        if self.uses_noise() && !(self.dirichlet_alpha.is_finite() && self.dirichlet_alpha > 0.0) {
            return Err(SearchError::InvalidConfig(format!(
                "dirichlet_alpha must be positive when noise is enabled, got {}",
                self.dirichlet_alpha
            )));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "temperature must be a finite non-negative number, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}
