//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_board_size() -> usize {
    defaults::board_size()
}
fn d_ship_lengths() -> Vec<usize> {
    defaults::ship_lengths().to_vec()
}
fn d_placement_retries() -> u32 {
    defaults::placement_retries()
}
fn d_num_sims() -> u32 {
    defaults::num_simulations()
}
fn d_c_puct() -> f64 {
    defaults::c_puct()
}
fn d_dirichlet_alpha() -> f64 {
    defaults::dirichlet_alpha()
}
fn d_dirichlet_epsilon() -> f64 {
    defaults::dirichlet_epsilon()
}
fn d_temperature() -> f64 {
    defaults::temperature()
}
fn d_actor_id() -> String {
    defaults::actor_id().into()
}
fn d_max_episodes() -> i32 {
    defaults::max_episodes()
}
fn d_parallel_episodes() -> usize {
    defaults::parallel_episodes()
}
fn d_log_interval() -> u32 {
    defaults::log_interval()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_eval_games() -> u32 {
    defaults::eval_games()
}
fn d_eval_opponent() -> String {
    defaults::eval_opponent().into()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub actor: ActorConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

/// Board and fleet layout, identical for both sides
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    #[serde(default = "d_board_size")]
    pub board_size: usize,
    #[serde(default = "d_ship_lengths")]
    pub ship_lengths: Vec<usize>,
    #[serde(default = "d_placement_retries")]
    pub placement_retries: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: defaults::board_size(),
            ship_lengths: defaults::ship_lengths().to_vec(),
            placement_retries: defaults::placement_retries(),
        }
    }
}

/// MCTS search parameters
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_num_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_c_puct")]
    pub c_puct: f64,
    #[serde(default = "d_dirichlet_alpha")]
    pub dirichlet_alpha: f64,
    #[serde(default = "d_dirichlet_epsilon")]
    pub dirichlet_epsilon: f64,
    #[serde(default = "d_temperature")]
    pub temperature: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::num_simulations(),
            c_puct: defaults::c_puct(),
            dirichlet_alpha: defaults::dirichlet_alpha(),
            dirichlet_epsilon: defaults::dirichlet_epsilon(),
            temperature: defaults::temperature(),
        }
    }
}

/// Actor (self-play) configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ActorConfig {
    #[serde(default = "d_actor_id")]
    pub actor_id: String,
    /// Negative means run until interrupted
    #[serde(default = "d_max_episodes")]
    pub max_episodes: i32,
    #[serde(default = "d_parallel_episodes")]
    pub parallel_episodes: usize,
    #[serde(default = "d_log_interval")]
    pub log_interval: u32,
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            actor_id: defaults::actor_id().into(),
            max_episodes: defaults::max_episodes(),
            parallel_episodes: defaults::parallel_episodes(),
            log_interval: defaults::log_interval(),
            seed: defaults::seed(),
        }
    }
}

/// Arena evaluation configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EvaluationConfig {
    #[serde(default = "d_eval_games")]
    pub games: u32,
    /// `random` or `mcts`
    #[serde(default = "d_eval_opponent")]
    pub opponent: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            games: defaults::eval_games(),
            opponent: defaults::eval_opponent().into(),
        }
    }
}
