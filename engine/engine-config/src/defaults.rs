//! Default configuration values loaded from config.defaults.toml.
//!
//! The file is embedded at compile time so the binary and the shipped
//! config template can never disagree.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    game: GameDefaults,
    mcts: MctsDefaults,
    actor: ActorDefaults,
    evaluation: EvaluationDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct GameDefaults {
    board_size: usize,
    ship_lengths: Vec<usize>,
    placement_retries: u32,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    num_simulations: u32,
    c_puct: f64,
    dirichlet_alpha: f64,
    dirichlet_epsilon: f64,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ActorDefaults {
    actor_id: String,
    max_episodes: i32,
    parallel_episodes: usize,
    log_interval: u32,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct EvaluationDefaults {
    games: u32,
    opponent: String,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Game
pub fn board_size() -> usize {
    DEFAULTS.game.board_size
}
pub fn ship_lengths() -> &'static [usize] {
    &DEFAULTS.game.ship_lengths
}
pub fn placement_retries() -> u32 {
    DEFAULTS.game.placement_retries
}

// MCTS
pub fn num_simulations() -> u32 {
    DEFAULTS.mcts.num_simulations
}
pub fn c_puct() -> f64 {
    DEFAULTS.mcts.c_puct
}
pub fn dirichlet_alpha() -> f64 {
    DEFAULTS.mcts.dirichlet_alpha
}
pub fn dirichlet_epsilon() -> f64 {
    DEFAULTS.mcts.dirichlet_epsilon
}
pub fn temperature() -> f64 {
    DEFAULTS.mcts.temperature
}

// Actor
pub fn actor_id() -> &'static str {
    &DEFAULTS.actor.actor_id
}
pub fn max_episodes() -> i32 {
    DEFAULTS.actor.max_episodes
}
pub fn parallel_episodes() -> usize {
    DEFAULTS.actor.parallel_episodes
}
pub fn log_interval() -> u32 {
    DEFAULTS.actor.log_interval
}
pub fn seed() -> u64 {
    DEFAULTS.actor.seed
}

// Evaluation
pub fn eval_games() -> u32 {
    DEFAULTS.evaluation.games
}
pub fn eval_opponent() -> &'static str {
    &DEFAULTS.evaluation.opponent
}
