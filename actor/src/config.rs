//! Configuration for the actor binary
//!
//! Configuration is loaded from config.toml with environment variable overrides
//! (`BATTLESHIP_<SECTION>_<KEY>`). CLI arguments take highest priority.

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use engine_config::{load_config, CentralConfig};
use games_battleship::BoardConfig;
use mcts::MctsConfig;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

use crate::storage::REPLAY_FILE_NAME;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_actor_id() -> String {
    CENTRAL_CONFIG.actor.actor_id.clone()
}

fn default_max_episodes() -> i32 {
    CENTRAL_CONFIG.actor.max_episodes
}

fn default_parallel_episodes() -> usize {
    CENTRAL_CONFIG.actor.parallel_episodes
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_log_interval() -> u32 {
    CENTRAL_CONFIG.actor.log_interval
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.actor.seed
}

fn default_board_size() -> usize {
    CENTRAL_CONFIG.game.board_size
}

fn default_ship_lengths() -> Vec<usize> {
    CENTRAL_CONFIG.game.ship_lengths.clone()
}

fn default_placement_retries() -> u32 {
    CENTRAL_CONFIG.game.placement_retries
}

fn default_num_simulations() -> u32 {
    CENTRAL_CONFIG.mcts.num_simulations
}

fn default_c_puct() -> f32 {
    CENTRAL_CONFIG.mcts.c_puct as f32
}

fn default_dirichlet_alpha() -> f32 {
    CENTRAL_CONFIG.mcts.dirichlet_alpha as f32
}

fn default_dirichlet_epsilon() -> f32 {
    CENTRAL_CONFIG.mcts.dirichlet_epsilon as f32
}

fn default_temperature() -> f32 {
    CENTRAL_CONFIG.mcts.temperature as f32
}

fn default_eval_games() -> u32 {
    CENTRAL_CONFIG.evaluation.games
}

fn default_opponent() -> Opponent {
    Opponent::from_str(&CENTRAL_CONFIG.evaluation.opponent, true).unwrap_or(Opponent::Random)
}

/// What the binary does once configured.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Generate training examples with MCTS self-play
    SelfPlay,
    /// Pit the MCTS player against `--opponent`
    Arena,
    /// Random vs random, reporting the average episode length
    RandomBaseline,
}

/// Opponent faced by the MCTS player in arena mode.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Opponent {
    /// Uniformly random legal shots
    Random,
    /// Greedy MCTS with a quarter of the simulation budget
    Mcts,
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "actor")]
#[command(about = "Battleship actor - self-play episode runner")]
#[command(
    long_about = "Actor that plays Battleship episodes with PUCT search and appends
the resulting training examples to {data_dir}/replay.jsonl.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Activity to run
    #[arg(long, value_enum, default_value_t = Mode::SelfPlay)]
    pub mode: Mode,

    /// Unique actor identifier
    #[arg(long, default_value_t = default_actor_id())]
    pub actor_id: String,

    /// Maximum episodes to run (-1 for unlimited)
    #[arg(long, default_value_t = default_max_episodes())]
    pub max_episodes: i32,

    /// Episodes played concurrently per batch
    #[arg(long, default_value_t = default_parallel_episodes())]
    pub parallel_episodes: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Log progress every N episodes (0 to disable)
    #[arg(long, default_value_t = default_log_interval())]
    pub log_interval: u32,

    /// Directory for the replay file and actor stats
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// Base seed; episode `i` is seeded with `seed + i`
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Board edge length
    #[arg(long, default_value_t = default_board_size())]
    pub board_size: usize,

    /// Comma-separated ship lengths, e.g. 3,2
    #[arg(long, value_delimiter = ',', default_values_t = default_ship_lengths())]
    pub ship_lengths: Vec<usize>,

    /// Whole-fleet placement attempts before giving up
    #[arg(long, default_value_t = default_placement_retries())]
    pub placement_retries: u32,

    /// Number of MCTS simulations per move
    #[arg(long, default_value_t = default_num_simulations())]
    pub num_simulations: u32,

    /// PUCT exploration constant
    #[arg(long, default_value_t = default_c_puct())]
    pub c_puct: f32,

    /// Dirichlet concentration for root noise
    #[arg(long, default_value_t = default_dirichlet_alpha())]
    pub dirichlet_alpha: f32,

    /// Weight of the root noise (0 disables it)
    #[arg(long, default_value_t = default_dirichlet_epsilon())]
    pub dirichlet_epsilon: f32,

    /// Move selection temperature (1.0 samples visits); must be positive for self-play
    #[arg(long, default_value_t = default_temperature())]
    pub temperature: f32,

    /// Games played in arena and random-baseline modes
    #[arg(long, default_value_t = default_eval_games())]
    pub eval_games: u32,

    /// Arena opponent
    #[arg(long, value_enum, default_value_t = default_opponent())]
    pub opponent: Opponent,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.actor_id.is_empty() {
            return Err(anyhow!("actor_id cannot be empty"));
        }

        if self.parallel_episodes == 0 {
            return Err(anyhow!("parallel_episodes must be greater than 0"));
        }

        if self.data_dir.is_empty() {
            return Err(anyhow!("data_dir cannot be empty"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        if self.mode != Mode::SelfPlay && self.eval_games == 0 {
            return Err(anyhow!("eval_games must be greater than 0"));
        }

        self.board_config()
            .validate()
            .map_err(|e| anyhow!("invalid game settings: {}", e))?;
        self.mcts_config()
            .validate()
            .map_err(|e| anyhow!("invalid mcts settings: {}", e))?;

        // Self-play samples its moves; a zero temperature would collapse to arg-max
        if self.mode == Mode::SelfPlay && self.temperature < 1e-6 {
            return Err(anyhow!(
                "temperature must be greater than 0 in self-play mode, got {}",
                self.temperature
            ));
        }

        Ok(())
    }

    pub fn board_config(&self) -> BoardConfig {
        BoardConfig::new(self.board_size, self.ship_lengths.clone())
            .with_placement_retries(self.placement_retries)
    }

    pub fn mcts_config(&self) -> MctsConfig {
        MctsConfig::for_training()
            .with_simulations(self.num_simulations)
            .with_c_puct(self.c_puct)
            .with_dirichlet(self.dirichlet_alpha, self.dirichlet_epsilon)
            .with_temperature(self.temperature)
    }

    /// `{data_dir}/replay.jsonl`
    pub fn replay_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(REPLAY_FILE_NAME)
    }

    /// Episode budget, `None` when unlimited.
    pub fn episode_limit(&self) -> Option<u64> {
        u64::try_from(self.max_episodes).ok().filter(|&n| n > 0)
    }
}
