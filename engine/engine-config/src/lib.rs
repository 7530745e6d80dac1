//! Centralized configuration loading from config.toml.
//!
//! This crate provides the configuration structs and loading logic used by
//! the actor binary.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`BATTLESHIP_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! BATTLESHIP_<SECTION>_<KEY>=value
//!
//! Examples:
//!     BATTLESHIP_COMMON_DATA_DIR=/data
//!     BATTLESHIP_GAME_BOARD_SIZE=7
//!     BATTLESHIP_GAME_SHIP_LENGTHS=4,3,2
//!     BATTLESHIP_MCTS_NUM_SIMULATIONS=200
//!     BATTLESHIP_ACTOR_SEED=42
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_ENV_VAR, CONFIG_SEARCH_PATHS,
};
pub use structs::*;

#[cfg(test)]
mod tests;
