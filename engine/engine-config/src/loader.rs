//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "BATTLESHIP_CONFIG";

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",      // Current directory
    "../config.toml",   // Parent directory (when running from subdirectory)
    "/app/config.toml", // Docker container
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by the BATTLESHIP_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
/// 4. Docker container path (/app/config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from {}: {}", CONFIG_ENV_VAR, path.display());
            return load_from_path(&path);
        }
        warn!(
            "{}={} not found, searching defaults",
            CONFIG_ENV_VAR,
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// Unreadable or malformed files fall back to the built-in defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Parse a comma-separated list such as `4,3,3,2`.
fn parse_list<T: std::str::FromStr>(raw: &str) -> Option<Vec<T>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect()
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (i32, u64, f64, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
    // Comma-separated list field
    ($config:expr, $section:ident . $field:ident, $key:expr, list) => {
        if let Ok(raw) = std::env::var($key) {
            match parse_list(&raw) {
                Some(v) => $config.$section.$field = v,
                None => warn!("Ignoring {}={}: expected a comma-separated list", $key, raw),
            }
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: BATTLESHIP_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "BATTLESHIP_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "BATTLESHIP_COMMON_LOG_LEVEL");

    // Game
    env_override!(
        config,
        game.board_size,
        "BATTLESHIP_GAME_BOARD_SIZE",
        parse
    );
    env_override!(
        config,
        game.ship_lengths,
        "BATTLESHIP_GAME_SHIP_LENGTHS",
        list
    );
    env_override!(
        config,
        game.placement_retries,
        "BATTLESHIP_GAME_PLACEMENT_RETRIES",
        parse
    );

    // MCTS
    env_override!(
        config,
        mcts.num_simulations,
        "BATTLESHIP_MCTS_NUM_SIMULATIONS",
        parse
    );
    env_override!(config, mcts.c_puct, "BATTLESHIP_MCTS_C_PUCT", parse);
    env_override!(
        config,
        mcts.dirichlet_alpha,
        "BATTLESHIP_MCTS_DIRICHLET_ALPHA",
        parse
    );
    env_override!(
        config,
        mcts.dirichlet_epsilon,
        "BATTLESHIP_MCTS_DIRICHLET_EPSILON",
        parse
    );
    env_override!(
        config,
        mcts.temperature,
        "BATTLESHIP_MCTS_TEMPERATURE",
        parse
    );

    // Actor
    env_override!(config, actor.actor_id, "BATTLESHIP_ACTOR_ACTOR_ID");
    env_override!(
        config,
        actor.max_episodes,
        "BATTLESHIP_ACTOR_MAX_EPISODES",
        parse
    );
    env_override!(
        config,
        actor.parallel_episodes,
        "BATTLESHIP_ACTOR_PARALLEL_EPISODES",
        parse
    );
    env_override!(
        config,
        actor.log_interval,
        "BATTLESHIP_ACTOR_LOG_INTERVAL",
        parse
    );
    env_override!(config, actor.seed, "BATTLESHIP_ACTOR_SEED", parse);

    // Evaluation
    env_override!(
        config,
        evaluation.games,
        "BATTLESHIP_EVALUATION_GAMES",
        parse
    );
    env_override!(
        config,
        evaluation.opponent,
        "BATTLESHIP_EVALUATION_OPPONENT"
    );

    config
}
