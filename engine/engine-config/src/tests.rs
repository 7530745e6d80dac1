//! Tests for the configuration module.

use super::*;
use std::io::Write;

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.data_dir, "./data");
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.actor.actor_id, "actor-1");
    assert_eq!(config.actor.max_episodes, -1);
    assert_eq!(config.actor.parallel_episodes, 4);
    assert_eq!(config.actor.log_interval, 50);
    assert_eq!(config.evaluation.games, 50);
    assert_eq!(config.evaluation.opponent, "random");
}

#[test]
fn test_game_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.game.board_size, 5);
    assert_eq!(config.game.ship_lengths, vec![3, 2]);
    assert_eq!(config.game.placement_retries, 32);
}

#[test]
fn test_mcts_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.mcts.num_simulations, 100);
    assert!((config.mcts.c_puct - 2.0).abs() < f64::EPSILON);
    assert!((config.mcts.temperature - 1.0).abs() < f64::EPSILON);
    assert!((config.mcts.dirichlet_alpha - 0.3).abs() < f64::EPSILON);
    assert!((config.mcts.dirichlet_epsilon - 0.25).abs() < f64::EPSILON);
}

#[test]
fn test_battleship_env_overrides() {
    std::env::set_var("BATTLESHIP_GAME_BOARD_SIZE", "7");
    std::env::set_var("BATTLESHIP_GAME_SHIP_LENGTHS", "4,3,2");
    std::env::set_var("BATTLESHIP_MCTS_C_PUCT", "1.5");
    std::env::set_var("BATTLESHIP_ACTOR_SEED", "99");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.game.board_size, 7);
    assert_eq!(config.game.ship_lengths, vec![4, 3, 2]);
    assert!((config.mcts.c_puct - 1.5).abs() < f64::EPSILON);
    assert_eq!(config.actor.seed, 99);

    std::env::remove_var("BATTLESHIP_GAME_BOARD_SIZE");
    std::env::remove_var("BATTLESHIP_GAME_SHIP_LENGTHS");
    std::env::remove_var("BATTLESHIP_MCTS_C_PUCT");
    std::env::remove_var("BATTLESHIP_ACTOR_SEED");
}

#[test]
fn test_invalid_env_values_are_ignored() {
    std::env::set_var("BATTLESHIP_ACTOR_PARALLEL_EPISODES", "many");
    std::env::set_var("BATTLESHIP_EVALUATION_GAMES", "-3");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.actor.parallel_episodes, 4);
    assert_eq!(config.evaluation.games, 50);

    std::env::remove_var("BATTLESHIP_ACTOR_PARALLEL_EPISODES");
    std::env::remove_var("BATTLESHIP_EVALUATION_GAMES");
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
data_dir = "/custom/data"

[game]
board_size = 10
ship_lengths = [5, 4, 3, 3, 2]

[actor]
actor_id = "my-actor"
max_episodes = 100

[mcts]
num_simulations = 400
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.data_dir, "/custom/data");
    assert_eq!(config.game.board_size, 10);
    assert_eq!(config.game.ship_lengths, vec![5, 4, 3, 3, 2]);
    assert_eq!(config.actor.actor_id, "my-actor");
    assert_eq!(config.actor.max_episodes, 100);
    assert_eq!(config.mcts.num_simulations, 400);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[game]
board_size = 6
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.game.board_size, 6);
    assert_eq!(config.game.ship_lengths, vec![3, 2]); // Default
    assert_eq!(config.common.data_dir, "./data"); // Default
    assert_eq!(config.actor.actor_id, "actor-1"); // Default
    assert!((config.mcts.c_puct - 2.0).abs() < f64::EPSILON); // Default
}

#[test]
fn test_load_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[evaluation]\ngames = 12\nopponent = \"mcts\"").unwrap();

    let config = load_from_path(&path);
    assert_eq!(config.evaluation.games, 12);
    assert_eq!(config.evaluation.opponent, "mcts");
}

#[test]
fn test_load_from_path_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let missing = load_from_path(&dir.path().join("missing.toml"));
    assert_eq!(missing.common.log_level, "info");

    let broken_path = dir.path().join("broken.toml");
    std::fs::write(&broken_path, "[game\nboard_size = ").unwrap();
    let broken = load_from_path(&broken_path);
    assert_eq!(broken.actor.actor_id, "actor-1");
}
