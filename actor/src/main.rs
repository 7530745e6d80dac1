//! Actor - Battleship self-play runner
//!
//! A long-running process that, depending on `--mode`:
//! 1. `self-play`: plays MCTS self-play episodes in parallel batches and
//!    appends the training examples to `{data_dir}/replay.jsonl`
//! 2. `arena`: pits a greedy MCTS player against `--opponent`
//! 3. `random-baseline`: plays random vs random and reports the average
//!    episode length

use anyhow::Result;
use clap::Parser;
use games_battleship::Battleship;
use mcts::UniformEvaluator;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

mod actor;
mod arena;
mod config;
mod policy;
mod self_play;
mod stats;
mod storage;

use crate::actor::Actor;
use crate::config::{Config, Mode, Opponent};
use crate::policy::{MctsPolicy, Policy, RandomPolicy};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, mode = ?config.mode, "Tracing initialized");

    let mode = config.mode;
    let result = match mode {
        Mode::SelfPlay => run_self_play(config).await,
        Mode::Arena => tokio::task::spawn_blocking(move || run_arena_mode(&config)).await?,
        Mode::RandomBaseline => {
            tokio::task::spawn_blocking(move || run_baseline_mode(&config)).await?
        }
    };

    match result {
        Ok(()) => {
            info!("Actor completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Actor failed: {}", e);
            Err(e)
        }
    }
}

async fn run_self_play(config: Config) -> Result<()> {
    let max_episode_description = match config.episode_limit() {
        Some(n) => n.to_string(),
        None => "unlimited".to_string(),
    };
    info!(
        max_episodes = config.max_episodes,
        "Actor {} will run {} episodes", config.actor_id, max_episode_description
    );

    let actor = Arc::new(Actor::new(config)?);

    // Setup graceful shutdown
    let shutdown_actor = Arc::clone(&actor);
    let shutdown_handle = tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, finishing current batch...");
                shutdown_actor.shutdown();
            }
            Err(e) => error!("Failed to listen for ctrl+c: {}", e),
        }
    });

    let run_result = actor.run().await;
    shutdown_handle.abort();

    run_result.map(|_| ())
}

fn run_arena_mode(config: &Config) -> Result<()> {
    let game = Battleship::new(config.board_config())?;
    let search = config
        .mcts_config()
        .with_dirichlet(config.dirichlet_alpha, 0.0)
        .with_temperature(0.0);

    let mut candidate = MctsPolicy::new(UniformEvaluator::new(), search.clone(), config.seed);
    let mut opponent: Box<dyn Policy> = match config.opponent {
        Opponent::Random => Box::new(RandomPolicy::with_seed(config.seed.wrapping_add(1))),
        Opponent::Mcts => Box::new(MctsPolicy::new(
            UniformEvaluator::new(),
            search.with_simulations((config.num_simulations / 4).max(1)),
            config.seed.wrapping_add(1),
        )),
    };

    let mut rng = ChaCha20Rng::seed_from_u64(config.seed);
    let report = arena::run_arena(
        &game,
        &mut candidate,
        opponent.as_mut(),
        config.eval_games,
        &mut rng,
    )?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_baseline_mode(config: &Config) -> Result<()> {
    let game = Battleship::new(config.board_config())?;
    let report = arena::run_random_baseline(&game, config.eval_games, config.seed)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
