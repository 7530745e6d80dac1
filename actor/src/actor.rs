//! Self-play actor: runs episodes in parallel batches and feeds the replay store.

use anyhow::Result;
use games_battleship::Battleship;
use indicatif::{ProgressBar, ProgressStyle};
use mcts::{Evaluator, MctsConfig, UniformEvaluator};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::self_play::{play_episode, Episode, SelfPlayError};
use crate::stats::{ActorStats, ActorStatsSnapshot};
use crate::storage::{create_replay_store, ReplayStore};

pub struct Actor {
    config: Config,
    game: Battleship,
    mcts_config: MctsConfig,
    evaluator: Arc<dyn Evaluator>,
    replay: Box<dyn ReplayStore>,
    stats: ActorStats,
    pool: ThreadPool,
    next_episode: AtomicU64,
    shutdown_signal: AtomicBool,
}

impl Actor {
    /// Build an actor writing to `{data_dir}/replay.jsonl`.
    pub fn new(config: Config) -> Result<Self> {
        let replay = create_replay_store(&config.replay_path())?;
        Self::with_replay_store(config, replay)
    }

    pub fn with_replay_store(config: Config, replay: Box<dyn ReplayStore>) -> Result<Self> {
        let game = Battleship::new(config.board_config())?;
        let mcts_config = config.mcts_config();
        mcts_config.validate()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.parallel_episodes)
            .thread_name(|i| format!("self-play-{i}"))
            .build()?;

        info!(
            actor_id = %config.actor_id,
            board_size = game.size(),
            ships = ?game.config().ship_lengths,
            "Actor initialized"
        );
        info!(
            "MCTS config: {} simulations, c_puct={}, dirichlet alpha={} epsilon={}, temperature={}",
            mcts_config.num_simulations,
            mcts_config.c_puct,
            mcts_config.dirichlet_alpha,
            mcts_config.dirichlet_epsilon,
            mcts_config.temperature
        );

        Ok(Self {
            stats: ActorStats::new(&config.data_dir, &config.actor_id),
            config,
            game,
            mcts_config,
            evaluator: Arc::new(UniformEvaluator::new()),
            replay,
            pool,
            next_episode: AtomicU64::new(0),
            shutdown_signal: AtomicBool::new(false),
        })
    }

    /// Replace the oracle used by every search.
    #[allow(dead_code)] // Used in tests
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub async fn run(self: &Arc<Self>) -> Result<ActorStatsSnapshot> {
        let limit = self.config.episode_limit();
        info!(
            actor_id = %self.config.actor_id,
            max_episodes = self.config.max_episodes,
            parallel_episodes = self.config.parallel_episodes,
            seed = self.config.seed,
            stats_path = self.stats.stats_path(),
            "Actor starting main loop"
        );

        // Only when stderr is a TTY
        let progress = match limit {
            Some(total) if std::io::IsTerminal::is_terminal(&std::io::stderr()) => {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} episodes ({eta})")?
                        .progress_chars("#>-"),
                );
                Some(pb)
            }
            _ => None,
        };

        loop {
            if self.shutdown_signal.load(Ordering::Relaxed) {
                info!("Shutdown signal received, stopping actor");
                break;
            }

            let start = self.next_episode.load(Ordering::Relaxed);
            let batch = self.config.parallel_episodes as u64;
            let count = match limit {
                Some(total) if start >= total => {
                    info!("Reached maximum episodes ({}), stopping", total);
                    break;
                }
                Some(total) => batch.min(total - start),
                None => batch,
            };

            let this = Arc::clone(self);
            let pb = progress.clone();
            tokio::task::spawn_blocking(move || this.run_batch(start, count, pb.as_ref())).await?;

            self.next_episode.fetch_add(count, Ordering::Relaxed);
            self.stats.write_stats();
        }

        if let Some(pb) = progress {
            pb.finish_with_message("done");
        }

        let snapshot = self.stats.snapshot();
        info!(
            episodes = snapshot.episodes_completed,
            failed = snapshot.episodes_failed,
            stored_examples = self.replay.count()?,
            avg_episode_length = format!("{:.2}", snapshot.avg_episode_length),
            "Actor stopped gracefully"
        );
        Ok(snapshot)
    }

    pub fn shutdown(&self) {
        self.shutdown_signal.store(true, Ordering::Relaxed);
        info!("Shutdown signal set");
    }

    /// Play episodes `start..start + count` on the pool, then store them in
    /// index order.
    fn run_batch(&self, start: u64, count: u64, progress: Option<&ProgressBar>) {
        let results: Vec<(u64, Result<Episode, SelfPlayError>, f64)> = self.pool.install(|| {
            (start..start + count)
                .into_par_iter()
                .map(|index| {
                    let began = Instant::now();
                    let result = self.run_episode(index);
                    (index, result, began.elapsed().as_secs_f64())
                })
                .collect()
        });

        for (index, result, duration) in results {
            match result {
                Ok(episode) => self.finish_episode(index, &episode, duration, progress),
                Err(e) => {
                    self.stats.record_failure();
                    error!("Episode {} failed: {}", index, e);
                }
            }
        }
    }

    fn run_episode(&self, index: u64) -> Result<Episode, SelfPlayError> {
        let mut rng = ChaCha20Rng::seed_from_u64(self.config.seed.wrapping_add(index));
        play_episode(&self.game, &self.evaluator, &self.mcts_config, &mut rng)
    }

    fn episode_id(&self, index: u64) -> String {
        format!("{}-ep-{}", self.config.actor_id, index)
    }

    fn finish_episode(
        &self,
        index: u64,
        episode: &Episode,
        duration: f64,
        progress: Option<&ProgressBar>,
    ) {
        let id = self.episode_id(index);
        if let Err(e) = self.replay.store_episode(&id, &episode.to_examples(&id)) {
            self.stats.record_failure();
            error!("Failed to store episode {}: {}", id, e);
            return;
        }

        let completed = self.stats.record(episode);
        debug!(
            episode = %id,
            actions = episode.actions,
            winner = %episode.winner,
            sunk = ?episode.sunk,
            duration,
            "Episode completed"
        );

        if let Some(pb) = progress {
            pb.inc(1);
        }

        let interval = self.config.log_interval as u64;
        if interval > 0 && completed % interval == 0 {
            let log = || {
                info!(
                    "Completed {} episodes (avg length: {:.2} actions, last: {:.2}s)",
                    completed,
                    self.stats.avg_episode_length(),
                    duration
                );
                episode.search_stats.log_summary(completed);
            };
            match progress {
                Some(pb) => pb.suspend(log),
                None => log(),
            }
        }
    }
}
