//! Actor statistics tracking and persistence.
//!
//! This module provides statistics tracking for the actor, including:
//! - Episode counts and winners
//! - Shot outcomes (hits and extra turns)
//! - MCTS performance metrics
//!
//! Stats are written to `{data_dir}/actor_stats.json` for external monitoring.

use games_battleship::Polarity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

use crate::self_play::Episode;

/// Aggregated actor statistics, designed for lock-free updates.
#[derive(Debug)]
pub struct ActorStats {
    /// Number of episodes completed
    episodes_completed: AtomicU64,
    /// Episodes abandoned after an error
    episodes_failed: AtomicU64,
    /// Total actions across all episodes
    total_actions: AtomicU64,
    /// Episodes won by the side that moved first
    positive_wins: AtomicU64,
    /// Episodes won by the side that moved second
    negative_wins: AtomicU64,
    /// Shots that landed on a ship
    hits: AtomicU64,
    /// Turns kept after a hit
    extra_turns: AtomicU64,
    /// MCTS stats: total searches performed
    mcts_searches: AtomicU64,
    /// MCTS stats: total oracle time (microseconds)
    mcts_inference_us: AtomicU64,
    /// Start time for rate calculations
    start_time: Instant,
    /// Path to write stats file
    stats_path: String,
    actor_id: String,
}

/// Serializable stats for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorStatsSnapshot {
    pub actor_id: String,
    pub episodes_completed: u64,
    pub episodes_failed: u64,
    pub total_actions: u64,
    pub positive_wins: u64,
    pub negative_wins: u64,
    pub hits: u64,
    pub extra_turns: u64,
    pub avg_episode_length: f64,
    pub episodes_per_second: f64,
    pub runtime_seconds: f64,
    pub mcts_searches: u64,
    pub mcts_avg_inference_us: f64,
    pub timestamp: u64,
}

impl ActorStats {
    /// Create new stats tracker.
    pub fn new(data_dir: &str, actor_id: &str) -> Self {
        let stats_path = format!("{}/actor_stats.json", data_dir);

        if let Err(e) = fs::create_dir_all(data_dir) {
            warn!("Failed to create data directory: {}", e);
        }

        Self {
            episodes_completed: AtomicU64::new(0),
            episodes_failed: AtomicU64::new(0),
            total_actions: AtomicU64::new(0),
            positive_wins: AtomicU64::new(0),
            negative_wins: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            extra_turns: AtomicU64::new(0),
            mcts_searches: AtomicU64::new(0),
            mcts_inference_us: AtomicU64::new(0),
            start_time: Instant::now(),
            stats_path,
            actor_id: actor_id.to_string(),
        }
    }

    /// Record a completed episode. Returns the new completed count.
    pub fn record_episode(&self, actions: u32, winner: Polarity, hits: u32, extra_turns: u32) -> u64 {
        self.total_actions
            .fetch_add(actions as u64, Ordering::Relaxed);
        self.hits.fetch_add(hits as u64, Ordering::Relaxed);
        self.extra_turns
            .fetch_add(extra_turns as u64, Ordering::Relaxed);

        match winner {
            Polarity::Positive => self.positive_wins.fetch_add(1, Ordering::Relaxed),
            Polarity::Negative => self.negative_wins.fetch_add(1, Ordering::Relaxed),
        };

        self.episodes_completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record everything an episode carries, search stats included.
    pub fn record(&self, episode: &Episode) -> u64 {
        self.record_mcts_stats(
            episode.search_stats.search_count,
            episode.search_stats.inference_time_us,
        );
        self.record_episode(episode.actions, episode.winner, episode.hits, episode.extra_turns)
    }

    pub fn record_failure(&self) {
        self.episodes_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record MCTS performance for an episode.
    pub fn record_mcts_stats(&self, searches: u32, inference_us: u64) {
        self.mcts_searches
            .fetch_add(searches as u64, Ordering::Relaxed);
        self.mcts_inference_us
            .fetch_add(inference_us, Ordering::Relaxed);
    }

    /// Running mean of actions per episode (0.0 before the first episode).
    pub fn avg_episode_length(&self) -> f64 {
        let episodes = self.episodes_completed.load(Ordering::Relaxed);
        if episodes == 0 {
            return 0.0;
        }
        self.total_actions.load(Ordering::Relaxed) as f64 / episodes as f64
    }

    /// Get a snapshot of current stats.
    pub fn snapshot(&self) -> ActorStatsSnapshot {
        let episodes = self.episodes_completed.load(Ordering::Relaxed);
        let runtime = self.start_time.elapsed().as_secs_f64();
        let searches = self.mcts_searches.load(Ordering::Relaxed);
        let inference_us = self.mcts_inference_us.load(Ordering::Relaxed);

        let episodes_per_second = if runtime > 0.0 {
            episodes as f64 / runtime
        } else {
            0.0
        };

        let mcts_avg_inference_us = if searches > 0 {
            inference_us as f64 / searches as f64
        } else {
            0.0
        };

        ActorStatsSnapshot {
            actor_id: self.actor_id.clone(),
            episodes_completed: episodes,
            episodes_failed: self.episodes_failed.load(Ordering::Relaxed),
            total_actions: self.total_actions.load(Ordering::Relaxed),
            positive_wins: self.positive_wins.load(Ordering::Relaxed),
            negative_wins: self.negative_wins.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            extra_turns: self.extra_turns.load(Ordering::Relaxed),
            avg_episode_length: self.avg_episode_length(),
            episodes_per_second,
            runtime_seconds: runtime,
            mcts_searches: searches,
            mcts_avg_inference_us,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Write stats to JSON file (atomic write-then-rename).
    pub fn write_stats(&self) {
        let snapshot = self.snapshot();

        let json = match serde_json::to_string_pretty(&snapshot) {
            Ok(j) => j,
            Err(e) => {
                warn!("Failed to serialize actor stats: {}", e);
                return;
            }
        };

        let temp_path = format!("{}.tmp", self.stats_path);
        match fs::File::create(&temp_path) {
            Ok(mut file) => {
                if let Err(e) = file.write_all(json.as_bytes()) {
                    warn!("Failed to write actor stats: {}", e);
                    return;
                }
            }
            Err(e) => {
                warn!("Failed to create temp stats file: {}", e);
                return;
            }
        }

        if let Err(e) = fs::rename(&temp_path, &self.stats_path) {
            warn!("Failed to rename stats file: {}", e);
            let _ = fs::remove_file(&temp_path);
            return;
        }

        debug!("Wrote actor stats to {}", self.stats_path);
    }

    pub fn stats_path(&self) -> &str {
        &self.stats_path
    }
}
