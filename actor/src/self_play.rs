//! Self-play episode orchestration.
//!
//! An episode alternates searches between the two sides until one of them has
//! hit every opposing ship cell. Each decision is recorded from the mover's
//! neutral perspective together with the search's visit distribution; once
//! the winner is known every record is labelled +1 (winner's turn) or -1.

use games_battleship::{sunk_ships, Battleship, BoardState, GameError, Polarity, Shot};
use mcts::{run_mcts, Evaluator, MctsConfig, SearchError, SearchStats};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::storage::TrainingExample;

#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Episode exceeded {limit} actions without a winner")]
    StepLimit { limit: u32 },
}

/// Upper bound on actions in one episode: each side can fire at every cell once.
pub fn max_actions(game: &Battleship) -> u32 {
    (2 * game.num_actions()) as u32
}

/// One recorded decision after the outcome is known.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Encoded neutral observation (`4 * size * size` values)
    pub observation: Vec<f32>,
    /// Visit distribution produced by the search
    pub policy: Vec<f32>,
    /// Side that acted
    #[allow(dead_code)] // Used in tests
    pub polarity: Polarity,
    /// +1 for the winner's decisions, -1 for the loser's
    pub outcome: f32,
}

/// A finished self-play game.
#[derive(Debug, Clone)]
pub struct Episode {
    pub samples: Vec<Sample>,
    pub winner: Polarity,
    pub actions: u32,
    pub hits: u32,
    pub extra_turns: u32,
    /// Ships sunk on each side's fleet, indexed by [`Polarity::index`]
    pub sunk: [usize; 2],
    pub search_stats: EpisodeStats,
}

impl Episode {
    /// Convert the samples into replay rows tagged with `episode_id`.
    pub fn to_examples(&self, episode_id: &str) -> Vec<TrainingExample> {
        self.samples
            .iter()
            .enumerate()
            .map(|(step, sample)| TrainingExample {
                episode_id: episode_id.to_string(),
                step: step as u32,
                observation: sample.observation.clone(),
                policy: sample.policy.clone(),
                outcome: sample.outcome,
            })
            .collect()
    }
}

/// Aggregated MCTS stats for an episode.
#[derive(Debug, Clone, Default)]
pub struct EpisodeStats {
    /// Number of MCTS searches performed
    pub search_count: u32,
    /// Total wall-clock time across all searches (microseconds)
    pub total_time_us: u64,
    /// Total time spent in tree selection (microseconds)
    pub selection_time_us: u64,
    /// Total time spent inside the oracle (microseconds)
    pub inference_time_us: u64,
    /// Total time spent creating children (microseconds)
    pub expansion_time_us: u64,
    /// Total time spent in backpropagation (microseconds)
    pub backprop_time_us: u64,
    /// Oracle calls across all searches
    pub evaluations: u64,
    /// Simulations that ended on a terminal node
    pub terminal_hits: u64,
}

impl EpisodeStats {
    pub fn add(&mut self, stats: &SearchStats) {
        self.search_count += 1;
        self.total_time_us += stats.total_time_us;
        self.selection_time_us += stats.selection_time_us;
        self.inference_time_us += stats.inference_time_us;
        self.expansion_time_us += stats.expansion_time_us;
        self.backprop_time_us += stats.backprop_time_us;
        self.evaluations += stats.evaluations as u64;
        self.terminal_hits += stats.terminal_hits as u64;
    }

    /// Log a per-search breakdown of where time went.
    pub fn log_summary(&self, episode: u64) {
        if self.search_count == 0 || self.total_time_us == 0 {
            return;
        }
        let searches = self.search_count as f64;
        let pct = |part: u64| 100.0 * part as f64 / self.total_time_us as f64;
        info!(
            episode,
            searches = self.search_count,
            avg_search_ms = format!("{:.2}", self.total_time_us as f64 / searches / 1000.0),
            selection_pct = format!("{:.1}", pct(self.selection_time_us)),
            inference_pct = format!("{:.1}", pct(self.inference_time_us)),
            expansion_pct = format!("{:.1}", pct(self.expansion_time_us)),
            backprop_pct = format!("{:.1}", pct(self.backprop_time_us)),
            evaluations = self.evaluations,
            terminal_hits = self.terminal_hits,
            "MCTS episode stats"
        );
    }
}

struct Decision {
    state: BoardState,
    policy: Vec<f32>,
    polarity: Polarity,
}

/// Play one full game against itself.
///
/// +1 moves first. Each step searches the acting side's neutral view, picks an
/// action from the visit distribution with `config.temperature`, and fires.
/// The actor only runs this with a positive temperature so moves are sampled.
/// A hit keeps the turn.
pub fn play_episode<E: Evaluator>(
    game: &Battleship,
    evaluator: &E,
    config: &MctsConfig,
    rng: &mut ChaCha20Rng,
) -> Result<Episode, SelfPlayError> {
    let deployment = game.initialize(rng, Polarity::Positive)?;
    let mut state = deployment.state.clone();
    let mut acting = Polarity::Positive;

    let limit = max_actions(game);
    let mut history: Vec<Decision> = Vec::new();
    let mut search_stats = EpisodeStats::default();
    let mut hits = 0u32;
    let mut extra_turns = 0u32;

    let winner = loop {
        if history.len() as u32 >= limit {
            return Err(SelfPlayError::StepLimit { limit });
        }

        let neutral = game.flip_perspective(state.clone(), acting);
        let result = run_mcts(game, evaluator, config.clone(), neutral.clone(), rng)?;
        let action = result.select_action(config.temperature, rng)?;
        search_stats.add(&result.stats);

        let shot = game.apply_action(&mut state, action, acting)?;
        trace!(step = history.len(), %acting, action, ?shot, value = result.value, "Action");
        history.push(Decision {
            state: neutral,
            policy: result.policy,
            polarity: acting,
        });

        if shot == Shot::Hit {
            hits += 1;
        }
        if let Some(winner) = game.winner(&state) {
            break winner;
        }
        if shot.extra_turn() {
            extra_turns += 1;
        } else {
            acting = acting.opponent();
        }
    };

    let sunk = [Polarity::Positive, Polarity::Negative]
        .map(|owner| sunk_ships(&state, deployment.fleet(owner), owner));

    let samples: Vec<Sample> = history
        .into_iter()
        .map(|decision| Sample {
            observation: game.encode_observation(&decision.state).into_vec(),
            policy: decision.policy,
            polarity: decision.polarity,
            outcome: if decision.polarity == winner { 1.0 } else { -1.0 },
        })
        .collect();

    debug!(
        %winner,
        actions = samples.len(),
        hits,
        extra_turns,
        sunk_positive = sunk[0],
        sunk_negative = sunk[1],
        "Episode finished\n{}",
        state.render(winner)
    );

    Ok(Episode {
        actions: samples.len() as u32,
        samples,
        winner,
        hits,
        extra_turns,
        sunk,
        search_stats,
    })
}
