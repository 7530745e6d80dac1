//! Head-to-head evaluation between policies.
//!
//! Matches use the same turn rule as self-play: a hit lets the shooter fire
//! again. There are no draws, so every match has a winner.

use anyhow::{anyhow, Result};
use games_battleship::{Battleship, Polarity};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::policy::{Policy, RandomPolicy};
use crate::self_play::max_actions;

/// Outcome of one match. `first` played +1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub winner: Polarity,
    pub actions: u32,
}

/// Play one game, `first` moving first as +1 and `second` as -1.
pub fn play_match(
    game: &Battleship,
    first: &mut dyn Policy,
    second: &mut dyn Policy,
    rng: &mut ChaCha20Rng,
) -> Result<MatchResult> {
    let deployment = game.initialize(rng, Polarity::Positive)?;
    let mut state = deployment.state;
    let mut acting = Polarity::Positive;
    let limit = max_actions(game);

    for actions in 1..=limit {
        let neutral = game.flip_perspective(state.clone(), acting);
        let action = match acting {
            Polarity::Positive => first.select_action(game, &neutral)?,
            Polarity::Negative => second.select_action(game, &neutral)?,
        };
        let shot = game.apply_action(&mut state, action, acting)?;

        if let Some(winner) = game.winner(&state) {
            return Ok(MatchResult { winner, actions });
        }
        if !shot.extra_turn() {
            acting = acting.opponent();
        }
    }

    Err(anyhow!("Match exceeded {} actions without a winner", limit))
}

/// Aggregate results of an arena run, from the candidate's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaReport {
    pub candidate: String,
    pub opponent: String,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub avg_length: f64,
}

/// Play `games` matches, alternating which side moves first.
pub fn run_arena(
    game: &Battleship,
    candidate: &mut dyn Policy,
    opponent: &mut dyn Policy,
    games: u32,
    rng: &mut ChaCha20Rng,
) -> Result<ArenaReport> {
    if games == 0 {
        return Err(anyhow!("Arena needs at least one game"));
    }

    let mut wins = 0u32;
    let mut total_actions = 0u64;

    for index in 0..games {
        let candidate_first = index % 2 == 0;
        let result = if candidate_first {
            play_match(game, candidate, opponent, rng)?
        } else {
            play_match(game, opponent, candidate, rng)?
        };

        let candidate_side = if candidate_first {
            Polarity::Positive
        } else {
            Polarity::Negative
        };
        let won = result.winner == candidate_side;
        if won {
            wins += 1;
        }
        total_actions += result.actions as u64;
        debug!(game = index, candidate_first, won, actions = result.actions, "Arena game");
    }

    let report = ArenaReport {
        candidate: candidate.name().to_string(),
        opponent: opponent.name().to_string(),
        games,
        wins,
        losses: games - wins,
        win_rate: wins as f64 / games as f64,
        avg_length: total_actions as f64 / games as f64,
    };
    info!(
        candidate = %report.candidate,
        opponent = %report.opponent,
        games,
        wins,
        losses = report.losses,
        win_rate = format!("{:.3}", report.win_rate),
        avg_length = format!("{:.2}", report.avg_length),
        "Arena finished"
    );
    Ok(report)
}

/// Random vs random statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineReport {
    pub games: u32,
    pub first_player_wins: u32,
    pub avg_length: f64,
}

/// Play `games` random-vs-random matches and report the average length.
pub fn run_random_baseline(game: &Battleship, games: u32, seed: u64) -> Result<BaselineReport> {
    use rand::SeedableRng;

    if games == 0 {
        return Err(anyhow!("Baseline needs at least one game"));
    }

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut first = RandomPolicy::with_seed(seed.wrapping_add(1));
    let mut second = RandomPolicy::with_seed(seed.wrapping_add(2));

    let mut first_player_wins = 0u32;
    let mut total_actions = 0u64;
    for _ in 0..games {
        let result = play_match(game, &mut first, &mut second, &mut rng)?;
        if result.winner == Polarity::Positive {
            first_player_wins += 1;
        }
        total_actions += result.actions as u64;
    }

    let report = BaselineReport {
        games,
        first_player_wins,
        avg_length: total_actions as f64 / games as f64,
    };
    info!(
        games,
        first_player_wins,
        avg_length = format!("{:.2}", report.avg_length),
        "Random baseline finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::MctsPolicy;
    use games_battleship::{BoardConfig, BoardState};
    use mcts::{MctsConfig, UniformEvaluator};
    use rand::SeedableRng;

    fn game(size: usize, ships: Vec<usize>) -> Battleship {
        Battleship::new(BoardConfig::new(size, ships)).unwrap()
    }

    /// Fires at cells in row-major order.
    struct Sweep;

    impl Policy for Sweep {
        fn select_action(&mut self, game: &Battleship, state: &BoardState) -> Result<usize> {
            game.legal_actions(state, Polarity::Positive)
                .first()
                .copied()
                .ok_or_else(|| anyhow!("board exhausted"))
        }

        fn name(&self) -> &str {
            "sweep"
        }
    }

    #[test]
    fn test_play_match_has_a_winner_within_bounds() {
        let game = game(5, vec![3, 2]);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut a = RandomPolicy::with_seed(2);
        let mut b = RandomPolicy::with_seed(3);

        let result = play_match(&game, &mut a, &mut b, &mut rng).unwrap();
        assert!(result.actions >= 5);
        assert!(result.actions < max_actions(&game));
    }

    #[test]
    fn test_play_match_accepts_custom_policies() {
        let game = game(4, vec![2]);
        for seed in 0..5 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let result = play_match(&game, &mut Sweep, &mut Sweep, &mut rng).unwrap();
            assert!(result.actions <= max_actions(&game));
        }
    }

    #[test]
    fn test_run_arena_counts_every_game() {
        let game = game(4, vec![2]);
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut candidate = RandomPolicy::with_seed(10);
        let mut opponent = RandomPolicy::with_seed(11);

        let report = run_arena(&game, &mut candidate, &mut opponent, 6, &mut rng).unwrap();
        assert_eq!(report.games, 6);
        assert_eq!(report.wins + report.losses, 6);
        assert!((report.win_rate - report.wins as f64 / 6.0).abs() < 1e-9);
        assert!(report.avg_length >= 2.0);
        assert_eq!(report.candidate, "random");
    }

    #[test]
    fn test_mcts_candidate_completes_arena() {
        let game = game(4, vec![2]);
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let config = MctsConfig::for_evaluation().with_simulations(64);
        let mut candidate = MctsPolicy::new(UniformEvaluator::new(), config, 4);
        let mut opponent = RandomPolicy::with_seed(8);

        let report = run_arena(&game, &mut candidate, &mut opponent, 10, &mut rng).unwrap();
        assert_eq!(report.wins + report.losses, 10);
        assert_eq!(report.opponent, "random");
    }

    #[test]
    fn test_run_arena_rejects_zero_games() {
        let game = game(4, vec![2]);
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let mut a = RandomPolicy::with_seed(0);
        let mut b = RandomPolicy::with_seed(1);
        assert!(run_arena(&game, &mut a, &mut b, 0, &mut rng).is_err());
    }

    #[test]
    fn test_random_baseline_is_reproducible() {
        let game = game(5, vec![3, 2]);
        let a = run_random_baseline(&game, 20, 77).unwrap();
        let b = run_random_baseline(&game, 20, 77).unwrap();

        assert_eq!(a, b);
        assert!(a.first_player_wins <= 20);
        assert!(a.avg_length >= 5.0 && a.avg_length < 50.0);
    }
}
