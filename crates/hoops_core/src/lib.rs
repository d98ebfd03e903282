//! # hoops_core - Deterministic Basketball Game Simulation Engine
//!
//! This library simulates a single basketball game, possession by
//! possession, from two roster descriptions and a random seed. It produces
//! both a machine-consumable sequence of timed animation events and a
//! human-readable play-by-play log, plus full box scores.
//!
//! ## Features
//! - 100% deterministic simulation (same seed + same inputs = same result)
//! - Rich rule set: quarters, overtime, the sudden-death elam ending,
//!   fouls and the bonus, fatigue, substitutions, injuries
//! - JSON API for easy integration with schedulers and web layers
//! - Fully instance-local state: independent games parallelize freely
//!
//! The core never persists anything, never renders, and never schedules;
//! it computes the outcome of one game given its inputs.

// Game engine APIs sometimes require many parameters for plan, seed, and
// rule-set plumbing.
#![allow(clippy::too_many_arguments)]

pub mod api;
pub mod engine;
pub mod error;
pub mod models;

// Re-export the main API functions.
pub use api::{
    simulate_batch, simulate_game, simulate_game_json, simulate_single, ForcedWinner, GameRequest,
    GameResponse,
};
pub use engine::{GameConfig, GameConfigOverride, GamePlan, GameRng, GameSim};
pub use error::{GameError, Result};
pub use models::{
    AnimationEvent, EventKind, GameResult, GameStats, Player, PlayerData, Position, Ratings,
    Report, Team, TeamData,
};

// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamSide;
    use serde_json::json;
    use sha2::{Digest, Sha256};

    fn team_data(id: u32, rating: u8, roster_size: u32) -> TeamData {
        TeamData {
            id,
            name: format!("Team {id}"),
            abbrev: format!("T{id}"),
            pace: 100.0,
            primary_color: "#c8102e".to_string(),
            secondary_color: "#1d428a".to_string(),
            players: (0..roster_size)
                .map(|i| PlayerData {
                    id: id * 100 + i,
                    name: format!("Player {id}-{i}"),
                    age: 22 + (i % 12),
                    ratings: Ratings::uniform(rating),
                    previously_injured: false,
                })
                .collect(),
        }
    }

    fn run_default(home_rating: u8, away_rating: u8, timestamp: u64) -> GameResult {
        run_with(home_rating, away_rating, timestamp, GameConfigOverride::default())
    }

    fn run_with(
        home_rating: u8,
        away_rating: u8,
        timestamp: u64,
        options: GameConfigOverride,
    ) -> GameResult {
        let config = GameConfig::from_override(&options).unwrap();
        simulate_single(
            team_data(0, home_rating, 8),
            team_data(1, away_rating, 8),
            config,
            false,
            timestamp,
            None,
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_basic_simulation() {
        let request = json!({
            "schemaVersion": 1,
            "timestamp": 1_700_000_000_000u64,
            "homeTeam": serde_json::to_value(team_data(0, 55, 8)).unwrap(),
            "awayTeam": serde_json::to_value(team_data(1, 50, 8)).unwrap(),
        });

        let result = simulate_game_json(&request.to_string());
        assert!(result.is_ok(), "simulation should succeed: {:?}", result.err());

        let parsed: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();
        assert_eq!(parsed["schemaVersion"], 1);
        assert!(parsed["scoreHome"].is_number());
        assert!(parsed["scoreAway"].is_number());
    }

    #[test]
    fn test_determinism() {
        let request = json!({
            "schemaVersion": 1,
            "timestamp": 999_000u64,
            "homeTeam": serde_json::to_value(team_data(0, 60, 8)).unwrap(),
            "awayTeam": serde_json::to_value(team_data(1, 58, 8)).unwrap(),
        })
        .to_string();

        let result1 = simulate_game_json(&request).unwrap();
        let result2 = simulate_game_json(&request).unwrap();
        assert_eq!(result1, result2, "same seed should produce same result");
    }

    #[test]
    fn test_determinism_sha256() {
        let options = GameConfigOverride {
            allow_fouls: Some(true),
            allow_substitutions: Some(true),
            use_injuries: Some(true),
            base_injury_rate: Some(0.002),
            ..Default::default()
        };

        fn sha256_hex(bytes: &[u8]) -> String {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            let digest = hasher.finalize();
            let mut out = String::with_capacity(digest.len() * 2);
            for b in digest {
                out.push_str(&format!("{:02x}", b));
            }
            out
        }

        let run = || {
            let result = run_with(63, 61, 123_456, options.clone());
            serde_json::to_string(&result).unwrap()
        };

        let h1 = sha256_hex(run().as_bytes());
        let h2 = sha256_hex(run().as_bytes());
        assert_eq!(h1, h2, "same seed should produce identical bundle sha256");
    }

    #[test]
    fn test_score_consistency() {
        for seed in 0..5u64 {
            let result = run_default(65, 60, seed * 7_919);

            for team in &result.teams {
                let player_pts: u32 = team.players.iter().map(|p| p.stat.pts).sum();
                assert_eq!(team.stat.pts, player_pts, "team points != player points");

                let quarter_pts: u32 = team.stat.pts_qtrs.iter().sum();
                assert_eq!(team.stat.pts, quarter_pts, "team points != quarter points");

                assert_eq!(
                    team.stat.pts_qtrs.len(),
                    (4 + result.overtimes) as usize,
                    "one quarter entry per period played"
                );
            }
        }
    }

    #[test]
    fn test_non_elam_games_never_tie() {
        for seed in 0..10u64 {
            let result = run_default(50, 50, 1_600_000_000_000 + seed);
            assert_ne!(result.teams[0].stat.pts, result.teams[1].stat.pts);
        }
    }

    #[test]
    fn test_uniform_rosters_seed_zero_scenario() {
        // Two five-player rosters, every raw rating 50, defaults, seed 0.
        let config = GameConfig::default();
        let result = simulate_single(
            team_data(0, 50, 5),
            team_data(1, 50, 5),
            config,
            false,
            0,
            None,
            0,
        )
        .unwrap();

        // Four quarters minimum, more when tied at the end of regulation.
        assert!(result.teams[0].stat.pts_qtrs.len() >= 4);
        assert_eq!(result.teams[0].stat.pts_qtrs.len(), result.teams[1].stat.pts_qtrs.len());

        let first = result.reports.first().expect("reports not empty");
        assert_eq!(first.kind, EventKind::QuarterStart);
        let last = result.reports.last().expect("reports not empty");
        assert_eq!(last.kind, EventKind::GameOver);
    }

    #[test]
    fn test_elam_ending_scenario() {
        let options = GameConfigOverride {
            elam: Some(true),
            elam_minutes: Some(4.0),
            elam_points: Some(9),
            ..Default::default()
        };
        let result = run_with(55, 52, 42, options);

        let target = result.elam_target.expect("elam target must be set");

        // The target froze at leading score + 9 when the ending activated.
        let activations: Vec<&Report> = result
            .reports
            .iter()
            .filter(|r| r.kind == EventKind::ElamActive)
            .collect();
        assert_eq!(activations.len(), 1);
        let at_activation = activations[0];
        assert_eq!(target, at_activation.score.iter().max().unwrap() + 9);

        // First to the target wins, the instant they reach it; the final
        // margin past the target is at most the scoring play's value.
        let score = result.score();
        let winner = score[result.winner()];
        let loser = score[1 - result.winner()];
        assert!(winner >= target);
        assert!(winner - target <= 3, "score ran past the target: {winner} vs {target}");
        assert!(loser < target);
        assert_eq!(result.overtimes, 0);

        let last_kinds: Vec<EventKind> =
            result.reports.iter().rev().take(2).map(|r| r.kind).collect();
        assert_eq!(last_kinds, vec![EventKind::GameOver, EventKind::ElamDone]);
    }

    #[test]
    fn test_fouls_disabled_scenario() {
        // allowFouls is off by default; no foul-flavored event may appear.
        let result = run_default(60, 60, 77);
        for report in &result.reports {
            assert!(!report.kind.is_foul(), "unexpected foul event {:?}", report.kind);
        }
        for team in &result.teams {
            assert_eq!(team.stat.pf, 0);
            assert_eq!(team.stat.fta, 0);
        }
    }

    #[test]
    fn test_fouls_enabled_produce_foul_events() {
        let options = GameConfigOverride {
            allow_fouls: Some(true),
            allow_substitutions: Some(true),
            ..Default::default()
        };
        let result = run_with(60, 60, 31_337, options);

        assert!(result.reports.iter().any(|r| r.kind.is_foul()));
        let total_pf = result.teams[0].stat.pf + result.teams[1].stat.pf;
        assert!(total_pf > 0);
    }

    #[test]
    fn test_on_court_legality() {
        let options = GameConfigOverride {
            allow_fouls: Some(true),
            allow_substitutions: Some(true),
            use_injuries: Some(true),
            base_injury_rate: Some(0.001),
            ..Default::default()
        };
        let result = run_with(58, 57, 8_675_309, options);

        for event in &result.events {
            for side in 0..2 {
                let on_court = &event.players_on_court[side];
                assert_eq!(on_court.len(), result.num_players_on_court);

                let mut distinct = on_court.clone();
                distinct.sort_unstable();
                distinct.dedup();
                assert_eq!(distinct.len(), result.num_players_on_court, "duplicate on court");

                for &index in on_court {
                    assert!(index < result.teams[side].players.len());
                }
            }
        }
    }

    #[test]
    fn test_realistic_output_across_seeds() {
        let mut total_points = 0u32;
        let num_games = 10;

        for seed in 0..num_games {
            let result = run_default(75, 75, 1_650_000_000_000 + seed * 1_000);
            let [home, away] = result.score();

            println!(
                "game {}: {} {} - {} {}",
                seed + 1,
                result.teams[0].name,
                home,
                result.teams[1].name,
                away
            );

            assert!((40..=250).contains(&home), "home score unrealistic: {home}");
            assert!((40..=250).contains(&away), "away score unrealistic: {away}");
            total_points += home + away;

            // Attempt counts stay consistent with makes.
            for team in &result.teams {
                assert!(team.stat.fg <= team.stat.fga);
                assert!(team.stat.tp <= team.stat.tpa);
                assert!(team.stat.ft <= team.stat.fta);
            }
        }

        let avg_total = total_points as f64 / num_games as f64;
        println!("average combined score: {avg_total:.1}");
        assert!((120.0..=420.0).contains(&avg_total), "combined scoring unrealistic: {avg_total}");
    }

    #[test]
    fn test_reports_reference_their_animations() {
        let result = run_default(55, 54, 11);

        for report in &result.reports {
            if report.kind.is_text_only() {
                assert!(report.animation.is_none());
            } else {
                let index = report.animation.expect("renderable kinds carry an animation");
                assert_eq!(result.events[index].kind, report.kind);
            }
        }

        // Scoring plays show the running score in the text.
        assert!(result
            .reports
            .iter()
            .filter(|r| r.kind.shows_score())
            .all(|r| r.text.contains('(') && r.text.contains('-')));
    }

    #[test]
    fn test_home_court_advantage_scales_composites() {
        let config = GameConfig::from_override(&GameConfigOverride {
            home_court_advantage: Some(10.0),
            ..Default::default()
        })
        .unwrap();

        let home = models::Team::new(team_data(0, 50, 8), config.synergy_factor);
        let away = models::Team::new(team_data(1, 50, 8), config.synergy_factor);
        let baseline = home.players[0].composite_rating;

        let sim = GameSim::new(GamePlan {
            teams: [home, away],
            exhibition: false,
            timestamp: 5,
            config,
        })
        .unwrap();

        let result = sim.run();
        let boosted = &result.teams[0].players[0];
        let penalized = &result.teams[1].players[0];

        assert!(boosted.composite_rating.dribbling > baseline.dribbling);
        assert!(penalized.composite_rating.dribbling < baseline.dribbling);
        // Negative ratings scale the other way.
        assert!(boosted.composite_rating.turnovers < baseline.turnovers);
        assert!(penalized.composite_rating.turnovers > baseline.turnovers);
        // Endurance is exempt.
        assert_eq!(boosted.composite_rating.endurance, baseline.endurance);
    }

    #[test]
    fn test_jump_ball_report_opens_possession_tracking() {
        let result = run_default(50, 50, 99);
        let jump = result
            .reports
            .iter()
            .find(|r| r.kind == EventKind::JumpBall)
            .expect("regulation opens with a jump ball");
        assert!(matches!(jump.team, TeamSide::Home | TeamSide::Away));
        assert!(jump.text.contains("won the jump ball"));
    }

    #[test]
    fn test_roster_too_small_is_rejected() {
        let config = GameConfig::default();
        let err = simulate_single(
            team_data(0, 50, 3),
            team_data(1, 50, 8),
            config,
            false,
            0,
            None,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, GameError::InvalidRoster(_)));
    }
}
