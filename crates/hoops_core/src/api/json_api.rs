//! JSON API surface.
//!
//! External collaborators (league extractors, bracket/season schedulers, a
//! web layer) talk to the core through these request/response types. The
//! core itself never touches storage; it computes one game from two rosters
//! and a seed and hands the bundle back.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::{GameConfig, GameConfigOverride, GamePlan, GameSim};
use crate::error::{GameError, Result};
use crate::models::{GameResult, Team, TeamData};
use crate::SCHEMA_VERSION;

/// Cap for the forced-winner retry loop; exhausting it is an error rather
/// than an unbounded spin on a pathological matchup.
pub const DEFAULT_MAX_FORCED_RETRIES: u32 = 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForcedWinner {
    Home,
    Away,
}

impl ForcedWinner {
    fn satisfied_by(self, home_won: bool) -> bool {
        match self {
            ForcedWinner::Home => home_won,
            ForcedWinner::Away => !home_won,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRequest {
    pub schema_version: u8,
    /// Millisecond timestamp; seeds the RNG and stamps the result.
    pub timestamp: u64,
    pub home_team: TeamData,
    pub away_team: TeamData,
    #[serde(default)]
    pub options: GameConfigOverride,
    #[serde(default)]
    pub exhibition: bool,
    /// Re-run with incrementing seeds until this side wins.
    #[serde(default)]
    pub forced_winner: Option<ForcedWinner>,
    #[serde(default)]
    pub max_forced_retries: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub schema_version: u8,
    /// The seed that actually produced this result (differs from the
    /// request timestamp after forced-winner retries).
    pub seed: u64,
    pub score_home: u32,
    pub score_away: u32,
    #[serde(flatten)]
    pub result: GameResult,
}

/// Simulate one game from a JSON request, returning the JSON response.
pub fn simulate_game_json(request: &str) -> Result<String> {
    let request: GameRequest = serde_json::from_str(request)?;
    let response = simulate_game(request)?;
    Ok(serde_json::to_string(&response)?)
}

pub fn simulate_game(request: GameRequest) -> Result<GameResponse> {
    if request.schema_version != SCHEMA_VERSION {
        return Err(GameError::InvalidSchemaVersion {
            found: request.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let config = GameConfig::from_override(&request.options)?;
    let max_retries =
        request.max_forced_retries.unwrap_or(DEFAULT_MAX_FORCED_RETRIES);

    let result = simulate_single(
        request.home_team,
        request.away_team,
        config,
        request.exhibition,
        request.timestamp,
        request.forced_winner,
        max_retries,
    )?;

    Ok(GameResponse {
        schema_version: SCHEMA_VERSION,
        seed: result.start_timestamp,
        score_home: result.teams[0].stat.pts,
        score_away: result.teams[1].stat.pts,
        result,
    })
}

/// Simulate a single game, optionally forcing the winner.
///
/// The forced-winner loop resets both teams, bumps the seed by one
/// millisecond and re-runs until the desired side wins. Each retry is an
/// independent deterministic run; the cap turns a pathological matchup
/// into a reportable error instead of an endless spin.
pub fn simulate_single(
    home: TeamData,
    away: TeamData,
    config: GameConfig,
    exhibition: bool,
    timestamp: u64,
    forced_winner: Option<ForcedWinner>,
    max_retries: u32,
) -> Result<GameResult> {
    let mut home = Team::new(home, config.synergy_factor);
    let mut away = Team::new(away, config.synergy_factor);
    let mut timestamp = timestamp;

    for attempt in 0..=max_retries {
        let sim = GameSim::new(GamePlan {
            teams: [home, away],
            exhibition,
            timestamp,
            config: config.clone(),
        })?;
        let result = sim.run();

        let home_won = result.teams[0].stat.pts > result.teams[1].stat.pts;
        match forced_winner {
            None => return Ok(result),
            Some(forced) if forced.satisfied_by(home_won) => return Ok(result),
            Some(_) => {}
        }

        log::debug!(
            "forced winner retry {}: {} - {}",
            attempt + 1,
            result.teams[0].stat.pts,
            result.teams[1].stat.pts
        );

        // Take the teams back, wipe the game state, nudge the seed.
        let [h, a] = result.teams;
        home = h;
        away = a;
        home.reset(config.synergy_factor);
        away.reset(config.synergy_factor);
        timestamp += 1;
    }

    log::warn!("forced winner not reached after {max_retries} retries");
    Err(GameError::ForcedWinnerExhausted { retries: max_retries })
}

/// Simulate many independent games in parallel. Every simulation owns its
/// full state, so this is a plain data-parallel map.
pub fn simulate_batch(requests: Vec<GameRequest>) -> Vec<Result<GameResponse>> {
    requests.into_par_iter().map(simulate_game).collect()
}
