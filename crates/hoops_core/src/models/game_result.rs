use serde::{Deserialize, Serialize};

use super::events::{AnimationEvent, Report};
use super::team::Team;

/// Complete result bundle of one simulated game: both output streams, the
/// final team states with all player stats, and the parameters a consumer
/// needs to interpret them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub events: Vec<AnimationEvent>,
    pub reports: Vec<Report>,
    pub teams: [Team; 2],
    pub overtimes: u32,
    pub num_players_on_court: usize,
    /// Frozen target score, present only when the elam ending activated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elam_target: Option<u32>,
    /// The millisecond timestamp that seeded this run. Differs from the
    /// requested timestamp when a forced-winner retry advanced the seed.
    pub start_timestamp: u64,
}

impl GameResult {
    pub fn score(&self) -> [u32; 2] {
        [self.teams[0].stat.pts, self.teams[1].stat.pts]
    }

    /// Winning side index, 0 for home. Ties cannot happen outside elam
    /// games, and elam games always finish with a leader.
    pub fn winner(&self) -> usize {
        if self.teams[0].stat.pts > self.teams[1].stat.pts {
            0
        } else {
            1
        }
    }
}
