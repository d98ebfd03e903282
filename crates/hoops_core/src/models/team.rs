use serde::{Deserialize, Serialize};

use super::player::{Player, PlayerData};
use super::ratings::{CompositeRating, ALL_COMPOSITE_KEYS};
use super::stats::GameStats;
use crate::engine::probability::{bound, sigmoid};

/// Roster input for one team, as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamData {
    pub id: u32,
    pub name: String,
    pub abbrev: String,
    /// Mean number of possessions this team likes to have in 48 minutes
    /// (100 is the league average).
    pub pace: f64,
    #[serde(default)]
    pub primary_color: String,
    #[serde(default)]
    pub secondary_color: String,
    pub players: Vec<PlayerData>,
}

/// Team-level skill synergy. Offense/defense/rebounding bonuses derived
/// from how many players clear skill thresholds at the same time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Synergy {
    pub off: f64,
    pub def: f64,
    pub reb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub abbrev: String,
    pub pace: f64,
    pub primary_color: String,
    pub secondary_color: String,
    pub players: Vec<Player>,
    pub stat: GameStats,
    pub synergy: Synergy,
    pub composite_rating: CompositeRating,
}

impl Team {
    pub fn new(data: TeamData, synergy_factor: f64) -> Self {
        let players: Vec<Player> = data.players.into_iter().map(Player::new).collect();
        let synergy = synergy_from_players(&players);
        let composite_rating = initial_composite(&players, &synergy, synergy_factor);

        Self {
            id: data.id,
            name: data.name,
            abbrev: data.abbrev,
            pace: data.pace,
            primary_color: data.primary_color,
            secondary_color: data.secondary_color,
            players,
            stat: GameStats::new(),
            synergy,
            composite_rating,
        }
    }

    /// Zero the team game state and re-derive the roster-wide figures, the
    /// same way construction does.
    pub fn reset(&mut self, synergy_factor: f64) {
        self.stat = GameStats::new();
        for player in &mut self.players {
            player.reset();
        }
        self.synergy = synergy_from_players(&self.players);
        self.composite_rating = initial_composite(&self.players, &self.synergy, synergy_factor);
    }

    pub fn validate(&self, num_players_on_court: usize) -> Result<(), String> {
        if self.players.is_empty() {
            return Err(format!("team {} has an empty roster", self.id));
        }
        if self.players.len() < num_players_on_court {
            return Err(format!(
                "team {} has {} players, needs at least {}",
                self.id,
                self.players.len(),
                num_players_on_court
            ));
        }
        if self.pace <= 0.0 {
            return Err(format!("team {} pace must be positive, got {}", self.id, self.pace));
        }
        Ok(())
    }
}

/// Fractional count of how strongly each player expresses the eight synergy
/// skills, then squashed into the three team bonuses. Shared by the
/// pre-game roster-wide figure and the in-game on-court recompute.
pub fn synergy_from_players<'a>(players: impl IntoIterator<Item = &'a Player>) -> Synergy {
    // Fractional skill counts, including duplicates. Cutoffs mirror the
    // skill-label cutoffs in the composite tables.
    let mut three = 0.0;
    let mut athleticism = 0.0;
    let mut ball_handling = 0.0;
    let mut interior_d = 0.0;
    let mut perimeter_d = 0.0;
    let mut post = 0.0;
    let mut passing = 0.0;
    let mut rebounding = 0.0;

    for p in players {
        let cr = &p.composite_rating;
        three += sigmoid(cr.shooting_three_pointer, 15.0, 0.59);
        athleticism += sigmoid(cr.athleticism, 15.0, 0.63);
        ball_handling += sigmoid(cr.dribbling, 15.0, 0.68);
        interior_d += sigmoid(cr.defense_interior, 15.0, 0.57);
        perimeter_d += sigmoid(cr.defense_perimeter, 15.0, 0.61);
        post += sigmoid(cr.shooting_low_post, 15.0, 0.61);
        passing += sigmoid(cr.passing, 15.0, 0.63);
        rebounding += sigmoid(cr.rebounding, 15.0, 0.61);
    }

    let mut synergy = Synergy::default();

    // Offense rewards shooting, handling and passing depth, with a hard
    // penalty for lineups missing perimeter skills entirely.
    synergy.off += 5.0 * sigmoid(three, 3.0, 2.0);
    synergy.off += 3.0 * sigmoid(ball_handling, 15.0, 0.75) + sigmoid(ball_handling, 5.0, 1.75);
    synergy.off += 3.0 * sigmoid(passing, 15.0, 0.75)
        + sigmoid(passing, 5.0, 1.75)
        + sigmoid(passing, 5.0, 2.75);
    synergy.off += sigmoid(post, 15.0, 0.75);
    synergy.off += sigmoid(athleticism, 15.0, 1.75) + sigmoid(athleticism, 5.0, 2.75);
    synergy.off /= 17.0;

    let perim_factor = bound((1.0 + ball_handling + passing + three).sqrt() - 1.0, 0.0, 2.0) / 2.0;
    synergy.off *= 0.5 + 0.5 * perim_factor;

    synergy.def += sigmoid(perimeter_d, 15.0, 0.75);
    synergy.def += 2.0 * sigmoid(interior_d, 15.0, 0.75);
    synergy.def += sigmoid(athleticism, 5.0, 2.0) + sigmoid(athleticism, 5.0, 3.25);
    synergy.def /= 6.0;

    synergy.reb += sigmoid(rebounding, 15.0, 0.75) + sigmoid(rebounding, 5.0, 1.75);
    synergy.reb /= 4.0;

    synergy
}

/// Roster-wide composite average plus the synergy bonuses. Display-only:
/// the in-game figure is recomputed per possession from the on-court five.
fn initial_composite(players: &[Player], synergy: &Synergy, synergy_factor: f64) -> CompositeRating {
    let mut composite = CompositeRating::default();
    if players.is_empty() {
        return composite;
    }

    for key in ALL_COMPOSITE_KEYS {
        let sum: f64 = players.iter().map(|p| p.composite_rating.get(key)).sum();
        composite.set(key, sum / players.len() as f64);
    }

    composite.dribbling += synergy_factor * synergy.off;
    composite.passing += synergy_factor * synergy.off;
    composite.rebounding += synergy_factor * synergy.reb;
    composite.defense += synergy_factor * synergy.def;
    composite.defense_perimeter += synergy_factor * synergy.def;
    composite.blocking += synergy_factor * synergy.def;

    composite
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ratings::Ratings;

    fn sample_team_data(id: u32, roster_size: usize, rating: u8) -> TeamData {
        TeamData {
            id,
            name: format!("Team {id}"),
            abbrev: format!("T{id}"),
            pace: 100.0,
            primary_color: "#aa3333".to_string(),
            secondary_color: "#222222".to_string(),
            players: (0..roster_size)
                .map(|i| PlayerData {
                    id: id * 100 + i as u32,
                    name: format!("Player {i}"),
                    age: 26,
                    ratings: Ratings::uniform(rating),
                    previously_injured: false,
                })
                .collect(),
        }
    }

    #[test]
    fn test_construction_derives_synergy_and_composite() {
        let team = Team::new(sample_team_data(1, 8, 50), 0.25);
        assert_eq!(team.players.len(), 8);
        assert!(team.synergy.off >= 0.0);
        // Averaged player composites stay in [0,1] before synergy; the
        // synergy-adjusted entries may exceed the unit interval.
        assert!(team.composite_rating.shooting_ft >= 0.0);
        assert!(team.composite_rating.shooting_ft <= 1.0);
    }

    #[test]
    fn test_reset_restores_fresh_state() {
        let mut team = Team::new(sample_team_data(1, 6, 50), 0.25);
        team.stat.pts = 99;
        team.stat.pts_qtrs = vec![20, 30, 25, 24];
        team.players[0].stat.pts = 40;

        team.reset(0.25);

        assert_eq!(team.stat.pts, 0);
        assert!(team.stat.pts_qtrs.is_empty());
        assert_eq!(team.players[0].stat.pts, 0);
    }

    #[test]
    fn test_validate_rejects_short_rosters() {
        let team = Team::new(sample_team_data(1, 3, 50), 0.25);
        assert!(team.validate(5).is_err());
        assert!(team.validate(3).is_ok());
    }

    #[test]
    fn test_loaded_roster_builds_more_synergy_than_scrubs() {
        let stars = Team::new(sample_team_data(1, 5, 90), 0.25);
        let scrubs = Team::new(sample_team_data(2, 5, 30), 0.25);
        assert!(stars.synergy.off > scrubs.synergy.off);
        assert!(stars.synergy.def > scrubs.synergy.def);
        assert!(stars.synergy.reb > scrubs.synergy.reb);
    }
}
