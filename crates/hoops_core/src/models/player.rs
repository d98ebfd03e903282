use serde::{Deserialize, Serialize};

use super::position::{calculate_position, Position};
use super::ratings::{calculate_overall, compute_composites, CompositeRating, Ratings, Skill};
use super::stats::GameStats;

/// Roster input for one player, as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerData {
    pub id: u32,
    pub name: String,
    /// Only consulted by the injury model.
    pub age: u32,
    pub ratings: Ratings,
    #[serde(default)]
    pub previously_injured: bool,
}

/// One player for the duration of a game. Owned exclusively by its team;
/// derived state (composites, skills) is cached at construction and redone
/// by `reset` between repeated simulations of the same matchup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub age: u32,
    pub ratings: Ratings,
    pub composite_rating: CompositeRating,
    pub skills: Vec<Skill>,
    pub stat: GameStats,
    pub injured: bool,
    pub previously_injured: bool,
}

impl Player {
    pub fn new(data: PlayerData) -> Self {
        let (composite_rating, skills) = compute_composites(&data.ratings);
        Self {
            id: data.id,
            name: data.name,
            age: data.age,
            ratings: data.ratings,
            composite_rating,
            skills,
            stat: GameStats::new(),
            injured: false,
            previously_injured: data.previously_injured,
        }
    }

    /// Zero the game state and recompute derived ratings (home-court
    /// scaling from a previous run is discarded along with the stats).
    pub fn reset(&mut self) {
        let (composite_rating, skills) = compute_composites(&self.ratings);
        self.composite_rating = composite_rating;
        self.skills = skills;
        self.stat = GameStats::new();
        self.injured = false;
    }

    pub fn ovr(&self) -> u8 {
        calculate_overall(&self.ratings)
    }

    pub fn position(&self) -> Position {
        calculate_position(&self.ratings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_player() -> Player {
        Player::new(PlayerData {
            id: 7,
            name: "Test Player".to_string(),
            age: 26,
            ratings: Ratings::uniform(50),
            previously_injured: false,
        })
    }

    #[test]
    fn test_composites_cached_at_construction() {
        let player = sample_player();
        assert!((player.composite_rating.shooting_ft - 0.5).abs() < 1e-12);
        assert_eq!(player.stat.pts, 0);
        assert!(!player.injured);
    }

    #[test]
    fn test_reset_clears_game_state_and_rederives() {
        let mut player = sample_player();
        player.stat.pts = 30;
        player.stat.energy = 0.2;
        player.injured = true;
        // Simulate home-court scaling having touched the cached composites.
        player.composite_rating.dribbling *= 1.05;

        player.reset();

        assert_eq!(player.stat.pts, 0);
        assert_eq!(player.stat.energy, 1.0);
        assert!(!player.injured);
        assert!((player.composite_rating.dribbling - 0.5).abs() < 1e-12);
    }
}
