use serde::{Deserialize, Serialize};

use super::ratings::Ratings;

/// Canonical positions plus the four hybrids between them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Position {
    #[serde(rename = "PG")]
    PointGuard,
    #[serde(rename = "G")]
    Guard,
    #[serde(rename = "SG")]
    ShootingGuard,
    #[serde(rename = "GF")]
    GuardForward,
    #[serde(rename = "SF")]
    SmallForward,
    #[serde(rename = "F")]
    Forward,
    #[serde(rename = "PF")]
    PowerForward,
    #[serde(rename = "FC")]
    ForwardCenter,
    #[serde(rename = "C")]
    Center,
}

impl Position {
    pub fn code(&self) -> &'static str {
        match self {
            Position::PointGuard => "PG",
            Position::Guard => "G",
            Position::ShootingGuard => "SG",
            Position::GuardForward => "GF",
            Position::SmallForward => "SF",
            Position::Forward => "F",
            Position::PowerForward => "PF",
            Position::ForwardCenter => "FC",
            Position::Center => "C",
        }
    }

    /// Scalar position value on the PG(0) .. C(4) axis.
    pub fn value(&self) -> f64 {
        match self {
            Position::PointGuard => 0.0,
            Position::Guard => 0.5,
            Position::ShootingGuard => 1.0,
            Position::GuardForward => 1.5,
            Position::SmallForward => 2.0,
            Position::Forward => 2.5,
            Position::PowerForward => 3.0,
            Position::ForwardCenter => 3.5,
            Position::Center => 4.0,
        }
    }

    /// Counts toward the guard quota in lineup legality checks.
    pub fn is_guard(&self) -> bool {
        matches!(
            self,
            Position::PointGuard
                | Position::Guard
                | Position::ShootingGuard
                | Position::GuardForward
        )
    }

    /// Counts toward the forward/center quota in lineup legality checks.
    pub fn is_forward(&self) -> bool {
        matches!(
            self,
            Position::GuardForward
                | Position::SmallForward
                | Position::Forward
                | Position::PowerForward
                | Position::ForwardCenter
        )
    }
}

const ALL_POSITIONS: [Position; 9] = [
    Position::PointGuard,
    Position::Guard,
    Position::ShootingGuard,
    Position::GuardForward,
    Position::SmallForward,
    Position::Forward,
    Position::PowerForward,
    Position::ForwardCenter,
    Position::Center,
];

/// Pick the position whose scalar value is closest to a fixed linear
/// discriminant over the raw ratings. Height and passing dominate the
/// discriminant, pulling players toward C and PG respectively.
pub fn calculate_position(ratings: &Ratings) -> Position {
    let value = -0.922949
        + 0.073339 * ratings.height as f64
        + 0.009744 * ratings.strength as f64
        + -0.002215 * ratings.speed as f64
        + -0.005438 * ratings.jump as f64
        + 0.003006 * ratings.endurance as f64
        + -0.003516 * ratings.inside_scoring as f64
        + -0.008239 * ratings.dunking as f64
        + 0.001647 * ratings.free_throw as f64
        + -0.001404 * ratings.mid_range as f64
        + -0.004599 * ratings.three_point as f64
        + 0.001407 * ratings.defensive_iq as f64
        + 0.002433 * ratings.offensive_iq as f64
        + -0.000753 * ratings.dribbling as f64
        + -0.021888 * ratings.passing as f64
        + 0.016867 * ratings.rebounding as f64;

    let mut best = Position::Forward;
    let mut best_diff = f64::INFINITY;
    for pos in ALL_POSITIONS {
        let diff = (value - pos.value()).abs();
        if diff < best_diff {
            best_diff = diff;
            best = pos;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tall_rebounder_is_a_center() {
        let mut ratings = Ratings::uniform(50);
        ratings.height = 100;
        ratings.rebounding = 95;
        ratings.strength = 90;
        ratings.passing = 20;
        let pos = calculate_position(&ratings);
        assert!(matches!(pos, Position::Center | Position::ForwardCenter), "got {pos:?}");
    }

    #[test]
    fn test_short_passer_is_a_point_guard() {
        let mut ratings = Ratings::uniform(50);
        ratings.height = 5;
        ratings.passing = 95;
        ratings.dribbling = 90;
        ratings.speed = 90;
        assert_eq!(calculate_position(&ratings), Position::PointGuard);
    }

    #[test]
    fn test_uniform_ratings_land_midcourt() {
        // Uniform 50s give a discriminant around 1.63, nearest GF.
        let pos = calculate_position(&Ratings::uniform(50));
        assert!(pos.is_guard() || pos.is_forward());
    }

    #[test]
    fn test_quota_flags() {
        assert!(Position::PointGuard.is_guard());
        assert!(!Position::PointGuard.is_forward());
        assert!(Position::GuardForward.is_guard());
        assert!(Position::GuardForward.is_forward());
        assert!(!Position::Center.is_forward());
        assert!(Position::PowerForward.is_forward());
    }
}
