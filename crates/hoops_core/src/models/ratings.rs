//! Raw player ratings and the derived composite ratings used by the
//! possession resolver.
//!
//! Raw ratings are 0-100 integers and never change during a game. Composite
//! ratings are weighted linear combinations of raw ratings (plus an optional
//! constant baseline component), normalized to [0,1]. A composite crossing
//! its cutoff attaches a skill label to the player.

use serde::{Deserialize, Serialize};

/// Raw ratings, 0-100. Immutable for the duration of a game.
///
/// Height is meant to also reflect standing reach and wingspan: for a
/// realistic professional league, take the player's height in inches,
/// subtract 66 and multiply by 3.70, so 0 is 5'6" and 100 is 7'9".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ratings {
    #[serde(default = "default_50")]
    pub height: u8,
    #[serde(default = "default_50")]
    pub strength: u8,
    #[serde(default = "default_50")]
    pub speed: u8,
    #[serde(default = "default_50")]
    pub jump: u8,
    #[serde(default = "default_50")]
    pub endurance: u8,
    #[serde(default = "default_50")]
    pub inside_scoring: u8,
    #[serde(default = "default_50")]
    pub dunking: u8,
    #[serde(default = "default_50")]
    pub free_throw: u8,
    #[serde(default = "default_50")]
    pub mid_range: u8,
    #[serde(default = "default_50")]
    pub three_point: u8,
    #[serde(default = "default_50")]
    pub offensive_iq: u8,
    #[serde(default = "default_50")]
    pub defensive_iq: u8,
    #[serde(default = "default_50")]
    pub dribbling: u8,
    #[serde(default = "default_50")]
    pub passing: u8,
    #[serde(default = "default_50")]
    pub rebounding: u8,
    #[serde(default = "default_50")]
    pub jump_ball: u8,
}

fn default_50() -> u8 {
    50
}

impl Ratings {
    /// Uniform ratings, useful for tests and placeholder rosters.
    pub fn uniform(value: u8) -> Self {
        Self {
            height: value,
            strength: value,
            speed: value,
            jump: value,
            endurance: value,
            inside_scoring: value,
            dunking: value,
            free_throw: value,
            mid_range: value,
            three_point: value,
            offensive_iq: value,
            defensive_iq: value,
            dribbling: value,
            passing: value,
            rebounding: value,
            jump_ball: value,
        }
    }

    pub fn get(&self, key: RatingKey) -> f64 {
        let v = match key {
            RatingKey::Height => self.height,
            RatingKey::Strength => self.strength,
            RatingKey::Speed => self.speed,
            RatingKey::Jump => self.jump,
            RatingKey::Endurance => self.endurance,
            RatingKey::InsideScoring => self.inside_scoring,
            RatingKey::Dunking => self.dunking,
            RatingKey::FreeThrow => self.free_throw,
            RatingKey::MidRange => self.mid_range,
            RatingKey::ThreePoint => self.three_point,
            RatingKey::OffensiveIq => self.offensive_iq,
            RatingKey::DefensiveIq => self.defensive_iq,
            RatingKey::Dribbling => self.dribbling,
            RatingKey::Passing => self.passing,
            RatingKey::Rebounding => self.rebounding,
            RatingKey::JumpBall => self.jump_ball,
        };
        v as f64
    }
}

impl Default for Ratings {
    fn default() -> Self {
        Self::uniform(50)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingKey {
    Height,
    Strength,
    Speed,
    Jump,
    Endurance,
    InsideScoring,
    Dunking,
    FreeThrow,
    MidRange,
    ThreePoint,
    OffensiveIq,
    DefensiveIq,
    Dribbling,
    Passing,
    Rebounding,
    JumpBall,
}

/// Derived per-player metrics in [0,1], consumed directly by the
/// probability formulas in the possession resolver.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompositeRating {
    pub pace: f64,
    pub usage: f64,
    pub dribbling: f64,
    pub passing: f64,
    pub turnovers: f64,
    pub shooting_at_rim: f64,
    pub shooting_low_post: f64,
    pub shooting_mid_range: f64,
    pub shooting_three_pointer: f64,
    pub shooting_ft: f64,
    pub rebounding: f64,
    pub stealing: f64,
    pub blocking: f64,
    pub fouling: f64,
    pub drawing_fouls: f64,
    pub defense: f64,
    pub defense_interior: f64,
    pub defense_perimeter: f64,
    pub endurance: f64,
    pub athleticism: f64,
    pub jump_ball: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum CompositeKey {
    Pace,
    Usage,
    Dribbling,
    Passing,
    Turnovers,
    ShootingAtRim,
    ShootingLowPost,
    ShootingMidRange,
    ShootingThreePointer,
    ShootingFt,
    Rebounding,
    Stealing,
    Blocking,
    Fouling,
    DrawingFouls,
    Defense,
    DefenseInterior,
    DefensePerimeter,
    Endurance,
    Athleticism,
    JumpBall,
}

pub const ALL_COMPOSITE_KEYS: [CompositeKey; 21] = [
    CompositeKey::Pace,
    CompositeKey::Usage,
    CompositeKey::Dribbling,
    CompositeKey::Passing,
    CompositeKey::Turnovers,
    CompositeKey::ShootingAtRim,
    CompositeKey::ShootingLowPost,
    CompositeKey::ShootingMidRange,
    CompositeKey::ShootingThreePointer,
    CompositeKey::ShootingFt,
    CompositeKey::Rebounding,
    CompositeKey::Stealing,
    CompositeKey::Blocking,
    CompositeKey::Fouling,
    CompositeKey::DrawingFouls,
    CompositeKey::Defense,
    CompositeKey::DefenseInterior,
    CompositeKey::DefensePerimeter,
    CompositeKey::Endurance,
    CompositeKey::Athleticism,
    CompositeKey::JumpBall,
];

impl CompositeRating {
    pub fn get(&self, key: CompositeKey) -> f64 {
        match key {
            CompositeKey::Pace => self.pace,
            CompositeKey::Usage => self.usage,
            CompositeKey::Dribbling => self.dribbling,
            CompositeKey::Passing => self.passing,
            CompositeKey::Turnovers => self.turnovers,
            CompositeKey::ShootingAtRim => self.shooting_at_rim,
            CompositeKey::ShootingLowPost => self.shooting_low_post,
            CompositeKey::ShootingMidRange => self.shooting_mid_range,
            CompositeKey::ShootingThreePointer => self.shooting_three_pointer,
            CompositeKey::ShootingFt => self.shooting_ft,
            CompositeKey::Rebounding => self.rebounding,
            CompositeKey::Stealing => self.stealing,
            CompositeKey::Blocking => self.blocking,
            CompositeKey::Fouling => self.fouling,
            CompositeKey::DrawingFouls => self.drawing_fouls,
            CompositeKey::Defense => self.defense,
            CompositeKey::DefenseInterior => self.defense_interior,
            CompositeKey::DefensePerimeter => self.defense_perimeter,
            CompositeKey::Endurance => self.endurance,
            CompositeKey::Athleticism => self.athleticism,
            CompositeKey::JumpBall => self.jump_ball,
        }
    }

    pub fn set(&mut self, key: CompositeKey, value: f64) {
        match key {
            CompositeKey::Pace => self.pace = value,
            CompositeKey::Usage => self.usage = value,
            CompositeKey::Dribbling => self.dribbling = value,
            CompositeKey::Passing => self.passing = value,
            CompositeKey::Turnovers => self.turnovers = value,
            CompositeKey::ShootingAtRim => self.shooting_at_rim = value,
            CompositeKey::ShootingLowPost => self.shooting_low_post = value,
            CompositeKey::ShootingMidRange => self.shooting_mid_range = value,
            CompositeKey::ShootingThreePointer => self.shooting_three_pointer = value,
            CompositeKey::ShootingFt => self.shooting_ft = value,
            CompositeKey::Rebounding => self.rebounding = value,
            CompositeKey::Stealing => self.stealing = value,
            CompositeKey::Blocking => self.blocking = value,
            CompositeKey::Fouling => self.fouling = value,
            CompositeKey::DrawingFouls => self.drawing_fouls = value,
            CompositeKey::Defense => self.defense = value,
            CompositeKey::DefenseInterior => self.defense_interior = value,
            CompositeKey::DefensePerimeter => self.defense_perimeter = value,
            CompositeKey::Endurance => self.endurance = value,
            CompositeKey::Athleticism => self.athleticism = value,
            CompositeKey::JumpBall => self.jump_ball = value,
        }
    }
}

/// Skill labels attached when a composite rating crosses its cutoff.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Skill {
    VolumeScorer,
    BallHandler,
    Passer,
    PostScorer,
    ThreePointShooter,
    Rebounder,
    InteriorDefender,
    PerimeterDefender,
    Athlete,
}

impl Skill {
    pub fn label(&self) -> &'static str {
        match self {
            Skill::VolumeScorer => "Volume Scorer",
            Skill::BallHandler => "Ball Handler",
            Skill::Passer => "Passer",
            Skill::PostScorer => "Post Scorer",
            Skill::ThreePointShooter => "Three Point Shooter",
            Skill::Rebounder => "Rebounder",
            Skill::InteriorDefender => "Interior Defender",
            Skill::PerimeterDefender => "Perimeter Defender",
            Skill::Athlete => "Athlete",
        }
    }
}

/// One weighted component of a composite rating. A constant baseline makes a
/// composite partly rating-independent (turnovers, stealing, fouling,
/// endurance all carry a 50 baseline).
#[derive(Debug, Clone, Copy)]
enum Component {
    R(RatingKey),
    Baseline(f64),
}

struct CompositeSpec {
    key: CompositeKey,
    components: &'static [(Component, f64)],
    skill: Option<(Skill, f64)>,
}

use Component::{Baseline, R};
use RatingKey::*;

/// How raw ratings combine into composites. Weights are signed; the
/// normalization uses the signed weight sum, matching the established
/// tuning of the probability formulas downstream.
const COMPOSITE_SPECS: &[CompositeSpec] = &[
    CompositeSpec {
        key: CompositeKey::Pace,
        components: &[
            (R(Speed), 1.0),
            (R(Jump), 1.0),
            (R(Dunking), 1.0),
            (R(ThreePoint), 1.0),
            (R(Dribbling), 1.0),
            (R(Passing), 1.0),
        ],
        skill: None,
    },
    CompositeSpec {
        key: CompositeKey::Usage,
        components: &[
            (R(InsideScoring), 1.5),
            (R(Dunking), 1.0),
            (R(MidRange), 1.0),
            (R(ThreePoint), 1.0),
            (R(Speed), 0.5),
            (R(Height), 0.5),
            (R(Dribbling), 0.5),
            (R(OffensiveIq), 0.5),
        ],
        skill: Some((Skill::VolumeScorer, 0.61)),
    },
    CompositeSpec {
        key: CompositeKey::Dribbling,
        components: &[(R(Dribbling), 1.0), (R(Speed), 1.0)],
        skill: Some((Skill::BallHandler, 0.68)),
    },
    CompositeSpec {
        key: CompositeKey::Passing,
        components: &[(R(Dribbling), 0.4), (R(Passing), 1.0), (R(OffensiveIq), 0.5)],
        skill: Some((Skill::Passer, 0.63)),
    },
    CompositeSpec {
        key: CompositeKey::Turnovers,
        components: &[
            (Baseline(50.0), 0.5),
            (R(InsideScoring), 1.0),
            (R(Passing), 1.0),
            (R(OffensiveIq), -1.0),
        ],
        skill: None,
    },
    CompositeSpec {
        key: CompositeKey::ShootingAtRim,
        components: &[
            (R(Height), 2.0),
            (R(Strength), 0.3),
            (R(Dunking), 0.3),
            (R(OffensiveIq), 0.2),
        ],
        skill: None,
    },
    CompositeSpec {
        key: CompositeKey::ShootingLowPost,
        components: &[
            (R(Height), 1.0),
            (R(Strength), 0.6),
            (R(Speed), 0.2),
            (R(InsideScoring), 1.0),
            (R(OffensiveIq), 0.4),
        ],
        skill: Some((Skill::PostScorer, 0.61)),
    },
    CompositeSpec {
        key: CompositeKey::ShootingMidRange,
        components: &[(R(OffensiveIq), -0.5), (R(MidRange), 1.0), (R(Strength), 0.2)],
        skill: None,
    },
    CompositeSpec {
        key: CompositeKey::ShootingThreePointer,
        components: &[(R(OffensiveIq), 0.1), (R(ThreePoint), 1.0)],
        skill: Some((Skill::ThreePointShooter, 0.59)),
    },
    CompositeSpec {
        key: CompositeKey::ShootingFt,
        components: &[(R(FreeThrow), 1.0)],
        skill: None,
    },
    CompositeSpec {
        key: CompositeKey::Rebounding,
        components: &[
            (R(Height), 2.0),
            (R(Strength), 0.1),
            (R(Jump), 0.1),
            (R(Rebounding), 2.0),
            (R(OffensiveIq), 0.5),
            (R(DefensiveIq), 0.5),
        ],
        skill: Some((Skill::Rebounder, 0.61)),
    },
    CompositeSpec {
        key: CompositeKey::Stealing,
        components: &[(Baseline(50.0), 1.0), (R(Speed), 1.0), (R(DefensiveIq), 2.0)],
        skill: None,
    },
    CompositeSpec {
        key: CompositeKey::Blocking,
        components: &[(R(Height), 2.5), (R(Jump), 1.5), (R(DefensiveIq), 0.5)],
        skill: None,
    },
    CompositeSpec {
        key: CompositeKey::Fouling,
        components: &[
            (Baseline(50.0), 3.0),
            (R(Height), 1.0),
            (R(DefensiveIq), -1.0),
            (R(Speed), -1.0),
        ],
        skill: None,
    },
    CompositeSpec {
        key: CompositeKey::DrawingFouls,
        components: &[
            (R(Height), 1.0),
            (R(Speed), 1.0),
            (R(Dribbling), 1.0),
            (R(Dunking), 1.0),
            (R(OffensiveIq), 1.0),
        ],
        skill: None,
    },
    CompositeSpec {
        key: CompositeKey::Defense,
        components: &[
            (R(Height), 1.0),
            (R(Strength), 1.0),
            (R(Speed), 1.0),
            (R(Jump), 0.5),
            (R(DefensiveIq), 2.0),
        ],
        skill: None,
    },
    CompositeSpec {
        key: CompositeKey::DefenseInterior,
        components: &[
            (R(Height), 2.5),
            (R(Strength), 1.0),
            (R(Speed), 0.5),
            (R(Jump), 0.5),
            (R(DefensiveIq), 2.0),
        ],
        skill: Some((Skill::InteriorDefender, 0.57)),
    },
    CompositeSpec {
        key: CompositeKey::DefensePerimeter,
        components: &[
            (R(Height), 0.5),
            (R(Strength), 0.5),
            (R(Speed), 2.0),
            (R(Jump), 0.5),
            (R(DefensiveIq), 1.0),
        ],
        skill: Some((Skill::PerimeterDefender, 0.61)),
    },
    CompositeSpec {
        key: CompositeKey::Endurance,
        components: &[(Baseline(50.0), 1.0), (R(Endurance), 1.0)],
        skill: None,
    },
    CompositeSpec {
        key: CompositeKey::Athleticism,
        components: &[
            (R(Strength), 1.0),
            (R(Speed), 1.0),
            (R(Jump), 1.0),
            (R(Height), 0.75),
        ],
        skill: Some((Skill::Athlete, 0.63)),
    },
    CompositeSpec {
        key: CompositeKey::JumpBall,
        components: &[(R(Height), 1.0), (R(JumpBall), 0.25)],
        skill: None,
    },
];

fn single_composite(ratings: &Ratings, components: &[(Component, f64)]) -> f64 {
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (component, weight) in components {
        let factor = match component {
            R(key) => ratings.get(*key),
            Baseline(value) => *value,
        };
        numerator += factor * weight;
        denominator += 100.0 * weight;
    }

    (numerator / denominator).clamp(0.0, 1.0)
}

/// Compute all composite ratings and the skill labels they unlock.
pub fn compute_composites(ratings: &Ratings) -> (CompositeRating, Vec<Skill>) {
    let mut composite = CompositeRating::default();
    let mut skills = Vec::new();

    for spec in COMPOSITE_SPECS {
        let value = single_composite(ratings, spec.components);
        composite.set(spec.key, value);

        if let Some((skill, cutoff)) = spec.skill {
            if value >= cutoff {
                skills.push(skill);
            }
        }
    }

    (composite, skills)
}

/// Overall rating on the 0-100 scale.
///
/// A fixed weighted combination of ratings offset by league reference means,
/// then pushed through a piecewise correction that keeps the scale aligned
/// with the pre-rescale era ratings (+8 at 68, +4 at 50, -5 at 42, -10 at 31).
pub fn calculate_overall(ratings: &Ratings) -> u8 {
    let r = 0.159 * (ratings.height as f64 - 47.5)
        + 0.0777 * (ratings.strength as f64 - 50.2)
        + 0.123 * (ratings.speed as f64 - 50.8)
        + 0.051 * (ratings.jump as f64 - 48.7)
        + 0.0632 * (ratings.endurance as f64 - 39.9)
        + 0.0126 * (ratings.inside_scoring as f64 - 42.4)
        + 0.0286 * (ratings.dunking as f64 - 49.5)
        + 0.0202 * (ratings.free_throw as f64 - 47.0)
        + 0.0726 * (ratings.three_point as f64 - 47.1)
        + 0.133 * (ratings.offensive_iq as f64 - 46.8)
        + 0.159 * (ratings.defensive_iq as f64 - 46.7)
        + 0.059 * (ratings.dribbling as f64 - 54.8)
        + 0.062 * (ratings.passing as f64 - 51.3)
        + 0.01 * (ratings.mid_range as f64 - 47.0)
        + 0.01 * (ratings.rebounding as f64 - 51.4)
        + 48.5;

    let fudge_factor = if r >= 68.0 {
        8.0
    } else if r >= 50.0 {
        4.0 + (r - 50.0) * (4.0 / 18.0)
    } else if r >= 42.0 {
        -5.0 + (r - 42.0) * (9.0 / 8.0)
    } else if r >= 31.0 {
        -5.0 - (42.0 - r) * (5.0 / 11.0)
    } else {
        -10.0
    };

    (r + fudge_factor).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_uniform_50_composites() {
        let (composite, skills) = compute_composites(&Ratings::uniform(50));

        // Every single-source or baseline-balanced composite sits at 0.5.
        assert!((composite.shooting_ft - 0.5).abs() < 1e-12);
        assert!((composite.endurance - 0.5).abs() < 1e-12);
        assert!((composite.jump_ball - 0.5).abs() < 1e-12);
        assert!((composite.pace - 0.5).abs() < 1e-12);

        // Signed-weight composites normalize the same way.
        assert!((composite.turnovers - 0.5).abs() < 1e-12);
        assert!((composite.shooting_mid_range - 0.5).abs() < 1e-12);

        // 0.5 clears no skill cutoff (lowest is Interior Defender at 0.57).
        assert!(skills.is_empty());
    }

    #[test]
    fn test_extremes_stay_bounded() {
        let (low, _) = compute_composites(&Ratings::uniform(0));
        let (high, _) = compute_composites(&Ratings::uniform(100));

        for key in ALL_COMPOSITE_KEYS {
            assert!((0.0..=1.0).contains(&low.get(key)), "{key:?} low out of range");
            assert!((0.0..=1.0).contains(&high.get(key)), "{key:?} high out of range");
        }
    }

    #[test]
    fn test_skill_labels_at_max_ratings() {
        let (_, skills) = compute_composites(&Ratings::uniform(100));
        for skill in [
            Skill::VolumeScorer,
            Skill::BallHandler,
            Skill::Passer,
            Skill::PostScorer,
            Skill::ThreePointShooter,
            Skill::Rebounder,
            Skill::InteriorDefender,
            Skill::PerimeterDefender,
            Skill::Athlete,
        ] {
            assert!(skills.contains(&skill), "missing {:?}", skill);
        }
    }

    #[test]
    fn test_every_composite_key_has_a_spec() {
        for key in CompositeKey::iter() {
            assert!(
                COMPOSITE_SPECS.iter().any(|s| s.key == key),
                "no weight table for {key:?}"
            );
        }
        assert_eq!(COMPOSITE_SPECS.len(), ALL_COMPOSITE_KEYS.len());
    }

    #[test]
    fn test_overall_fudge_segments() {
        // All-zero ratings bottom out well below the scale floor.
        assert_eq!(calculate_overall(&Ratings::uniform(0)), 0);

        // All-100 saturates the top segment (+8 fudge, clamped to 100).
        assert_eq!(calculate_overall(&Ratings::uniform(100)), 100);

        // Uniform 50s land just above the reference means: r ~= 50.47,
        // fudge ~= 4.10, rounded to 55.
        assert_eq!(calculate_overall(&Ratings::uniform(50)), 55);

        // Monotone in any single rating.
        let mut better = Ratings::uniform(50);
        better.defensive_iq = 90;
        assert!(calculate_overall(&better) > calculate_overall(&Ratings::uniform(50)));
    }

    #[test]
    fn test_jump_ball_rating_feeds_only_jump_ball() {
        let mut specialist = Ratings::uniform(50);
        specialist.jump_ball = 100;

        let (base, _) = compute_composites(&Ratings::uniform(50));
        let (tipper, _) = compute_composites(&specialist);

        assert!(tipper.jump_ball > base.jump_ball);
        for key in ALL_COMPOSITE_KEYS {
            if key != CompositeKey::JumpBall {
                assert_eq!(base.get(key), tipper.get(key), "{key:?} moved");
            }
        }
    }

    proptest! {
        #[test]
        fn prop_composites_stay_in_unit_interval(values in proptest::collection::vec(0u8..=100, 16)) {
            let ratings = Ratings {
                height: values[0],
                strength: values[1],
                speed: values[2],
                jump: values[3],
                endurance: values[4],
                inside_scoring: values[5],
                dunking: values[6],
                free_throw: values[7],
                mid_range: values[8],
                three_point: values[9],
                offensive_iq: values[10],
                defensive_iq: values[11],
                dribbling: values[12],
                passing: values[13],
                rebounding: values[14],
                jump_ball: values[15],
            };
            let (composite, _) = compute_composites(&ratings);
            for key in ALL_COMPOSITE_KEYS {
                let v = composite.get(key);
                prop_assert!((0.0..=1.0).contains(&v), "{:?} = {}", key, v);
            }
        }

        #[test]
        fn prop_overall_in_scale(values in proptest::collection::vec(0u8..=100, 16)) {
            let mut ratings = Ratings::uniform(50);
            ratings.height = values[0];
            ratings.strength = values[1];
            ratings.speed = values[2];
            ratings.jump = values[3];
            ratings.endurance = values[4];
            ratings.inside_scoring = values[5];
            ratings.dunking = values[6];
            ratings.free_throw = values[7];
            ratings.mid_range = values[8];
            ratings.three_point = values[9];
            ratings.offensive_iq = values[10];
            ratings.defensive_iq = values[11];
            ratings.dribbling = values[12];
            ratings.passing = values[13];
            ratings.rebounding = values[14];
            ratings.jump_ball = values[15];
            let ovr = calculate_overall(&ratings);
            prop_assert!(ovr <= 100);
        }
    }
}
