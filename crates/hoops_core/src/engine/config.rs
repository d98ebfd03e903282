//! Game rules configuration.
//!
//! `GameConfig` holds the full rule set with named defaults. Callers send a
//! `GameConfigOverride` (all fields optional) that is merged field-by-field
//! and validated once at construction; the merged config is immutable for
//! the lifetime of the simulation.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub num_players_on_court: usize,
    /// Period length in minutes.
    pub quarter_length: f64,
    pub num_periods: u32,
    /// League-average possessions per 48 minutes; scales both teams' pace.
    pub pace: f64,

    /// Sudden-death ending: once the final-period clock drops to
    /// `elam_minutes`, the target becomes leading score + `elam_points` and
    /// the first team to reach it wins immediately.
    pub elam: bool,
    pub elam_minutes: f64,
    pub elam_points: u32,

    /// Percentage bonus applied to home composite ratings (and inverse
    /// penalty to the away team).
    pub home_court_advantage: f64,
    pub fouls_needed_to_foul_out: u32,
    /// Team fouls before the opponent shoots bonus free throws:
    /// [regulation period, overtime period, last two minutes].
    pub fouls_until_bonus: [u32; 3],

    pub foul_rate_factor: f64,
    pub turnover_factor: f64,
    pub steal_factor: f64,
    pub three_point_tendency_factor: f64,
    pub three_point_accuracy_factor: f64,
    pub two_point_accuracy_factor: f64,
    pub three_pointers: bool,
    pub block_factor: f64,
    pub orb_factor: f64,
    pub synergy_factor: f64,

    pub base_injury_rate: f64,
    pub use_injuries: bool,
    pub allow_substitutions: bool,
    pub allow_fouls: bool,

    /// Shot clock in seconds, and the shorter reset after an offensive
    /// rebound.
    pub shot_clock: f64,
    pub orb_shot_clock: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players_on_court: 5,
            quarter_length: 12.0,
            num_periods: 4,
            pace: 75.0,
            elam: false,
            elam_minutes: 4.0,
            elam_points: 9,
            home_court_advantage: 0.0,
            fouls_needed_to_foul_out: 6,
            fouls_until_bonus: [5, 4, 2],
            foul_rate_factor: 0.7,
            turnover_factor: 0.8,
            steal_factor: 1.0,
            three_point_tendency_factor: 0.8,
            three_point_accuracy_factor: 1.15,
            two_point_accuracy_factor: 1.2,
            three_pointers: true,
            block_factor: 1.1,
            orb_factor: 1.0,
            synergy_factor: 0.25,
            base_injury_rate: 0.0,
            use_injuries: false,
            allow_substitutions: false,
            allow_fouls: false,
            shot_clock: 24.0,
            orb_shot_clock: 24.0,
        }
    }
}

impl GameConfig {
    /// Merge a caller override onto the defaults and validate the result.
    pub fn from_override(overrides: &GameConfigOverride) -> Result<Self> {
        let mut config = Self::default();
        overrides.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_players_on_court == 0 {
            return Err(GameError::InvalidConfig(
                "numPlayersOnCourt must be at least 1".to_string(),
            ));
        }
        if self.quarter_length <= 0.0 {
            return Err(GameError::InvalidConfig(format!(
                "quarterLength must be positive, got {}",
                self.quarter_length
            )));
        }
        if self.num_periods == 0 {
            return Err(GameError::InvalidConfig("numPeriods must be at least 1".to_string()));
        }
        if self.pace <= 0.0 {
            return Err(GameError::InvalidConfig(format!(
                "pace must be positive, got {}",
                self.pace
            )));
        }
        if self.shot_clock <= 0.0 || self.orb_shot_clock <= 0.0 {
            return Err(GameError::InvalidConfig("shot clocks must be positive".to_string()));
        }
        if self.elam && self.elam_points == 0 {
            return Err(GameError::InvalidConfig(
                "elamPoints must be positive when elam is enabled".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.base_injury_rate) {
            return Err(GameError::InvalidConfig(format!(
                "baseInjuryRate must be in [0,1], got {}",
                self.base_injury_rate
            )));
        }
        Ok(())
    }
}

/// Caller-supplied partial configuration; unset fields keep their default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameConfigOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_players_on_court: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_periods: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elam: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elam_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elam_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_court_advantage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fouls_needed_to_foul_out: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fouls_until_bonus: Option<[u32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foul_rate_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turnover_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steal_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_point_tendency_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_point_accuracy_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_point_accuracy_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_pointers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orb_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synergy_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_injury_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_injuries: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_substitutions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_fouls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_clock: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orb_shot_clock: Option<f64>,
}

impl GameConfigOverride {
    fn apply_to(&self, config: &mut GameConfig) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = self.$field {
                    config.$field = v;
                })*
            };
        }

        merge!(
            num_players_on_court,
            quarter_length,
            num_periods,
            pace,
            elam,
            elam_minutes,
            elam_points,
            home_court_advantage,
            fouls_needed_to_foul_out,
            fouls_until_bonus,
            foul_rate_factor,
            turnover_factor,
            steal_factor,
            three_point_tendency_factor,
            three_point_accuracy_factor,
            two_point_accuracy_factor,
            three_pointers,
            block_factor,
            orb_factor,
            synergy_factor,
            base_injury_rate,
            use_injuries,
            allow_substitutions,
            allow_fouls,
            shot_clock,
            orb_shot_clock,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_override_merges_field_by_field() {
        let overrides = GameConfigOverride {
            elam: Some(true),
            elam_minutes: Some(4.0),
            elam_points: Some(9),
            quarter_length: Some(10.0),
            ..Default::default()
        };
        let config = GameConfig::from_override(&overrides).unwrap();
        assert!(config.elam);
        assert_eq!(config.quarter_length, 10.0);
        // Untouched fields keep their defaults.
        assert_eq!(config.num_periods, 4);
        assert_eq!(config.fouls_until_bonus, [5, 4, 2]);
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let overrides =
            GameConfigOverride { quarter_length: Some(0.0), ..Default::default() };
        assert!(GameConfig::from_override(&overrides).is_err());

        let overrides =
            GameConfigOverride { num_players_on_court: Some(0), ..Default::default() };
        assert!(GameConfig::from_override(&overrides).is_err());

        let overrides = GameConfigOverride {
            elam: Some(true),
            elam_points: Some(0),
            ..Default::default()
        };
        assert!(GameConfig::from_override(&overrides).is_err());
    }

    #[test]
    fn test_override_deserializes_from_partial_json() {
        let overrides: GameConfigOverride =
            serde_json::from_str(r#"{"allowFouls": true, "pace": 90.0}"#).unwrap();
        assert_eq!(overrides.allow_fouls, Some(true));
        assert_eq!(overrides.pace, Some(90.0));
        assert_eq!(overrides.elam, None);
    }
}
