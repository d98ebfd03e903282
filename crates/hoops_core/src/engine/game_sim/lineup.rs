//! Lineup management: substitutions, synergy, per-possession team composite
//! scaling, playing-time bookkeeping and injuries.
//!
//! Substitution policy in short: compute a fatigue- and foul-aware
//! "effective overall" for everyone, then starting from the weakest player
//! on the floor, bring in any eligible bench player who is clearly better,
//! subject to minimum court/bench stints and a positional-quota veto.

use super::GameSim;
use crate::models::{
    synergy_from_players, CompositeKey, CourtSlot, EventKind, EventPlayers, Position, RosterIndex,
    StatKind, TeamSide,
};

/// Composite ratings the possession formulas actually consume at the team
/// level; nothing else is recomputed per possession.
const TEAM_RATINGS: [CompositeKey; 6] = [
    CompositeKey::Dribbling,
    CompositeKey::Passing,
    CompositeKey::Rebounding,
    CompositeKey::Defense,
    CompositeKey::DefensePerimeter,
    CompositeKey::Blocking,
];

impl GameSim {
    /// Perform appropriate substitutions. Returns true when the floor
    /// changed, in which case the caller refreshes synergy.
    pub(crate) fn update_players_on_court(&mut self, shooter: Option<CourtSlot>) -> bool {
        // Pre-game lineup fixing is allowed even with substitutions off.
        if !self.config.allow_substitutions && self.starters_recorded {
            return false;
        }

        let mut substitutions = false;
        let late_game = self.is_late_game();
        let fouls_needed = self.config.fouls_needed_to_foul_out;

        let diff = (self.team[0].stat.pts as i64 - self.team[1].stat.pts as i64).abs();
        let quarter = self.team[0].stat.pts_qtrs.len() as u32;
        let blowout = if self.elam_active {
            let max_pts = self.team[0].stat.pts.max(self.team[1].stat.pts) as i64;
            let pts_to_target = self.elam_target as i64 - max_pts;
            diff >= 20 && pts_to_target < diff
        } else {
            quarter == self.num_periods
                && ((diff >= 30 && self.t < 12.0)
                    || (diff >= 25 && self.t < 9.0)
                    || (diff >= 20 && self.t < 7.0)
                    || (diff >= 15 && self.t < 3.0)
                    || (diff >= 10 && self.t < 1.0))
        };

        let foul_limit = self.foul_trouble_limit();

        for side in TeamSide::BOTH {
            let t = side.index();

            let mut ovrs = self.effective_ovrs(side, false, late_game, blowout, foul_limit);

            // If too many players fouled out, they play anyway; otherwise
            // only the bottom of the roster would be left on the floor.
            if count_eligible(&ovrs) < self.num_players_on_court {
                ovrs = self.effective_ovrs(side, true, late_game, blowout, foul_limit);
            }

            let ovrs_on_court: Vec<f64> =
                self.players_on_court[t].iter().map(|index| ovrs[index.0]).collect();

            // Sub off the lowest effective player first.
            for pp in sorted_indexes(&ovrs_on_court) {
                let p = self.players_on_court[t][pp];
                let on_court_is_ineligible = ovrs[p.0] == f64::NEG_INFINITY;

                // Never sub out the player at the line.
                if side == self.o && shooter == Some(CourtSlot(pp)) {
                    continue;
                }

                for b in 0..self.team[t].players.len() {
                    if self.players_on_court[t].iter().any(|index| index.0 == b) {
                        continue;
                    }

                    let bench_is_valid_and_better = self.team[t].players[p.0].stat.court_time
                        > 2.0
                        && self.team[t].players[b].stat.bench_time > 2.0
                        && ovrs[b] > ovrs[p.0];
                    let bench_is_eligible = ovrs[b] != f64::NEG_INFINITY;

                    if !(bench_is_valid_and_better
                        || (on_court_is_ineligible && bench_is_eligible))
                    {
                        continue;
                    }

                    // Would the substitute leave a legal lineup? Require 2
                    // guards (or a PG) and 2 forwards (or a C) at five-out.
                    let mut positions: Vec<Position> = Vec::with_capacity(self.num_players_on_court);
                    for (j, index) in self.players_on_court[t].iter().enumerate() {
                        if j != pp {
                            positions.push(self.team[t].players[index.0].position());
                        }
                    }
                    positions.push(self.team[t].players[b].position());

                    let num_g = positions.iter().filter(|pos| pos.is_guard()).count();
                    let num_pg =
                        positions.iter().filter(|&&pos| pos == Position::PointGuard).count();
                    let num_f = positions.iter().filter(|pos| pos.is_forward()).count();
                    let num_c = positions.iter().filter(|&&pos| pos == Position::Center).count();

                    let cutoff = if self.num_players_on_court >= 5 {
                        2
                    } else if self.num_players_on_court >= 3 {
                        1
                    } else {
                        0
                    };
                    if (num_g < cutoff && num_pg == 0) || (num_f < cutoff && num_c == 0) {
                        let energy = self.team[t].players[p.0].stat.energy;
                        if self.fatigue(energy) > 0.728 && !on_court_is_ineligible {
                            // Quota veto holds unless the player is running
                            // on fumes; unbalanced rosters still get rest.
                            continue;
                        }
                    }

                    substitutions = true;

                    self.players_on_court[t][pp] = RosterIndex(b);
                    // Smear the stint clocks so fresh subs don't bounce
                    // straight back out.
                    self.team[t].players[b].stat.court_time = self.rng.uniform(-2.0, 2.0);
                    self.team[t].players[b].stat.bench_time = self.rng.uniform(-2.0, 2.0);
                    self.team[t].players[p.0].stat.court_time = self.rng.uniform(-2.0, 2.0);
                    self.team[t].players[p.0].stat.bench_time = self.rng.uniform(-2.0, 2.0);

                    self.record_event(
                        EventKind::Sub,
                        EventPlayers {
                            offense: Some(RosterIndex(b)),
                            defense: None,
                            assist: Some(p),
                        },
                        Some(side),
                    );

                    break;
                }
            }
        }

        // Record the real starters exactly once, after injury fixing.
        if !self.starters_recorded {
            for side in TeamSide::BOTH {
                let t = side.index();
                for p in 0..self.team[t].players.len() {
                    if self.players_on_court[t].iter().any(|index| index.0 == p) {
                        self.record_stat(side, RosterIndex(p), StatKind::Gs, 1);
                    }
                }
            }
            self.starters_recorded = true;
        }

        substitutions
    }

    /// Overall ratings scaled by fatigue, foul trouble and garbage time.
    /// Ineligible players (injured, fouled out) come back as -inf.
    fn effective_ovrs(
        &mut self,
        side: TeamSide,
        include_fouled_out: bool,
        late_game: bool,
        blowout: bool,
        foul_limit: u32,
    ) -> Vec<f64> {
        let t = side.index();
        let fouls_needed = self.config.fouls_needed_to_foul_out;
        let roster_len = self.team[t].players.len();
        let mut ovrs = vec![0.0; roster_len];

        for p in 0..roster_len {
            let (injured, pf, energy, ovr) = {
                let player = &self.team[t].players[p];
                (player.injured, player.stat.pf, player.stat.energy, player.ovr())
            };

            if injured || (!include_fouled_out && fouls_needed > 0 && pf >= fouls_needed) {
                ovrs[p] = f64::NEG_INFINITY;
                continue;
            }

            let jitter = if !late_game { self.rng.uniform(0.9, 1.1) } else { 1.0 };
            let mut value = ovr as f64 * self.fatigue(energy) * jitter;

            if blowout {
                // Stars sit in garbage time; scale by roster position.
                value *= (p + 1) as f64 / 10.0;
            } else {
                value *= Self::foul_trouble_factor(pf, foul_limit);
            }

            ovrs[p] = value;
        }

        ovrs
    }

    /// Refresh both teams' synergy from the players currently on the floor.
    /// Call after any substitution; output only changes when the floor does.
    pub(crate) fn update_synergy(&mut self) {
        for t in 0..2 {
            let on_court: Vec<&crate::models::Player> = self.players_on_court[t]
                .iter()
                .map(|index| &self.team[t].players[index.0])
                .collect();
            let synergy = synergy_from_players(on_court.into_iter());
            self.team[t].synergy = synergy;
        }
    }

    /// Recompute the team composite ratings from the on-court players,
    /// scaled by fatigue, the score-differential performance factor and
    /// foul-trouble discounts, then add the synergy bonuses.
    ///
    /// Runs once per possession, after lineups and synergy are current.
    /// The synergy addition may push a value above 1; downstream formulas
    /// consume it unclamped.
    pub(crate) fn update_team_composite_ratings(&mut self) {
        let foul_limit = self.foul_trouble_limit() as i64;

        for k in 0..2 {
            let opp = 1 - k;
            let diff = self.team[k].stat.pts as f64 - self.team[opp].stat.pts as f64;
            let perf_factor = 1.0 - 0.2 * (diff / 60.0).tanh();

            let mut new_values = [0.0; TEAM_RATINGS.len()];
            for (j, &rating) in TEAM_RATINGS.iter().enumerate() {
                let mut sum = 0.0;
                for slot in 0..self.num_players_on_court {
                    let index = self.players_on_court[k][slot];
                    let player = &self.team[k].players[index.0];

                    let mut foul_limit_factor = 1.0;
                    if matches!(
                        rating,
                        CompositeKey::Defense
                            | CompositeKey::DefensePerimeter
                            | CompositeKey::Blocking
                    ) {
                        let pf = player.stat.pf as i64;
                        if pf == foul_limit {
                            foul_limit_factor = 0.9;
                        } else if pf > foul_limit {
                            foul_limit_factor = 0.75;
                        }
                    }

                    sum += player.composite_rating.get(rating)
                        * self.fatigue(player.stat.energy)
                        * perf_factor
                        * foul_limit_factor;
                }
                new_values[j] = sum / self.num_players_on_court as f64;
            }

            for (j, &rating) in TEAM_RATINGS.iter().enumerate() {
                self.team[k].composite_rating.set(rating, new_values[j]);
            }

            let synergy = self.team[k].synergy;
            let composite = &mut self.team[k].composite_rating;
            composite.dribbling += self.synergy_factor * synergy.off;
            composite.passing += self.synergy_factor * synergy.off;
            composite.rebounding += self.synergy_factor * synergy.reb;
            composite.defense += self.synergy_factor * synergy.def;
            composite.defense_perimeter += self.synergy_factor * synergy.def;
            composite.blocking += self.synergy_factor * synergy.def;
        }
    }

    /// Record minutes and move energy: on-court players burn it in
    /// proportion to possession length and their endurance deficit, bench
    /// players regenerate.
    pub(crate) fn update_playing_time(&mut self, possession_length: f64) {
        for t in 0..2 {
            for p in 0..self.team[t].players.len() {
                let on_court = self.players_on_court[t].iter().any(|index| index.0 == p);
                if on_court {
                    let endurance = self.team[t].players[p].composite_rating.endurance;
                    let burn = possession_length * self.fatigue_factor * (1.0 - endurance);

                    let player = &mut self.team[t].players[p];
                    player.stat.min += possession_length;
                    player.stat.court_time += possession_length;
                    player.stat.energy -= burn;
                    if player.stat.energy < 0.0 {
                        player.stat.energy = 0.0;
                    }
                    self.team[t].stat.min += possession_length;
                } else {
                    let player = &mut self.team[t].players[p];
                    player.stat.bench_time += possession_length;
                    player.stat.energy += possession_length * 0.094;
                    if player.stat.energy > 1.0 {
                        player.stat.energy = 1.0;
                    }
                }
            }
        }
    }

    /// Roll for in-game injuries. Determines only whether a player is hurt
    /// badly enough to leave the floor; any new injury forces an immediate
    /// substitution pass.
    pub(crate) fn roll_injuries(&mut self) {
        if !self.config.use_injuries {
            return;
        }

        // Injuries really accrue per minute played, but the roll happens
        // per possession, so modulate by pace.
        let base_rate = self.base_injury_rate * 100.0 / self.config.pace;

        let mut new_injury = false;
        for side in TeamSide::BOTH {
            let t = side.index();
            for slot in 0..self.num_players_on_court {
                let index = self.players_on_court[t][slot];
                let (age, previously_injured) = {
                    let player = &self.team[t].players[index.0];
                    (player.age, player.previously_injured)
                };

                let rate = injury_rate(base_rate, age, previously_injured);
                if self.rng.random() < rate {
                    self.team[t].players[index.0].injured = true;
                    new_injury = true;
                    log::debug!("injury: {}", self.team[t].players[index.0].name);
                    self.record_event(
                        EventKind::Injury,
                        EventPlayers::offense(index),
                        Some(side),
                    );
                }
            }
        }

        if new_injury {
            self.update_players_on_court(None);
        }
    }
}

/// Age- and history-adjusted injury rate: +3% per year past 26, +50% when
/// playing through a prior injury.
pub(crate) fn injury_rate(base_rate: f64, age: u32, previously_injured: bool) -> f64 {
    let mut rate = base_rate * 1.03f64.powi(age.min(50) as i32 - 26);
    if previously_injured {
        rate *= 1.5;
    }
    rate
}

fn count_eligible(ovrs: &[f64]) -> usize {
    ovrs.iter().filter(|&&v| v > f64::NEG_INFINITY).count()
}

/// Indexes sorted ascending by value; ties resolve with the later entry
/// first, so an all-equal array comes back fully reversed.
pub(crate) fn sorted_indexes(values: &[f64]) -> Vec<usize> {
    let mut indexes: Vec<usize> = (0..values.len()).collect();
    indexes.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.cmp(&a))
    });
    indexes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_indexes_ascending() {
        assert_eq!(sorted_indexes(&[50.0, 70.0, 10.0, 20.0, 60.0]), vec![2, 3, 0, 4, 1]);
    }

    #[test]
    fn test_sorted_indexes_ties_reverse() {
        assert_eq!(sorted_indexes(&[0.0, 0.0, 0.0, 0.0, 0.0]), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_sorted_indexes_with_ineligible() {
        let v = [f64::NEG_INFINITY, 5.0, f64::NEG_INFINITY, 1.0];
        assert_eq!(sorted_indexes(&v), vec![2, 0, 3, 1]);
    }

    #[test]
    fn test_injury_rate_age_and_history() {
        let base = injury_rate(0.01, 26, false);
        assert!((base - 0.01).abs() < 1e-12);

        assert!(injury_rate(0.01, 36, false) > base);
        assert!(injury_rate(0.01, 20, false) < base);
        assert!((injury_rate(0.01, 26, true) - 0.015).abs() < 1e-12);

        // Age effect caps at 50.
        assert_eq!(injury_rate(0.01, 50, false), injury_rate(0.01, 80, false));
    }
}
