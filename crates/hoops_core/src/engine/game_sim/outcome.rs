//! Possession outcome resolution.
//!
//! Order of evaluation each possession: end-of-quarter short circuits,
//! turnover (maybe a steal), shooter selection, non-shooting fouls (bonus
//! free throws once the defense is in the penalty), then the shot itself
//! with its block / make / and-one / miss-and-foul / rebound tree.

use super::{GameSim, PossessionOutcome};
use crate::engine::probability::{bound, bound_prob};
use crate::models::{CompositeKey, CourtSlot, EventKind, EventPlayers, RosterIndex, StatKind};

/// Where on the floor a field-goal attempt comes from. Free throws are a
/// separate path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShotType {
    AtRim,
    LowPost,
    MidRange,
    ThreePointer,
}

impl GameSim {
    pub(crate) fn resolve_possession(
        &mut self,
        possession_length: f64,
        intentional_foul: bool,
    ) -> PossessionOutcome {
        let quarter = self.team[self.o.index()].stat.pts_qtrs.len() as u32;

        // If winning at the end of the game, just run out the clock.
        if self.t <= 0.0
            && quarter >= self.num_periods
            && self.team[self.o.index()].stat.pts > self.team[self.d.index()].stat.pts
            && !self.elam_active
        {
            return PossessionOutcome::EndOfQuarter;
        }

        // With little time left in a period, a short possession may simply
        // die with the clock; likelier the shorter it was.
        if self.t <= 0.0 && possession_length < 6.0 / 60.0 && !self.elam_active {
            let survive = (possession_length / (8.0 / 60.0)).powf(0.25);
            if self.rng.random() > survive {
                return PossessionOutcome::EndOfQuarter;
            }
        }

        if self.rng.random() < self.prob_tov() {
            return self.do_tov();
        }

        // Usage-weighted shooter selection, exponentiated to favor the
        // high-usage players a bit more.
        let ratios = self.rating_array(CompositeKey::Usage, self.o, 1.25);
        let shooter = CourtSlot(self.rng.pick_player(&ratios, None));

        // Non-shooting foul?
        if self.config.allow_fouls
            && (self.rng.random() < 0.08 * self.config.foul_rate_factor || intentional_foul)
        {
            // Offset by one: the counter increments inside do_pf below.
            let in_bonus = self.fouls_until_bonus_remaining() <= 1;

            if in_bonus {
                self.do_pf(EventKind::PfBonus, Some(shooter), None);
                return self.do_ft(shooter, 2);
            }

            self.do_pf(EventKind::PfNonShooting, None, None);
            return PossessionOutcome::NonShootingFoul;
        }

        self.do_shot(shooter, possession_length)
    }

    /// Probability the possession ends in a turnover.
    fn prob_tov(&self) -> f64 {
        let offense = &self.team[self.o.index()].composite_rating;
        let defense = &self.team[self.d.index()].composite_rating;
        bound_prob(
            self.config.turnover_factor * (0.14 * defense.defense)
                / (0.5 * (offense.dribbling + offense.passing)),
        )
    }

    fn do_tov(&mut self) -> PossessionOutcome {
        let ratios = self.rating_array(CompositeKey::Turnovers, self.o, 2.0);
        let slot = CourtSlot(self.rng.pick_player(&ratios, None));
        let p = self.on_court(self.o, slot);
        self.record_stat(self.o, p, StatKind::Tov, 1);

        if self.prob_stl() > self.rng.random() {
            return self.do_stl(p);
        }

        self.record_event(EventKind::Tov, EventPlayers::offense(p), None);
        PossessionOutcome::Turnover
    }

    /// Probability a turnover this possession is a live-ball steal.
    fn prob_stl(&self) -> f64 {
        let offense = &self.team[self.o.index()].composite_rating;
        let defense = &self.team[self.d.index()].composite_rating;
        bound_prob(
            self.config.steal_factor * (0.45 * defense.defense_perimeter)
                / (0.5 * (offense.dribbling + offense.passing)),
        )
    }

    fn do_stl(&mut self, stolen_from: RosterIndex) -> PossessionOutcome {
        let ratios = self.rating_array(CompositeKey::Stealing, self.d, 4.0);
        let slot = CourtSlot(self.rng.pick_player(&ratios, None));
        let p = self.on_court(self.d, slot);
        self.record_stat(self.d, p, StatKind::Stl, 1);
        self.record_event(
            EventKind::Stl,
            EventPlayers { offense: Some(stolen_from), defense: Some(p), assist: None },
            None,
        );
        PossessionOutcome::Steal
    }

    fn do_shot(&mut self, shooter: CourtSlot, possession_length: f64) -> PossessionOutcome {
        let p = self.on_court(self.o, shooter);
        let shooter_energy = self.player(self.o, p).stat.energy;
        let current_fatigue = self.fatigue(shooter_energy);

        // Will an assist be credited if this goes in?
        let mut passer: Option<CourtSlot> = None;
        if self.prob_ast() > self.rng.random() && self.num_players_on_court > 1 {
            let ratios = self.rating_array(CompositeKey::Passing, self.o, 10.0);
            passer = Some(CourtSlot(self.rng.pick_player(&ratios, Some(shooter.0))));
        }
        let passer_index = passer.map(|slot| self.on_court(self.o, slot));

        let raw_three = self.player(self.o, p).composite_rating.shooting_three_pointer;

        // Too many players take threes at the high end: squeeze 0.55-1.0
        // down to 0.55-0.85.
        let mut three_scaled = raw_three;
        if three_scaled > 0.55 {
            three_scaled = 0.55 + (three_scaled - 0.55) * (0.3 / 0.45);
        }

        // And too many at the low end: stretch 0.35-0.45 to 0.1-0.45 and
        // compress everything below it toward zero.
        let mut three_scaled2 = three_scaled;
        if three_scaled2 < 0.35 {
            three_scaled2 *= 0.1 / 0.35;
        } else if three_scaled2 < 0.45 {
            three_scaled2 = 0.1 + (three_scaled2 - 0.35) * (0.35 / 0.1);
        }

        // Late-and-close situations and buzzer heaves force threes.
        let diff =
            self.team[self.d.index()].stat.pts as i64 - self.team[self.o.index()].stat.pts as i64;
        let quarter = self.team[self.o.index()].stat.pts_qtrs.len() as u32;
        let force_three_pointer = (!self.elam_active
            && (3..=10).contains(&diff)
            && self.t <= 10.0 / 60.0
            && quarter >= self.num_periods
            && self.rng.random() > self.t)
            || (quarter < self.num_periods && self.t == 0.0 && possession_length <= 2.5 / 60.0);

        let shot_type;
        let mut prob_make;
        let mut prob_and_one;
        let mut prob_miss_and_foul;

        if force_three_pointer
            || self.rng.random()
                < 0.67 * three_scaled2 * self.config.three_point_tendency_factor
        {
            shot_type = ShotType::ThreePointer;
            prob_miss_and_foul = 0.02;
            prob_make = three_scaled * 0.3 + 0.36;
            prob_and_one = 0.01;

            if self.exhibition {
                prob_make += 0.02;
            }
            prob_make *= self.config.three_point_accuracy_factor;

            self.record_event(EventKind::FgaTp, EventPlayers::offense(p), Some(self.o));
        } else {
            let shooter_composite = self.player(self.o, p).composite_rating;
            let synergy_edge = self.synergy_factor
                * (self.team[self.o.index()].synergy.off - self.team[self.d.index()].synergy.def);

            // Three scores race; synergy makes the easy looks at the rim
            // and in the post more or less available.
            let r1 = 0.8 * self.rng.random() * shooter_composite.shooting_mid_range;
            let r2 = self.rng.random() * (shooter_composite.shooting_at_rim + synergy_edge);
            let r3 = self.rng.random() * (shooter_composite.shooting_low_post + synergy_edge);

            if r1 > r2 && r1 > r3 {
                shot_type = ShotType::MidRange;
                prob_miss_and_foul = 0.07;
                prob_make = shooter_composite.shooting_mid_range * 0.32 + 0.42;
                prob_and_one = 0.05;
                self.record_event(EventKind::FgaMidRange, EventPlayers::offense(p), Some(self.o));
            } else if r2 > r3 {
                shot_type = ShotType::AtRim;
                prob_miss_and_foul = 0.37;
                prob_make = shooter_composite.shooting_at_rim * 0.41 + 0.54;
                prob_and_one = 0.25;
                self.record_event(EventKind::FgaAtRim, EventPlayers::offense(p), Some(self.o));
            } else {
                shot_type = ShotType::LowPost;
                prob_miss_and_foul = 0.33;
                prob_make = shooter_composite.shooting_low_post * 0.32 + 0.34;
                prob_and_one = 0.15;
                self.record_event(EventKind::FgaLowPost, EventPlayers::offense(p), Some(self.o));
            }

            if self.exhibition {
                prob_make += 0.1;
            }
            prob_make *= self.config.two_point_accuracy_factor;
        }

        let drawing_fouls = self.player(self.o, p).composite_rating.drawing_fouls;
        let mut foul_factor =
            0.65 * (drawing_fouls / 0.5).powi(2) * self.config.foul_rate_factor;
        if self.exhibition {
            foul_factor *= 0.4;
        }
        if !self.config.allow_fouls {
            foul_factor = 0.0;
        }
        prob_miss_and_foul *= foul_factor;
        prob_and_one *= foul_factor;

        prob_make = (prob_make - 0.25 * self.team[self.d.index()].composite_rating.defense
            + self.synergy_factor
                * (self.team[self.o.index()].synergy.off - self.team[self.d.index()].synergy.def))
            * current_fatigue;

        // Rushed shots at the end of a period are worse.
        if self.t == 0.0 && possession_length < 6.0 / 60.0 {
            prob_make *= (possession_length / (8.0 / 60.0)).sqrt();
        }

        // Assisted looks are easier.
        if passer.is_some() {
            prob_make += 0.025;
        }

        let blocker_ratios = self.rating_array(CompositeKey::Blocking, self.d, 10.0);
        let blocker_slot = CourtSlot(self.rng.pick_player(&blocker_ratios, None));
        let blocker = self.on_court(self.d, blocker_slot);
        if self.prob_blk() > self.rng.random() {
            return self.do_blk(p, blocker, passer_index, shot_type);
        }

        // Make?
        if prob_make > self.rng.random() {
            let and_one = prob_and_one > self.rng.random();
            let outcome = self.do_fg(shooter, passer, shot_type, and_one);

            let kind = match (shot_type, and_one) {
                (ShotType::AtRim, false) => EventKind::FgAtRim,
                (ShotType::AtRim, true) => EventKind::FgAtRimAndOne,
                (ShotType::LowPost, false) => EventKind::FgLowPost,
                (ShotType::LowPost, true) => EventKind::FgLowPostAndOne,
                (ShotType::MidRange, false) => EventKind::FgMidRange,
                (ShotType::MidRange, true) => EventKind::FgMidRangeAndOne,
                (ShotType::ThreePointer, false) => EventKind::Tp,
                (ShotType::ThreePointer, true) => EventKind::TpAndOne,
            };
            self.record_event(
                kind,
                EventPlayers {
                    offense: Some(p),
                    defense: Some(blocker),
                    assist: passer_index,
                },
                None,
            );
            if let Some(passer_index) = passer_index {
                self.record_event(
                    EventKind::Ast,
                    EventPlayers::offense(passer_index),
                    None,
                );
            }

            return outcome;
        }

        // Miss, but fouled?
        if prob_miss_and_foul > self.rng.random() {
            let three = shot_type == ShotType::ThreePointer && self.config.three_pointers;
            self.do_pf(if three { EventKind::PfTp } else { EventKind::PfFg }, Some(shooter), None);
            return self.do_ft(shooter, if three { 3 } else { 2 });
        }

        // Plain miss.
        self.record_stat(self.o, p, StatKind::Fga, 1);
        let miss_kind = match shot_type {
            ShotType::AtRim => {
                self.record_stat(self.o, p, StatKind::FgaAtRim, 1);
                EventKind::MissAtRim
            }
            ShotType::LowPost => {
                self.record_stat(self.o, p, StatKind::FgaLowPost, 1);
                EventKind::MissLowPost
            }
            ShotType::MidRange => {
                self.record_stat(self.o, p, StatKind::FgaMidRange, 1);
                EventKind::MissMidRange
            }
            ShotType::ThreePointer => {
                self.record_stat(self.o, p, StatKind::Tpa, 1);
                EventKind::MissTp
            }
        };
        self.record_event(
            miss_kind,
            EventPlayers { offense: Some(p), defense: Some(blocker), assist: passer_index },
            None,
        );

        if self.t > 0.5 / 60.0 || self.elam_active {
            return self.do_reb();
        }
        PossessionOutcome::EndOfQuarter
    }

    /// Probability the shot gets blocked.
    fn prob_blk(&self) -> f64 {
        self.config.block_factor
            * 0.2
            * self.team[self.d.index()].composite_rating.blocking.powi(2)
    }

    fn do_blk(
        &mut self,
        shooter: RosterIndex,
        blocker: RosterIndex,
        passer: Option<RosterIndex>,
        shot_type: ShotType,
    ) -> PossessionOutcome {
        self.record_stat(self.o, shooter, StatKind::Ba, 1);
        self.record_stat(self.o, shooter, StatKind::Fga, 1);

        let kind = match shot_type {
            ShotType::AtRim => {
                self.record_stat(self.o, shooter, StatKind::FgaAtRim, 1);
                EventKind::BlkAtRim
            }
            ShotType::LowPost => {
                self.record_stat(self.o, shooter, StatKind::FgaLowPost, 1);
                EventKind::BlkLowPost
            }
            ShotType::MidRange => {
                self.record_stat(self.o, shooter, StatKind::FgaMidRange, 1);
                EventKind::BlkMidRange
            }
            ShotType::ThreePointer => {
                self.record_stat(self.o, shooter, StatKind::Tpa, 1);
                EventKind::BlkTp
            }
        };

        self.record_stat(self.d, blocker, StatKind::Blk, 1);
        self.record_event(
            kind,
            EventPlayers { offense: Some(shooter), defense: Some(blocker), assist: passer },
            None,
        );

        self.do_reb()
    }

    /// Successful field goal; also runs the and-one free throw when the
    /// shooter was fouled on a make.
    fn do_fg(
        &mut self,
        shooter: CourtSlot,
        passer: Option<CourtSlot>,
        shot_type: ShotType,
        and_one: bool,
    ) -> PossessionOutcome {
        let p = self.on_court(self.o, shooter);
        self.record_stat(self.o, p, StatKind::Fga, 1);
        self.record_stat(self.o, p, StatKind::Fg, 1);
        self.record_stat(self.o, p, StatKind::Pts, 2);

        let fouler = if and_one {
            let ratios = self.rating_array(CompositeKey::Fouling, self.d, 1.0);
            Some(CourtSlot(self.rng.pick_player(&ratios, None)))
        } else {
            None
        };

        match shot_type {
            ShotType::AtRim => {
                self.record_stat(self.o, p, StatKind::FgaAtRim, 1);
                self.record_stat(self.o, p, StatKind::FgAtRim, 1);
            }
            ShotType::LowPost => {
                self.record_stat(self.o, p, StatKind::FgaLowPost, 1);
                self.record_stat(self.o, p, StatKind::FgLowPost, 1);
            }
            ShotType::MidRange => {
                self.record_stat(self.o, p, StatKind::FgaMidRange, 1);
                self.record_stat(self.o, p, StatKind::FgMidRange, 1);
            }
            ShotType::ThreePointer => {
                if self.config.three_pointers {
                    // The extra point for threes.
                    self.record_stat(self.o, p, StatKind::Pts, 1);
                }
                self.record_stat(self.o, p, StatKind::Tpa, 1);
                self.record_stat(self.o, p, StatKind::Tp, 1);
            }
        }

        if let Some(passer) = passer {
            let p2 = self.on_court(self.o, passer);
            self.record_stat(self.o, p2, StatKind::Ast, 1);
        }

        if and_one && !self.elam_done {
            self.do_pf(EventKind::PfAndOne, Some(shooter), fouler);
            return self.do_ft(shooter, 1);
        }

        PossessionOutcome::MadeShot
    }

    /// Probability a made shot this possession is assisted.
    fn prob_ast(&self) -> f64 {
        let offense = &self.team[self.o.index()].composite_rating;
        let defense = &self.team[self.d.index()].composite_rating;
        0.6 * (2.0 + offense.passing) / (2.0 + defense.defense)
    }

    /// Shoot free throws. Fatigue has no effect on the stripe.
    fn do_ft(&mut self, shooter: CourtSlot, amount: u32) -> PossessionOutcome {
        let p = self.on_court(self.o, shooter);

        // 95% max; a 75 FT rating shoots 90%, a 25 FT rating shoots 60%.
        let ft_composite = self.player(self.o, p).composite_rating.shooting_ft;
        let ftp = bound(ft_composite * 0.6 + 0.45, 0.0, 0.95);

        let mut made_last = false;
        for _ in 0..amount {
            self.record_stat(self.o, p, StatKind::Fta, 1);

            if self.rng.random() < ftp {
                self.record_stat(self.o, p, StatKind::Ft, 1);
                self.record_stat(self.o, p, StatKind::Pts, 1);
                self.record_event(EventKind::Ft, EventPlayers::offense(p), None);
                made_last = true;

                // Reaching the elam target ends it mid-sequence.
                if self.elam_done {
                    break;
                }
            } else {
                self.record_event(EventKind::MissFt, EventPlayers::offense(p), None);
                made_last = false;
            }
        }

        if made_last {
            PossessionOutcome::MadeShot
        } else {
            self.do_reb()
        }
    }

    /// Personal foul on the defense. Only the defense can foul; there are
    /// no charges in this game.
    pub(crate) fn do_pf(
        &mut self,
        kind: EventKind,
        shooter: Option<CourtSlot>,
        fouler: Option<CourtSlot>,
    ) {
        let fouler = fouler.unwrap_or_else(|| {
            let ratios = self.rating_array(CompositeKey::Fouling, self.d, 1.0);
            CourtSlot(self.rng.pick_player(&ratios, None))
        });
        let p = self.on_court(self.d, fouler);
        self.record_stat(self.d, p, StatKind::Pf, 1);

        let shooter_index = shooter.map(|slot| self.on_court(self.o, slot));
        self.record_event(
            kind,
            EventPlayers { offense: shooter_index, defense: Some(p), assist: None },
            None,
        );

        // Foul out.
        let fouls_needed = self.config.fouls_needed_to_foul_out;
        if fouls_needed > 0 && self.player(self.d, p).stat.pf >= fouls_needed {
            log::debug!("{} fouled out", self.player(self.d, p).name);
            self.record_event(EventKind::FoulOut, EventPlayers::defense(p), None);

            // Force substitutions now; never sub out a shooter mid free
            // throws.
            self.update_players_on_court(shooter);
            self.update_synergy();
        }

        self.fouls_this_quarter[self.d.index()] += 1;
        if self.t <= 2.0 {
            self.fouls_last_two_minutes[self.d.index()] += 1;
        }
    }

    /// Rebound opportunity after a miss, block, or missed free throw.
    fn do_reb(&mut self) -> PossessionOutcome {
        // Sometimes the ball just goes out of bounds; credit the best
        // available defensive passer with chasing it down.
        if self.rng.random() < 0.15 {
            let ratios = self.rating_array(CompositeKey::Passing, self.d, 1.0);
            let slot = CourtSlot(self.rng.pick_player(&ratios, None));
            let p = self.on_court(self.d, slot);
            self.record_event(EventKind::Oob, EventPlayers::defense(p), None);
            return PossessionOutcome::OutOfBounds;
        }

        let offense_reb = self.team[self.o.index()].composite_rating.rebounding;
        let defense_reb = self.team[self.d.index()].composite_rating.rebounding;
        let drb_prob =
            0.75 * (2.0 + defense_reb) / (self.config.orb_factor * (2.0 + offense_reb));

        if drb_prob > self.rng.random() {
            let ratios = self.rating_array(CompositeKey::Rebounding, self.d, 3.0);
            let slot = CourtSlot(self.rng.pick_player(&ratios, None));
            let p = self.on_court(self.d, slot);
            self.record_stat(self.d, p, StatKind::Drb, 1);
            self.record_event(EventKind::Drb, EventPlayers::defense(p), None);
            return PossessionOutcome::DefensiveRebound;
        }

        let ratios = self.rating_array(CompositeKey::Rebounding, self.o, 5.0);
        let slot = CourtSlot(self.rng.pick_player(&ratios, None));
        let p = self.on_court(self.o, slot);
        self.record_stat(self.o, p, StatKind::Orb, 1);
        self.record_event(EventKind::Orb, EventPlayers::offense(p), None);
        PossessionOutcome::OffensiveRebound
    }
}
