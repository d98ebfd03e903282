//! Dual-stream output recording.
//!
//! Every notable action funnels through `record_event`, which may produce
//! (a) report text only (shot attempts, assist annotations), or (b) an
//! animation event plus a report. Assist annotations never create a new
//! report entry; they retroactively extend the made shot they belong to.

use super::GameSim;
use crate::models::{
    AnimationEvent, CompositeKey, CourtSlot, EventKind, EventPlayers, Report, ScoreLine, TeamSide,
};

/// Output buffers for one simulation.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub events: Vec<AnimationEvent>,
    pub reports: Vec<Report>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameSim {
    /// Record one event into the output streams. `override_offense` swaps
    /// the team context for events that are not about the current offense
    /// (jump balls, substitutions, injuries).
    pub(crate) fn record_event(
        &mut self,
        kind: EventKind,
        players: EventPlayers,
        override_offense: Option<TeamSide>,
    ) {
        let side = override_offense.unwrap_or(self.o);

        if kind == EventKind::Ast {
            self.annotate_assist(side, players);
            return;
        }

        let animation = if kind.is_text_only() {
            None
        } else {
            self.record_animation(kind, players, side);
            Some(self.recorder.events.len() - 1)
        };

        self.save_report(kind, side, players, animation);
    }

    fn record_animation(&mut self, kind: EventKind, players: EventPlayers, side: TeamSide) {
        let jitter = self.rng.random();
        let score = [self.quarter_score_total(0), self.quarter_score_total(1)];
        let players_on_court = [
            self.players_on_court[0].iter().map(|index| index.0).collect(),
            self.players_on_court[1].iter().map(|index| index.0).collect(),
        ];

        self.recorder.events.push(AnimationEvent {
            kind,
            clock_seconds: self.t * 60.0,
            jitter,
            players,
            players_on_court,
            offensive_team: side,
            score,
        });
    }

    fn save_report(
        &mut self,
        kind: EventKind,
        side: TeamSide,
        players: EventPlayers,
        animation: Option<usize>,
    ) {
        let text = self.narrative(kind, side, players);

        let report = Report {
            kind,
            text,
            team: side,
            time: self.clock_string(),
            seconds_elapsed: self.seconds_elapsed_from_start(),
            score: [self.team[0].stat.pts, self.team[1].stat.pts],
            scoreline: [self.score_line(0), self.score_line(1)],
            players: if players == EventPlayers::default() { None } else { Some(players) },
            animation,
        };
        self.recorder.reports.push(report);
    }

    /// Attach "(assist: X)" to the most recent made-shot report.
    fn annotate_assist(&mut self, side: TeamSide, players: EventPlayers) {
        let Some(passer) = players.offense else {
            return;
        };
        let name = self.player(side, passer).name.clone();

        for report in self.recorder.reports.iter_mut().rev() {
            if report.kind.is_made_shot() {
                report.text.push_str(&format!(" (assist: {name})"));
                return;
            }
        }
    }

    // =========================================================================
    // Narrative text
    // =========================================================================

    /// Play-by-play text for one event. Templates are weighted per kind;
    /// `{0}`/`{1}` stand for the primary and secondary actor names.
    fn narrative(&mut self, kind: EventKind, side: TeamSide, players: EventPlayers) -> String {
        let (name0, name1) = self.narrative_names(kind, side, players);

        let text = match kind {
            EventKind::ElamActive => {
                format!("Target score set at {}", self.elam_target)
            }
            EventKind::ElamDone => "The target score has been reached".to_string(),
            EventKind::TimeOver => "Time Over".to_string(),
            EventKind::GameOver => "End of game".to_string(),
            EventKind::JumpBall => "{0} won the jump ball".to_string(),
            EventKind::QuarterStart => {
                let period = self.team[0].stat.pts_qtrs.len();
                format!("Start of {} {}", ordinal(period), period_name(self.num_periods))
            }
            EventKind::QuarterEnd => {
                let period = self.team[0].stat.pts_qtrs.len();
                format!("End of {} {}", ordinal(period), period_name(self.num_periods))
            }
            EventKind::Overtime => {
                let count =
                    self.team[0].stat.pts_qtrs.len().saturating_sub(self.num_periods as usize);
                if count == 1 {
                    "Start of overtime".to_string()
                } else {
                    format!("Start of {} overtime", ordinal(count))
                }
            }
            EventKind::Sub => {
                // {0} checks in for the player going out (carried in the
                // assist slot).
                let going_out = players
                    .assist
                    .map(|index| self.player(side, index).name.clone())
                    .unwrap_or_default();
                let coming_in = name0.clone().unwrap_or_default();
                format!("Substitution: {coming_in} for {going_out}")
            }
            EventKind::Injury => "{0} was injured!".to_string(),
            EventKind::Tov => "{0} turned the ball over".to_string(),
            EventKind::Stl => "{1} stole the ball from {0}".to_string(),
            EventKind::FgaAtRim => "{0} elevates for a shot at the rim".to_string(),
            EventKind::FgaLowPost => "{0} attempts a low post shot".to_string(),
            EventKind::FgaMidRange => "{0} attempts a mid-range shot".to_string(),
            EventKind::FgaTp => "{0} attempts a three pointer".to_string(),
            EventKind::FgAtRim => {
                // Sync the report with the animation: pick somebody to get
                // dunked on.
                let ratios = self.rating_array(CompositeKey::Blocking, side.opponent(), 5.0);
                let slot = CourtSlot(self.rng.pick_player(&ratios, None));
                let dunked_on = self.on_court(side.opponent(), slot);
                let dunked_on_name = self.player(side.opponent(), dunked_on).name.clone();
                self.weighted_text(&[
                    (format!("{{0}} throws it down on {dunked_on_name}!"), 1.0),
                    ("{0} slams it home".to_string(), 2.0),
                    ("The layup is good".to_string(), 2.0),
                ])
            }
            EventKind::FgAtRimAndOne => self.weighted_text(&[
                ("{0} throws it down on {1}, and a foul!".to_string(), 1.0),
                ("{0} slams it home, and a foul!".to_string(), 2.0),
                ("The layup is good, and a foul!".to_string(), 2.0),
            ]),
            EventKind::FgLowPost | EventKind::FgMidRange | EventKind::Tp => {
                "It's good!".to_string()
            }
            EventKind::FgLowPostAndOne | EventKind::FgMidRangeAndOne | EventKind::TpAndOne => {
                "It's good, and a foul!".to_string()
            }
            EventKind::BlkAtRim => self.weighted_text(&[
                ("{1} blocked the layup attempt".to_string(), 1.0),
                ("{1} blocked the dunk attempt".to_string(), 1.0),
            ]),
            EventKind::BlkLowPost | EventKind::BlkMidRange | EventKind::BlkTp => {
                "Blocked by {1}!".to_string()
            }
            EventKind::MissAtRim => self.weighted_text(&[
                ("{0} missed the layup".to_string(), 1.0),
                ("The layup attempt rolls out".to_string(), 1.0),
                ("No good".to_string(), 3.0),
            ]),
            EventKind::MissLowPost | EventKind::MissMidRange | EventKind::MissTp => self
                .weighted_text(&[
                    ("The shot rims out".to_string(), 1.0),
                    ("No good".to_string(), 4.0),
                    ("{0} bricks it".to_string(), 1.0),
                ]),
            EventKind::Orb => "{0} grabbed the offensive rebound".to_string(),
            EventKind::Drb => "{0} grabbed the defensive rebound".to_string(),
            EventKind::Oob => "no rebound".to_string(),
            EventKind::Ft => "{0} made a free throw".to_string(),
            EventKind::MissFt => "{0} missed a free throw".to_string(),
            EventKind::PfNonShooting => "Non-shooting foul on {0}".to_string(),
            EventKind::PfBonus => {
                "Non-shooting foul on {0}. They are in the penalty, so two FTs for {1}"
                    .to_string()
            }
            EventKind::PfFg => "Shooting foul on {0}, two FTs for {1}".to_string(),
            EventKind::PfTp => "Shooting foul on {0}, three FTs for {1}".to_string(),
            // The shot text already carries the description.
            EventKind::PfAndOne => "Foul on {0}".to_string(),
            EventKind::FoulOut => "{0} fouled out".to_string(),
            EventKind::Ast => "(assist: {0})".to_string(),
        };

        let mut text = text;
        if let Some(name) = name0 {
            text = text.replace("{0}", &name);
        }
        if let Some(name) = name1 {
            text = text.replace("{1}", &name);
        }

        if kind.shows_score() {
            text.push_str(&format!(
                " ({}-{})",
                self.team[0].stat.pts, self.team[1].stat.pts
            ));
        }

        text
    }

    /// Resolve the `{0}`/`{1}` names for an event. Fouls read defense
    /// first (the foul is on the fouler); everything else leads with the
    /// offensive actor and falls back to the defensive one.
    fn narrative_names(
        &self,
        kind: EventKind,
        side: TeamSide,
        players: EventPlayers,
    ) -> (Option<String>, Option<String>) {
        let offense_name =
            players.offense.map(|index| self.player(side, index).name.clone());
        let defense_name =
            players.defense.map(|index| self.player(side.opponent(), index).name.clone());

        if kind.is_foul() {
            (defense_name, offense_name)
        } else {
            match offense_name {
                Some(name) => (Some(name), defense_name),
                None => (defense_name, None),
            }
        }
    }

    fn weighted_text(&mut self, options: &[(String, f64)]) -> String {
        let weights: Vec<f64> = options.iter().map(|(_, w)| *w).collect();
        let index = self.rng.choice_index(&weights);
        options[index].0.clone()
    }

    // =========================================================================
    // Clock helpers
    // =========================================================================

    /// Remaining period clock as "M:SS", floored at 0:00 for display (the
    /// raw clock in the animation stream may be negative under elam).
    fn clock_string(&self) -> String {
        let t = self.t.max(0.0);
        let seconds = ((t % 1.0) * 60.0).floor() as i64;
        format!("{}:{:02}", t.floor() as i64, seconds)
    }

    /// Seconds since the opening tip. Overtime periods are shorter than
    /// regulation ones, so completed periods are priced separately.
    fn seconds_elapsed_from_start(&self) -> f64 {
        let period = self.team[0].stat.pts_qtrs.len();
        let completed = period.saturating_sub(1);
        let overtime_duration = (0.4 * self.config.quarter_length).ceil();
        let period_duration =
            if self.overtimes > 0 { overtime_duration } else { self.config.quarter_length };

        let completed_regulation = completed.min(self.num_periods as usize);
        let completed_overtimes = completed.saturating_sub(self.num_periods as usize);

        let seconds_from_period_start = (period_duration - self.t) * 60.0;
        completed_regulation as f64 * self.config.quarter_length * 60.0
            + completed_overtimes as f64 * overtime_duration * 60.0
            + seconds_from_period_start
    }

    fn quarter_score_total(&self, t: usize) -> u32 {
        self.team[t].stat.pts_qtrs.iter().sum()
    }

    fn score_line(&self, t: usize) -> ScoreLine {
        ScoreLine {
            id: self.team[t].id,
            name: self.team[t].name.clone(),
            pts: self.team[t].stat.pts,
        }
    }
}

/// "1st", "2nd", "3rd", "4th", ...
pub(crate) fn ordinal(x: usize) -> String {
    let suffix = if (11..=13).contains(&(x % 100)) {
        "th"
    } else {
        match x % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{x}{suffix}")
}

/// What one period of the game is called.
pub(crate) fn period_name(num_periods: u32) -> &'static str {
    match num_periods {
        2 => "half",
        4 => "quarter",
        _ => "period",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_suffixes() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(111), "111th");
    }

    #[test]
    fn test_period_name() {
        assert_eq!(period_name(2), "half");
        assert_eq!(period_name(4), "quarter");
        assert_eq!(period_name(3), "period");
        assert_eq!(period_name(6), "period");
    }
}
