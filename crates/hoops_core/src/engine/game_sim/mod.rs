//! Game Simulation Engine
//!
//! Possession-by-possession simulation of one basketball game. This module
//! owns the state machine:
//!
//! - Clock and period management (regulation, overtime, elam ending)
//! - The possession loop (turnovers, shots, fouls, rebounds)
//! - Fatigue, substitutions and injuries
//! - Dual-stream output recording (animation events + play-by-play reports)
//!
//! ## Architecture
//!
//! The engine is an exclusively-owned context value: RNG, both teams, clock
//! and foul counters, and the output buffers all live on `GameSim`. Every
//! resolution step is a method mutating that context; nothing is global, so
//! independent games can run in parallel with no coordination.
//!
//! `impl GameSim` is split across focused files:
//!
//! | File | Responsibility |
//! |------|----------------|
//! | `mod.rs` | State, lifecycle, clock strategy, stat recording |
//! | `outcome.rs` | Possession outcome resolution |
//! | `lineup.rs` | Substitutions, synergy, fatigue bookkeeping, injuries |
//! | `recorder.rs` | Animation events and narrative reports |
//!
//! ## Index spaces
//!
//! Two player index spaces exist and are deliberately kept as distinct
//! types: `CourtSlot` (position in the on-court array, what the weighted
//! picks produce) and `RosterIndex` (position in the team's roster, what
//! stats and events reference). `GameSim::on_court` is the only mapping
//! between them.

mod lineup;
mod outcome;
mod recorder;

pub(crate) use recorder::Recorder;

use crate::engine::config::GameConfig;
use crate::engine::probability::bound;
use crate::engine::rng::GameRng;
use crate::error::{GameError, Result};
use crate::models::{
    CompositeKey, CourtSlot, EventKind, EventPlayers, GameResult, Player, RosterIndex, StatKind,
    Team, TeamSide,
};

/// Everything needed to run one game.
#[derive(Debug)]
pub struct GamePlan {
    /// Home team first; home-court advantage favors index 0.
    pub teams: [Team; 2],
    /// Exhibition games skip home-court advantage, shoot a little better
    /// and rarely draw fouls.
    pub exhibition: bool,
    /// Millisecond timestamp; doubles as the RNG seed.
    pub timestamp: u64,
    pub config: GameConfig,
}

/// Terminal state of one possession. `OffensiveRebound` and
/// `NonShootingFoul` hand the ball straight back to the offense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PossessionOutcome {
    EndOfQuarter,
    Turnover,
    Steal,
    NonShootingFoul,
    MadeShot,
    OffensiveRebound,
    DefensiveRebound,
    OutOfBounds,
}

pub struct GameSim {
    pub(crate) config: GameConfig,
    pub(crate) rng: GameRng,
    pub(crate) team: [Team; 2],
    pub(crate) players_on_court: [Vec<RosterIndex>; 2],
    starters_recorded: bool,
    /// Expected possessions between substitution passes.
    subs_every_n: i64,
    pub(crate) overtimes: u32,
    /// Minutes remaining in the current period. Goes negative once the
    /// elam ending ignores the clock.
    pub(crate) t: f64,
    pub(crate) num_periods: u32,
    pub(crate) fouls_this_quarter: [u32; 2],
    pub(crate) fouls_last_two_minutes: [u32; 2],
    average_possession_length: f64,
    pub(crate) synergy_factor: f64,
    pub(crate) o: TeamSide,
    pub(crate) d: TeamSide,
    pub(crate) exhibition: bool,
    elam: bool,
    pub(crate) elam_active: bool,
    pub(crate) elam_done: bool,
    pub(crate) elam_target: u32,
    pub(crate) fatigue_factor: f64,
    pub(crate) num_players_on_court: usize,
    base_injury_rate: f64,
    shot_clock: f64,
    start_timestamp: u64,
    pub(crate) recorder: Recorder,
}

impl GameSim {
    pub fn new(plan: GamePlan) -> Result<Self> {
        let GamePlan { teams, exhibition, timestamp, config } = plan;

        config.validate()?;
        for team in &teams {
            team.validate(config.num_players_on_court)
                .map_err(GameError::InvalidRoster)?;
        }

        let rng = GameRng::from_seed(timestamp);
        let num_players_on_court = config.num_players_on_court;

        // The relationship between average possession length and the actual
        // possession count is not perfect, hence the correction term.
        let mut pace_factor = config.pace / 100.0;
        pace_factor += 0.025 * bound((pace_factor - 1.0) / 0.2, -1.0, 1.0);
        let num_possessions =
            (teams[0].pace + teams[1].pace) / 2.0 * 1.1 * pace_factor;
        let average_possession_length = 48.0 / (2.0 * num_possessions);

        let starting_lineup: Vec<RosterIndex> =
            (0..num_players_on_court).map(RosterIndex).collect();

        let mut sim = Self {
            rng,
            team: teams,
            players_on_court: [starting_lineup.clone(), starting_lineup],
            starters_recorded: false,
            subs_every_n: 6,
            overtimes: 0,
            t: config.quarter_length,
            num_periods: config.num_periods,
            fouls_this_quarter: [0, 0],
            fouls_last_two_minutes: [0, 0],
            average_possession_length,
            synergy_factor: config.synergy_factor,
            o: TeamSide::Home,
            d: TeamSide::Away,
            exhibition,
            elam: config.elam,
            elam_active: false,
            elam_done: false,
            elam_target: 0,
            fatigue_factor: 0.055 / 1.85,
            num_players_on_court,
            base_injury_rate: config.base_injury_rate,
            shot_clock: config.shot_clock,
            start_timestamp: timestamp,
            recorder: Recorder::new(),
            config,
        };

        // Starting lineups; must run before anything else because injured
        // carry-over players may sit in the top roster spots.
        sim.update_players_on_court(None);
        sim.update_synergy();

        if !sim.exhibition {
            sim.home_court_advantage();
        }

        Ok(sim)
    }

    /// Simulate the game to its terminal state and return the full bundle.
    pub fn run(mut self) -> GameResult {
        self.sim_regulation();

        while self.team[0].stat.pts == self.team[1].stat.pts {
            self.sim_overtime();
        }

        if self.elam_done {
            self.record_event(EventKind::ElamDone, EventPlayers::default(), None);
        } else {
            self.record_event(EventKind::TimeOver, EventPlayers::default(), None);
        }
        self.record_event(EventKind::GameOver, EventPlayers::default(), None);

        let elam_target = if self.elam_active { Some(self.elam_target) } else { None };
        GameResult {
            events: self.recorder.events,
            reports: self.recorder.reports,
            teams: self.team,
            overtimes: self.overtimes,
            num_players_on_court: self.num_players_on_court,
            elam_target,
            start_timestamp: self.start_timestamp,
        }
    }

    // =========================================================================
    // Period loops
    // =========================================================================

    fn sim_regulation(&mut self) {
        let mut quarter = 1;
        let mut won_jump: Option<TeamSide> = None;

        while !self.elam_done && quarter <= self.num_periods {
            for t in 0..2 {
                self.team[t].stat.pts_qtrs.push(0);
            }
            self.fouls_this_quarter = [0, 0];
            self.fouls_last_two_minutes = [0, 0];
            self.t = self.config.quarter_length;
            self.record_event(EventKind::QuarterStart, EventPlayers::default(), None);

            let winner = match won_jump {
                Some(winner) => winner,
                None => {
                    let winner = self.jump_ball();
                    won_jump = Some(winner);
                    winner
                }
            };

            // Assignments look inverted because sim_possession swaps
            // offense and defense at the top of every possession.
            if jump_ball_winner_starts_period(quarter, self.num_periods) {
                self.o = winner.opponent();
            } else {
                self.o = winner;
            }
            self.d = self.o.opponent();

            // Before the loop, in case the threshold is the full quarter.
            self.check_elam_ending();
            while (self.t > 0.5 / 60.0 || self.elam_active) && !self.elam_done {
                self.sim_possession();
                self.check_elam_ending();
            }

            if !self.elam_done {
                self.record_event(EventKind::QuarterEnd, EventPlayers::default(), None);
            }

            quarter += 1;
        }
    }

    fn sim_overtime(&mut self) {
        self.t = (0.4 * self.config.quarter_length).ceil();
        if self.t == 0.0 {
            self.t = 5.0;
        }

        self.overtimes += 1;
        for t in 0..2 {
            self.team[t].stat.pts_qtrs.push(0);
        }
        self.fouls_this_quarter = [0, 0];
        self.fouls_last_two_minutes = [0, 0];
        self.record_event(EventKind::Overtime, EventPlayers::default(), None);
        self.jump_ball();

        while self.t > 0.5 / 60.0 {
            self.sim_possession();
        }
    }

    /// Contest the opening tip. Returns the side that won possession.
    fn jump_ball(&mut self) -> TeamSide {
        let jumpers: [RosterIndex; 2] = [TeamSide::Home, TeamSide::Away].map(|side| {
            let ratios = self.rating_array(CompositeKey::JumpBall, side, 1.0);
            let mut best_slot = 0;
            let mut best = f64::NEG_INFINITY;
            for (slot, &ratio) in ratios.iter().enumerate() {
                if ratio > best {
                    best = ratio;
                    best_slot = slot;
                }
            }
            self.on_court(side, CourtSlot(best_slot))
        });

        let home_jb = self.player(TeamSide::Home, jumpers[0]).composite_rating.jump_ball;
        let away_jb = self.player(TeamSide::Away, jumpers[1]).composite_rating.jump_ball;
        // Cubed ratio; a zeroed away rating just hands home the tip.
        let prob = if away_jb > 0.0 { 0.5 * (home_jb / away_jb).powi(3) } else { 1.0 };

        // Inverted assignment again: the winner must be on defense here so
        // the swap at the top of the first possession puts them on offense.
        self.o = if self.rng.random() < prob { TeamSide::Away } else { TeamSide::Home };
        self.d = self.o.opponent();

        let winner = self.d;
        self.record_event(
            EventKind::JumpBall,
            EventPlayers::offense(jumpers[winner.index()]),
            Some(winner),
        );
        winner
    }

    fn check_elam_ending(&mut self) {
        if self.elam
            && !self.elam_active
            && self.team[0].stat.pts_qtrs.len() as u32 >= self.num_periods
            && self.t <= self.config.elam_minutes
        {
            let max_pts = self.team[0].stat.pts.max(self.team[1].stat.pts);
            self.elam_target = max_pts + self.config.elam_points;
            self.elam_active = true;
            log::debug!("elam ending active, target {}", self.elam_target);
            self.record_event(EventKind::ElamActive, EventPlayers::default(), None);
        }
    }

    // =========================================================================
    // Possession loop
    // =========================================================================

    fn sim_possession(&mut self) {
        // Possession change.
        self.o = self.o.opponent();
        self.d = self.o.opponent();
        self.update_team_composite_ratings();

        // Clock.
        let intentional_foul = self.should_intentional_foul();
        let possession_length = self.get_possession_length(intentional_foul);
        self.t -= possession_length;

        let outcome = self.resolve_possession(possession_length, intentional_foul);

        // Swap back so the offense keeps the ball after an offensive board
        // or a non-shooting foul (they get re-swapped at the next top).
        if matches!(
            outcome,
            PossessionOutcome::OffensiveRebound | PossessionOutcome::NonShootingFoul
        ) {
            self.o = self.o.opponent();
            self.d = self.o.opponent();
        }

        self.shot_clock = if outcome == PossessionOutcome::OffensiveRebound {
            self.config.orb_shot_clock
        } else {
            self.config.shot_clock
        };

        self.update_playing_time(possession_length);
        self.roll_injuries();

        let game_over = if self.elam {
            self.elam_done
        } else {
            self.t <= 0.0
                && self.team[0].stat.pts_qtrs.len() as u32 >= self.num_periods
                && self.team[0].stat.pts != self.team[1].stat.pts
        };

        if !game_over && self.rng.rand_int(1, self.subs_every_n) == 1 {
            let substitutions = self.update_players_on_court(None);
            if substitutions {
                self.update_synergy();
            }
        }
    }

    /// Pick how long the offense holds the ball, in minutes. Strategy
    /// depends on score, clock and the two-for-one window.
    fn get_possession_length(&mut self, intentional_foul: bool) -> f64 {
        let quarter = self.team[self.o.index()].stat.pts_qtrs.len() as u32;
        let point_differential =
            self.team[self.o.index()].stat.pts as i64 - self.team[self.d.index()].stat.pts as i64;

        // Run out the clock if winning.
        if quarter >= self.num_periods
            && !self.elam_active
            && self.t <= self.shot_clock / 60.0
            && point_differential > 0
            && !intentional_foul
        {
            return self.t;
        }

        let hold_for_last_shot = !self.elam_active
            && self.t <= 26.0 / 60.0
            && (quarter < self.num_periods || point_differential >= 0);
        let catch_up = !self.elam_active
            && quarter >= self.num_periods
            && ((self.t <= 3.0 && point_differential <= -10)
                || (self.t <= 2.0 && point_differential <= -5)
                || (self.t <= 1.0 && point_differential < 0));
        let maintain_lead = !self.elam_active
            && quarter >= self.num_periods
            && ((self.t <= 3.0 && point_differential > 10)
                || (self.t <= 2.0 && point_differential > 5)
                || (self.t <= 1.0 && point_differential > 0));
        let two_for_one =
            !self.elam_active && self.t >= 32.0 / 60.0 && self.t <= 52.0 / 60.0;

        let mut lower_bound = 4.0 / 60.0;
        let mut upper_bound = self.shot_clock / 60.0;
        if lower_bound > self.t {
            lower_bound = self.t;
        }
        if upper_bound > self.t {
            upper_bound = self.t;
        }

        let possession_length;
        if intentional_foul {
            possession_length = self.rng.random() * 3.0 / 60.0;
            lower_bound = 0.0;
            upper_bound = self.t;
        } else if hold_for_last_shot {
            possession_length = self.rng.gauss(self.t, 5.0 / 60.0);
        } else if catch_up {
            possession_length =
                self.rng.gauss(self.average_possession_length - 3.0 / 60.0, 5.0 / 60.0);
            if self.t < 48.0 / 60.0 && self.t > 4.0 / 60.0 {
                upper_bound = self.t / 2.0;
            }
        } else if maintain_lead {
            possession_length =
                self.rng.gauss(self.average_possession_length + 3.0 / 60.0, 5.0 / 60.0);
        } else {
            possession_length = self.rng.gauss(self.average_possession_length, 5.0 / 60.0);
        }

        if two_for_one && !catch_up && !maintain_lead && self.rng.random() < 0.6 {
            // 32-52 seconds remain; aim to get the shot up with 29-35 left.
            lower_bound = self.t - 35.0 / 60.0;
            upper_bound = self.t - 29.0 / 60.0;
        }

        if upper_bound < lower_bound {
            lower_bound = upper_bound;
        }
        if lower_bound < 0.0 {
            lower_bound = 0.0;
        }
        if upper_bound < 1.0 / 60.0 {
            upper_bound = 1.0 / 60.0;
        }
        let upper_bound = if self.elam_active { f64::INFINITY } else { upper_bound };

        let bounded = bound(possession_length, lower_bound, upper_bound);
        let final_upper = if self.elam_active { f64::INFINITY } else { self.t };
        bound(bounded, 0.0, final_upper)
    }

    /// Decide before the clock runs whether the offense gives a deliberate
    /// foul to stop it. Only worthwhile while narrowly winning late.
    fn should_intentional_foul(&self) -> bool {
        if !self.config.allow_fouls {
            return false;
        }

        let diff =
            self.team[self.o.index()].stat.pts as i64 - self.team[self.d.index()].stat.pts as i64;
        let offense_winning_by_a_bit = diff > 0 && diff <= 6;

        offense_winning_by_a_bit
            && self.team[0].stat.pts_qtrs.len() as u32 >= self.num_periods
            && self.t < 27.0 / 60.0
            && !self.elam_active
            && self.fouls_until_bonus_remaining() <= 10
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    /// Map an on-court slot to the roster index occupying it.
    pub(crate) fn on_court(&self, side: TeamSide, slot: CourtSlot) -> RosterIndex {
        self.players_on_court[side.index()][slot.0]
    }

    pub(crate) fn player(&self, side: TeamSide, index: RosterIndex) -> &Player {
        &self.team[side.index()].players[index.0]
    }

    /// Fatigue multiplier from an energy level: 1 is fresh, towards 0 is
    /// gassed. Late in games (and in the elam endgame) the effect is
    /// compressed toward neutral.
    pub(crate) fn fatigue(&self, energy: f64) -> f64 {
        let mut energy = energy + 0.016;
        if energy > 1.0 {
            energy = 1.0;
        }

        if self.is_late_game() {
            let factor = 6.0 - self.t;
            return (energy + factor) / (1.0 + factor);
        }
        energy
    }

    pub(crate) fn is_late_game(&self) -> bool {
        let quarter = self.team[0].stat.pts_qtrs.len() as u32;
        if self.elam_active {
            let max_pts = self.team[0].stat.pts.max(self.team[1].stat.pts) as i64;
            self.elam_target as i64 - max_pts <= 15
        } else {
            quarter >= self.num_periods && self.t < self.config.quarter_length / 2.0
        }
    }

    /// Foul count at which a player starts sitting for foul trouble. Scales
    /// with game completion (2/3/5/5 by quarter under default settings) and
    /// is waived entirely once the outcome is being decided.
    pub(crate) fn foul_trouble_limit(&self) -> u32 {
        let fouls_needed = self.config.fouls_needed_to_foul_out;

        let quarter = self.team[0].stat.pts_qtrs.len() as u32;
        if self.overtimes > 0
            || self.elam_active
            || (quarter == self.num_periods && self.t < 8.0)
        {
            return fouls_needed;
        }

        let game_completion = (quarter as f64 - self.t / self.config.quarter_length)
            / self.num_periods as f64;

        let mut foul_limit = (game_completion * fouls_needed as f64).ceil();
        if foul_limit < 2.0 {
            // One foul is nobody's problem.
            foul_limit = 2.0;
        } else if foul_limit >= fouls_needed as f64 {
            foul_limit = fouls_needed as f64 - 1.0;
        }

        foul_limit as u32
    }

    /// 1 means no foul trouble; lower means increasingly likely to sit.
    pub(crate) fn foul_trouble_factor(pf: u32, foul_limit: u32) -> f64 {
        if pf == foul_limit {
            0.75
        } else if pf > foul_limit {
            0.1
        } else {
            1.0
        }
    }

    /// How many more team fouls until the offense shoots bonus free
    /// throws. Negative once the defense is deep in the penalty.
    pub(crate) fn fouls_until_bonus_remaining(&self) -> i64 {
        let thresholds = self.config.fouls_until_bonus;
        let d = self.d.index();
        if self.t <= 2.0 {
            return thresholds[2] as i64 - self.fouls_last_two_minutes[d] as i64;
        }
        if self.overtimes >= 1 {
            return thresholds[1] as i64 - self.fouls_this_quarter[d] as i64;
        }
        thresholds[0] as i64 - self.fouls_this_quarter[d] as i64
    }

    /// Composite ratings of the on-court players, fatigue-scaled and raised
    /// to `power`, floored at 5% of the array total so weighted picks never
    /// fully exclude anyone.
    pub(crate) fn rating_array(
        &self,
        rating: CompositeKey,
        side: TeamSide,
        power: f64,
    ) -> Vec<f64> {
        let n = self.num_players_on_court;
        let mut array = vec![0.0; n];
        let mut total = 0.0;

        let foul_limit = if rating == CompositeKey::Fouling {
            self.foul_trouble_limit() as i64
        } else {
            0
        };

        for (slot, value) in array.iter_mut().enumerate() {
            let index = self.players_on_court[side.index()][slot];
            let player = &self.team[side.index()].players[index.0];

            let mut composite = player.composite_rating.get(rating);
            if rating == CompositeKey::Fouling {
                // Players in foul trouble stop reaching.
                let pf = player.stat.pf as i64;
                if pf == foul_limit - 1 {
                    composite *= 0.8;
                } else if pf == foul_limit {
                    composite *= 0.5;
                } else if pf > foul_limit {
                    composite *= 0.25;
                }
            }

            *value = (composite * self.fatigue(player.stat.energy)).powf(power);
            total += *value;
        }

        let floor = 0.05 * total;
        for value in &mut array {
            if *value < floor {
                *value = floor;
            }
        }

        array
    }

    /// Scale every composite rating for home-court advantage. Endurance is
    /// exempt; turnovers and fouling are negative ratings, so their scaling
    /// is inverted.
    fn home_court_advantage(&mut self) {
        let modifier = bound(1.0 + self.config.home_court_advantage / 100.0, 0.01, f64::INFINITY);

        for side in TeamSide::BOTH {
            let factor = match side {
                TeamSide::Home => modifier,
                TeamSide::Away => 1.0 / modifier,
            };

            for player in &mut self.team[side.index()].players {
                for key in crate::models::ratings::ALL_COMPOSITE_KEYS {
                    if key == CompositeKey::Endurance {
                        continue;
                    }
                    let value = player.composite_rating.get(key);
                    let scaled = match key {
                        CompositeKey::Turnovers | CompositeKey::Fouling => value / factor,
                        _ => value * factor,
                    };
                    player.composite_rating.set(key, scaled);
                }
            }
        }
    }

    // =========================================================================
    // Stat recording
    // =========================================================================

    /// Increment an integer stat for a player, mirroring it onto the team
    /// totals. Points additionally feed the per-quarter array, every
    /// on-court player's plus-minus, and the elam target check.
    pub(crate) fn record_stat(
        &mut self,
        side: TeamSide,
        player: RosterIndex,
        kind: StatKind,
        amount: u32,
    ) {
        let t = side.index();
        self.team[t].players[player.0].stat.add(kind, amount);

        // Starts are a player-only stat.
        if kind == StatKind::Gs {
            return;
        }
        self.team[t].stat.add(kind, amount);

        if kind == StatKind::Pts {
            if let Some(current_quarter) = self.team[t].stat.pts_qtrs.last_mut() {
                *current_quarter += amount;
            }

            for side2 in 0..2 {
                let delta = if side2 == t { amount as i64 } else { -(amount as i64) };
                for slot in 0..self.num_players_on_court {
                    let index = self.players_on_court[side2][slot];
                    self.team[side2].players[index.0].stat.pm += delta;
                }
            }

            if self.elam_active
                && (self.team[0].stat.pts >= self.elam_target
                    || self.team[1].stat.pts >= self.elam_target)
            {
                self.elam_done = true;
            }
        }
    }
}

/// Which side starts a period with the ball, by jump-ball alternation.
/// Overtimes always restart with a fresh jump ball, so they return true.
pub(crate) fn jump_ball_winner_starts_period(period: u32, num_periods: u32) -> bool {
    if period > num_periods {
        return true;
    }

    let period_remainder = period % 2;

    // Odd period counts just alternate.
    if num_periods % 2 == 1 {
        return period_remainder == 1;
    }

    // Special case for halves.
    if period == 2 && num_periods == 2 {
        return false;
    }

    // Even counts alternate, except the period right after halftime repeats
    // the one before it.
    let first_period_after_halftime = num_periods / 2 + 1;
    if period < first_period_after_halftime {
        period_remainder == 1
    } else {
        period_remainder == 0
    }
}
