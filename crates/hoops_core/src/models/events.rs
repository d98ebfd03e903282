//! Event vocabulary shared by the animation stream and the play-by-play
//! reports.
//!
//! The two player index spaces are kept as distinct types on purpose:
//! `CourtSlot` addresses the five-or-fewer on-court slots of one team, and
//! `RosterIndex` addresses a team's full roster. Everything recorded into
//! the output streams uses roster indices; slots only exist inside the
//! possession resolver.

use serde::{Deserialize, Serialize};

/// Which of the two teams; home is always side 0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub const BOTH: [TeamSide; 2] = [TeamSide::Home, TeamSide::Away];

    pub fn index(self) -> usize {
        match self {
            TeamSide::Home => 0,
            TeamSide::Away => 1,
        }
    }

    pub fn opponent(self) -> TeamSide {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

/// Index into the on-court slot array of one team (0..numPlayersOnCourt).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourtSlot(pub usize);

/// Index into a team's roster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterIndex(pub usize);

/// Everything the simulation can report. One closed set for both streams;
/// the recorder dispatches exhaustively, so adding a variant without
/// narrative text is a compile error rather than a silent fallback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    ElamActive,
    ElamDone,
    TimeOver,
    GameOver,
    JumpBall,
    QuarterStart,
    QuarterEnd,
    Overtime,
    Sub,
    Injury,
    Tov,
    Stl,
    FgaAtRim,
    FgaLowPost,
    FgaMidRange,
    FgaTp,
    FgAtRim,
    FgAtRimAndOne,
    FgLowPost,
    FgLowPostAndOne,
    FgMidRange,
    FgMidRangeAndOne,
    Tp,
    TpAndOne,
    MissAtRim,
    MissLowPost,
    MissMidRange,
    MissTp,
    BlkAtRim,
    BlkLowPost,
    BlkMidRange,
    BlkTp,
    Ft,
    MissFt,
    PfNonShooting,
    PfBonus,
    PfFg,
    PfTp,
    PfAndOne,
    FoulOut,
    Oob,
    Drb,
    Orb,
    Ast,
}

impl EventKind {
    /// Shot attempts and assist annotations never become animation events;
    /// they only contribute play-by-play text.
    pub fn is_text_only(self) -> bool {
        matches!(
            self,
            EventKind::FgaAtRim
                | EventKind::FgaLowPost
                | EventKind::FgaMidRange
                | EventKind::FgaTp
                | EventKind::Ast
        )
    }

    pub fn is_made_shot(self) -> bool {
        matches!(
            self,
            EventKind::FgAtRim
                | EventKind::FgAtRimAndOne
                | EventKind::FgLowPost
                | EventKind::FgLowPostAndOne
                | EventKind::FgMidRange
                | EventKind::FgMidRangeAndOne
                | EventKind::Tp
                | EventKind::TpAndOne
        )
    }

    /// Scoring plays get the running score appended to their report text.
    pub fn shows_score(self) -> bool {
        self.is_made_shot() || self == EventKind::Ft
    }

    pub fn is_foul(self) -> bool {
        matches!(
            self,
            EventKind::PfNonShooting
                | EventKind::PfBonus
                | EventKind::PfFg
                | EventKind::PfTp
                | EventKind::PfAndOne
                | EventKind::FoulOut
        )
    }
}

/// Roster references attached to an event. Which of the three are present
/// depends on the event kind (a steal has an offense victim and a defense
/// thief, a substitution reuses offense for the player coming in and
/// assist for the player going out).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventPlayers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offense: Option<RosterIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defense: Option<RosterIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assist: Option<RosterIndex>,
}

impl EventPlayers {
    pub fn offense(p: RosterIndex) -> Self {
        Self { offense: Some(p), ..Default::default() }
    }

    pub fn defense(p: RosterIndex) -> Self {
        Self { defense: Some(p), ..Default::default() }
    }
}

/// One renderable event: enough for an animation layer to stage the play
/// without re-deriving game state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimationEvent {
    pub kind: EventKind,
    /// Game clock remaining in the current period, in seconds. May go
    /// negative once the elam ending ignores the clock.
    pub clock_seconds: f64,
    /// Fresh RNG draw for renderer-side variation (camera picks, crowd).
    pub jitter: f64,
    pub players: EventPlayers,
    /// Occupied on-court slots per team at the time of the event, as
    /// roster indices.
    pub players_on_court: [Vec<usize>; 2],
    pub offensive_team: TeamSide,
    pub score: [u32; 2],
}

/// Minimal team snapshot embedded in each report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreLine {
    pub id: u32,
    pub name: String,
    pub pts: u32,
}

/// One play-by-play entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub kind: EventKind,
    pub text: String,
    /// Team context for the entry (the offense, unless the kind overrides).
    pub team: TeamSide,
    /// Clock string "M:SS" remaining in the period, floored at 0:00.
    pub time: String,
    /// Seconds elapsed since the opening tip, accounting for the shorter
    /// overtime periods.
    pub seconds_elapsed: f64,
    pub score: [u32; 2],
    pub scoreline: [ScoreLine; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<EventPlayers>,
    /// Index into the animation stream, for report kinds that render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<usize>,
}
