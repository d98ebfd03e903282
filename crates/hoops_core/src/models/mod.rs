pub mod events;
pub mod game_result;
pub mod player;
pub mod position;
pub mod ratings;
pub mod stats;
pub mod team;

pub use events::{
    AnimationEvent, CourtSlot, EventKind, EventPlayers, Report, RosterIndex, ScoreLine, TeamSide,
};
pub use game_result::GameResult;
pub use player::{Player, PlayerData};
pub use position::{calculate_position, Position};
pub use ratings::{
    calculate_overall, compute_composites, CompositeKey, CompositeRating, Ratings, Skill,
};
pub use stats::{GameStats, StatKind};
pub use team::{synergy_from_players, Synergy, Team, TeamData};
