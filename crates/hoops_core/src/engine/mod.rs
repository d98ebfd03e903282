pub mod config;
pub mod game_sim;
pub mod probability;
pub mod rng;

pub use config::{GameConfig, GameConfigOverride};
pub use game_sim::{GamePlan, GameSim};
pub use rng::GameRng;
