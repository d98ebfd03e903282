pub mod json_api;

pub use json_api::{
    simulate_batch, simulate_game, simulate_game_json, simulate_single, ForcedWinner, GameRequest,
    GameResponse, DEFAULT_MAX_FORCED_RETRIES,
};
