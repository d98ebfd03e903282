use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Unsupported schema version: found {found}, expected {expected}")]
    InvalidSchemaVersion { found: u8, expected: u8 },

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Forced winner did not win within {retries} retries")]
    ForcedWinnerExhausted { retries: u32 },
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            GameError::Deserialization(err.to_string())
        } else {
            GameError::Serialization(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialization_error_from_bad_json() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let game_err: GameError = err.into();
        assert!(matches!(game_err, GameError::Deserialization(_)));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let err = GameError::InvalidSchemaVersion { found: 9, expected: 1 };
        assert!(err.to_string().contains("found 9"));

        let err = GameError::ForcedWinnerExhausted { retries: 1024 };
        assert!(err.to_string().contains("1024"));
    }
}
