//! Error types for the PAGI turn controller

use thiserror::Error;

/// Result type alias for turn controller operations
pub type TurnResult<T> = Result<T, TurnError>;

/// Errors that can occur while driving a conversation turn.
///
/// None of these are fatal to the controller: collaborator failures are
/// absorbed into [`crate::turn::TurnOutcome::warnings`] and logged.
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Remote channel send error: {0}")]
    RemoteSend(String),

    #[error("Audio playback error: {0}")]
    Playback(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Channel send error: {0}")]
    ChannelSend(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Turn runtime already started")]
    AlreadyStarted,

    #[error("Turn runtime not started")]
    NotStarted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ConfigError> for TurnError {
    fn from(err: config::ConfigError) -> Self {
        TurnError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_maps_to_config_variant() {
        let err: TurnError = config::ConfigError::Message("bad key".to_string()).into();
        assert!(matches!(err, TurnError::Config(ref m) if m.contains("bad key")));
    }

    #[test]
    fn test_display_includes_detail() {
        let err = TurnError::RemoteSend("busy".to_string());
        assert_eq!(err.to_string(), "Remote channel send error: busy");
    }
}
