//! Runtime configuration.
//!
//! Precedence: env `PAGI_TURN__*` > file at `PAGI_TURN_CONFIG` (default
//! `config/turn`, optional) > built-in defaults.

use crate::error::{TurnError, TurnResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the turn runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnConfig {
    /// Capture sample rate in Hz (default: 16000). Used to report uplinked audio duration.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Playback volume applied at startup, 0-100 (default: 100).
    #[serde(default = "default_playback_volume")]
    pub playback_volume: u8,

    /// Log every turn outcome at info level (default: true).
    #[serde(default = "default_outcome_log")]
    pub outcome_log: bool,
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_playback_volume() -> u8 {
    100
}

fn default_outcome_log() -> bool {
    true
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            playback_volume: default_playback_volume(),
            outcome_log: default_outcome_log(),
        }
    }
}

impl TurnConfig {
    /// Load from file and environment, then validate.
    pub fn load() -> TurnResult<Self> {
        let config_path =
            std::env::var("PAGI_TURN_CONFIG").unwrap_or_else(|_| "config/turn".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Load with an explicit file path (extension optional, missing file is fine).
    pub fn load_from(path: &Path) -> TurnResult<Self> {
        let builder = config::Config::builder()
            .set_default("sample_rate", default_sample_rate() as i64)?
            .set_default("playback_volume", default_playback_volume() as i64)?
            .set_default("outcome_log", default_outcome_log())?;

        let built = builder
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("PAGI_TURN").separator("__"))
            .build()?;

        let cfg: Self = built.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values outside the supported ranges.
    pub fn validate(&self) -> TurnResult<()> {
        if self.sample_rate == 0 || self.sample_rate > 96_000 {
            return Err(TurnError::Config(format!(
                "sample_rate must be in 1..=96000 Hz, got {}",
                self.sample_rate
            )));
        }
        if self.playback_volume > 100 {
            return Err(TurnError::Config(format!(
                "playback_volume must be 0-100, got {}",
                self.playback_volume
            )));
        }
        Ok(())
    }
}
