//! Replay scripts: a JSON list of link, engine, sample and event steps used to
//! drive the runtime against placeholder collaborators.

use crate::error::TurnResult;
use crate::link::LinkEvent;
use crate::turn::AudioEvent;
use serde::Deserialize;
use std::path::Path;

/// One scripted step (`step` tag, snake_case).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ReplayStep {
    /// Report a network link transition.
    Link { state: LinkEvent },
    /// Set the engine's playback-active flag.
    Playing { active: bool },
    /// Set the engine's recording-active flag.
    Recording { active: bool },
    /// Submit an audio event and wait for its outcome.
    Event { event: AudioEvent },
    /// Forward a batch of `count` silent samples.
    Samples { count: usize },
    /// Make the next remote send fail.
    FailNextSend,
}

/// A parsed replay script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayScript {
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    /// Parse a script from JSON text.
    pub fn parse(json: &str) -> TurnResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a script file.
    pub fn load(path: &Path) -> TurnResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}
