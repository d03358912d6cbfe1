//! User-facing feedback cues (display animations on the device).
//!
//! Fire-and-forget: the turn logic never depends on a cue being shown.

use serde::{Deserialize, Serialize};

/// Animation or indicator the display should switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiCue {
    /// Network link is down or being established.
    WifiConnecting,
    /// Session ready, waiting for the user.
    MicIdle,
    /// Button pressed, capturing the user.
    Listening,
}

/// Display/feedback collaborator.
pub trait Feedback: Send + Sync {
    /// Switch to `cue`. Must not block.
    fn show(&self, cue: UiCue);
}

/// Feedback sink that discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFeedback;

impl Feedback for NoopFeedback {
    fn show(&self, _cue: UiCue) {}
}
