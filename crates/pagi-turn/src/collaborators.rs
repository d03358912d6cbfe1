//! Seams to the external collaborators: the audio engine, the remote chat
//! channel, and the session connector.
//!
//! Implementations are expected to be non-blocking (or to enqueue internally);
//! the controller never awaits their completion.

use crate::error::TurnResult;
use std::sync::Arc;

/// The audio capture/playback engine (wake word, VAD, I2S, playback task).
pub trait AudioEngine: Send + Sync {
    /// Whether capture is currently armed (wake word, button or VAD opened it).
    fn is_recording(&self) -> bool;

    /// Whether a reply is currently being played back.
    fn is_playing(&self) -> bool;

    /// (Re)start the playback task so it is ready to receive a reply.
    fn start_playback(&self) -> TurnResult<()>;

    /// Halt playback output immediately.
    fn stop_playback(&self) -> TurnResult<()>;

    /// Drop any buffered reply audio.
    fn clear_playback_buffer(&self) -> TurnResult<()>;

    /// Set the output volume, 0-100.
    fn set_volume(&self, percent: u8) -> TurnResult<()>;
}

/// An established conversation session with the remote agent.
pub trait RemoteChannel: Send + Sync {
    /// Forward captured PCM (16-bit little-endian mono).
    fn send_audio(&self, pcm: &[u8]) -> TurnResult<()>;

    /// Close out the current turn and request a reply.
    fn send_complete(&self) -> TurnResult<()>;

    /// Abandon the current turn without a reply.
    fn send_cancel(&self) -> TurnResult<()>;
}

/// Opens a remote session once the network link is up.
pub trait SessionConnector: Send + Sync {
    /// Open a new session. Called only when no session is installed.
    fn connect(&self) -> TurnResult<Arc<dyn RemoteChannel>>;
}
