//! Placeholder collaborators that record every call into a shared [`CallLog`].
//!
//! Use these to drive the controller without audio hardware or a network
//! session (tests, the replay tool). Failures can be injected per operation.

use crate::collaborators::{AudioEngine, RemoteChannel, SessionConnector};
use crate::error::{TurnError, TurnResult};
use crate::feedback::{Feedback, UiCue};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// One collaborator call, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
    StartPlayback,
    StopPlayback,
    ClearPlaybackBuffer,
    SetVolume(u8),
    /// Number of PCM bytes sent.
    SendAudio(usize),
    SendComplete,
    SendCancel,
    Connect,
    Show(UiCue),
}

/// Shared, ordered record of calls across all placeholders.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Snapshot of all calls so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calls other than UI cues and volume changes.
    pub fn commands(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Show(_) | Call::SetVolume(_)))
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Audio engine whose recording/playing flags are set by the caller.
#[derive(Debug)]
pub struct PlaceholderEngine {
    log: CallLog,
    recording: AtomicBool,
    playing: AtomicBool,
    fail_stop: AtomicBool,
    fail_clear: AtomicBool,
}

impl PlaceholderEngine {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            recording: AtomicBool::new(false),
            playing: AtomicBool::new(false),
            fail_stop: AtomicBool::new(false),
            fail_clear: AtomicBool::new(false),
        }
    }

    pub fn set_recording(&self, active: bool) {
        self.recording.store(active, Ordering::Release);
    }

    pub fn set_playing(&self, active: bool) {
        self.playing.store(active, Ordering::Release);
    }

    /// Make every `stop_playback` fail (playback keeps going).
    pub fn fail_stop(&self, fail: bool) {
        self.fail_stop.store(fail, Ordering::Release);
    }

    /// Make every `clear_playback_buffer` fail.
    pub fn fail_clear(&self, fail: bool) {
        self.fail_clear.store(fail, Ordering::Release);
    }
}

impl AudioEngine for PlaceholderEngine {
    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    fn start_playback(&self) -> TurnResult<()> {
        self.log.push(Call::StartPlayback);
        Ok(())
    }

    fn stop_playback(&self) -> TurnResult<()> {
        self.log.push(Call::StopPlayback);
        if self.fail_stop.load(Ordering::Acquire) {
            return Err(TurnError::Playback("stop rejected by placeholder".to_string()));
        }
        self.playing.store(false, Ordering::Release);
        Ok(())
    }

    fn clear_playback_buffer(&self) -> TurnResult<()> {
        self.log.push(Call::ClearPlaybackBuffer);
        if self.fail_clear.load(Ordering::Acquire) {
            return Err(TurnError::Playback("clear rejected by placeholder".to_string()));
        }
        Ok(())
    }

    fn set_volume(&self, percent: u8) -> TurnResult<()> {
        self.log.push(Call::SetVolume(percent));
        Ok(())
    }
}

/// Remote channel that logs sends. `fail_sends(n)` makes the next `n` sends fail.
#[derive(Debug)]
pub struct PlaceholderChannel {
    log: CallLog,
    failures_pending: AtomicUsize,
}

impl PlaceholderChannel {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            failures_pending: AtomicUsize::new(0),
        }
    }

    pub fn fail_sends(&self, count: usize) {
        self.failures_pending.store(count, Ordering::Release);
    }

    fn check(&self) -> TurnResult<()> {
        let consumed = self
            .failures_pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        match consumed {
            Ok(_) => Err(TurnError::RemoteSend("channel busy".to_string())),
            Err(_) => Ok(()),
        }
    }
}

impl RemoteChannel for PlaceholderChannel {
    fn send_audio(&self, pcm: &[u8]) -> TurnResult<()> {
        self.log.push(Call::SendAudio(pcm.len()));
        self.check()
    }

    fn send_complete(&self) -> TurnResult<()> {
        self.log.push(Call::SendComplete);
        self.check()
    }

    fn send_cancel(&self) -> TurnResult<()> {
        self.log.push(Call::SendCancel);
        self.check()
    }
}

/// Connector handing out one shared [`PlaceholderChannel`].
#[derive(Debug)]
pub struct PlaceholderConnector {
    log: CallLog,
    channel: Arc<PlaceholderChannel>,
    refuse: AtomicBool,
}

impl PlaceholderConnector {
    pub fn new(log: CallLog, channel: Arc<PlaceholderChannel>) -> Self {
        Self {
            log,
            channel,
            refuse: AtomicBool::new(false),
        }
    }

    pub fn refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::Release);
    }
}

impl SessionConnector for PlaceholderConnector {
    fn connect(&self) -> TurnResult<Arc<dyn RemoteChannel>> {
        self.log.push(Call::Connect);
        if self.refuse.load(Ordering::Acquire) {
            return Err(TurnError::Session("connect refused by placeholder".to_string()));
        }
        Ok(self.channel.clone())
    }
}

/// Feedback sink that logs cues into the call log.
#[derive(Debug, Clone)]
pub struct RecordingFeedback {
    log: CallLog,
}

impl RecordingFeedback {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl Feedback for RecordingFeedback {
    fn show(&self, cue: UiCue) {
        self.log.push(Call::Show(cue));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_fails_only_requested_number_of_times() {
        let log = CallLog::new();
        let channel = PlaceholderChannel::new(log.clone());
        channel.fail_sends(1);
        assert!(channel.send_complete().is_err());
        assert!(channel.send_complete().is_ok());
        assert_eq!(log.count(&Call::SendComplete), 2);
    }

    #[test]
    fn test_stop_clears_playing_flag() {
        let engine = PlaceholderEngine::new(CallLog::new());
        engine.set_playing(true);
        engine.stop_playback().unwrap();
        assert!(!engine.is_playing());
    }

    #[test]
    fn test_failed_stop_keeps_playing() {
        let engine = PlaceholderEngine::new(CallLog::new());
        engine.set_playing(true);
        engine.fail_stop(true);
        assert!(engine.stop_playback().is_err());
        assert!(engine.is_playing());
    }

    #[test]
    fn test_commands_skip_cues() {
        let log = CallLog::new();
        RecordingFeedback::new(log.clone()).show(UiCue::Listening);
        log.push(Call::StartPlayback);
        assert_eq!(log.commands(), vec![Call::StartPlayback]);
        assert_eq!(log.calls().len(), 2);
    }
}
