//! Barge-in: silence an in-flight reply before a new capture cycle starts.
//!
//! Order is fixed: stop output, then drop the buffer (clearing while still
//! draining can re-arm output), then cancel the remote turn.

use crate::collaborators::AudioEngine;
use crate::error::TurnError;
use crate::session::SessionSlot;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What an interrupt attempt did.
#[derive(Debug, Default)]
pub struct Interruption {
    /// Playback was active and the interrupt sequence ran.
    pub interrupted: bool,
    /// A cancel was sent to the remote session (successfully or not).
    pub cancel_sent: bool,
    /// Failures absorbed along the way.
    pub warnings: Vec<TurnError>,
}

/// Stops playback and cancels the remote turn when a reply is playing.
pub struct PlaybackInterrupter {
    engine: Arc<dyn AudioEngine>,
    session: SessionSlot,
}

impl PlaybackInterrupter {
    pub fn new(engine: Arc<dyn AudioEngine>, session: SessionSlot) -> Self {
        Self { engine, session }
    }

    /// Run the interrupt sequence if playback is active; otherwise do nothing.
    ///
    /// Every step is attempted even if an earlier one failed.
    pub fn interrupt_if_playing(&self) -> Interruption {
        let mut outcome = Interruption::default();
        if !self.engine.is_playing() {
            return outcome;
        }

        info!("⏸️ Barge-in: interrupting reply playback");
        outcome.interrupted = true;

        if let Err(e) = self.engine.stop_playback() {
            warn!(error = %e, "barge-in: stop playback failed");
            outcome.warnings.push(e);
        }
        if let Err(e) = self.engine.clear_playback_buffer() {
            warn!(error = %e, "barge-in: clear playback buffer failed");
            outcome.warnings.push(e);
        }

        match self.session.current() {
            Some(channel) => {
                outcome.cancel_sent = true;
                if let Err(e) = channel.send_cancel() {
                    warn!(error = %e, "barge-in: remote cancel failed");
                    outcome.warnings.push(e);
                }
            }
            None => debug!("barge-in: no session, remote cancel skipped"),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::{Call, CallLog, PlaceholderChannel, PlaceholderEngine};

    fn setup(with_session: bool) -> (CallLog, Arc<PlaceholderEngine>, PlaybackInterrupter) {
        let log = CallLog::new();
        let engine = Arc::new(PlaceholderEngine::new(log.clone()));
        let session = if with_session {
            SessionSlot::with_channel(Arc::new(PlaceholderChannel::new(log.clone())))
        } else {
            SessionSlot::new()
        };
        let interrupter = PlaybackInterrupter::new(engine.clone(), session);
        (log, engine, interrupter)
    }

    #[test]
    fn test_idle_playback_is_noop() {
        let (log, _engine, interrupter) = setup(true);
        let outcome = interrupter.interrupt_if_playing();
        assert!(!outcome.interrupted);
        assert!(log.calls().is_empty());
    }

    #[test]
    fn test_playing_runs_sequence_in_order() {
        let (log, engine, interrupter) = setup(true);
        engine.set_playing(true);
        let outcome = interrupter.interrupt_if_playing();
        assert!(outcome.interrupted);
        assert!(outcome.cancel_sent);
        assert!(outcome.warnings.is_empty());
        assert_eq!(
            log.calls(),
            vec![Call::StopPlayback, Call::ClearPlaybackBuffer, Call::SendCancel]
        );
    }

    #[test]
    fn test_second_call_after_stop_is_noop() {
        let (log, engine, interrupter) = setup(true);
        engine.set_playing(true);
        interrupter.interrupt_if_playing();
        log.clear();
        let outcome = interrupter.interrupt_if_playing();
        assert!(!outcome.interrupted);
        assert!(log.calls().is_empty());
    }

    #[test]
    fn test_no_session_skips_cancel() {
        let (log, engine, interrupter) = setup(false);
        engine.set_playing(true);
        let outcome = interrupter.interrupt_if_playing();
        assert!(outcome.interrupted);
        assert!(!outcome.cancel_sent);
        assert_eq!(log.calls(), vec![Call::StopPlayback, Call::ClearPlaybackBuffer]);
    }

    #[test]
    fn test_failed_stop_still_clears_and_cancels() {
        let (log, engine, interrupter) = setup(true);
        engine.set_playing(true);
        engine.fail_stop(true);
        let outcome = interrupter.interrupt_if_playing();
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(
            log.calls(),
            vec![Call::StopPlayback, Call::ClearPlaybackBuffer, Call::SendCancel]
        );
    }
}
