//! Turn state machine: audio-subsystem events → playback and remote commands.
//!
//! Each turn boundary (wake, button press, VAD end, button release, wake-window
//! timeout) resets the uplink counter exactly once, and issues at most one of
//! complete / cancel to the remote session.

use crate::collaborators::AudioEngine;
use crate::error::TurnError;
use crate::feedback::{Feedback, UiCue};
use crate::interrupt::PlaybackInterrupter;
use crate::session::SessionSlot;
use crate::uplink::UplinkCounter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Events delivered by the audio subsystem, one at a time, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioEvent {
    /// Wake word recognised.
    WakeDetected { index: i32, volume_db: f32 },
    /// VAD heard speech begin.
    VadStart,
    /// VAD heard speech end.
    VadEnd,
    /// Wake window expired.
    WakeTimeout,
    /// Push-to-talk pressed.
    ButtonTrigger,
    /// Push-to-talk released.
    ButtonRelease,
}

impl AudioEvent {
    /// Stable snake_case name, matching the serde tag.
    pub fn name(&self) -> &'static str {
        match self {
            AudioEvent::WakeDetected { .. } => "wake_detected",
            AudioEvent::VadStart => "vad_start",
            AudioEvent::VadEnd => "vad_end",
            AudioEvent::WakeTimeout => "wake_timeout",
            AudioEvent::ButtonTrigger => "button_trigger",
            AudioEvent::ButtonRelease => "button_release",
        }
    }
}

/// Whether a turn's audio is expected to stream in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    #[default]
    /// No capture expected.
    Idle,
    /// A turn's audio is streaming in.
    Capturing,
}

/// Signal issued to the remote session for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteSignal {
    /// Nothing sent (informational event, or no session).
    None,
    /// Turn closed, reply requested.
    Complete,
    /// Turn abandoned without a reply.
    Cancel,
}

/// Result of processing one event.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The event that was processed.
    pub event: AudioEvent,
    /// State after processing.
    pub state: TurnState,
    /// Complete or cancel sent to the session, if any.
    pub signal: RemoteSignal,
    /// A reply was playing and the barge-in sequence ran.
    pub interrupted: bool,
    /// Uplink samples consumed by this boundary's counter reset (0 if none).
    pub uplinked_samples: u64,
    /// Collaborator failures absorbed while processing.
    pub warnings: Vec<TurnError>,
    /// When processing started.
    pub timestamp: DateTime<Utc>,
}

/// The conversation turn controller.
pub struct TurnController {
    state: TurnState,
    engine: Arc<dyn AudioEngine>,
    session: SessionSlot,
    uplink: UplinkCounter,
    interrupter: PlaybackInterrupter,
    feedback: Arc<dyn Feedback>,
    sample_rate: u32,
}

impl TurnController {
    /// Controller starting in `Idle`, sharing `uplink` with the forwarder.
    pub fn new(
        engine: Arc<dyn AudioEngine>,
        session: SessionSlot,
        uplink: UplinkCounter,
        feedback: Arc<dyn Feedback>,
        sample_rate: u32,
    ) -> Self {
        let interrupter = PlaybackInterrupter::new(Arc::clone(&engine), session.clone());
        Self {
            state: TurnState::Idle,
            engine,
            session,
            uplink,
            interrupter,
            feedback,
            sample_rate,
        }
    }

    /// Process one event to completion.
    pub fn handle_event(&mut self, event: AudioEvent) -> TurnOutcome {
        let mut outcome = TurnOutcome {
            event: event.clone(),
            state: self.state,
            signal: RemoteSignal::None,
            interrupted: false,
            uplinked_samples: 0,
            warnings: Vec::new(),
            timestamp: Utc::now(),
        };

        match event {
            AudioEvent::WakeDetected { index, volume_db } => {
                info!(index, volume_db, "🎤 Wake word detected");
                self.begin_turn(&mut outcome, false);
            }
            AudioEvent::ButtonTrigger => {
                info!("🔘 Button trigger, force capture");
                self.begin_turn(&mut outcome, true);
            }
            AudioEvent::VadStart => {
                info!("VAD start, capturing");
                self.state = TurnState::Capturing;
            }
            AudioEvent::VadEnd => {
                info!("VAD end, completing turn");
                self.send_signal(RemoteSignal::Complete, &mut outcome);
                outcome.uplinked_samples = self.uplink.take();
                self.state = TurnState::Idle;
            }
            AudioEvent::ButtonRelease => {
                info!("🔘 Button release, completing turn");
                self.send_signal(RemoteSignal::Complete, &mut outcome);
                outcome.uplinked_samples = self.uplink.take();
                self.state = TurnState::Idle;
            }
            AudioEvent::WakeTimeout => {
                let samples = self.uplink.take();
                outcome.uplinked_samples = samples;
                let signal = if samples > 0 {
                    RemoteSignal::Complete
                } else {
                    RemoteSignal::Cancel
                };
                if self.session.is_present() {
                    match signal {
                        RemoteSignal::Complete => warn!(
                            samples,
                            seconds = UplinkCounter::duration_at(samples, self.sample_rate).as_secs_f32(),
                            "⏱️ Wake window timeout, auto-completing turn"
                        ),
                        _ => warn!("⏱️ Wake window timeout, cancelling turn (no input)"),
                    }
                }
                self.send_signal(signal, &mut outcome);
                self.state = TurnState::Idle;
            }
        }

        outcome.state = self.state;
        outcome
    }

    /// Shared start-of-turn path for wake word and button press.
    fn begin_turn(&mut self, outcome: &mut TurnOutcome, show_listening: bool) {
        let interruption = self.interrupter.interrupt_if_playing();
        outcome.interrupted = interruption.interrupted;
        if interruption.cancel_sent {
            outcome.signal = RemoteSignal::Cancel;
        }
        outcome.warnings.extend(interruption.warnings);

        let discarded = self.uplink.take();
        if discarded > 0 {
            debug!(discarded, "new turn started with un-closed uplink samples");
        }
        outcome.uplinked_samples = discarded;

        if show_listening {
            self.feedback.show(UiCue::Listening);
        }

        if let Err(e) = self.engine.start_playback() {
            warn!(error = %e, "start playback failed");
            outcome.warnings.push(e);
        }
        self.state = TurnState::Capturing;
    }

    /// Send complete or cancel if a session exists; failures become warnings.
    fn send_signal(&self, signal: RemoteSignal, outcome: &mut TurnOutcome) {
        let Some(channel) = self.session.current() else {
            debug!(?signal, "no session, remote signal suppressed");
            return;
        };
        let result = match signal {
            RemoteSignal::Complete => channel.send_complete(),
            RemoteSignal::Cancel => channel.send_cancel(),
            RemoteSignal::None => return,
        };
        outcome.signal = signal;
        if let Err(e) = result {
            warn!(error = %e, ?signal, "remote signal failed");
            outcome.warnings.push(e);
        }
    }

    /// Current turn state.
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Counter handle shared with the forwarder.
    pub fn uplink(&self) -> &UplinkCounter {
        &self.uplink
    }
}
