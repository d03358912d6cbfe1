//! Audio forwarder: capture callback → remote channel, with uplink accounting.
//!
//! Runs on the capture context, synchronously and without blocking on the
//! event loop. Only a successful send advances the counter, so a timeout right
//! after a failed send falls back to cancel instead of a false complete.

use crate::collaborators::AudioEngine;
use crate::session::SessionSlot;
use crate::uplink::UplinkCounter;
use std::sync::Arc;
use tracing::{debug, warn};

/// What happened to one capture batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// Capture is not armed; nothing was sent.
    NotRecording,
    /// Empty batch dropped.
    Empty,
    /// Declared count exceeds the buffer; batch dropped.
    Malformed,
    /// No session; nothing was sent.
    NoSession,
    /// Sent and accounted this many samples.
    Sent(usize),
    /// Send failed; counter unchanged.
    Failed,
}

/// Forwards recorded PCM to the current session.
pub struct AudioForwarder {
    engine: Arc<dyn AudioEngine>,
    session: SessionSlot,
    uplink: UplinkCounter,
}

impl AudioForwarder {
    /// Forwarder sharing `uplink` with the turn controller.
    pub fn new(engine: Arc<dyn AudioEngine>, session: SessionSlot, uplink: UplinkCounter) -> Self {
        Self {
            engine,
            session,
            uplink,
        }
    }

    /// Forward a batch of 16-bit mono samples.
    pub fn on_samples(&self, samples: &[i16]) -> ForwardOutcome {
        if !self.engine.is_recording() {
            return ForwardOutcome::NotRecording;
        }
        if samples.is_empty() {
            return ForwardOutcome::Empty;
        }
        let Some(channel) = self.session.current() else {
            return ForwardOutcome::NoSession;
        };

        let pcm = encode_pcm16_le(samples);
        match channel.send_audio(&pcm) {
            Ok(()) => {
                self.uplink.record(samples.len());
                debug!(samples = samples.len(), total = self.uplink.get(), "uplink batch sent");
                ForwardOutcome::Sent(samples.len())
            }
            Err(e) => {
                warn!(error = %e, samples = samples.len(), "send audio to remote failed");
                ForwardOutcome::Failed
            }
        }
    }

    /// Forward `count` samples from `samples`, as delivered by a `(buffer, count)`
    /// capture callback. While recording, a count larger than the buffer is
    /// dropped as malformed.
    pub fn on_batch(&self, samples: &[i16], count: usize) -> ForwardOutcome {
        if !self.engine.is_recording() {
            return ForwardOutcome::NotRecording;
        }
        if count > samples.len() {
            warn!(count, available = samples.len(), "malformed capture batch dropped");
            return ForwardOutcome::Malformed;
        }
        self.on_samples(&samples[..count])
    }

    /// Counter handle shared with the turn state machine.
    pub fn uplink(&self) -> &UplinkCounter {
        &self.uplink
    }
}

fn encode_pcm16_le(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}
