//! Turn runtime - the coordination layer
//!
//! Events from the audio subsystem are queued on an unbounded channel and
//! drained by a single task that owns the [`TurnController`], so events run
//! one at a time in arrival order. Sample batches bypass the queue and go
//! straight to the [`AudioForwarder`] on the capture callback's own thread;
//! the two paths share only the uplink counter.

use crate::collaborators::AudioEngine;
use crate::config::TurnConfig;
use crate::error::{TurnError, TurnResult};
use crate::feedback::Feedback;
use crate::forwarder::AudioForwarder;
use crate::session::SessionSlot;
use crate::turn::{AudioEvent, TurnController, TurnOutcome};
use crate::uplink::UplinkCounter;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Cloneable entry point for the audio subsystem's event callback.
#[derive(Debug, Clone)]
pub struct EventIngress {
    tx: mpsc::UnboundedSender<AudioEvent>,
}

impl EventIngress {
    /// Queue an event. Never blocks.
    pub fn submit(&self, event: AudioEvent) -> TurnResult<()> {
        self.tx
            .send(event)
            .map_err(|e| TurnError::ChannelSend(e.to_string()))
    }
}

/// Owns the event loop and the sample path for one device.
pub struct TurnRuntime {
    config: TurnConfig,
    engine: Arc<dyn AudioEngine>,
    session: SessionSlot,
    forwarder: Arc<AudioForwarder>,

    // Moved into the event task on start
    controller: Option<TurnController>,
    outcome_tx: Option<mpsc::UnboundedSender<TurnOutcome>>,

    // Channels
    event_tx: Option<mpsc::UnboundedSender<AudioEvent>>,
    outcome_rx: Option<mpsc::UnboundedReceiver<TurnOutcome>>,
    shutdown_tx: Option<oneshot::Sender<()>>,

    task: Option<JoinHandle<()>>,
}

impl TurnRuntime {
    /// Validate `config` and wire the controller and forwarder. Nothing runs until [`start`](Self::start).
    pub fn new(
        config: TurnConfig,
        engine: Arc<dyn AudioEngine>,
        session: SessionSlot,
        feedback: Arc<dyn Feedback>,
    ) -> TurnResult<Self> {
        config.validate()?;

        let uplink = UplinkCounter::new();
        let forwarder = Arc::new(AudioForwarder::new(
            Arc::clone(&engine),
            session.clone(),
            uplink.clone(),
        ));
        let controller = TurnController::new(
            Arc::clone(&engine),
            session.clone(),
            uplink,
            feedback,
            config.sample_rate,
        );
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            engine,
            session,
            forwarder,
            controller: Some(controller),
            outcome_tx: Some(outcome_tx),
            event_tx: None,
            outcome_rx: Some(outcome_rx),
            shutdown_tx: None,
            task: None,
        })
    }

    /// Apply the playback volume, arm the playback task and start the event loop.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(&mut self) -> TurnResult<()> {
        let mut controller = self.controller.take().ok_or(TurnError::AlreadyStarted)?;
        let outcome_tx = self.outcome_tx.take().ok_or(TurnError::AlreadyStarted)?;

        info!(
            sample_rate = self.config.sample_rate,
            volume = self.config.playback_volume,
            "🚀 Starting turn runtime"
        );

        if let Err(e) = self.engine.set_volume(self.config.playback_volume) {
            warn!(error = %e, "set playback volume failed");
        }
        // Playback task stays resident, ready for a reply at any time.
        if let Err(e) = self.engine.start_playback() {
            warn!(error = %e, "initial start playback failed");
        }

        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AudioEvent>();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let outcome_log = self.config.outcome_log;

        let handle = tokio::spawn(async move {
            debug!("turn event loop started");
            loop {
                tokio::select! {
                    biased;
                    event = event_rx.recv() => match event {
                        Some(event) => process(&mut controller, event, &outcome_tx, outcome_log),
                        None => break,
                    },
                    _ = &mut shutdown_rx => {
                        // Finish whatever was queued before the stop request.
                        event_rx.close();
                        while let Some(event) = event_rx.recv().await {
                            process(&mut controller, event, &outcome_tx, outcome_log);
                        }
                        break;
                    }
                }
            }
            info!("🛑 Turn event loop ended");
        });

        self.event_tx = Some(event_tx);
        self.shutdown_tx = Some(shutdown_tx);
        self.task = Some(handle);

        info!("✅ Turn runtime started");
        Ok(())
    }

    /// Entry point for the event callback context.
    pub fn event_ingress(&self) -> TurnResult<EventIngress> {
        self.event_tx
            .as_ref()
            .map(|tx| EventIngress { tx: tx.clone() })
            .ok_or(TurnError::NotStarted)
    }

    /// Entry point for the capture callback context.
    pub fn forwarder(&self) -> Arc<AudioForwarder> {
        Arc::clone(&self.forwarder)
    }

    /// The session slot shared with the controller and forwarder.
    pub fn session(&self) -> SessionSlot {
        self.session.clone()
    }

    /// Counter of samples uplinked in the current turn.
    pub fn uplink(&self) -> UplinkCounter {
        self.forwarder.uplink().clone()
    }

    /// Receiver of per-event outcomes. Can be taken once.
    pub fn take_outcome_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<TurnOutcome>> {
        self.outcome_rx.take()
    }

    /// True between `start` and `stop` while the event task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop accepting events, drain the queue and join the event task.
    pub async fn stop(&mut self) -> TurnResult<()> {
        let handle = self.task.take().ok_or(TurnError::NotStarted)?;
        info!("🛑 Stopping turn runtime");

        self.event_tx = None;
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = handle.await {
            warn!(error = %e, "turn event task ended abnormally");
        }

        info!("✅ Turn runtime stopped");
        Ok(())
    }
}

impl Drop for TurnRuntime {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn process(
    controller: &mut TurnController,
    event: AudioEvent,
    outcome_tx: &mpsc::UnboundedSender<TurnOutcome>,
    outcome_log: bool,
) {
    let outcome = controller.handle_event(event);
    if outcome_log {
        info!(
            event = outcome.event.name(),
            state = ?outcome.state,
            signal = ?outcome.signal,
            interrupted = outcome.interrupted,
            uplinked = outcome.uplinked_samples,
            warnings = outcome.warnings.len(),
            "turn outcome"
        );
    }
    if outcome_tx.send(outcome).is_err() {
        debug!("outcome receiver dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::NoopFeedback;
    use crate::placeholder::{Call, CallLog, PlaceholderEngine};

    fn runtime(log: &CallLog) -> TurnRuntime {
        let engine = Arc::new(PlaceholderEngine::new(log.clone()));
        TurnRuntime::new(
            TurnConfig::default(),
            engine,
            SessionSlot::new(),
            Arc::new(NoopFeedback),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = TurnConfig {
            playback_volume: 150,
            ..Default::default()
        };
        let engine = Arc::new(PlaceholderEngine::new(CallLog::new()));
        let result = TurnRuntime::new(config, engine, SessionSlot::new(), Arc::new(NoopFeedback));
        assert!(matches!(result, Err(TurnError::Config(_))));
    }

    #[test]
    fn test_ingress_requires_start() {
        let rt = runtime(&CallLog::new());
        assert!(matches!(rt.event_ingress(), Err(TurnError::NotStarted)));
        assert!(!rt.is_running());
    }

    #[test]
    fn test_outcome_receiver_taken_once() {
        let mut rt = runtime(&CallLog::new());
        assert!(rt.take_outcome_receiver().is_some());
        assert!(rt.take_outcome_receiver().is_none());
    }

    #[tokio::test]
    async fn test_start_applies_volume_and_arms_playback() {
        let log = CallLog::new();
        let mut rt = runtime(&log);
        rt.start().await.unwrap();
        assert!(rt.is_running());
        assert_eq!(log.calls(), vec![Call::SetVolume(100), Call::StartPlayback]);
        assert!(matches!(rt.start().await, Err(TurnError::AlreadyStarted)));
        rt.stop().await.unwrap();
        assert!(!rt.is_running());
    }
}
