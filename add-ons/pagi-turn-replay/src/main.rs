//! Turn replay tool
//!
//! Drives the turn runtime with placeholder collaborators from a JSON script,
//! then prints the collaborator call log. Useful for checking barge-in and
//! timeout behaviour without a device.
//!
//! Usage: `pagi-turn-replay <script.json>` (or set `PAGI_TURN_SCRIPT`).

use pagi_turn::{
    CallLog, LinkSupervisor, PlaceholderChannel, PlaceholderConnector, PlaceholderEngine,
    RecordingFeedback, ReplayScript, ReplayStep as Step, SessionSlot, TurnConfig, TurnError,
    TurnRuntime,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[pagi-turn-replay] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let script_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PAGI_TURN_SCRIPT").ok())
        .map(PathBuf::from)
        .ok_or_else(|| TurnError::Config("usage: pagi-turn-replay <script.json>".to_string()))?;
    let script = ReplayScript::load(&script_path)?;

    let config = TurnConfig::load()?;
    tracing::info!(
        script = %script_path.display(),
        steps = script.steps.len(),
        sample_rate = config.sample_rate,
        "Replaying turn script"
    );

    let log = CallLog::new();
    let engine = Arc::new(PlaceholderEngine::new(log.clone()));
    let channel = Arc::new(PlaceholderChannel::new(log.clone()));
    let feedback = Arc::new(RecordingFeedback::new(log.clone()));
    let session = SessionSlot::new();

    let supervisor = LinkSupervisor::new(
        session.clone(),
        Arc::new(PlaceholderConnector::new(log.clone(), channel.clone())),
        feedback.clone(),
    );
    supervisor.announce_startup();

    let mut runtime = TurnRuntime::new(config, engine.clone(), session, feedback)?;
    let mut outcomes = runtime
        .take_outcome_receiver()
        .ok_or(TurnError::NotStarted)?;
    runtime.start().await?;
    let ingress = runtime.event_ingress()?;
    let forwarder = runtime.forwarder();

    for step in script.steps {
        match step {
            Step::Link { state } => {
                let outcome = supervisor.handle(state);
                if let Some(e) = outcome.warning {
                    tracing::warn!(error = %e, "link step failed");
                }
            }
            Step::Playing { active } => engine.set_playing(active),
            Step::Recording { active } => engine.set_recording(active),
            Step::Samples { count } => {
                let samples = vec![0i16; count];
                let outcome = forwarder.on_samples(&samples);
                tracing::debug!(?outcome, count, "samples step");
            }
            Step::FailNextSend => channel.fail_sends(1),
            Step::Event { event } => {
                ingress.submit(event)?;
                // Wait so later sample steps land after this event.
                if outcomes.recv().await.is_none() {
                    break;
                }
            }
        }
    }

    let pending = runtime.uplink().get();
    runtime.stop().await?;

    println!("{}", serde_json::to_string_pretty(&log.calls())?);
    println!("uplink counter at end: {}", pending);

    Ok(())
}
