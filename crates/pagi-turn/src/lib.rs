//! # PAGI Turn - Conversation Turn Controller
//!
//! Sits between an always-on audio capture/playback engine and a remote
//! conversational-agent session. Decides when an utterance begins, completes
//! or is cancelled, and handles barge-in (the user speaking over a reply).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Turn Runtime                             │
//! │  ┌──────────────┐   events   ┌─────────────────┐                 │
//! │  │ Audio Engine │──────────→ │ Turn Controller │──→ complete /   │
//! │  │ (wake, VAD,  │   (queue)  │  Idle/Capturing │    cancel       │
//! │  │  button)     │            └────────┬────────┘                 │
//! │  └──────┬───────┘                     │ barge-in                  │
//! │         │ samples            ┌────────▼────────┐                 │
//! │         │                    │   Interrupter   │──→ stop, clear, │
//! │  ┌──────▼───────┐            └─────────────────┘    cancel       │
//! │  │  Forwarder   │──→ send_audio        ▲                          │
//! │  └──────┬───────┘                      │ read / reset             │
//! │         └────────→ Uplink Counter ─────┘                          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod collaborators;
pub mod config;
pub mod error;
pub mod feedback;
pub mod forwarder;
pub mod interrupt;
pub mod link;
pub mod placeholder;
pub mod replay;
pub mod runtime;
pub mod session;
pub mod turn;
pub mod uplink;

pub use collaborators::{AudioEngine, RemoteChannel, SessionConnector};
pub use config::TurnConfig;
pub use error::{TurnError, TurnResult};
pub use feedback::{Feedback, NoopFeedback, UiCue};
pub use forwarder::{AudioForwarder, ForwardOutcome};
pub use interrupt::{Interruption, PlaybackInterrupter};
pub use link::{LinkEvent, LinkOutcome, LinkSupervisor};
pub use placeholder::{
    Call, CallLog, PlaceholderChannel, PlaceholderConnector, PlaceholderEngine, RecordingFeedback,
};
pub use replay::{ReplayScript, ReplayStep};
pub use runtime::{EventIngress, TurnRuntime};
pub use session::SessionSlot;
pub use turn::{AudioEvent, RemoteSignal, TurnController, TurnOutcome, TurnState};
pub use uplink::UplinkCounter;
