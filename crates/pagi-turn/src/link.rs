//! Link supervisor: network link state → remote session lifecycle.
//!
//! The session slot's presence is the only "already connected" flag; a link-up
//! while a session exists is ignored, and link-down always returns the display
//! to the connecting cue.

use crate::collaborators::SessionConnector;
use crate::error::TurnError;
use crate::feedback::{Feedback, UiCue};
use crate::session::SessionSlot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Network link transitions reported by the connectivity manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkEvent {
    /// Link up with an address.
    Connected,
    /// Link lost.
    Disconnected,
    /// Association attempt failed.
    ConnectFailed,
}

/// Result of handling one link event.
#[derive(Debug)]
pub struct LinkOutcome {
    /// Whether a session is installed after handling the event.
    pub session_present: bool,
    /// Connect failure, if one happened.
    pub warning: Option<TurnError>,
}

/// Installs the remote session on link-up and tears it down on link-down.
pub struct LinkSupervisor {
    session: SessionSlot,
    connector: Arc<dyn SessionConnector>,
    feedback: Arc<dyn Feedback>,
}

impl LinkSupervisor {
    /// Supervisor over `session`, opening sessions through `connector`.
    pub fn new(
        session: SessionSlot,
        connector: Arc<dyn SessionConnector>,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        Self {
            session,
            connector,
            feedback,
        }
    }

    /// Show the connecting cue before the first link event arrives.
    pub fn announce_startup(&self) {
        self.feedback.show(UiCue::WifiConnecting);
    }

    /// Open the session on link-up (once), close it on link-down.
    pub fn handle(&self, event: LinkEvent) -> LinkOutcome {
        let mut warning = None;
        match event {
            LinkEvent::Connected => {
                if !self.session.is_present() {
                    info!("📶 Link up, opening chat session");
                    match self.connector.connect() {
                        Ok(channel) => {
                            self.session.install(channel);
                            self.feedback.show(UiCue::MicIdle);
                        }
                        Err(e) => {
                            error!(error = %e, "chat session init failed on link up");
                            warning = Some(e);
                        }
                    }
                }
            }
            LinkEvent::Disconnected | LinkEvent::ConnectFailed => {
                if self.session.clear().is_some() {
                    info!(?event, "📴 Link down, chat session closed");
                }
                self.feedback.show(UiCue::WifiConnecting);
            }
        }
        LinkOutcome {
            session_present: self.session.is_present(),
            warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::{
        Call, CallLog, PlaceholderChannel, PlaceholderConnector, RecordingFeedback,
    };

    fn rig() -> (CallLog, SessionSlot, Arc<PlaceholderConnector>, LinkSupervisor) {
        let log = CallLog::new();
        let channel = Arc::new(PlaceholderChannel::new(log.clone()));
        let connector = Arc::new(PlaceholderConnector::new(log.clone(), channel));
        let session = SessionSlot::new();
        let supervisor = LinkSupervisor::new(
            session.clone(),
            connector.clone(),
            Arc::new(RecordingFeedback::new(log.clone())),
        );
        (log, session, connector, supervisor)
    }

    #[test]
    fn test_connect_installs_once() {
        let (log, session, _connector, supervisor) = rig();
        assert!(supervisor.handle(LinkEvent::Connected).session_present);
        assert!(supervisor.handle(LinkEvent::Connected).session_present);
        assert!(session.is_present());
        assert_eq!(log.count(&Call::Connect), 1);
        assert_eq!(log.count(&Call::Show(UiCue::MicIdle)), 1);
    }

    #[test]
    fn test_disconnect_clears_and_shows_connecting() {
        let (log, session, _connector, supervisor) = rig();
        supervisor.handle(LinkEvent::Connected);
        let outcome = supervisor.handle(LinkEvent::Disconnected);
        assert!(!outcome.session_present);
        assert!(!session.is_present());
        assert_eq!(log.calls().last(), Some(&Call::Show(UiCue::WifiConnecting)));
    }

    #[test]
    fn test_refused_connect_leaves_slot_empty() {
        let (log, session, connector, supervisor) = rig();
        connector.refuse(true);
        let outcome = supervisor.handle(LinkEvent::Connected);
        assert!(outcome.warning.is_some());
        assert!(!session.is_present());
        assert_eq!(log.count(&Call::Show(UiCue::MicIdle)), 0);

        connector.refuse(false);
        assert!(supervisor.handle(LinkEvent::Connected).session_present);
    }

    #[test]
    fn test_connect_failed_without_session_still_shows_cue() {
        let (log, _session, _connector, supervisor) = rig();
        supervisor.announce_startup();
        supervisor.handle(LinkEvent::ConnectFailed);
        assert_eq!(log.count(&Call::Show(UiCue::WifiConnecting)), 2);
    }
}
