//! Holder for the optional remote session handle.
//!
//! The slot is owned by whoever manages connectivity (see [`crate::link`]);
//! the turn controller only borrows the current handle for a single call.

use crate::collaborators::RemoteChannel;
use std::sync::{Arc, PoisonError, RwLock};

/// Cloneable, shared `Option<Arc<dyn RemoteChannel>>`.
#[derive(Clone, Default)]
pub struct SessionSlot {
    inner: Arc<RwLock<Option<Arc<dyn RemoteChannel>>>>,
}

impl SessionSlot {
    /// An empty slot (no session yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that already holds `channel`.
    pub fn with_channel(channel: Arc<dyn RemoteChannel>) -> Self {
        let slot = Self::new();
        slot.install(channel);
        slot
    }

    /// The current session, if any.
    pub fn current(&self) -> Option<Arc<dyn RemoteChannel>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a session is currently installed.
    pub fn is_present(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Install a session, returning the one it replaced.
    pub fn install(&self, channel: Arc<dyn RemoteChannel>) -> Option<Arc<dyn RemoteChannel>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(channel)
    }

    /// Tear the session down, returning it if one was present.
    pub fn clear(&self) -> Option<Arc<dyn RemoteChannel>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl std::fmt::Debug for SessionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSlot")
            .field("present", &self.is_present())
            .finish()
    }
}
