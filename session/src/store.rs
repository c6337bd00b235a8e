//! Persistence hook for the signed-in session.
//!
//! SYSTEM CONTEXT
//! ==============
//! The hosted SDK keeps its session across page reloads. `SupabaseClient`
//! mirrors every session change into a [`SessionStore`] and restores from it
//! when the store is attached, so the cache's initial fetch finds the session
//! a previous page load signed in with. The browser client plugs in
//! `localStorage`; native callers can leave the default no-op store.

use std::sync::{Mutex, PoisonError};

use crate::model::Session;

/// Durable slot holding at most one session.
pub trait SessionStore: Send + Sync {
    /// Previously saved session, if any.
    fn load(&self) -> Option<Session>;

    fn save(&self, session: &Session);

    fn clear(&self);
}

/// Store that forgets everything; the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStore;

impl SessionStore for NoopStore {
    fn load(&self) -> Option<Session> {
        None
    }

    fn save(&self, _session: &Session) {}

    fn clear(&self) {}
}

/// Process-local store, for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Session>>,
}

impl MemoryStore {
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self { slot: Mutex::new(Some(session)) }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Option<Session> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn save(&self, session: &Session) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
    }

    fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
