//! Seam between the session cache and the hosted backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! The cache only ever talks to the backend through [`AuthBackend`]. Calls are
//! `?Send` because in the browser they run on the single UI event loop, where
//! fetch futures are not `Send`.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::BackendError;
use crate::model::{Credentials, ProfileRow, Registration, Session, SignUpOutcome};

/// Auth state change pushed by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
}

impl AuthEvent {
    /// Backend wire name of the event.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
        }
    }
}

/// Live registration for [`AuthEvent`]s.
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`])
/// releases it with the backend. The release hook runs at most once.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<AuthEvent>,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(events: mpsc::UnboundedReceiver<AuthEvent>, release: impl FnOnce() + 'static) -> Self {
        Self { events, release: Some(Box::new(release)) }
    }

    /// Wait for the next event. `None` once the backend closes the channel.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        self.events.recv().await
    }

    /// Release the subscription now rather than at drop.
    pub fn unsubscribe(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("released", &self.release.is_none())
            .finish_non_exhaustive()
    }
}

/// Client surface of the hosted auth + data service.
#[async_trait(?Send)]
pub trait AuthBackend {
    /// Current session, if one is persisted.
    async fn get_session(&self) -> Result<Option<Session>, BackendError>;

    /// Register for future sign-in/sign-out notifications.
    fn subscribe(&self) -> Subscription;

    /// Profile row keyed by subject id; `None` when no row exists.
    async fn select_profile_by_id(&self, id: &str) -> Result<Option<ProfileRow>, BackendError>;

    /// Insert or merge a profile row, returning the stored row.
    async fn upsert_profile(&self, row: &ProfileRow) -> Result<ProfileRow, BackendError>;

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, BackendError>;

    async fn sign_up(&self, registration: &Registration) -> Result<SignUpOutcome, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;
}
