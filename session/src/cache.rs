//! Reactive session cache.
//!
//! ARCHITECTURE
//! ============
//! The cache mirrors the backend session into a single [`CacheSnapshot`]
//! published through a `tokio::sync::watch` channel. Two paths write to it:
//! the initial session fetch and push events from the backend subscription.
//! Sign-in/up/out calls are pass-through and never write the snapshot; the
//! backend's follow-up push event does.
//!
//! ORDERING
//! ========
//! Each observed identity triggers one profile lookup. Lookups are never
//! cancelled. Every lookup holds a ticket from the enrichment marker; its
//! result is applied, and the marker released, only while that ticket is
//! still the outstanding one. A slow lookup for an earlier identity change
//! (a different subject, or the same subject before a sign-out) therefore
//! cannot overwrite or unblock a later one.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use std::future::Future;
use std::pin::pin;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::watch;

use crate::backend::{AuthBackend, AuthEvent};
use crate::error::BackendError;
use crate::model::{CacheSnapshot, Credentials, Identity, Registration, Role, Session, SignUpOutcome};

/// Process-wide holder of the current identity.
pub struct SessionCache<B> {
    backend: B,
    snapshot: watch::Sender<CacheSnapshot>,
    enriching: Mutex<Enrichment>,
}

/// Outstanding-lookup marker. Tickets are never reused.
#[derive(Debug, Default)]
struct Enrichment {
    next_ticket: u64,
    /// Subject and ticket of the lookup in flight, if any.
    outstanding: Option<(String, u64)>,
}

enum Step {
    Shutdown,
    Event(Option<AuthEvent>),
    Settled,
}

impl<B: AuthBackend> SessionCache<B> {
    /// New cache in the loading state. Nothing is fetched until
    /// [`initialize`](Self::initialize) or [`run`](Self::run).
    pub fn new(backend: B) -> Self {
        let (snapshot, _) = watch::channel(CacheSnapshot::default());
        Self { backend, snapshot, enriching: Mutex::new(Enrichment::default()) }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CacheSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified on every snapshot change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<CacheSnapshot> {
        self.snapshot.subscribe()
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Initialize, subscribe, and apply push events until the backend closes
    /// the event channel or `shutdown` resolves.
    ///
    /// Event handlers run concurrently on the calling task, so a slow profile
    /// lookup does not hold back a later sign-out. The subscription lives in
    /// this call's scope and is released exactly once when it returns or is
    /// dropped, whatever lookups are still in flight.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut subscription = self.backend.subscribe();
        let mut handlers: FuturesUnordered<LocalBoxFuture<'_, ()>> = FuturesUnordered::new();
        handlers.push(self.initialize().boxed_local());

        let mut shutdown = pin!(shutdown.fuse());
        loop {
            let step = futures::select_biased! {
                () = shutdown => Step::Shutdown,
                event = subscription.recv().fuse() => Step::Event(event),
                () = handlers.select_next_some() => Step::Settled,
            };
            match step {
                Step::Shutdown => {
                    tracing::debug!(in_flight = handlers.len(), "session cache shutting down");
                    return;
                }
                Step::Event(Some(event)) => handlers.push(self.on_auth_event(event).boxed_local()),
                Step::Event(None) => {
                    tracing::debug!("auth event channel closed");
                    break;
                }
                Step::Settled => {}
            }
        }

        drop(subscription);
        while handlers.next().await.is_some() {}
    }

    /// Fetch the backend's current session once and seed the cache from it.
    pub async fn initialize(&self) {
        match self.backend.get_session().await {
            Ok(Some(session)) => self.observe_session(&session).await,
            Ok(None) => {
                tracing::debug!("no existing session");
                // A sign-in pushed while the fetch was in flight owns the state.
                self.snapshot.send_if_modified(|s| {
                    if s.identity.is_some() || !s.is_loading {
                        return false;
                    }
                    s.is_loading = false;
                    true
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "session fetch failed");
                self.snapshot.send_modify(|s| {
                    s.last_error = Some(e.to_string());
                    if s.identity.is_none() {
                        s.is_loading = false;
                    }
                });
            }
        }
    }

    /// Apply one push event from the backend.
    pub async fn on_auth_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(session) => {
                tracing::debug!(subject_id = %session.user.id, "signed in");
                self.observe_session(&session).await;
            }
            AuthEvent::SignedOut => {
                tracing::debug!("signed out");
                self.lock_enriching().outstanding = None;
                self.snapshot.send_modify(|s| {
                    s.identity = None;
                    s.last_error = None;
                    s.is_loading = false;
                });
            }
        }
    }

    /// Seed the identity from a session and enrich it.
    async fn observe_session(&self, session: &Session) {
        let subject_id = session.user.id.as_str();
        let Some(ticket) = self.claim_enrichment(subject_id) else {
            tracing::debug!(subject_id, "profile lookup already outstanding");
            return;
        };

        let refresh = {
            let current = self.snapshot.borrow();
            !current.is_loading && current.identity.as_ref().is_some_and(|i| i.subject_id == subject_id)
        };
        self.snapshot.send_modify(|s| match s.identity.as_mut() {
            // Same subject, already settled: keep the known role while re-enriching.
            Some(identity) if refresh => {
                if session.user.email.is_some() {
                    identity.email.clone_from(&session.user.email);
                }
            }
            _ => {
                s.identity = Some(Identity::provisional(&session.user));
                s.is_loading = true;
            }
        });

        self.enrich_with_ticket(subject_id, ticket).await;
    }

    /// Look up the profile row for `subject_id` and merge it into the live
    /// identity if that identity still belongs to `subject_id`.
    ///
    /// Does nothing while a lookup for the same subject is outstanding.
    /// Lookup failures are logged and degrade the identity to [`Role::User`];
    /// they never reach `last_error`.
    pub async fn enrich(&self, subject_id: &str) {
        let Some(ticket) = self.claim_enrichment(subject_id) else {
            tracing::debug!(subject_id, "profile lookup already outstanding");
            return;
        };
        self.enrich_with_ticket(subject_id, ticket).await;
    }

    async fn enrich_with_ticket(&self, subject_id: &str, ticket: u64) {
        let outcome = self.backend.select_profile_by_id(subject_id).await;

        // A lookup whose ticket was superseded belongs to an earlier identity
        // change, even when the subject matches.
        let applied = self.holds_ticket(ticket)
            && self.snapshot.send_if_modified(|s| {
                let Some(identity) = s.identity.as_mut().filter(|i| i.subject_id == subject_id) else {
                    return false;
                };
                match &outcome {
                    Ok(Some(row)) => identity.apply_profile(row),
                    Ok(None) | Err(_) => identity.role = Role::User,
                }
                s.is_loading = false;
                true
            });

        match (&outcome, applied) {
            (_, false) => tracing::debug!(subject_id, "discarding stale profile lookup"),
            (Ok(Some(row)), true) => tracing::debug!(subject_id, role = ?row.role, "profile applied"),
            (Ok(None), true) => tracing::debug!(subject_id, "no profile row, defaulting to user role"),
            (Err(e), true) => tracing::warn!(subject_id, error = %e, "profile lookup failed, defaulting to user role"),
        }

        self.release_enrichment(ticket);
    }

    // =========================================================================
    // PASS-THROUGH ACTIONS
    // =========================================================================

    /// Password sign-in. The snapshot changes only when the backend's
    /// `SignedIn` event arrives.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unmodified.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, BackendError> {
        self.backend.sign_in_with_password(credentials).await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unmodified.
    pub async fn sign_up(&self, registration: &Registration) -> Result<SignUpOutcome, BackendError> {
        self.backend.sign_up(registration).await
    }

    /// Sign out. The snapshot clears when the backend's `SignedOut` event
    /// arrives.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unmodified.
    pub async fn sign_out(&self) -> Result<(), BackendError> {
        self.backend.sign_out().await
    }

    // =========================================================================
    // ENRICHMENT MARKER
    // =========================================================================

    fn lock_enriching(&self) -> MutexGuard<'_, Enrichment> {
        self.enriching.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark a lookup for `subject_id` as outstanding and hand out its ticket.
    /// Returns `None` if a lookup for that subject already is.
    fn claim_enrichment(&self, subject_id: &str) -> Option<u64> {
        let mut enriching = self.lock_enriching();
        if enriching.outstanding.as_ref().is_some_and(|(s, _)| s == subject_id) {
            return None;
        }
        let ticket = enriching.next_ticket;
        enriching.next_ticket += 1;
        enriching.outstanding = Some((subject_id.to_owned(), ticket));
        Some(ticket)
    }

    fn holds_ticket(&self, ticket: u64) -> bool {
        self.lock_enriching().outstanding.as_ref().is_some_and(|(_, t)| *t == ticket)
    }

    /// Clear the marker, but only if `ticket` is still the outstanding one.
    fn release_enrichment(&self, ticket: u64) {
        let mut enriching = self.lock_enriching();
        if enriching.outstanding.as_ref().is_some_and(|(_, t)| *t == ticket) {
            enriching.outstanding = None;
        }
    }
}
