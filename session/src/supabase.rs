//! `AuthBackend` over the hosted GoTrue (auth) + PostgREST (data) REST API.
//!
//! ARCHITECTURE
//! ============
//! The session lives in memory inside the client, the way the hosted SDK
//! keeps it. Auth state changes are fanned out to subscribers from this
//! process: a successful password sign-in (or auto-confirmed sign-up) emits
//! `SignedIn`, and sign-out emits `SignedOut` once the local session is gone.
//!
//! Every session change is written through to the attached [`SessionStore`]
//! so a new process (or page load) can pick the session back up.
//!
//! TRADE-OFFS
//! ==========
//! Tokens are not refreshed here; an expired session is reported as absent
//! (and dropped from the store) and the user signs in again.

#[cfg(test)]
#[path = "supabase_test.rs"]
mod supabase_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::backend::{AuthBackend, AuthEvent, Subscription};
use crate::config::SupabaseConfig;
use crate::error::BackendError;
use crate::model::{Credentials, ProfileRow, Registration, Session, SessionUser, SignUpOutcome};
use crate::store::{NoopStore, SessionStore};

const PROFILES_TABLE: &str = "profiles";
const ADMIN_USERS_PAGE_SIZE: usize = 200;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    senders: HashMap<u64, mpsc::UnboundedSender<AuthEvent>>,
}

/// REST client for the hosted backend.
#[derive(Clone)]
pub struct SupabaseClient {
    config: SupabaseConfig,
    http: reqwest::Client,
    session: Arc<Mutex<Option<Session>>>,
    store: Arc<dyn SessionStore>,
    listeners: Arc<Mutex<Listeners>>,
}

impl SupabaseClient {
    /// Build a client with the configured HTTP timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: SupabaseConfig) -> Result<Self, BackendError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect());
        let http = builder.build()?;

        Ok(Self {
            config,
            http,
            session: Arc::new(Mutex::new(None)),
            store: Arc::new(NoopStore),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        })
    }

    /// Use a specific session, bypassing the store.
    #[must_use]
    pub fn with_session(self, session: Session) -> Self {
        *self.lock_session() = Some(session);
        self
    }

    /// Persist sessions through `store`, restoring whatever it holds now.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        if let Some(saved) = store.load() {
            tracing::debug!(subject_id = %saved.user.id, "restored stored session");
            *self.lock_session() = Some(saved);
        }
        self.store = store;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    /// Current in-memory session, expired or not.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.lock_session().clone()
    }

    /// Find an auth user by email through the admin API.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::MissingServiceRole`] without a service-role key,
    /// or the API error if the listing fails.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<SessionUser>, BackendError> {
        #[derive(serde::Deserialize)]
        struct UserPage {
            #[serde(default)]
            users: Vec<SessionUser>,
        }

        let key = self
            .config
            .service_role_key
            .as_deref()
            .ok_or(BackendError::MissingServiceRole)?;

        let mut page = 1_usize;
        loop {
            let resp = self
                .http
                .get(self.config.auth_url("/admin/users"))
                .query(&[("page", page), ("per_page", ADMIN_USERS_PAGE_SIZE)])
                .header("apikey", key)
                .header(AUTHORIZATION, format!("Bearer {key}"))
                .send()
                .await?;
            let body: UserPage = check(resp).await?.json().await?;

            let count = body.users.len();
            if let Some(user) = body
                .users
                .into_iter()
                .find(|u| u.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)))
            {
                return Ok(Some(user));
            }
            if count < ADMIN_USERS_PAGE_SIZE {
                return Ok(None);
            }
            page += 1;
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn lock_session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver an event to every live subscriber, dropping closed ones.
    fn emit(&self, event: &AuthEvent) {
        let mut listeners = self.lock_listeners();
        listeners.senders.retain(|_, tx| tx.send(event.clone()).is_ok());
        tracing::debug!(subscribers = listeners.senders.len(), event = event.kind(), "auth event emitted");
    }

    fn store_session(&self, session: &Session) {
        *self.lock_session() = Some(session.clone());
        self.store.save(session);
        self.emit(&AuthEvent::SignedIn(session.clone()));
    }

    /// Token for PostgREST calls: the user's access token, else the anon key.
    fn bearer(&self) -> String {
        self.lock_session()
            .as_ref()
            .map_or_else(|| self.config.anon_key.clone(), |s| s.access_token.clone())
    }

    /// Token for profile writes: the service role when configured.
    fn write_bearer(&self) -> String {
        self.config
            .service_role_key
            .clone()
            .unwrap_or_else(|| self.bearer())
    }
}

#[async_trait(?Send)]
impl AuthBackend for SupabaseClient {
    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        let mut session = self.lock_session();
        if session.as_ref().is_some_and(|s| s.is_expired_at(unix_now())) {
            tracing::debug!("stored session expired");
            *session = None;
            self.store.clear();
        }
        Ok(session.clone())
    }

    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut listeners = self.lock_listeners();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.senders.insert(id, tx);
            id
        };
        let listeners = Arc::clone(&self.listeners);
        Subscription::new(rx, move || {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .senders
                .remove(&id);
        })
    }

    async fn select_profile_by_id(&self, id: &str) -> Result<Option<ProfileRow>, BackendError> {
        let resp = self
            .http
            .get(self.config.rest_url(PROFILES_TABLE))
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_owned())])
            .header("apikey", &self.config.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.bearer()))
            .send()
            .await?;
        let rows: Vec<ProfileRow> = check(resp).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_profile(&self, row: &ProfileRow) -> Result<ProfileRow, BackendError> {
        let resp = self
            .http
            .post(self.config.rest_url(PROFILES_TABLE))
            .header("apikey", &self.config.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.write_bearer()))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(row)
            .send()
            .await?;
        let rows: Vec<ProfileRow> = check(resp).await?.json().await?;
        Ok(rows.into_iter().next().unwrap_or_else(|| row.clone()))
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, BackendError> {
        let resp = self
            .http
            .post(self.config.auth_url("/token?grant_type=password"))
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({ "email": credentials.email, "password": credentials.password }))
            .send()
            .await?;
        let session: Session = check(resp).await?.json().await?;
        self.store_session(&session);
        Ok(session)
    }

    async fn sign_up(&self, registration: &Registration) -> Result<SignUpOutcome, BackendError> {
        let resp = self
            .http
            .post(self.config.auth_url("/signup"))
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({
                "email": registration.email,
                "password": registration.password,
                "data": { "full_name": registration.full_name },
            }))
            .send()
            .await?;
        let body: Value = check(resp).await?.json().await?;
        let outcome = parse_sign_up(body)?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            self.store_session(session);
        }
        Ok(outcome)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let token = self.lock_session().as_ref().map(|s| s.access_token.clone());
        let remote = match token {
            Some(token) => {
                let sent = self
                    .http
                    .post(self.config.auth_url("/logout"))
                    .header("apikey", &self.config.anon_key)
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .send()
                    .await;
                match sent {
                    Ok(resp) => check(resp).await.map(|_| ()),
                    Err(e) => Err(e.into()),
                }
            }
            None => Ok(()),
        };
        if let Err(e) = &remote {
            tracing::warn!(error = %e, "remote sign-out failed, clearing local session anyway");
        }

        *self.lock_session() = None;
        self.store.clear();
        self.emit(&AuthEvent::SignedOut);
        remote
    }
}

/// Pass successful responses through; turn the rest into `BackendError::Api`.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::Api { status: status.as_u16(), message: error_message(status.as_u16(), &body) })
}

/// Pull the human-readable message out of a GoTrue/PostgREST error body.
fn error_message(status: u16, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["msg", "message", "error_description", "error"]
            .iter()
            .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_owned))
    });
    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_owned(),
        None => format!("request failed with status {status}"),
    }
}

/// A sign-up response is a session when email confirmation is disabled and
/// a bare user (possibly wrapped in `user`) otherwise.
fn parse_sign_up(body: Value) -> Result<SignUpOutcome, serde_json::Error> {
    if body.get("access_token").is_some() {
        return Ok(SignUpOutcome::SignedIn(serde_json::from_value(body)?));
    }
    let user = body.get("user").cloned().unwrap_or(body);
    Ok(SignUpOutcome::ConfirmationRequired(serde_json::from_value(user)?))
}

#[cfg(not(target_arch = "wasm32"))]
fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(target_arch = "wasm32")]
#[allow(clippy::cast_possible_truncation)]
fn unix_now() -> i64 {
    (js_sys::Date::now() / 1000.0) as i64
}
