//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The `session` crate's cache owns the truth. This module runs it on the
//! browser event loop and mirrors every snapshot change into an
//! `RwSignal<AuthState>` so route guards and the navbar re-render reactively.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use leptos::prelude::*;
use session::{CacheSnapshot, SessionCache, SupabaseClient};

/// Reactive mirror of the session cache snapshot.
pub type AuthState = CacheSnapshot;

/// Session cache backed by the hosted backend.
pub type StoreCache = SessionCache<SupabaseClient>;

/// Context handle for auth actions.
///
/// `cache` holds `None` outside the browser and when the backend is not
/// configured; pages then show the config error instead of a form result.
/// The cache is kept in local (UI-thread) storage, so the handle is `Copy`.
#[derive(Clone, Copy)]
pub struct AuthHandle {
    cache: StoredValue<Option<Arc<StoreCache>>, LocalStorage>,
}

impl AuthHandle {
    /// Start the session cache and bridge it into `auth`.
    pub fn start(auth: RwSignal<AuthState>) -> Self {
        #[cfg(feature = "csr")]
        {
            Self { cache: StoredValue::new_local(start_cache(auth)) }
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = auth;
            Self::detached()
        }
    }

    /// Handle with no backend behind it.
    #[must_use]
    pub fn detached() -> Self {
        Self { cache: StoredValue::new_local(None) }
    }

    #[must_use]
    pub fn cache(&self) -> Option<Arc<StoreCache>> {
        self.cache.try_get_value().flatten()
    }
}

/// Message shown when an action is attempted without a configured backend.
pub const BACKEND_UNAVAILABLE: &str = "Sign-in is unavailable: the store backend is not configured.";

/// Snapshot reported when the backend cannot be reached at all.
#[must_use]
pub fn unavailable_state(reason: &str) -> AuthState {
    CacheSnapshot { identity: None, is_loading: false, last_error: Some(reason.to_owned()) }
}

#[cfg(feature = "csr")]
fn start_cache(auth: RwSignal<AuthState>) -> Option<Arc<StoreCache>> {
    use futures::channel::oneshot;
    use session::SupabaseConfig;

    use crate::util::session_storage::LocalSessionStore;

    let client = match SupabaseConfig::from_build_env()
        .map_err(|e| e.to_string())
        .and_then(|config| SupabaseClient::new(config).map_err(|e| e.to_string()))
        .map(|client| client.with_store(Arc::new(LocalSessionStore)))
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("session backend unavailable: {e}");
            auth.set(unavailable_state(&e));
            return None;
        }
    };

    let cache = Arc::new(SessionCache::new(client));
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let runner = Arc::clone(&cache);
    leptos::task::spawn_local(async move {
        runner
            .run(async move {
                let _ = stop_rx.await;
            })
            .await;
    });

    let bridge = Arc::clone(&cache);
    leptos::task::spawn_local(async move {
        let mut rx = bridge.watch();
        loop {
            let current = rx.borrow_and_update().clone();
            if auth.try_set(current).is_some() {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    });

    on_cleanup(move || {
        let _ = stop_tx.send(());
    });

    Some(cache)
}
