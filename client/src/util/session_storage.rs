//! Browser `localStorage` persistence for the signed-in session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Attached to the backend client at boot so a page reload restores the
//! session the previous page signed in with. Outside the `csr` build there is
//! no browser storage and every call is a no-op.

#[cfg(test)]
#[path = "session_storage_test.rs"]
mod session_storage_test;

use session::{Session, SessionStore};

/// `localStorage` key holding the serialized session.
pub const SESSION_STORAGE_KEY: &str = "storefront.auth.session";

/// [`SessionStore`] backed by `window.localStorage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSessionStore;

impl SessionStore for LocalSessionStore {
    fn load(&self) -> Option<Session> {
        decode(&read_item(SESSION_STORAGE_KEY)?)
    }

    fn save(&self, session: &Session) {
        if let Some(raw) = encode(session) {
            write_item(SESSION_STORAGE_KEY, Some(&raw));
        }
    }

    fn clear(&self) {
        write_item(SESSION_STORAGE_KEY, None);
    }
}

fn encode(session: &Session) -> Option<String> {
    serde_json::to_string(session).ok()
}

/// Parse a stored session; unreadable values are treated as absent.
fn decode(raw: &str) -> Option<Session> {
    serde_json::from_str(raw).ok()
}

fn read_item(key: &str) -> Option<String> {
    #[cfg(feature = "csr")]
    {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
        storage.get_item(key).ok().flatten()
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = key;
        None
    }
}

fn write_item(key: &str, value: Option<&str>) {
    #[cfg(feature = "csr")]
    {
        let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) else {
            return;
        };
        let _ = match value {
            Some(raw) => storage.set_item(key, raw),
            None => storage.remove_item(key),
        };
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (key, value);
    }
}
