//! Auth data model shared by the cache, the guard, and backends.
//!
//! DESIGN
//! ======
//! `Session`, `SessionUser`, and `ProfileRow` mirror what the hosted backend
//! returns and are owned by it; the cache never invents fields for them.
//! `Identity` and `CacheSnapshot` are the cache's own view, derived from a
//! session and (once enrichment settles) a profile row.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use serde::{Deserialize, Serialize};

// =============================================================================
// ROLE
// =============================================================================

/// Privilege level stored on the profile row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper. Also the fallback whenever the stored role is unknown.
    #[default]
    User,
    /// Store operator with access to the admin panel.
    Admin,
}

impl Role {
    /// Interpret the raw `role` column of a profile row.
    ///
    /// Only the exact value `"admin"` grants admin; anything else
    /// (including a missing value) is `User`.
    #[must_use]
    pub fn from_profile(raw: Option<&str>) -> Self {
        match raw {
            Some("admin") => Self::Admin,
            _ => Self::User,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

// =============================================================================
// BACKEND-OWNED SHAPES
// =============================================================================

/// Free-form metadata attached to an auth user at sign-up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Auth user as carried inside a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Opaque subject identifier.
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Authenticated session issued by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Expiry as seconds since the Unix epoch, when the backend reports one.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: SessionUser,
}

impl Session {
    /// Whether the session has expired as of `now_secs` (Unix seconds).
    /// Sessions without an expiry never expire locally.
    #[must_use]
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now_secs)
    }
}

/// Row of the `profiles` table, keyed by the auth subject id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Email + password pair for password sign-in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Sign-up request; `full_name` lands in the auth user's metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Result of a successful sign-up call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Email confirmation is disabled; the backend signed the user in.
    SignedIn(Session),
    /// The account exists but must be confirmed by email first.
    ConfirmationRequired(SessionUser),
}

// =============================================================================
// CACHE VIEW
// =============================================================================

/// The single live identity held by a session cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: String,
    pub email: Option<String>,
    /// Filled from the profile row once enrichment succeeds.
    pub display_name: Option<String>,
    /// Provisionally `User` until enrichment settles.
    pub role: Role,
}

impl Identity {
    /// Seed an identity from a freshly observed session, before any profile
    /// lookup has completed.
    #[must_use]
    pub fn provisional(user: &SessionUser) -> Self {
        Self { subject_id: user.id.clone(), email: user.email.clone(), display_name: None, role: Role::User }
    }

    /// Merge a profile row into this identity. Absent row fields keep the
    /// values already known from the session.
    pub fn apply_profile(&mut self, row: &ProfileRow) {
        if row.email.is_some() {
            self.email.clone_from(&row.email);
        }
        if row.full_name.is_some() {
            self.display_name.clone_from(&row.full_name);
        }
        self.role = Role::from_profile(row.role.as_deref());
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Name to show in the UI: display name, else email, else the subject id.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.subject_id)
    }
}

/// Point-in-time view of a session cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub identity: Option<Identity>,
    /// True until the first session lookup (and its enrichment) settles.
    pub is_loading: bool,
    /// Set only when the initial session fetch fails.
    pub last_error: Option<String>,
}

impl CacheSnapshot {
    /// Settled snapshot with no identity.
    #[must_use]
    pub fn signed_out() -> Self {
        Self { identity: None, is_loading: false, last_error: None }
    }

    /// Role of the live identity once it can be trusted.
    #[must_use]
    pub fn settled_role(&self) -> Option<Role> {
        if self.is_loading {
            return None;
        }
        self.identity.as_ref().map(|i| i.role)
    }
}

impl Default for CacheSnapshot {
    /// A freshly constructed cache is loading with no identity.
    fn default() -> Self {
        Self { identity: None, is_loading: true, last_error: None }
    }
}
