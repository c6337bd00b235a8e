//! Error types for backend calls and configuration.
//!
//! ERROR HANDLING
//! ==============
//! `BackendError` is what every `AuthBackend` call returns. The cache decides
//! per call site whether it is recorded (initial session fetch), downgraded
//! (profile enrichment), or handed back untouched (sign-in/up/out).

/// Failure talking to the hosted auth/data backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },
    /// The response body did not have the expected shape.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// An admin-only call was attempted without a service-role key.
    #[error("service role key required for admin operations")]
    MissingServiceRole,
    /// A call that needs a signed-in session was made without one.
    #[error("no active session")]
    NotSignedIn,
}

impl BackendError {
    /// HTTP status for `Api` errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Invalid or missing backend configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {var}")]
    Missing { var: &'static str },
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}
