//! Backend configuration parsed from environment variables.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

impl Timeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

/// Connection settings for the hosted auth + data service.
#[derive(Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project base URL without a trailing slash.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Service-role key; required only for admin user lookups.
    pub service_role_key: Option<String>,
    pub timeouts: Timeouts,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("service_role_key", &self.service_role_key.as_ref().map(|_| "<redacted>"))
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl SupabaseConfig {
    /// Build a config from explicit values.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an `http(s)` URL or `anon_key` is empty.
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            url: normalize_url(url)?,
            anon_key: non_empty("SUPABASE_ANON_KEY", anon_key)?,
            service_role_key: None,
            timeouts: Timeouts::default(),
        })
    }

    #[must_use]
    pub fn with_service_role_key(mut self, key: Option<String>) -> Self {
        self.service_role_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Load from the process environment.
    ///
    /// Required:
    /// - `SUPABASE_URL`
    /// - `SUPABASE_ANON_KEY`
    ///
    /// Optional:
    /// - `SUPABASE_SERVICE_ROLE_KEY`
    /// - `SUPABASE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SUPABASE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var("SUPABASE_URL").map_err(|_| ConfigError::Missing { var: "SUPABASE_URL" })?;
        let anon_key =
            std::env::var("SUPABASE_ANON_KEY").map_err(|_| ConfigError::Missing { var: "SUPABASE_ANON_KEY" })?;

        let mut config =
            Self::new(&url, &anon_key)?.with_service_role_key(std::env::var("SUPABASE_SERVICE_ROLE_KEY").ok());
        config.timeouts = Timeouts {
            request_secs: env_parse_u64("SUPABASE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("SUPABASE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(config)
    }

    /// Load from values baked in at compile time, for builds that have no
    /// process environment at runtime (the browser client).
    ///
    /// # Errors
    ///
    /// Returns an error if either value was absent when the crate was built.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let url = option_env!("SUPABASE_URL").ok_or(ConfigError::Missing { var: "SUPABASE_URL" })?;
        let anon_key = option_env!("SUPABASE_ANON_KEY").ok_or(ConfigError::Missing { var: "SUPABASE_ANON_KEY" })?;
        Self::new(url, anon_key)
    }

    /// `{url}/auth/v1{path}`
    #[must_use]
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{path}", self.url)
    }

    /// `{url}/rest/v1/{table}`
    #[must_use]
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.url)
    }
}

fn normalize_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(ConfigError::Missing { var: "SUPABASE_URL" });
    }
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ConfigError::Invalid { var: "SUPABASE_URL", reason: format!("expected http(s) URL, got '{url}'") });
    }
    Ok(url.to_owned())
}

fn non_empty(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ConfigError::Missing { var });
    }
    Ok(value.to_owned())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
