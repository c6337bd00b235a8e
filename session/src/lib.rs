//! # session
//!
//! Client-side auth core for the storefront: a reactive session cache that
//! mirrors the hosted backend's session plus the caller's profile row, and the
//! route-guard decision table built on top of it.
//!
//! The backend is reached only through the [`backend::AuthBackend`] trait.
//! [`supabase::SupabaseClient`] implements it over the GoTrue + PostgREST
//! REST surface; tests script their own in-memory backends.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod guard;
pub mod model;
pub mod store;
pub mod supabase;

pub use backend::{AuthBackend, AuthEvent, Subscription};
pub use cache::SessionCache;
pub use config::SupabaseConfig;
pub use error::{BackendError, ConfigError};
pub use guard::{Capability, Destination, GuardDecision, decide};
pub use model::{
    CacheSnapshot, Credentials, Identity, ProfileRow, Registration, Role, Session, SessionUser, SignUpOutcome, UserMetadata,
};
pub use store::{MemoryStore, NoopStore, SessionStore};
pub use supabase::SupabaseClient;
