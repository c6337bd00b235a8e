//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and delegates rendering details
//! to `components`. Guarding happens in `app` via `ProtectedRoute`, so pages
//! behind it can assume a settled identity.

pub mod admin;
pub mod home;
pub mod login;
pub mod not_found;
pub mod orders;
pub mod register;
