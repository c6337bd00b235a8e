//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read the shared `RwSignal<AuthState>` context and render
//! navigation chrome or gate route content on it.

pub mod navbar;
pub mod protected_route;
