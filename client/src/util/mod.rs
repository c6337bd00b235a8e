//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules keep routing decisions out of components so they can be
//! unit tested without a browser.

pub mod auth;
pub mod session_storage;
