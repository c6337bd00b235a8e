//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! Auth is the only cross-page state: the session cache snapshot plus a
//! handle for the pass-through sign-in/up/out actions.

pub mod auth;
