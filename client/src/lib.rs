//! # client
//!
//! Leptos + WASM storefront shell: routing, the auth-aware navbar, sign-in and
//! registration forms, and the `ProtectedRoute` guard that wraps order history
//! and the admin panel.
//!
//! Auth state comes from the `session` crate's cache, bridged into a reactive
//! `RwSignal<CacheSnapshot>` context by `state::auth`.

pub mod app;
pub mod components;
pub mod pages;
pub mod state;
pub mod util;

/// Browser entry point.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(app::App);
}
