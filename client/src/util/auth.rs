//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! The sign-in and register pages apply identical "already signed in"
//! redirect behavior; guarded routes go through `ProtectedRoute` instead.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use session::Role;

use crate::state::auth::AuthState;

/// Landing route after a successful sign-in.
#[must_use]
pub fn post_auth_destination(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::User => "/",
    }
}

/// Where a signed-in visitor of a guest-only page should be sent, if anywhere.
///
/// Waits for the role to settle so admins are not first bounced to `/`.
#[must_use]
pub fn signed_in_redirect(state: &AuthState) -> Option<&'static str> {
    state.settled_role().map(post_auth_destination)
}

/// Navigate away from guest-only pages once a settled identity is present.
pub fn install_signed_in_redirect<F>(auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if let Some(path) = signed_in_redirect(&auth.get()) {
            navigate(path, NavigateOptions { replace: true, ..Default::default() });
        }
    });
}
