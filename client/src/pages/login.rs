//! Email + password sign-in page.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_query_map};
use session::{BackendError, Credentials};

use crate::state::auth::{AuthHandle, AuthState, BACKEND_UNAVAILABLE};
use crate::util::auth::install_signed_in_redirect;

/// Query flag set by the register page after a confirmation-pending sign-up.
pub const REGISTERED_QUERY: &str = "registered";

/// Notice shown when arriving from a confirmation-pending sign-up.
pub const REGISTERED_NOTICE: &str = "Registration successful! Please check your email to verify your account.";

/// Validate and trim the sign-in form.
///
/// # Errors
///
/// Returns the message to display when either field is empty.
pub fn validate_sign_in(email: &str, password: &str) -> Result<Credentials, &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err("Enter both email and password.");
    }
    Ok(Credentials { email: email.to_owned(), password: password.to_owned() })
}

/// User-facing text for a failed auth action.
#[must_use]
pub fn action_error_message(err: &BackendError) -> String {
    match err {
        BackendError::Api { message, .. } => message.clone(),
        BackendError::Http(_) => "Could not reach the server. Please try again.".to_owned(),
        other => other.to_string(),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let handle = expect_context::<AuthHandle>();
    install_signed_in_redirect(auth, use_navigate());

    let query = use_query_map();
    let registered = move || query.get().get(REGISTERED_QUERY).is_some();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let credentials = match validate_sign_in(&email.get(), &password.get()) {
            Ok(credentials) => credentials,
            Err(message) => {
                error.set(Some(message.to_owned()));
                return;
            }
        };
        let Some(cache) = handle.cache() else {
            error.set(Some(BACKEND_UNAVAILABLE.to_owned()));
            return;
        };
        busy.set(true);
        error.set(None);

        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            // Success navigates through the signed-in redirect once the role settles.
            if let Err(e) = cache.sign_in(&credentials).await {
                log::warn!("sign-in failed: {e}");
                error.set(Some(action_error_message(&e)));
                busy.set(false);
            }
        });
        #[cfg(not(feature = "csr"))]
        {
            let _ = (cache, credentials);
            busy.set(false);
        }
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Sign in to your account"</h1>
                <Show when=registered>
                    <p class="auth-message auth-message--success">{REGISTERED_NOTICE}</p>
                </Show>
                <form class="auth-form" on:submit=on_submit>
                    <input
                        class="auth-input"
                        type="email"
                        placeholder="you@example.com"
                        autocomplete="email"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="auth-input"
                        type="password"
                        placeholder="Password"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="auth-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Signing in..." } else { "Sign In" }}
                    </button>
                </form>
                <Show when=move || error.get().is_some()>
                    <p class="auth-message auth-message--error">{move || error.get().unwrap_or_default()}</p>
                </Show>
                <p class="auth-card__footer">
                    "Don't have an account? "
                    <a href="/register">"Register"</a>
                </p>
            </div>
        </div>
    }
}
