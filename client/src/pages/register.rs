//! Account registration page.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use session::Registration;

use crate::pages::login::REGISTERED_QUERY;
use crate::state::auth::{AuthHandle, AuthState, BACKEND_UNAVAILABLE};
use crate::util::auth::install_signed_in_redirect;

const MIN_FULL_NAME_CHARS: usize = 2;
const MIN_PASSWORD_CHARS: usize = 6;

/// Raw register form input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Per-field validation messages; `None` means the field is valid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterErrors {
    pub full_name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
    pub confirm_password: Option<&'static str>,
}

impl RegisterErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Validate every field at once so all messages show together.
///
/// # Errors
///
/// Returns the per-field messages when any field is invalid.
pub fn validate_registration(form: &RegisterForm) -> Result<Registration, RegisterErrors> {
    let full_name = form.full_name.trim();
    let email = form.email.trim();

    let errors = RegisterErrors {
        full_name: if full_name.is_empty() {
            Some("Full name is required")
        } else if full_name.chars().count() < MIN_FULL_NAME_CHARS {
            Some("Full name must be at least 2 characters")
        } else {
            None
        },
        email: if email.is_empty() {
            Some("Email is required")
        } else if !is_plausible_email(email) {
            Some("Please enter a valid email address")
        } else {
            None
        },
        password: if form.password.is_empty() {
            Some("Password is required")
        } else if form.password.chars().count() < MIN_PASSWORD_CHARS {
            Some("Password must be at least 6 characters")
        } else {
            None
        },
        confirm_password: if form.confirm_password.is_empty() {
            Some("Please confirm your password")
        } else if form.confirm_password != form.password {
            Some("Passwords do not match")
        } else {
            None
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Registration { email: email.to_owned(), password: form.password.clone(), full_name: full_name.to_owned() })
}

/// `local@domain.tld` with no whitespace and a single `@`.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let handle = expect_context::<AuthHandle>();
    let navigate = use_navigate();
    install_signed_in_redirect(auth, navigate.clone());

    let form = RwSignal::new(RegisterForm::default());
    let errors = RwSignal::new(RegisterErrors::default());
    let general = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        general.set(None);
        let registration = match validate_registration(&form.get()) {
            Ok(registration) => {
                errors.set(RegisterErrors::default());
                registration
            }
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };
        let Some(cache) = handle.cache() else {
            general.set(Some(BACKEND_UNAVAILABLE.to_owned()));
            return;
        };
        busy.set(true);

        #[cfg(feature = "csr")]
        {
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                match cache.sign_up(&registration).await {
                    Ok(session::SignUpOutcome::ConfirmationRequired(_)) => {
                        navigate(&format!("/login?{REGISTERED_QUERY}=1"), leptos_router::NavigateOptions::default());
                    }
                    // Auto-confirmed: the signed-in redirect takes over.
                    Ok(session::SignUpOutcome::SignedIn(_)) => {}
                    Err(e) => {
                        log::warn!("sign-up failed: {e}");
                        general.set(Some(crate::pages::login::action_error_message(&e)));
                        busy.set(false);
                    }
                }
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (cache, registration, &navigate);
            busy.set(false);
        }
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Create your account"</h1>
                <form class="auth-form" on:submit=on_submit>
                    <label class="auth-label">
                        "Full name"
                        <input
                            class="auth-input"
                            type="text"
                            autocomplete="name"
                            class:auth-input--invalid=move || errors.get().full_name.is_some()
                            prop:value=move || form.get().full_name
                            on:input=move |ev| {
                                form.update(|f| f.full_name = event_target_value(&ev));
                                errors.update(|e| e.full_name = None);
                            }
                        />
                    </label>
                    <FieldError message=Signal::derive(move || errors.get().full_name)/>
                    <label class="auth-label">
                        "Email"
                        <input
                            class="auth-input"
                            type="email"
                            autocomplete="email"
                            class:auth-input--invalid=move || errors.get().email.is_some()
                            prop:value=move || form.get().email
                            on:input=move |ev| {
                                form.update(|f| f.email = event_target_value(&ev));
                                errors.update(|e| e.email = None);
                            }
                        />
                    </label>
                    <FieldError message=Signal::derive(move || errors.get().email)/>
                    <label class="auth-label">
                        "Password"
                        <input
                            class="auth-input"
                            type="password"
                            autocomplete="new-password"
                            class:auth-input--invalid=move || errors.get().password.is_some()
                            prop:value=move || form.get().password
                            on:input=move |ev| {
                                form.update(|f| f.password = event_target_value(&ev));
                                errors.update(|e| e.password = None);
                            }
                        />
                    </label>
                    <FieldError message=Signal::derive(move || errors.get().password)/>
                    <label class="auth-label">
                        "Confirm password"
                        <input
                            class="auth-input"
                            type="password"
                            autocomplete="new-password"
                            class:auth-input--invalid=move || errors.get().confirm_password.is_some()
                            prop:value=move || form.get().confirm_password
                            on:input=move |ev| {
                                form.update(|f| f.confirm_password = event_target_value(&ev));
                                errors.update(|e| e.confirm_password = None);
                            }
                        />
                    </label>
                    <FieldError message=Signal::derive(move || errors.get().confirm_password)/>
                    <Show when=move || general.get().is_some()>
                        <p class="auth-message auth-message--error">{move || general.get().unwrap_or_default()}</p>
                    </Show>
                    <button class="auth-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Creating account..." } else { "Create Account" }}
                    </button>
                </form>
                <p class="auth-card__footer">
                    "Already have an account? "
                    <a href="/login">"Sign in"</a>
                </p>
            </div>
        </div>
    }
}

#[component]
fn FieldError(message: Signal<Option<&'static str>>) -> impl IntoView {
    move || message.get().map(|m| view! { <p class="auth-field-error">{m}</p> })
}
