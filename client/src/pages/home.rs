//! Landing page.

use leptos::prelude::*;

use crate::state::auth::AuthState;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();

    let greeting = move || {
        let state = auth.get();
        match (&state.identity, state.is_loading) {
            (Some(identity), false) => format!("Welcome back, {}!", identity.label()),
            _ => "Welcome to the store!".to_owned(),
        }
    };

    view! {
        <section class="home-page">
            <h1>{greeting}</h1>
            <Show when=move || auth.get().last_error.is_some()>
                <p class="home-page__error">
                    "We couldn't restore your session: "
                    {move || auth.get().last_error.unwrap_or_default()}
                </p>
            </Show>
            <p class="home-page__subtitle">"Browse the catalog and sign in to track your orders."</p>
        </section>
    }
}
