//! Order history page shell. Only reachable through `ProtectedRoute`.

use leptos::prelude::*;

use crate::state::auth::AuthState;

#[component]
pub fn OrdersPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let owner = move || auth.get().identity.map(|i| i.label().to_owned()).unwrap_or_default();

    view! {
        <section class="orders-page">
            <h1>"My Orders"</h1>
            <p class="orders-page__owner">"Signed in as " {owner}</p>
            <p class="orders-page__empty">"You have no orders yet."</p>
        </section>
    }
}
