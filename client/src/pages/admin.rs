//! Admin panel shells. Only reachable through `ProtectedRoute admin_only`.

use leptos::prelude::*;

use crate::state::auth::AuthState;

/// Admin landing page with the caller's identity and quick actions.
#[component]
pub fn AdminDashboardPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let identity = move || auth.get().identity;

    view! {
        <section class="admin-page">
            <h1>"Admin Dashboard"</h1>
            <dl class="admin-page__identity">
                <dt>"User ID"</dt>
                <dd>{move || identity().map(|i| i.subject_id).unwrap_or_default()}</dd>
                <dt>"Email"</dt>
                <dd>{move || identity().and_then(|i| i.email).unwrap_or_default()}</dd>
                <dt>"Role"</dt>
                <dd>{move || identity().map(|i| i.role.as_str()).unwrap_or_default()}</dd>
            </dl>
            <h2>"Quick Actions"</h2>
            <div class="admin-page__actions">
                <a href="/admin/products" class="admin-page__action">
                    <strong>"Manage Products"</strong>
                    <span>"Add, edit, or remove products"</span>
                </a>
                <a href="/admin/orders" class="admin-page__action">
                    <strong>"Manage Orders"</strong>
                    <span>"Manage customer orders"</span>
                </a>
            </div>
        </section>
    }
}

/// Placeholder for an admin sub-section.
#[component]
pub fn AdminSectionPage(#[prop(into)] title: String) -> impl IntoView {
    view! {
        <section class="admin-page">
            <a href="/admin" class="admin-page__back">"Back to dashboard"</a>
            <h1>{title}</h1>
        </section>
    }
}
