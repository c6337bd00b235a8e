//! Route wrapper that gates its children on the session cache.
//!
//! DESIGN
//! ======
//! The decision itself is `session::decide`; this component only re-runs it
//! whenever the auth snapshot changes and turns `Redirect` into a history
//! replace, so the guarded URL never stays in the back stack.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;
use session::{Capability, GuardDecision, decide};

use crate::state::auth::AuthState;

/// Render `children` only for a signed-in identity (admins only when
/// `admin_only`). Shows a placeholder while auth is settling.
#[component]
pub fn ProtectedRoute(#[prop(optional)] admin_only: bool, children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let required = Capability::admin_only(admin_only);
    let decision = Memo::new(move |_| decide(&auth.get(), required));

    let navigate = use_navigate();
    Effect::new(move || {
        if let GuardDecision::Redirect(destination) = decision.get() {
            navigate(destination.path(), NavigateOptions { replace: true, ..Default::default() });
        }
    });

    move || match decision.get() {
        GuardDecision::Placeholder => view! {
            <div class="auth-loading" aria-busy="true">
                <span class="auth-loading__spinner"></span>
            </div>
        }
        .into_any(),
        GuardDecision::Redirect(_) => ().into_any(),
        GuardDecision::Render => children().into_any(),
    }
}
