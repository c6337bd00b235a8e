//! Top navigation bar reflecting the current auth state.
//!
//! SYSTEM CONTEXT
//! ==============
//! The link set is derived purely from the auth snapshot (see [`nav_links`]);
//! the only side effect here is the sign-out action, which goes through the
//! session cache so the snapshot updates from the resulting push event.

#[cfg(test)]
#[path = "navbar_test.rs"]
mod navbar_test;

use leptos::prelude::*;

use crate::state::auth::{AuthHandle, AuthState};

/// One entry in the navbar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
}

const HOME: NavLink = NavLink { href: "/", label: "Home" };

const GUEST_LINKS: [NavLink; 2] = [
    NavLink { href: "/login", label: "Login" },
    NavLink { href: "/register", label: "Register" },
];

const ADMIN_LINKS: [NavLink; 3] = [
    NavLink { href: "/admin", label: "Dashboard" },
    NavLink { href: "/admin/products", label: "Manage Products" },
    NavLink { href: "/admin/orders", label: "Manage Orders" },
];

/// Links to show for `state`. Empty while auth is still settling.
#[must_use]
pub fn nav_links(state: &AuthState) -> Vec<NavLink> {
    if state.is_loading {
        return Vec::new();
    }
    let mut links = vec![HOME];
    match &state.identity {
        None => links.extend(GUEST_LINKS),
        Some(identity) => {
            links.push(NavLink { href: "/orders", label: "My Orders" });
            if identity.is_admin() {
                links.extend(ADMIN_LINKS);
            }
        }
    }
    links
}

/// Whether the sign-out action is offered.
#[must_use]
pub fn shows_sign_out(state: &AuthState) -> bool {
    !state.is_loading && state.identity.is_some()
}

#[component]
pub fn Navbar() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let handle = expect_context::<AuthHandle>();
    let signing_out = RwSignal::new(false);

    let sign_out = Callback::new(move |()| {
        if signing_out.get_untracked() {
            return;
        }
        let Some(cache) = handle.cache() else {
            return;
        };
        signing_out.set(true);
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            if let Err(e) = cache.sign_out().await {
                log::warn!("sign-out failed: {e}");
            }
            signing_out.set(false);
        });
        #[cfg(not(feature = "csr"))]
        {
            let _ = cache;
            signing_out.set(false);
        }
    });

    view! {
        <nav class="navbar">
            <a href="/" class="navbar__brand">"Storefront"</a>
            <Show
                when=move || !auth.get().is_loading
                fallback=|| view! {
                    <div class="navbar__skeleton" aria-hidden="true">
                        <span class="navbar__skeleton-bar"></span>
                        <span class="navbar__skeleton-bar"></span>
                    </div>
                }
            >
                <div class="navbar__links">
                    <For
                        each=move || nav_links(&auth.get())
                        key=|link| link.href
                        children=|link| view! { <a href=link.href class="navbar__link">{link.label}</a> }
                    />
                    <Show when=move || shows_sign_out(&auth.get())>
                        <span class="navbar__user">
                            {move || auth.get().identity.map(|i| i.label().to_owned()).unwrap_or_default()}
                        </span>
                        <button class="btn navbar__sign-out" on:click=move |_| sign_out.run(()) disabled=move || signing_out.get()>
                            "Sign Out"
                        </button>
                    </Show>
                </div>
            </Show>
        </nav>
    }
}
