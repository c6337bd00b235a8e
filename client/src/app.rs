//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::navbar::Navbar;
use crate::components::protected_route::ProtectedRoute;
use crate::pages::{
    admin::{AdminDashboardPage, AdminSectionPage},
    home::HomePage,
    login::LoginPage,
    not_found::NotFoundPage,
    orders::OrdersPage,
    register::RegisterPage,
};
use crate::state::auth::{AuthHandle, AuthState};

/// Root application component.
///
/// Starts the session cache, provides auth contexts, and sets up client-side
/// routing. Order history requires a signed-in user; `/admin/*` requires the
/// admin role.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let auth = RwSignal::new(AuthState::default());
    let handle = AuthHandle::start(auth);
    provide_context(auth);
    provide_context(handle);

    view! {
        <Title text="Storefront"/>

        <Router>
            <Navbar/>
            <main>
                <Routes fallback=NotFoundPage>
                    <Route path=StaticSegment("") view=HomePage/>
                    <Route path=StaticSegment("login") view=LoginPage/>
                    <Route path=StaticSegment("register") view=RegisterPage/>
                    <Route
                        path=StaticSegment("orders")
                        view=|| view! { <ProtectedRoute><OrdersPage/></ProtectedRoute> }
                    />
                    <Route
                        path=StaticSegment("admin")
                        view=|| view! { <ProtectedRoute admin_only=true><AdminDashboardPage/></ProtectedRoute> }
                    />
                    <Route
                        path=(StaticSegment("admin"), StaticSegment("products"))
                        view=|| view! {
                            <ProtectedRoute admin_only=true>
                                <AdminSectionPage title="Manage Products"/>
                            </ProtectedRoute>
                        }
                    />
                    <Route
                        path=(StaticSegment("admin"), StaticSegment("orders"))
                        view=|| view! {
                            <ProtectedRoute admin_only=true>
                                <AdminSectionPage title="Customer Orders"/>
                            </ProtectedRoute>
                        }
                    />
                </Routes>
            </main>
        </Router>
    }
}
