use super::*;
use crate::model::Identity;

fn identity(role: Role) -> Identity {
    Identity { subject_id: "u1".to_owned(), email: None, display_name: None, role }
}

fn snapshot(identity: Option<Identity>, is_loading: bool) -> CacheSnapshot {
    CacheSnapshot { identity, is_loading, last_error: None }
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn loading_shows_placeholder_regardless_of_identity() {
    for required in [Capability::None, Capability::Admin] {
        assert_eq!(decide(&snapshot(None, true), required), GuardDecision::Placeholder);
        assert_eq!(decide(&snapshot(Some(identity(Role::User)), true), required), GuardDecision::Placeholder);
        assert_eq!(decide(&snapshot(Some(identity(Role::Admin)), true), required), GuardDecision::Placeholder);
    }
}

// =============================================================================
// Settled
// =============================================================================

#[test]
fn absent_identity_redirects_to_sign_in() {
    for required in [Capability::None, Capability::Admin] {
        assert_eq!(
            decide(&snapshot(None, false), required),
            GuardDecision::Redirect(Destination::SignIn)
        );
    }
}

#[test]
fn last_error_without_identity_still_redirects_to_sign_in() {
    let mut s = snapshot(None, false);
    s.last_error = Some("session fetch failed".into());
    assert_eq!(decide(&s, Capability::None), GuardDecision::Redirect(Destination::SignIn));
}

#[test]
fn user_on_admin_route_redirects_home() {
    assert_eq!(
        decide(&snapshot(Some(identity(Role::User)), false), Capability::Admin),
        GuardDecision::Redirect(Destination::Home)
    );
}

#[test]
fn user_on_signed_in_route_renders() {
    assert_eq!(decide(&snapshot(Some(identity(Role::User)), false), Capability::None), GuardDecision::Render);
}

#[test]
fn admin_renders_everywhere() {
    for required in [Capability::None, Capability::Admin] {
        assert_eq!(decide(&snapshot(Some(identity(Role::Admin)), false), required), GuardDecision::Render);
    }
}

// =============================================================================
// Helpers
// =============================================================================

#[test]
fn destinations_map_to_routes() {
    assert_eq!(Destination::SignIn.path(), "/login");
    assert_eq!(Destination::Home.path(), "/");
}

#[test]
fn capability_from_admin_flag() {
    assert_eq!(Capability::admin_only(true), Capability::Admin);
    assert_eq!(Capability::admin_only(false), Capability::None);
    assert_eq!(Capability::default(), Capability::None);
}
