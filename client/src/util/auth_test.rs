use super::*;
use session::Identity;

fn identity(role: Role) -> Identity {
    Identity {
        subject_id: "u1".to_owned(),
        email: Some("u1@example.com".to_owned()),
        display_name: None,
        role,
    }
}

#[test]
fn post_auth_destination_sends_admins_to_dashboard() {
    assert_eq!(post_auth_destination(Role::Admin), "/admin");
    assert_eq!(post_auth_destination(Role::User), "/");
}

#[test]
fn no_redirect_while_loading() {
    let state = AuthState { identity: Some(identity(Role::Admin)), is_loading: true, last_error: None };
    assert_eq!(signed_in_redirect(&state), None);
}

#[test]
fn no_redirect_when_signed_out() {
    assert_eq!(signed_in_redirect(&AuthState::signed_out()), None);
}

#[test]
fn settled_identity_redirects_by_role() {
    let user = AuthState { identity: Some(identity(Role::User)), is_loading: false, last_error: None };
    let admin = AuthState { identity: Some(identity(Role::Admin)), is_loading: false, last_error: None };
    assert_eq!(signed_in_redirect(&user), Some("/"));
    assert_eq!(signed_in_redirect(&admin), Some("/admin"));
}
