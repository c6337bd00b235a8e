use super::*;
use session::{SessionUser, UserMetadata};

fn session() -> Session {
    Session {
        access_token: "at".to_owned(),
        refresh_token: "rt".to_owned(),
        expires_at: Some(1_900_000_000),
        user: SessionUser {
            id: "u1".to_owned(),
            email: Some("u1@example.com".to_owned()),
            user_metadata: UserMetadata { full_name: Some("Ada".to_owned()) },
        },
    }
}

#[test]
fn stored_session_decodes_back() {
    let raw = encode(&session()).unwrap();
    assert_eq!(decode(&raw), Some(session()));
}

#[test]
fn corrupt_storage_reads_as_absent() {
    assert_eq!(decode("not json"), None);
    assert_eq!(decode(r#"{"access_token":"at"}"#), None);
}

#[cfg(not(feature = "csr"))]
#[test]
fn outside_browser_store_is_empty() {
    let store = LocalSessionStore;
    store.save(&session());
    assert_eq!(store.load(), None);
    store.clear();
}
