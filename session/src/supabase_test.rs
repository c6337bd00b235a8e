use super::*;
use crate::cache::SessionCache;
use crate::model::UserMetadata;
use crate::store::MemoryStore;

fn client() -> SupabaseClient {
    SupabaseClient::new(SupabaseConfig::new("http://127.0.0.1:9", "anon").unwrap()).unwrap()
}

fn session(expires_at: Option<i64>) -> Session {
    Session {
        access_token: "user-token".into(),
        refresh_token: "refresh".into(),
        expires_at,
        user: SessionUser { id: "u1".into(), email: Some("u1@example.com".into()), user_metadata: UserMetadata::default() },
    }
}

// =============================================================================
// error_message
// =============================================================================

#[test]
fn error_message_prefers_gotrue_msg() {
    assert_eq!(error_message(400, r#"{"code":400,"msg":"Invalid login credentials"}"#), "Invalid login credentials");
}

#[test]
fn error_message_reads_postgrest_message() {
    let body = r#"{"code":"42501","message":"permission denied for table profiles","details":null}"#;
    assert_eq!(error_message(401, body), "permission denied for table profiles");
}

#[test]
fn error_message_reads_oauth_style_description() {
    let body = r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#;
    assert_eq!(error_message(400, body), "Email not confirmed");
}

#[test]
fn error_message_falls_back_to_raw_body_then_status() {
    assert_eq!(error_message(502, "  upstream down \n"), "upstream down");
    assert_eq!(error_message(502, ""), "request failed with status 502");
}

// =============================================================================
// parse_sign_up
// =============================================================================

#[test]
fn sign_up_with_session_is_signed_in() {
    let body = serde_json::json!({
        "access_token": "at",
        "refresh_token": "rt",
        "expires_at": 10,
        "user": { "id": "u1", "email": "u1@example.com" }
    });
    match parse_sign_up(body).unwrap() {
        SignUpOutcome::SignedIn(s) => assert_eq!(s.user.id, "u1"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn sign_up_with_bare_user_requires_confirmation() {
    let body = serde_json::json!({
        "id": "u2",
        "email": "u2@example.com",
        "user_metadata": { "full_name": "Bea" }
    });
    match parse_sign_up(body).unwrap() {
        SignUpOutcome::ConfirmationRequired(user) => {
            assert_eq!(user.id, "u2");
            assert_eq!(user.user_metadata.full_name.as_deref(), Some("Bea"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn sign_up_with_wrapped_user_requires_confirmation() {
    let body = serde_json::json!({ "user": { "id": "u3" }, "session": null });
    assert!(matches!(parse_sign_up(body).unwrap(), SignUpOutcome::ConfirmationRequired(u) if u.id == "u3"));
}

#[test]
fn sign_up_with_unexpected_body_is_decode_error() {
    assert!(parse_sign_up(serde_json::json!({ "unexpected": true })).is_err());
}

// =============================================================================
// Local session + subscriptions
// =============================================================================

#[tokio::test]
async fn get_session_returns_restored_session() {
    let client = client().with_session(session(None));
    let current = client.get_session().await.unwrap();
    assert_eq!(current.unwrap().user.id, "u1");
}

#[tokio::test]
async fn get_session_drops_expired_session() {
    let client = client().with_session(session(Some(1)));
    assert!(client.get_session().await.unwrap().is_none());
    assert!(client.current_session().is_none());
}

#[tokio::test]
async fn subscribers_receive_emitted_events() {
    let client = client();
    let mut first = client.subscribe();
    let mut second = client.subscribe();

    client.emit(&AuthEvent::SignedOut);
    assert_eq!(first.recv().await, Some(AuthEvent::SignedOut));
    assert_eq!(second.recv().await, Some(AuthEvent::SignedOut));
}

#[test]
fn dropping_subscription_removes_listener() {
    let client = client();
    let first = client.subscribe();
    let second = client.subscribe();
    assert_eq!(client.lock_listeners().senders.len(), 2);

    drop(first);
    assert_eq!(client.lock_listeners().senders.len(), 1);
    second.unsubscribe();
    assert_eq!(client.lock_listeners().senders.len(), 0);
}

#[tokio::test]
async fn sign_out_without_session_emits_signed_out() {
    let client = client();
    let mut events = client.subscribe();

    client.sign_out().await.unwrap();
    assert_eq!(events.recv().await, Some(AuthEvent::SignedOut));
}

#[tokio::test]
async fn find_user_by_email_requires_service_role() {
    let err = client().find_user_by_email("a@example.com").await.unwrap_err();
    assert!(matches!(err, BackendError::MissingServiceRole));
}

// =============================================================================
// Session store
// =============================================================================

#[tokio::test]
async fn stored_session_is_restored_into_initialize() {
    let store = Arc::new(MemoryStore::with_session(session(None)));
    let client = client().with_store(store);
    assert_eq!(client.current_session().map(|s| s.user.id), Some("u1".to_owned()));

    // The profile lookup cannot reach the unroutable backend, so the role
    // degrades to user, but the identity itself comes from the store.
    let cache = SessionCache::new(client);
    cache.initialize().await;
    let snapshot = cache.snapshot();
    assert!(!snapshot.is_loading);
    assert!(snapshot.last_error.is_none());
    let identity = snapshot.identity.expect("restored identity");
    assert_eq!(identity.subject_id, "u1");
    assert_eq!(identity.email.as_deref(), Some("u1@example.com"));
}

#[test]
fn empty_store_leaves_session_absent() {
    let client = client().with_store(Arc::new(MemoryStore::default()));
    assert!(client.current_session().is_none());
}

#[test]
fn new_session_is_written_to_store() {
    let store = Arc::new(MemoryStore::default());
    let client = client().with_store(store.clone());
    client.store_session(&session(Some(i64::MAX)));
    assert_eq!(store.load().map(|s| s.user.id), Some("u1".to_owned()));
}

#[tokio::test]
async fn expired_stored_session_is_dropped_from_store() {
    let store = Arc::new(MemoryStore::with_session(session(Some(1))));
    let client = client().with_store(store.clone());
    assert!(client.get_session().await.unwrap().is_none());
    assert!(store.load().is_none());
}

#[tokio::test]
async fn sign_out_clears_store_even_when_remote_fails() {
    let store = Arc::new(MemoryStore::with_session(session(None)));
    let client = client().with_store(store.clone());
    let mut events = client.subscribe();

    assert!(client.sign_out().await.is_err());
    assert!(store.load().is_none());
    assert!(client.current_session().is_none());
    assert_eq!(events.recv().await, Some(AuthEvent::SignedOut));
}

// =============================================================================
// Bearer selection
// =============================================================================

#[test]
fn bearer_uses_session_token_when_signed_in() {
    let client = client();
    assert_eq!(client.bearer(), "anon");
    let client = client.with_session(session(None));
    assert_eq!(client.bearer(), "user-token");
    assert_eq!(client.write_bearer(), "user-token");
}

#[test]
fn write_bearer_prefers_service_role() {
    let config = SupabaseConfig::new("http://127.0.0.1:9", "anon")
        .unwrap()
        .with_service_role_key(Some("service".into()));
    let client = SupabaseClient::new(config).unwrap().with_session(session(None));
    assert_eq!(client.write_bearer(), "service");
}
