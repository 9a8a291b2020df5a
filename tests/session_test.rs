use std::sync::Arc;

use campustrack::api::InMemoryPortalApi;
use campustrack::services::AccountService;
use campustrack::session::{Session, SessionStore};
use pretty_assertions::assert_eq;

#[test]
fn session_transitions() {
    let mut session = Session::default();
    assert!(!session.is_signed_in());
    assert_eq!(session.token(), None);

    session.sign_in("token-abc".to_string());
    assert!(session.is_signed_in());
    assert_eq!(session.token(), Some("token-abc"));

    session.sign_out();
    assert!(!session.is_signed_in());
}

#[test]
fn store_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::new(dir.path().join("session"));

    // Missing file reads as signed out.
    assert_eq!(store.load().expect("load"), Session::SignedOut);

    let mut session = Session::default();
    session.sign_in("token-xyz".to_string());
    store.save(&session).expect("save");
    assert_eq!(store.load().expect("reload"), session);

    store.clear().expect("clear");
    assert_eq!(store.load().expect("load after clear"), Session::SignedOut);
    // Clearing twice is fine.
    store.clear().expect("clear again");
}

#[test]
fn saving_a_signed_out_session_clears_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::new(dir.path().join("session"));

    let mut session = Session::default();
    session.sign_in("token-1".to_string());
    store.save(&session).expect("save");

    session.sign_out();
    store.save(&session).expect("save signed out");
    assert_eq!(store.load().expect("load"), Session::SignedOut);
}

#[tokio::test]
async fn expired_token_clears_the_stored_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session");
    let api = Arc::new(InMemoryPortalApi::new());

    let mut account = AccountService::new(api.clone(), SessionStore::new(path.clone()))
        .expect("account service");
    account
        .register(
            "student@example.com".to_string(),
            "hunter2".to_string(),
            None,
        )
        .await
        .expect("register");
    account
        .login("student@example.com".to_string(), "hunter2".to_string())
        .await
        .expect("login");
    assert!(account.session().is_signed_in());
    assert!(path.exists());

    // The backend expires the token behind our back.
    let token = account.session().token().expect("token").to_string();
    api.revoke_token(&token);

    let err = account.current_user().await.expect_err("401 expected");
    assert!(err.is_unauthorized());
    assert!(!account.session().is_signed_in());
    assert!(!path.exists(), "session file must be cleared after a 401");
}

#[tokio::test]
async fn login_persists_the_token_for_the_next_invocation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session");
    let api = Arc::new(InMemoryPortalApi::new());

    let mut account =
        AccountService::new(api.clone(), SessionStore::new(path.clone())).expect("account");
    account
        .register("a@example.com".to_string(), "pw".to_string(), None)
        .await
        .expect("register");
    account
        .login("a@example.com".to_string(), "pw".to_string())
        .await
        .expect("login");

    // A fresh service over the same store picks the session back up.
    let reloaded = AccountService::new(api, SessionStore::new(path)).expect("reload");
    assert!(reloaded.session().is_signed_in());
    assert_eq!(reloaded.session().token(), account.session().token());
}
