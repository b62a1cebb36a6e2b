/// Integration tests for the magic-link login flow
///
/// Each test runs the real router end-to-end: session middleware, flash
/// state, storage, and the outbox.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{location, TestContext};
use nameplate_shared::events::DomainEvent;
use nameplate_shared::store::AuthStore;

#[tokio::test]
async fn test_login_page_is_up_and_running() {
    let ctx = TestContext::new();

    let response = ctx.get("/login", None).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_a_logged_in_user_cannot_visit_the_login_page() {
    let ctx = TestContext::new();
    let user = ctx.create_user("u@example.com", "Roo").await;
    let sid = ctx.begin_session().await;
    ctx.session(&sid).log_in(user.id);

    let response = ctx.get("/login", Some(&sid)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/"));
}

#[tokio::test]
async fn test_cannot_request_a_link_with_invalid_input() {
    let ctx = TestContext::new();
    let user = ctx.create_user("u@example.com", "Roo").await;

    for value in ["", "me", "you@you", "roo.3"] {
        let sid = ctx.begin_session().await;

        let response = ctx
            .post_form("/login", &format!("email={value}"), Some(&sid))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{value:?}");
        assert_eq!(location(&response).as_deref(), Some("/login"), "{value:?}");
        assert!(ctx.session(&sid).has_flash("errors.email"), "{value:?}");
    }

    // None of the rejected submissions issued a token.
    assert!(ctx
        .store
        .login_token_for_user(user.id)
        .await
        .unwrap()
        .is_none());
    assert!(ctx.state.outbox.recorded().is_empty());
}

#[tokio::test]
async fn test_token_is_sent_after_filling_in_the_form_successfully() {
    let ctx = TestContext::new();
    let user = ctx.create_user("u@example.com", "Roo").await;
    let sid = ctx.begin_session().await;

    let response = ctx
        .post_form("/login", "email=u@example.com", Some(&sid))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/login"));
    assert!(ctx.session(&sid).has_flash("link.sent"));

    let link_requests = ctx
        .state
        .outbox
        .recorded()
        .into_iter()
        .filter(|event| {
            matches!(
                event,
                DomainEvent::AuthenticationLinkWasRequested { user_id } if *user_id == user.id
            )
        })
        .count();
    assert_eq!(link_requests, 1);

    assert!(ctx
        .store
        .login_token_for_user(user.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_requesting_a_link_does_not_log_the_user_in() {
    let ctx = TestContext::new();
    ctx.create_user("u@example.com", "Roo").await;
    let sid = ctx.begin_session().await;

    ctx.post_form("/login", "email=u@example.com", Some(&sid))
        .await;

    // Still able to use the form: not redirected away as authenticated.
    let response = ctx.get("/login", Some(&sid)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ctx.session(&sid).user_id(), None);
}

#[tokio::test]
async fn test_user_is_logged_in_successfully() {
    let ctx = TestContext::new();
    let user = ctx.create_user("u@example.com", "Roo").await;
    let token = ctx.issue_token(&user).await;
    let sid = ctx.begin_session().await;

    let response = ctx.get(&format!("/login/{token}"), Some(&sid)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/"));

    let session_user_id = ctx.session(&sid).user_id().expect("session bound to a user");
    let session_user = ctx
        .store
        .find_user_by_id(session_user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session_user.moniker, user.moniker);

    // Make sure this token cannot be reused.
    assert!(!ctx.store.login_token_exists(&token).await.unwrap());
    assert!(ctx
        .state
        .outbox
        .recorded()
        .contains(&DomainEvent::LoggedIn { user_id: user.id }));
}

#[tokio::test]
async fn test_a_token_cannot_be_used_twice() {
    let ctx = TestContext::new();
    let user = ctx.create_user("u@example.com", "Roo").await;
    let token = ctx.issue_token(&user).await;

    let first_sid = ctx.begin_session().await;
    ctx.get(&format!("/login/{token}"), Some(&first_sid)).await;

    let second_sid = ctx.begin_session().await;
    let response = ctx.get(&format!("/login/{token}"), Some(&second_sid)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/login"));
    assert!(ctx.session(&second_sid).has_flash("token.expired"));
    assert_eq!(ctx.session(&second_sid).user_id(), None);
}

#[tokio::test]
async fn test_user_cannot_login_with_an_expired_token() {
    let ctx = TestContext::new();
    let user = ctx.create_user("u@example.com", "Roo").await;
    let token = ctx.issue_token(&user).await;
    ctx.store
        .set_login_token_created_at(user.id, Utc::now() - Duration::minutes(6));
    let sid = ctx.begin_session().await;

    let response = ctx.get(&format!("/login/{token}"), Some(&sid)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/login"));
    assert!(ctx.session(&sid).has_flash("token.expired"));
    assert_eq!(ctx.session(&sid).user_id(), None);
}

#[tokio::test]
async fn test_an_unknown_token_reads_the_same_as_an_expired_one() {
    let ctx = TestContext::new();
    ctx.create_user("u@example.com", "Roo").await;
    let sid = ctx.begin_session().await;

    let response = ctx.get("/login/never-issued-value", Some(&sid)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/login"));
    assert!(ctx.session(&sid).has_flash("token.expired"));
    assert_eq!(ctx.session(&sid).user_id(), None);
}

#[tokio::test]
async fn test_a_logged_in_user_following_a_link_is_sent_home() {
    let ctx = TestContext::new();
    let user = ctx.create_user("u@example.com", "Roo").await;
    let token = ctx.issue_token(&user).await;
    let sid = ctx.begin_session().await;
    ctx.session(&sid).log_in(user.id);

    let response = ctx.get(&format!("/login/{token}"), Some(&sid)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/"));
    // The guard fired before consumption: the token is untouched.
    assert!(ctx.store.login_token_exists(&token).await.unwrap());
}

#[tokio::test]
async fn test_logout_clears_the_session() {
    let ctx = TestContext::new();
    let user = ctx.create_user("u@example.com", "Roo").await;
    let sid = ctx.begin_session().await;
    ctx.session(&sid).log_in(user.id);

    let response = ctx.get("/logout", Some(&sid)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/"));
    assert_eq!(ctx.session(&sid).user_id(), None);
}
