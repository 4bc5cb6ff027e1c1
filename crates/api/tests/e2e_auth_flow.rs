// E2E tests for the Auth0 login flow

mod common;

use api::routes::auth::STATE_TTL_MINUTES;
use axum::http::{header, StatusCode};
use chrono::Duration;
use common::*;
use httpmock::prelude::*;
use services::auth::UserRepository;

// ============================================
// Login redirect
// ============================================

#[tokio::test]
async fn test_login_redirects_to_auth0_authorize() {
    let app = setup_test_app().await;

    let response = app.server.get("/auth/login").await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    let location = response.header(header::LOCATION);
    let location = url::Url::parse(location.to_str().unwrap()).unwrap();
    assert_eq!(location.path(), "/authorize");

    let query: std::collections::HashMap<_, _> = location.query_pairs().into_owned().collect();
    assert_eq!(query["client_id"], "client-123");
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["redirect_uri"], "https://app.example.com/auth/callback");
    assert_eq!(query["scope"], "openid profile email");

    // The issued state is remembered for the callback
    let state = &query["state"];
    assert!(app.state.state_store.read().await.contains_key(state));
}

#[tokio::test]
async fn test_login_state_is_single_use() {
    let app = setup_test_app().await;
    mock_token_endpoint(&app.auth0).await;
    mock_userinfo_endpoint(&app.auth0, auth0_profile()).await;

    let state = issue_state(&app).await;

    let first = app
        .server
        .get("/auth/callback")
        .add_query_param("code", TEST_CODE)
        .add_query_param("state", &state)
        .await;
    assert_eq!(first.status_code(), StatusCode::SEE_OTHER);

    let replay = app
        .server
        .get("/auth/callback")
        .add_query_param("code", TEST_CODE)
        .add_query_param("state", &state)
        .await;
    assert_eq!(replay.status_code(), StatusCode::BAD_REQUEST);
    assert!(replay.text().is_empty());
}

// ============================================
// Callback success
// ============================================

#[tokio::test]
async fn test_callback_creates_user_and_opens_session() {
    let app = setup_test_app().await;
    let token = mock_token_endpoint(&app.auth0).await;
    let userinfo = mock_userinfo_endpoint(&app.auth0, auth0_profile()).await;

    let response = complete_callback(&app).await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.header(header::LOCATION).to_str().unwrap(),
        LOGIN_REDIRECT
    );
    token.assert_hits_async(1).await;
    userinfo.assert_hits_async(1).await;

    let set_cookie = response.header(header::SET_COOKIE);
    let set_cookie = set_cookie.to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Secure"));
    assert!(set_cookie.contains("Path=/"));
    let session_id = session_id_from(set_cookie);

    let users = app.users.users();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "email@email.com");
    assert_eq!(users[0].email, "email@email.com");
    assert_eq!(users[0].provider_user_id.as_deref(), Some("auth0|1111111"));

    // The session exposes the user and the raw profile
    let me = app
        .server
        .get("/auth/user")
        .add_header("Cookie", format!("session_id={session_id}"))
        .await;
    assert_eq!(me.status_code(), StatusCode::OK);

    let body = me.json::<serde_json::Value>();
    assert_eq!(body["id"], users[0].id.to_string());
    assert_eq!(body["username"], "email@email.com");
    assert_eq!(body["email"], "email@email.com");
    assert_eq!(body["profile"], auth0_profile());
}

#[tokio::test]
async fn test_repeat_login_reuses_user_matched_by_email() {
    let app = setup_test_app().await;
    mock_token_endpoint(&app.auth0).await;
    mock_userinfo_endpoint(&app.auth0, auth0_profile()).await;

    for _ in 0..2 {
        let response = complete_callback(&app).await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    }

    assert_eq!(app.users.count().await.unwrap(), 1);
    assert_eq!(app.state.sessions.read().await.len(), 2);
}

// ============================================
// Callback failures: always 400 with an empty body
// ============================================

#[tokio::test]
async fn test_callback_without_code_is_rejected() {
    let app = setup_test_app().await;
    let token = mock_token_endpoint(&app.auth0).await;

    let response = app.server.get("/auth/callback").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().is_empty());
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    token.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_callback_without_state_is_rejected() {
    let app = setup_test_app().await;
    let token = mock_token_endpoint(&app.auth0).await;
    issue_state(&app).await;

    let response = app
        .server
        .get("/auth/callback")
        .add_query_param("code", TEST_CODE)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().is_empty());
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(app.users.users().is_empty());
    token.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_callback_with_expired_state_is_rejected() {
    let app = setup_test_app().await;
    let token = mock_token_endpoint(&app.auth0).await;
    mock_userinfo_endpoint(&app.auth0, auth0_profile()).await;

    let state = issue_state(&app).await;
    app.state
        .state_store
        .write()
        .await
        .get_mut(&state)
        .unwrap()
        .issued_at -= Duration::minutes(STATE_TTL_MINUTES + 1);

    let response = app
        .server
        .get("/auth/callback")
        .add_query_param("code", TEST_CODE)
        .add_query_param("state", &state)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().is_empty());
    assert!(!app.state.state_store.read().await.contains_key(&state));
    token.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_login_prunes_expired_states() {
    let app = setup_test_app().await;

    let abandoned = issue_state(&app).await;
    app.state
        .state_store
        .write()
        .await
        .get_mut(&abandoned)
        .unwrap()
        .issued_at -= Duration::minutes(STATE_TTL_MINUTES + 1);

    let fresh = issue_state(&app).await;

    let store = app.state.state_store.read().await;
    assert_eq!(store.len(), 1);
    assert!(store.contains_key(&fresh));
    assert!(!store.contains_key(&abandoned));
}

#[tokio::test]
async fn test_callback_with_unknown_state_is_rejected() {
    let app = setup_test_app().await;
    let token = mock_token_endpoint(&app.auth0).await;

    let response = app
        .server
        .get("/auth/callback")
        .add_query_param("code", TEST_CODE)
        .add_query_param("state", "never-issued")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().is_empty());
    token.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_callback_rejects_code_refused_by_auth0() {
    let app = setup_test_app().await;
    app.auth0
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(403).json_body(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Invalid authorization code"
            }));
        })
        .await;

    let state = issue_state(&app).await;
    let response = app
        .server
        .get("/auth/callback")
        .add_query_param("code", "expired-code")
        .add_query_param("state", state)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().is_empty());
    assert!(app.users.users().is_empty());
}

#[tokio::test]
async fn test_callback_rejects_userinfo_failure() {
    let app = setup_test_app().await;
    mock_token_endpoint(&app.auth0).await;
    app.auth0
        .mock_async(|when, then| {
            when.method(GET).path("/userinfo");
            then.status(401).body("Unauthorized");
        })
        .await;

    let response = complete_callback(&app).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().is_empty());
}

#[tokio::test]
async fn test_callback_rejects_profile_with_null_user_id() {
    let app = setup_test_app().await;
    mock_token_endpoint(&app.auth0).await;
    let mut profile = auth0_profile();
    profile["user_id"] = serde_json::Value::Null;
    mock_userinfo_endpoint(&app.auth0, profile).await;

    let response = complete_callback(&app).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().is_empty());
    assert!(app.users.users().is_empty());
    assert!(app.state.sessions.read().await.is_empty());
}

#[tokio::test]
async fn test_callback_rejects_empty_profile() {
    let app = setup_test_app().await;
    mock_token_endpoint(&app.auth0).await;
    mock_userinfo_endpoint(&app.auth0, serde_json::json!({})).await;

    let response = complete_callback(&app).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().is_empty());
    assert!(app.users.users().is_empty());
}

// ============================================
// Session endpoints
// ============================================

#[tokio::test]
async fn test_current_user_requires_session() {
    let app = setup_test_app().await;

    let response = app.server.get("/auth/user").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get("/auth/user")
        .add_header("Cookie", "session_id=not-a-session")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = setup_test_app().await;
    mock_token_endpoint(&app.auth0).await;
    mock_userinfo_endpoint(&app.auth0, auth0_profile()).await;

    let response = complete_callback(&app).await;
    let session_id = session_id_from(response.header(header::SET_COOKIE).to_str().unwrap());
    let cookie = format!("session_id={session_id}");

    let logout = app
        .server
        .post("/auth/logout")
        .add_header("Cookie", cookie.clone())
        .await;
    assert_eq!(logout.status_code(), StatusCode::OK);
    assert!(logout
        .header(header::SET_COOKIE)
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));

    let me = app.server.get("/auth/user").add_header("Cookie", cookie).await;
    assert_eq!(me.status_code(), StatusCode::UNAUTHORIZED);

    // The local user survives logout
    assert_eq!(app.users.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_test_app().await;

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<serde_json::Value>()["status"], "ok");
}
