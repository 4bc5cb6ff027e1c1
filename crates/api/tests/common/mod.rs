#![allow(dead_code)]

use api::{build_app, init_auth_state, routes::auth::AuthState};
use axum_test::TestServer;
use config::Auth0Config;
use httpmock::prelude::*;
use serde_json::Value;
use services::test_utils::InMemoryUserRepository;
use std::sync::Arc;

pub const TEST_CODE: &str = "test-authorization-code";
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";
pub const LOGIN_REDIRECT: &str = "/dashboard";

/// Application wired against a mock Auth0 tenant and an in-memory user store
pub struct TestApp {
    pub server: TestServer,
    pub auth0: MockServer,
    pub users: Arc<InMemoryUserRepository>,
    pub state: AuthState,
}

pub fn test_auth0_config(auth0: &MockServer) -> Auth0Config {
    Auth0Config {
        domain: auth0.base_url(),
        client_id: "client-123".to_string(),
        client_secret: "secret-456".to_string(),
        full_url: "https://app.example.com".to_string(),
        login_redirect: LOGIN_REDIRECT.to_string(),
    }
}

pub async fn setup_test_app() -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("api=debug,services=debug")
        .try_init();

    let auth0 = MockServer::start_async().await;
    let users = Arc::new(InMemoryUserRepository::new());
    let state = init_auth_state(test_auth0_config(&auth0), users.clone())
        .expect("Failed to build auth state");
    let server = TestServer::new(build_app(state.clone())).expect("Failed to start test server");

    TestApp {
        server,
        auth0,
        users,
        state,
    }
}

pub fn auth0_profile() -> Value {
    serde_json::json!({
        "email": "email@email.com",
        "nickname": "test_username",
        "name": "Test User",
        "picture": "http://localhost/test.png",
        "user_id": "auth0|1111111"
    })
}

/// Token endpoint that accepts `TEST_CODE`
pub async fn mock_token_endpoint(auth0: &MockServer) -> httpmock::Mock<'_> {
    auth0
        .mock_async(|when, then| {
            when.method(POST)
                .path("/oauth/token")
                .json_body_partial(format!(r#"{{"code": "{TEST_CODE}"}}"#));
            then.status(200).json_body(serde_json::json!({
                "access_token": TEST_ACCESS_TOKEN,
                "token_type": "Bearer"
            }));
        })
        .await
}

pub async fn mock_userinfo_endpoint(auth0: &MockServer, profile: Value) -> httpmock::Mock<'_> {
    auth0
        .mock_async(|when, then| {
            when.method(GET)
                .path("/userinfo")
                .query_param("access_token", TEST_ACCESS_TOKEN);
            then.status(200).json_body(profile);
        })
        .await
}

/// Extract the session id from a `Set-Cookie` value
pub fn session_id_from(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.trim().strip_prefix("session_id="))
        .expect("Set-Cookie should carry session_id")
        .to_string()
}

/// Start a login and return the state it issued
pub async fn issue_state(app: &TestApp) -> String {
    let response = app.server.get("/auth/login").await;
    let location = url::Url::parse(
        response
            .header(axum::http::header::LOCATION)
            .to_str()
            .expect("Location should be ASCII"),
    )
    .expect("Location should be a URL");

    location
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("authorize URL should carry a state")
}

/// Complete the callback with `TEST_CODE` and a freshly issued state
pub async fn complete_callback(app: &TestApp) -> axum_test::TestResponse {
    let state = issue_state(app).await;
    app.server
        .get("/auth/callback")
        .add_query_param("code", TEST_CODE)
        .add_query_param("state", state)
        .await
}
