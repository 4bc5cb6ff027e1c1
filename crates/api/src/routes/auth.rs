use crate::middleware::AuthenticatedUser;
use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use axum_extra::TypedHeader;
use chrono::{DateTime, Duration, Utc};
use headers::Cookie;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use services::auth::{Auth0Client, AuthError, IdentityResolver, UserId, UserRepository};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";

/// How long an issued login state stays valid
pub const STATE_TTL_MINUTES: i64 = 10;

/// CSRF states issued by `/auth/login` and not yet consumed
/// In production, use Redis or similar
pub type StateStore = Arc<RwLock<HashMap<String, OAuthState>>>;

#[derive(Debug, Clone)]
pub struct OAuthState {
    pub issued_at: DateTime<Utc>,
}

impl OAuthState {
    pub fn issued_now() -> Self {
        Self {
            issued_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at >= Duration::minutes(STATE_TTL_MINUTES)
    }
}

/// Server-side sessions keyed by the `session_id` cookie
pub type SessionStore = Arc<RwLock<HashMap<String, AuthSession>>>;

/// A logged-in browser session
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: UserId,
    /// Raw user-info document returned by Auth0
    pub profile: Value,
}

/// Shared state for the auth routes and the session middleware
#[derive(Clone)]
pub struct AuthState {
    pub auth0: Arc<Auth0Client>,
    pub resolver: Arc<dyn IdentityResolver>,
    pub user_repository: Arc<dyn UserRepository>,
    pub state_store: StateStore,
    pub sessions: SessionStore,
}

impl AuthState {
    pub fn new(
        auth0: Arc<Auth0Client>,
        resolver: Arc<dyn IdentityResolver>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            auth0,
            resolver,
            user_repository,
            state_store: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[derive(Deserialize)]
pub struct OAuthCallback {
    code: Option<String>,
    state: Option<String>,
}

#[derive(Serialize)]
pub struct CurrentUserResponse {
    id: UserId,
    username: String,
    email: String,
    profile: Value,
}

/// Initiate the Auth0 login flow - redirects to the tenant's authorize page
pub async fn login(State(state): State<AuthState>) -> Redirect {
    debug!("Initiating Auth0 login flow");

    let (auth_url, csrf_state) = state.auth0.authorize_url();

    // Store state for verification, dropping any that were never redeemed
    let now = Utc::now();
    let mut store = state.state_store.write().await;
    store.retain(|_, issued| !issued.is_expired(now));
    store.insert(csrf_state.clone(), OAuthState::issued_now());
    drop(store);

    debug!("Redirecting to Auth0 with state: {}", csrf_state);
    Redirect::to(&auth_url)
}

/// Handle the Auth0 redirect back to the application.
///
/// On success a session is opened and the browser is sent to the configured
/// login redirect. Every failure answers 400 with an empty body.
pub async fn oauth_callback(
    Query(params): Query<OAuthCallback>,
    State(state): State<AuthState>,
) -> Response {
    match complete_login(&state, params).await {
        Ok(session_id) => {
            let cookie = session_cookie(&state, &session_id, None);
            let redirect = Redirect::to(&state.auth0.config().login_redirect);
            ([(SET_COOKIE, cookie)], redirect).into_response()
        }
        Err(e) => {
            error!("Auth0 login failed: {}", e);
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

async fn complete_login(state: &AuthState, params: OAuthCallback) -> Result<String, AuthError> {
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AuthError::OAuthError("Missing authorization code".to_string()))?;

    // The state must be one we issued, still fresh; each is single-use
    let csrf_state = params.state.ok_or(AuthError::InvalidState)?;
    let issued = state.state_store.write().await.remove(&csrf_state);
    match issued {
        Some(issued) if !issued.is_expired(Utc::now()) => {}
        Some(_) => {
            debug!("Login state expired: {}", csrf_state);
            return Err(AuthError::InvalidState);
        }
        None => return Err(AuthError::InvalidState),
    }

    let (profile, user_info) = state.auth0.handle_callback(&code).await?;

    let user = state
        .resolver
        .resolve(&profile)
        .await?
        .ok_or(AuthError::NoUser)?;

    let session_id = Uuid::new_v4().to_string();
    state.sessions.write().await.insert(
        session_id.clone(),
        AuthSession {
            user_id: user.id,
            profile: user_info,
        },
    );

    info!(user_id = %user.id, "User {} logged in", user.username);
    Ok(session_id)
}

/// `Set-Cookie` value for the session cookie. `Secure` is added when the
/// application is served over https.
fn session_cookie(state: &AuthState, value: &str, max_age: Option<u64>) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/");
    if state.auth0.config().full_url.starts_with("https://") {
        cookie.push_str("; Secure");
    }
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    cookie
}

/// Get the user behind the current session
pub async fn current_user(
    Extension(AuthenticatedUser { user, session }): Extension<AuthenticatedUser>,
) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        profile: session.profile,
    })
}

/// Logout - drops the server-side session and clears the cookie
pub async fn logout(
    State(state): State<AuthState>,
    cookies: Option<TypedHeader<Cookie>>,
) -> impl IntoResponse {
    if let Some(session_id) = cookies
        .as_ref()
        .and_then(|TypedHeader(cookie)| cookie.get(SESSION_COOKIE))
    {
        if state.sessions.write().await.remove(session_id).is_some() {
            debug!("Removed session {}", session_id);
        }
    }

    let cookie = session_cookie(&state, "", Some(0));
    (
        [(SET_COOKIE, cookie)],
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
}
