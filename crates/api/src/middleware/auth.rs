use crate::routes::auth::{AuthSession, AuthState, SESSION_COOKIE};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use headers::{Cookie, HeaderMapExt};
use services::auth::LocalUser;
use tracing::{debug, error};

/// Authenticated user information passed to route handlers
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub user: LocalUser,
    pub session: AuthSession,
}

/// Resolve the `session_id` cookie to a user, or answer 401
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let session_id = request
        .headers()
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(SESSION_COOKIE).map(str::to_string))
        .ok_or_else(|| {
            debug!("No session cookie on request");
            StatusCode::UNAUTHORIZED
        })?;

    let session = state
        .sessions
        .read()
        .await
        .get(&session_id)
        .cloned()
        .ok_or_else(|| {
            debug!("Unknown or expired session");
            StatusCode::UNAUTHORIZED
        })?;

    let user = state
        .user_repository
        .get_by_id(session.user_id)
        .await
        .map_err(|e| {
            error!("Failed to load session user: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or_else(|| {
            debug!("Session user {} no longer exists", session.user_id);
            StatusCode::UNAUTHORIZED
        })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user, session });
    Ok(next.run(request).await)
}
