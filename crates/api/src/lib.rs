pub mod middleware;
pub mod routes;

use crate::{
    middleware::auth_middleware,
    routes::{
        auth::{current_user, login, logout, oauth_callback, AuthState},
        health::health_check,
    },
};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use config::{ApiConfig, Auth0Config, LoggingConfig};
use database::Database;
use services::auth::{
    Auth0Client, AuthError, EmailIdentityResolver, IdentityResolver, UserRepository,
};
use std::sync::Arc;

/// Initialize database connection and run migrations
pub async fn init_database(db_config: &config::DatabaseConfig) -> anyhow::Result<Arc<Database>> {
    let database = Arc::new(Database::from_config(db_config).await?);

    // Run database migrations
    tracing::info!("Starting database migrations...");
    database.run_migrations().await?;
    tracing::info!("Database migrations completed.");

    Ok(database)
}

/// Wire the Auth0 client and the email resolver over a user store
pub fn init_auth_state(
    auth0_config: Auth0Config,
    user_repository: Arc<dyn UserRepository>,
) -> Result<AuthState, AuthError> {
    tracing::info!("Setting up Auth0 for tenant {}", auth0_config.domain);
    let auth0 = Arc::new(Auth0Client::new(auth0_config)?);
    let resolver: Arc<dyn IdentityResolver> =
        Arc::new(EmailIdentityResolver::new(user_repository.clone()));

    Ok(AuthState::new(auth0, resolver, user_repository))
}

/// Initialize authentication services backed by Postgres
pub fn init_auth_services(
    database: Arc<Database>,
    config: &ApiConfig,
) -> Result<AuthState, AuthError> {
    let user_repository: Arc<dyn UserRepository> = Arc::new(database.users.clone());
    init_auth_state(config.auth0.clone(), user_repository)
}

/// Build the full application router
pub fn build_app(auth_state: AuthState) -> Router {
    Router::new()
        .nest("/auth", build_auth_routes(auth_state))
        .route("/health", get(health_check))
}

/// Build authentication routes
pub fn build_auth_routes(auth_state: AuthState) -> Router {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(oauth_callback))
        .route(
            "/user",
            get(current_user).layer(from_fn_with_state(auth_state.clone(), auth_middleware)),
        )
        .route("/logout", post(logout))
        .with_state(auth_state)
}

/// Install the global tracing subscriber described by `logging_config`
pub fn init_tracing(logging_config: &LoggingConfig) {
    let filter = logging_config.filter_directive();

    match logging_config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .compact()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .init();
        }
    }
}
