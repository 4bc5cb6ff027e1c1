use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::Profile;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

// Domain ID types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        UserId(uuid)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Domain models

/// The application's persisted representation of an authenticated principal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Provider subject id recorded at creation; never used for matching
    pub provider_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields of a user about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider_user_id: Option<String>,
}

// Error types

/// Errors raised by the identity resolver
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Profile is missing the provider identity claim (user_id)")]
    MissingIdentityClaim,

    #[error("Profile is missing the email claim")]
    MissingEmailClaim,

    #[error("User repository error: {0}")]
    Repository(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("OAuth error: {0}")]
    OAuthError(String),

    #[error("Invalid state parameter")]
    InvalidState,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Profile did not resolve to a user")]
    NoUser,

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

// Repository traits

/// Data-access port for Local Users
#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// First user (oldest) whose email equals `email` exactly
    async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<LocalUser>>;

    async fn get_by_id(&self, id: UserId) -> anyhow::Result<Option<LocalUser>>;

    async fn create(&self, user: NewUser) -> anyhow::Result<LocalUser>;

    async fn count(&self) -> anyhow::Result<i64>;
}

// Service traits

/// Maps a provider profile onto a Local User.
///
/// `Ok(None)` means no claims were supplied at all; a profile that was
/// supplied but lacks the identity claim is an error instead.
#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, profile: &Profile) -> Result<Option<LocalUser>, ResolveError>;
}
