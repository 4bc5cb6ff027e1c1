use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of the `users` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Auth0 subject id recorded when the user was created
    pub provider_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for services::auth::LocalUser {
    fn from(db_user: User) -> Self {
        services::auth::LocalUser {
            id: services::auth::UserId(db_user.id),
            username: db_user.username,
            email: db_user.email,
            display_name: db_user.display_name,
            avatar_url: db_user.avatar_url,
            provider_user_id: db_user.provider_user_id,
            created_at: db_user.created_at,
        }
    }
}
