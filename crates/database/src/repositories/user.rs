use crate::models::User;
use crate::pool::DbPool;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use services::auth::{LocalUser, NewUser, UserId};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new user. A duplicate username fails on the unique constraint.
    pub async fn insert(&self, user: NewUser) -> Result<User> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let id = Uuid::new_v4();
        let now = Utc::now();

        let row = client
            .query_one(
                r#"
            INSERT INTO users (
                id, username, email, display_name, avatar_url,
                provider_user_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
                &[
                    &id,
                    &user.username,
                    &user.email,
                    &user.display_name,
                    &user.avatar_url,
                    &user.provider_user_id,
                    &now,
                ],
            )
            .await
            .context("Failed to create user")?;

        debug!("Created user: {} ({})", user.email, id);
        Ok(row_to_user(row))
    }

    /// Oldest user with exactly this email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_opt(
                "SELECT * FROM users WHERE email = $1 ORDER BY created_at ASC LIMIT 1",
                &[&email],
            )
            .await
            .context("Failed to query user by email")?;

        Ok(row.map(row_to_user))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_opt("SELECT * FROM users WHERE id = $1", &[&id])
            .await
            .context("Failed to query user")?;

        Ok(row.map(row_to_user))
    }

    pub async fn count_users(&self) -> Result<i64> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_one("SELECT COUNT(*) FROM users", &[])
            .await
            .context("Failed to count users")?;

        Ok(row.get(0))
    }
}

// Helper function to convert database row to User
fn row_to_user(row: tokio_postgres::Row) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        avatar_url: row.get("avatar_url"),
        provider_user_id: row.get("provider_user_id"),
        created_at: row.get("created_at"),
    }
}

// Implement the service trait
#[async_trait]
impl services::auth::UserRepository for PgUserRepository {
    async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<LocalUser>> {
        let maybe_user = self.find_by_email(email).await?;
        Ok(maybe_user.map(LocalUser::from))
    }

    async fn get_by_id(&self, id: UserId) -> anyhow::Result<Option<LocalUser>> {
        let maybe_user = self.find_by_id(id.0).await?;
        Ok(maybe_user.map(LocalUser::from))
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<LocalUser> {
        let db_user = self.insert(user).await?;
        Ok(db_user.into())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        self.count_users().await
    }
}
