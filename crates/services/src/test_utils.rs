// Test utilities for services and downstream crates
#![cfg(any(test, feature = "test-mocks"))]

use crate::auth::{LocalUser, NewUser, UserId, UserRepository};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;
use uuid::Uuid;

/// In-memory user store mirroring the `users` table: usernames are unique,
/// emails are not.
pub struct InMemoryUserRepository {
    users: Mutex<Vec<LocalUser>>,
    unique_username: bool,
    lookup_barrier: Option<Arc<Barrier>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            unique_username: true,
            lookup_barrier: None,
        }
    }

    /// A store that accepts duplicate usernames
    pub fn without_unique_username() -> Self {
        Self {
            unique_username: false,
            ..Self::new()
        }
    }

    /// Hold every email lookup at `barrier` after it has read the table, so
    /// concurrent callers all observe the same snapshot before any insert.
    pub fn with_lookup_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.lookup_barrier = Some(barrier);
        self
    }

    pub fn users(&self) -> Vec<LocalUser> {
        self.users.lock().expect("user store poisoned").clone()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<LocalUser>> {
        let found = {
            let users = self.users.lock().expect("user store poisoned");
            users.iter().find(|u| u.email == email).cloned()
        };

        if let Some(barrier) = &self.lookup_barrier {
            barrier.wait().await;
        }

        Ok(found)
    }

    async fn get_by_id(&self, id: UserId) -> anyhow::Result<Option<LocalUser>> {
        let users = self.users.lock().expect("user store poisoned");
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<LocalUser> {
        let mut users = self.users.lock().expect("user store poisoned");

        if self.unique_username && users.iter().any(|u| u.username == user.username) {
            anyhow::bail!(
                "duplicate key value violates unique constraint \"users_username_key\""
            );
        }

        let created = LocalUser {
            id: UserId(Uuid::new_v4()),
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            provider_user_id: user.provider_user_id,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.users.lock().expect("user store poisoned").len() as i64)
    }
}
