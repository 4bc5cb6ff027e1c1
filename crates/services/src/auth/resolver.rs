use super::ports::{IdentityResolver, LocalUser, NewUser, ResolveError, UserRepository};
use super::profile::{Claim, Profile};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves profiles to users by email, creating the user on first sight.
///
/// Matching is on the `email` claim only. The provider's `user_id` must be
/// present but is recorded at creation and otherwise ignored, so an email
/// change on the provider side yields a second local user.
pub struct EmailIdentityResolver {
    user_repository: Arc<dyn UserRepository>,
}

impl EmailIdentityResolver {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }
}

#[async_trait]
impl IdentityResolver for EmailIdentityResolver {
    async fn resolve(&self, profile: &Profile) -> Result<Option<LocalUser>, ResolveError> {
        if profile.is_empty() {
            debug!("No claims supplied, nothing to resolve");
            return Ok(None);
        }

        let provider_user_id = profile
            .non_empty(Claim::UserId)
            .ok_or(ResolveError::MissingIdentityClaim)?;
        let email = profile
            .non_empty(Claim::Email)
            .ok_or(ResolveError::MissingEmailClaim)?;

        // No lock between lookup and create; the store's constraints are the only guard
        let existing_user = self
            .user_repository
            .get_by_email(email)
            .await
            .map_err(|e| ResolveError::Repository(format!("Failed to check existing user: {e}")))?;

        if let Some(user) = existing_user {
            debug!(user_id = %user.id, "Matched existing user by email");
            return Ok(Some(user));
        }

        debug!("Creating new user: {}", email);

        let user = self
            .user_repository
            .create(NewUser {
                username: email.to_string(),
                email: email.to_string(),
                display_name: profile.name().map(str::to_string),
                avatar_url: profile.picture().map(str::to_string),
                provider_user_id: Some(provider_user_id.to_string()),
            })
            .await
            .map_err(|e| ResolveError::Repository(format!("Failed to create user: {e}")))?;

        info!(user_id = %user.id, "Created new user {}", user.email);
        Ok(Some(user))
    }
}
