use super::ports::AuthError;
use super::profile::Profile;
use config::Auth0Config;
use oauth2::{basic::BasicClient, AuthUrl, ClientId, CsrfToken, RedirectUrl, Scope};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

// Type alias for an OAuth client that only builds authorization URLs
type AuthorizeClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    oauth2::EndpointSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
>;

const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";
const LOGIN_SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// JSON body posted to the token endpoint
#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: String,
    code: &'a str,
    grant_type: &'static str,
}

/// Token endpoint response. Only `access_token` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Auth0 provider client: code exchange and user-info retrieval
pub struct Auth0Client {
    config: Auth0Config,
    authorize_client: AuthorizeClient,
    http_client: Client,
}

impl Auth0Client {
    pub fn new(config: Auth0Config) -> Result<Self, AuthError> {
        let auth_url = AuthUrl::new(format!("{}/authorize", config.base_url()))
            .map_err(|e| AuthError::ConfigError(format!("Invalid Auth0 authorize URL: {}", e)))?;

        let authorize_client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_auth_uri(auth_url)
            .set_redirect_uri(
                RedirectUrl::new(config.callback_url())
                    .map_err(|e| AuthError::ConfigError(format!("Invalid redirect URL: {}", e)))?,
            );

        Ok(Self {
            config,
            authorize_client,
            http_client: Client::new(),
        })
    }

    pub fn config(&self) -> &Auth0Config {
        &self.config
    }

    fn token_url(&self) -> String {
        format!("{}/oauth/token", self.config.base_url())
    }

    fn userinfo_url(&self) -> String {
        format!("{}/userinfo", self.config.base_url())
    }

    /// Generate the provider authorization URL with a fresh CSRF state.
    /// Returns `(url, state)`.
    pub fn authorize_url(&self) -> (String, String) {
        let (auth_url, csrf_state) = self
            .authorize_client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(LOGIN_SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .url();

        (auth_url.to_string(), csrf_state.secret().to_string())
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        debug!("Exchanging Auth0 code for token");

        let body = TokenRequest {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            redirect_uri: self.config.callback_url(),
            code,
            grant_type: GRANT_TYPE_AUTHORIZATION_CODE,
        };

        let response = self
            .http_client
            .post(self.token_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Token exchange failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let response_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            return Err(AuthError::OAuthError(format!(
                "Token endpoint returned status: {}, body: {}",
                status, response_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::OAuthError(format!("Failed to parse token response: {}", e)))
    }

    /// Fetch the raw user-info document for an access token
    pub async fn fetch_user_info(&self, access_token: &str) -> Result<Value, AuthError> {
        debug!("Fetching Auth0 user info with access token");

        let response = self
            .http_client
            .get(self.userinfo_url())
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Failed to fetch user info: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::AuthFailed(format!(
                "User info endpoint returned status: {}",
                status
            )));
        }

        let user_info: Value = response
            .json()
            .await
            .map_err(|e| AuthError::AuthFailed(format!("Failed to parse user info: {}", e)))?;

        if !user_info.is_object() {
            return Err(AuthError::AuthFailed(
                "User info response is not a JSON object".to_string(),
            ));
        }

        Ok(user_info)
    }

    /// Handle the OAuth callback: exchange the code, then fetch the profile.
    /// Returns the parsed profile and the raw user-info document.
    pub async fn handle_callback(&self, code: &str) -> Result<(Profile, Value), AuthError> {
        let token = self.exchange_code(code).await?;
        let user_info = self.fetch_user_info(&token.access_token).await?;
        let profile = Profile::from_value(&user_info);

        debug!(
            "Auth0 user authenticated: {}",
            profile.email().unwrap_or("<no email>")
        );
        Ok((profile, user_info))
    }
}
