//! Google OAuth2 authorization-code flow.
//!
//! The handshake is the only place the service talks to the identity provider.
//! Handlers depend on the `IdentityProvider` trait so tests can substitute a stub.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::models::Identity;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "email profile";
pub const PROVIDER: &str = "google";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid provider URL: {0}")]
    Url(String),

    #[error("Provider rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL of the consent screen, carrying the CSRF `state`.
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError>;

    /// Exchanges an authorization code for the user's identity.
    async fn exchange_code(&self, code: &str) -> Result<Identity, OAuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
}

impl From<UserInfo> for Identity {
    fn from(info: UserInfo) -> Self {
        Identity {
            id: info.sub,
            provider: PROVIDER.to_string(),
            display_name: info.name,
            email: info.email,
            picture: info.picture,
            authenticated_at: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct GoogleOAuth {
    client: Client,
    client_id: String,
    client_secret: String,
    callback_url: String,
}

impl GoogleOAuth {
    pub fn new(config: &Config) -> Result<Self, OAuthError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()?,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            callback_url: config.google_callback_url.clone(),
        })
    }
}

/// Turns a non-success response into `OAuthError::Rejected`.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, OAuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(OAuthError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl IdentityProvider for GoogleOAuth {
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::Url(e.to_string()))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<Identity, OAuthError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;
        let token: TokenResponse = ensure_success(response).await?.json().await?;
        debug!("Exchanged authorization code for access token");

        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        let info: UserInfo = ensure_success(response).await?.json().await?;
        Ok(info.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_carries_client_and_state() {
        let provider = GoogleOAuth::new(&Config::for_tests()).unwrap();
        let url = Url::parse(&provider.authorize_url("xyz").unwrap()).unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert!(params.contains(&("client_id".to_string(), "client-id".to_string())));
        assert!(params.contains(&("state".to_string(), "xyz".to_string())));
        assert!(params.contains(&("scope".to_string(), SCOPES.to_string())));
        assert!(params.contains(&("response_type".to_string(), "code".to_string())));
    }

    #[test]
    fn test_userinfo_maps_to_identity() {
        let info: UserInfo = serde_json::from_str(
            r#"{"sub":"1234","name":"Ada","email":"ada@example.com","email_verified":true}"#,
        )
        .unwrap();
        let identity = Identity::from(info);
        assert_eq!(identity.id, "1234");
        assert_eq!(identity.provider, PROVIDER);
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
        assert!(identity.picture.is_none());
    }
}
