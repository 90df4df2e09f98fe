//! HTTP client for the auth endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::error::SessionError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// User fields as the server reports them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Server response to sign-up and sign-in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Server response to a token refresh.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// The auth calls the session controller needs.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthSession, SessionError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SessionError>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, SessionError>;
    async fn me(&self, access_token: &str) -> Result<UserProfile, SessionError>;

    /// Whether the transport is encrypted; stored cookies mark `secure`
    /// accordingly.
    fn is_secure(&self) -> bool {
        false
    }
}

/// `AuthApi` over reqwest against a base URL like `http://localhost:8080`.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthSession, SessionError> {
        let response = self
            .client
            .post(self.url("/api/auth/signup"))
            .json(&json!({ "email": email, "password": password, "name": name }))
            .send()
            .await?;
        decode(response).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SessionError> {
        let response = self
            .client
            .post(self.url("/api/auth/signin"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        decode(response).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, SessionError> {
        let response = self
            .client
            .post(self.url("/api/auth/refresh"))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await?;
        decode(response).await
    }

    async fn me(&self, access_token: &str) -> Result<UserProfile, SessionError> {
        let response = self
            .client
            .get(self.url("/api/auth/me"))
            .bearer_auth(access_token)
            .send()
            .await?;
        let data: MeData = decode(response).await?;
        Ok(data.user)
    }

    fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct MeData {
    user: UserProfile,
}

/// Unwraps the `{success, data|message}` envelope every endpoint uses.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SessionError> {
    let status = response.status().as_u16();
    let envelope: Envelope<T> = response.json().await?;

    if !envelope.success {
        return Err(SessionError::Api {
            status,
            message: envelope
                .message
                .unwrap_or_else(|| "Request failed".to_string()),
        });
    }
    envelope.data.ok_or(SessionError::Api {
        status,
        message: "Response carried no data".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = HttpAuthApi::new("http://localhost:8080/").unwrap();
        assert_eq!(api.url("/api/auth/me"), "http://localhost:8080/api/auth/me");
    }

    #[test]
    fn test_is_secure_tracks_scheme() {
        assert!(!HttpAuthApi::new("http://localhost:8080").unwrap().is_secure());
        assert!(HttpAuthApi::new("https://api.example.com").unwrap().is_secure());
    }

    #[test]
    fn test_session_decodes_camel_case() {
        let session: AuthSession = serde_json::from_value(json!({
            "user": { "id": "u1", "email": "a@x.com", "name": "Alice" },
            "accessToken": "at",
            "refreshToken": "rt",
            "expiresIn": 900,
        }))
        .unwrap();

        assert_eq!(session.access_token, "at");
        assert_eq!(session.refresh_token, "rt");
        assert_eq!(session.expires_in, 900);
        assert_eq!(session.user.name, "Alice");
    }
}
