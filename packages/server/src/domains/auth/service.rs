//! Registration, sign-in, refresh, and identity lookup.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::common::validate::is_valid_email;
use crate::common::{AppError, UserId};
use crate::domains::auth::models::{NewUser, User, UserProfile};
use crate::domains::auth::password::{hash_password, verify_password};
use crate::domains::auth::tokens::TokenService;
use crate::kernel::CredentialStore;

const MIN_PASSWORD_LEN: usize = 6;
const MAX_NAME_LEN: usize = 100;

/// Fields accepted when registering.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Fields accepted when signing in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Fields accepted when refreshing tokens.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshInput {
    pub refresh_token: Option<String>,
}

/// A signed-in session: the account plus the tokens to act as it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// A rotated token pair, as returned by refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Authentication flows over the credential store.
///
/// Each call is independent; there is no session state here beyond what the
/// tokens themselves carry.
#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            credentials,
            tokens,
            bcrypt_cost,
        }
    }

    /// Register a new account and sign it in.
    ///
    /// Emails are matched case-insensitively: they are stored normalized, so
    /// `Alice@Example.com` and `alice@example.com` are the same account.
    pub async fn sign_up(&self, input: SignUpInput) -> Result<AuthSession, AppError> {
        let email = normalize_email(input.email.as_deref());
        let name = input.name.as_deref().unwrap_or("").trim().to_string();
        let password = input.password.unwrap_or_default();

        let mut problems = Vec::new();
        if !is_valid_email(&email) {
            problems.push("Valid email required".to_string());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            problems.push("Password at least 6 characters".to_string());
        }
        if name.is_empty() {
            problems.push("Name required".to_string());
        } else if name.chars().count() > MAX_NAME_LEN {
            problems.push("Name too long".to_string());
        }
        if !problems.is_empty() {
            return Err(AppError::Validation(problems));
        }

        if self.credentials.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::AlreadyRegistered);
        }

        let password_hash = hash_password(&password, self.bcrypt_cost)?;
        // A registration race past the lookup above still ends up as a
        // unique violation in the store.
        let user = self
            .credentials
            .insert_user(NewUser {
                email,
                password_hash,
                name,
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        self.session_for(user)
    }

    /// Sign in with an email and password.
    ///
    /// Unknown email and wrong password take the same failure path, so the
    /// response never reveals which one it was.
    pub async fn sign_in(&self, input: SignInInput) -> Result<AuthSession, AppError> {
        let email = normalize_email(input.email.as_deref());
        let password = input.password.unwrap_or_default();

        let mut problems = Vec::new();
        if !is_valid_email(&email) {
            problems.push("Valid email required".to_string());
        }
        if password.is_empty() {
            problems.push("Password required".to_string());
        }
        if !problems.is_empty() {
            return Err(AppError::Validation(problems));
        }

        let user = match self.credentials.find_user_by_email(&email).await? {
            Some(user) if verify_password(&password, &user.password_hash) => user,
            _ => {
                debug!("sign-in rejected");
                return Err(AppError::InvalidCredentials);
            }
        };

        debug!(user_id = %user.id, "user signed in");
        self.session_for(user)
    }

    /// Exchange a refresh token for a brand-new token pair.
    ///
    /// Rotation is by convention: the old refresh token is not invalidated
    /// server-side and stays verifiable until its own expiry. The client is
    /// expected to discard it in favor of the returned one.
    pub fn refresh(&self, input: RefreshInput) -> Result<TokenGrant, AppError> {
        let token = input.refresh_token.unwrap_or_default();
        if token.is_empty() {
            return Err(AppError::InvalidToken);
        }

        let user_id = self
            .tokens
            .verify_refresh(&token)
            .map_err(|_| AppError::InvalidToken)?;
        let pair = self.tokens.issue(user_id)?;

        debug!(user_id = %user_id, "tokens rotated");
        Ok(TokenGrant {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: self.tokens.access_ttl_secs(),
        })
    }

    /// Look up the account behind a verified access token.
    ///
    /// The account may have disappeared since the token was minted; that is
    /// an authentication failure, not a lookup miss.
    pub async fn identity(&self, user_id: UserId) -> Result<UserProfile, AppError> {
        match self.credentials.find_user_by_id(user_id).await? {
            Some(user) => Ok(user.profile()),
            None => Err(AppError::Unauthorized),
        }
    }

    fn session_for(&self, user: User) -> Result<AuthSession, AppError> {
        let pair = self.tokens.issue(user.id)?;
        Ok(AuthSession {
            user: user.profile(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: self.tokens.access_ttl_secs(),
        })
    }
}

fn normalize_email(raw: Option<&str>) -> String {
    raw.unwrap_or("").trim().to_lowercase()
}
