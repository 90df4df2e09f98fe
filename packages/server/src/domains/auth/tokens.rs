use anyhow::Result;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::UserId;

/// JWT Claims - data stored in both token kinds
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user id as string)
    pub exp: i64,    // Expiration timestamp
    pub iat: i64,    // Issued at timestamp
    pub jti: String, // JWT ID (unique token identifier)
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token service - creates and verifies the two token kinds.
///
/// Access and refresh tokens are signed with distinct secrets, so one kind
/// can never be presented where the other is expected. No token is stored
/// server-side; validity is signature plus expiry.
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    /// Create a token service from the two signing secrets and lifetimes.
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Issue a fresh token pair for a user.
    ///
    /// Every call produces previously unseen token strings (each carries its
    /// own jti), which is what makes rotation observable to clients.
    pub fn issue(&self, user_id: UserId) -> Result<TokenPair> {
        let now = Utc::now();
        let access_token = self.sign(user_id, now, self.access_ttl_secs, &self.access_encoding)?;
        let refresh_token = self.sign(user_id, now, self.refresh_ttl_secs, &self.refresh_encoding)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn sign(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        ttl_secs: i64,
        key: &EncodingKey,
    ) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + chrono::Duration::seconds(ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(), // Unique token ID
        };

        encode(&Header::default(), &claims, key).map_err(Into::into)
    }

    /// Verify an access token and return the user id it was issued to.
    pub fn verify_access(&self, token: &str) -> Result<UserId> {
        Self::verify(token, &self.access_decoding)
    }

    /// Verify a refresh token and return the user id it was issued to.
    pub fn verify_refresh(&self, token: &str) -> Result<UserId> {
        Self::verify(token, &self.refresh_decoding)
    }

    fn verify(token: &str, key: &DecodingKey) -> Result<UserId> {
        let mut validation = Validation::default();
        validation.leeway = 0; // expiry is exact, no grace window

        let data = decode::<Claims>(token, key, &validation)?;
        UserId::parse(&data.claims.sub).map_err(Into::into)
    }

    /// Lifetime of newly issued access tokens, in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    /// Lifetime of newly issued refresh tokens, in seconds.
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> TokenService {
        TokenService::new("access_secret", "refresh_secret", 900, 604800)
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let service = test_service();
        let user_id = UserId::new();

        let pair = service.issue(user_id).unwrap();

        assert_eq!(service.verify_access(&pair.access_token).unwrap(), user_id);
        assert_eq!(service.verify_refresh(&pair.refresh_token).unwrap(), user_id);
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let service = test_service();
        let pair = service.issue(UserId::new()).unwrap();

        // Access token signed with the access secret must fail refresh
        // verification, and vice versa
        assert!(service.verify_refresh(&pair.access_token).is_err());
        assert!(service.verify_access(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_invalid_token() {
        let service = test_service();
        assert!(service.verify_access("invalid_token").is_err());
        assert!(service.verify_refresh("invalid_token").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = TokenService::new("access_a", "refresh_a", 900, 604800);
        let service2 = TokenService::new("access_b", "refresh_b", 900, 604800);

        let pair = service1.issue(UserId::new()).unwrap();

        assert!(service2.verify_access(&pair.access_token).is_err());
        assert!(service2.verify_refresh(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_expired_token_fails() {
        // Negative TTL puts exp in the past
        let service = TokenService::new("access_secret", "refresh_secret", -60, -60);
        let pair = service.issue(UserId::new()).unwrap();

        assert!(service.verify_access(&pair.access_token).is_err());
        assert!(service.verify_refresh(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_reissue_produces_distinct_tokens() {
        let service = test_service();
        let user_id = UserId::new();

        let first = service.issue(user_id).unwrap();
        let second = service.issue(user_id).unwrap();

        // Same user, same second: jti still makes every string unique
        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(first.access_token, first.refresh_token);
    }

    #[test]
    fn test_expiry_window() {
        let service = test_service();
        let pair = service.issue(UserId::new()).unwrap();

        let mut validation = Validation::default();
        validation.leeway = 0;
        let claims = decode::<Claims>(&pair.access_token, &service.access_decoding, &validation)
            .unwrap()
            .claims;

        assert_eq!(claims.exp - claims.iat, 900);
    }
}
