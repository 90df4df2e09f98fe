use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use tracing::debug;

use crate::common::{AppError, UserId};
use crate::domains::auth::TokenService;

/// Identity attached to a request that presented a valid access token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// Verifies the Authorization header and attaches `AuthUser`.
///
/// Requests without a usable token pass through untouched; whether that is
/// acceptable is decided per handler by the extractor below, so public and
/// protected routes share one layer.
pub async fn jwt_auth_middleware(
    tokens: Arc<TokenService>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &tokens) {
        Some(user) => {
            debug!(user_id = %user.user_id, "request authenticated");
            request.extensions_mut().insert(user);
        }
        None => debug!("request carries no valid access token"),
    }
    next.run(request).await
}

fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Option<AuthUser> {
    let user_id = tokens.verify_access(bearer_token(headers)?).ok()?;
    Some(AuthUser { user_id })
}

/// Pulls the token out of `Authorization`, with or without the `Bearer `
/// prefix.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value))
}

// Handlers take `user: AuthUser` as an extractor; a request that reached
// them without authenticating gets a 401.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_tokens() -> TokenService {
        TokenService::new("access_secret", "refresh_secret", 900, 604800)
    }

    fn auth_headers(value: String) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(&value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_prefix_is_optional() {
        let tokens = test_tokens();
        let user_id = UserId::new();
        let pair = tokens.issue(user_id).unwrap();

        let with_prefix = auth_headers(format!("Bearer {}", pair.access_token));
        let bare = auth_headers(pair.access_token.clone());

        assert_eq!(
            authenticate(&with_prefix, &tokens).unwrap().user_id,
            user_id
        );
        assert_eq!(authenticate(&bare, &tokens).unwrap().user_id, user_id);
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        let tokens = test_tokens();
        assert!(authenticate(&HeaderMap::new(), &tokens).is_none());
    }

    #[test]
    fn test_refresh_token_is_not_accepted() {
        let tokens = test_tokens();
        let pair = tokens.issue(UserId::new()).unwrap();
        let headers = auth_headers(format!("Bearer {}", pair.refresh_token));
        assert!(authenticate(&headers, &tokens).is_none());
    }

    #[test]
    fn test_garbage_token_is_anonymous() {
        let tokens = test_tokens();
        let headers = auth_headers("Bearer not.a.jwt".to_string());
        assert!(authenticate(&headers, &tokens).is_none());
    }
}
