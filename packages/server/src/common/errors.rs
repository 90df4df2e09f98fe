use thiserror::Error;

use crate::kernel::StoreError;

/// Application error taxonomy.
///
/// Every failure a handler can surface maps onto one of these variants;
/// the HTTP layer turns each variant into a status code and a response
/// envelope. Messages are client-facing. `Internal` keeps its cause for
/// logging but always renders as a generic message.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more input fields failed validation.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Email already registered")]
    AlreadyRegistered,

    /// Sign-in failed. Unknown email and wrong password produce this same
    /// variant; the response never reveals which one it was.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// A refresh token was missing, malformed, expired, or forged.
    #[error("Invalid refresh token")]
    InvalidToken,

    /// The request carried no valid access token.
    #[error("Not authorized")]
    Unauthorized,

    /// No contact with that id is owned by the caller. Covers both truly
    /// absent ids and contacts owned by someone else.
    #[error("Contact not found")]
    NotFound,

    /// A unique constraint was violated at the store level.
    #[error("Duplicate field value")]
    Conflict,

    #[error("Server error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Build a validation error from a single message.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AppError::Conflict,
            StoreError::Other(err) => AppError::Internal(err),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}
