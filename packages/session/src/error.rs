use thiserror::Error;

/// Failures surfaced to callers of the session controller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The server answered and rejected the request.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never got a usable answer (timeout, connection, decode).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// No session to act on: no stored refresh token, or it was cleared.
    #[error("not signed in")]
    NotSignedIn,

    /// The cookie jar could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl SessionError {
    /// True when the server itself rejected the credentials or token, as
    /// opposed to the request not getting through.
    pub fn is_rejection(&self) -> bool {
        matches!(self, SessionError::Api { .. } | SessionError::NotSignedIn)
    }
}
