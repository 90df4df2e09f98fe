//! Auth domain - accounts and token-based sessions.
//!
//! Responsibilities:
//! - Registration and sign-in over the credential store
//! - Dual-secret JWT handling (short-lived access, long-lived refresh)
//! - Refresh rotation and identity lookup

pub mod models;
pub mod password;
pub mod service;
pub mod tokens;

pub use service::{AuthService, AuthSession, RefreshInput, SignInInput, SignUpInput, TokenGrant};
pub use tokens::{Claims, TokenPair, TokenService};
