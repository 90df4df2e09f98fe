//! Client session handling for the contacts API.
//!
//! Wraps the auth endpoints with a [`SessionController`] that keeps the
//! access token in memory, persists the refresh token through a
//! [`CookieJar`], and rotates the pair in the background.

pub mod api;
pub mod controller;
pub mod cookie;
pub mod error;

pub use api::{AuthApi, AuthSession, HttpAuthApi, TokenGrant, UserProfile};
pub use controller::{SessionConfig, SessionController, REFRESH_TOKEN_COOKIE};
pub use cookie::{Cookie, CookieJar, FileCookieJar, MemoryCookieJar, SameSite};
pub use error::SessionError;
