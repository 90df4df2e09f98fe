//! Client-side session state.
//!
//! Holds the access token in memory only; the refresh token lives in the
//! cookie jar so a session survives restarts. A background timer rotates
//! the pair before the access token expires, and concurrent refresh
//! attempts coalesce into a single rotation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::api::{AuthApi, AuthSession, UserProfile};
use crate::cookie::{Cookie, CookieJar, SameSite};
use crate::error::SessionError;

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Tunables for the silent-refresh loop.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How often the background timer rotates tokens. Kept shorter than
    /// the 15-minute access TTL so the token never expires mid-use.
    pub refresh_interval: Duration,
    /// Lifetime written on the stored refresh cookie; matches the server's
    /// refresh TTL.
    pub refresh_ttl: chrono::Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(14 * 60),
            refresh_ttl: chrono::Duration::days(7),
        }
    }
}

struct Inner {
    api: Arc<dyn AuthApi>,
    jar: Arc<dyn CookieJar>,
    secure_cookies: bool,
    refresh_interval: Duration,
    refresh_ttl: chrono::Duration,
    access_token: RwLock<Option<String>>,
    user: RwLock<Option<UserProfile>>,
    /// Serializes rotations; waiters re-check the generation after the
    /// holder finishes.
    refresh_gate: Mutex<()>,
    /// Bumped on every successful rotation (and on login), so a queued
    /// refresh can tell its work was already done.
    refresh_generation: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    fn refresh_cookie(&self, value: String) -> Cookie {
        Cookie {
            name: REFRESH_TOKEN_COOKIE.to_string(),
            value,
            same_site: SameSite::Strict,
            secure: self.secure_cookies,
            expires_at: Utc::now() + self.refresh_ttl,
        }
    }
}

#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(api: Arc<dyn AuthApi>, jar: Arc<dyn CookieJar>, config: SessionConfig) -> Self {
        let secure_cookies = api.is_secure();
        Self {
            inner: Arc::new(Inner {
                api,
                jar,
                secure_cookies,
                refresh_interval: config.refresh_interval,
                refresh_ttl: config.refresh_ttl,
                access_token: RwLock::new(None),
                user: RwLock::new(None),
                refresh_gate: Mutex::new(()),
                refresh_generation: AtomicU64::new(0),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Register a new account and start a session for it.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<UserProfile, SessionError> {
        let session = self.inner.api.sign_up(email, password, name).await?;
        self.install_session(session).await
    }

    /// Sign in and start a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, SessionError> {
        let session = self.inner.api.sign_in(email, password).await?;
        self.install_session(session).await
    }

    /// Try to pick up a session left by a previous run.
    ///
    /// Looks for a stored refresh token, rotates it, and confirms the
    /// identity with the server. Any failure along the way settles to
    /// signed-out and drops the stored cookie; this never errors, so app
    /// startup cannot be wedged by a stale cookie.
    pub async fn resume(&self) -> Option<UserProfile> {
        match self.try_resume().await {
            Ok(profile) => Some(profile),
            Err(err) => {
                debug!("no session to resume: {err}");
                clear_state(&self.inner).await;
                if let Err(jar_err) = self.inner.jar.remove(REFRESH_TOKEN_COOKIE) {
                    warn!("failed to clear refresh cookie: {jar_err:#}");
                }
                None
            }
        }
    }

    async fn try_resume(&self) -> Result<UserProfile, SessionError> {
        do_refresh(&self.inner).await?;
        let token = self
            .inner
            .access_token
            .read()
            .await
            .clone()
            .ok_or(SessionError::NotSignedIn)?;
        let profile = self.inner.api.me(&token).await?;
        *self.inner.user.write().await = Some(profile.clone());
        self.start_timer().await;
        Ok(profile)
    }

    /// Rotate the token pair now.
    ///
    /// Calls made while a rotation is already in flight wait for it and
    /// then succeed without a second round-trip.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        do_refresh(&self.inner).await
    }

    /// Forget the session.
    ///
    /// Local only: the server keeps no session state to revoke, so this
    /// stops the timer, drops the tokens, and clears the cookie.
    pub async fn logout(&self) {
        if let Some(handle) = self.inner.timer.lock().await.take() {
            handle.abort();
        }
        clear_state(&self.inner).await;
        if let Err(err) = self.inner.jar.remove(REFRESH_TOKEN_COOKIE) {
            warn!("failed to clear refresh cookie: {err:#}");
        }
        debug!("session cleared");
    }

    /// The current access token, if signed in.
    pub async fn access_token(&self) -> Option<String> {
        self.inner.access_token.read().await.clone()
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner.user.read().await.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.inner.access_token.read().await.is_some()
    }

    async fn install_session(&self, session: AuthSession) -> Result<UserProfile, SessionError> {
        let inner = &self.inner;
        *inner.access_token.write().await = Some(session.access_token);
        inner.jar.set(inner.refresh_cookie(session.refresh_token))?;
        *inner.user.write().await = Some(session.user.clone());
        inner.refresh_generation.fetch_add(1, Ordering::AcqRel);
        self.start_timer().await;
        Ok(session.user)
    }

    /// (Re)start the silent-refresh timer.
    ///
    /// The task holds only a `Weak` to the session state, so dropping the
    /// last controller handle ends the loop on its next tick.
    async fn start_timer(&self) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let interval = self.inner.refresh_interval;

        let handle = tokio::spawn(async move {
            loop {
                sleep(interval).await;
                let Some(inner) = weak.upgrade() else { break };
                if inner.user.read().await.is_none() {
                    break;
                }
                match do_refresh(&inner).await {
                    Ok(()) => {}
                    Err(err) if err.is_rejection() => {
                        debug!("scheduled refresh stopped: {err}");
                        break;
                    }
                    Err(err) => {
                        // Transient failure; the session is still intact,
                        // try again next tick.
                        warn!("scheduled refresh failed (will retry): {err}");
                    }
                }
            }
        });

        if let Some(old) = self.inner.timer.lock().await.replace(handle) {
            old.abort();
        }
    }
}

/// One rotation attempt against the stored refresh token.
async fn do_refresh(inner: &Arc<Inner>) -> Result<(), SessionError> {
    let generation = inner.refresh_generation.load(Ordering::Acquire);
    let _gate = inner.refresh_gate.lock().await;
    if inner.refresh_generation.load(Ordering::Acquire) != generation {
        // Someone else rotated while we waited; their result is ours.
        return Ok(());
    }

    let Some(cookie) = inner.jar.get(REFRESH_TOKEN_COOKIE)? else {
        clear_state(inner).await;
        return Err(SessionError::NotSignedIn);
    };

    match inner.api.refresh(&cookie.value).await {
        Ok(grant) => {
            *inner.access_token.write().await = Some(grant.access_token);
            inner.jar.set(inner.refresh_cookie(grant.refresh_token))?;
            inner.refresh_generation.fetch_add(1, Ordering::AcqRel);
            debug!("session tokens rotated");
            Ok(())
        }
        Err(err) if err.is_rejection() => {
            // The server will never accept this token again.
            clear_state(inner).await;
            if let Err(jar_err) = inner.jar.remove(REFRESH_TOKEN_COOKIE) {
                warn!("failed to drop rejected refresh cookie: {jar_err:#}");
            }
            Err(err)
        }
        Err(err) => Err(err),
    }
}

async fn clear_state(inner: &Inner) {
    *inner.access_token.write().await = None;
    *inner.user.write().await = None;
}
