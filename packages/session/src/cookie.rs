//! Refresh-token storage.
//!
//! The access token lives only in memory, but the refresh token has to
//! survive a restart. A `CookieJar` is that durable, restricted store; the
//! attributes mirror what a browser would enforce on a real cookie.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// A stored cookie with the attributes the session flow cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub same_site: SameSite,
    pub secure: bool,
    pub expires_at: DateTime<Utc>,
}

impl Cookie {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Durable cookie storage. Expired cookies read back as absent.
pub trait CookieJar: Send + Sync {
    fn get(&self, name: &str) -> Result<Option<Cookie>>;
    fn set(&self, cookie: Cookie) -> Result<()>;
    fn remove(&self, name: &str) -> Result<()>;
}

/// Jar that lives and dies with the process.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    inner: Mutex<HashMap<String, Cookie>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Cookie>>> {
        self.inner.lock().map_err(|_| anyhow!("cookie jar lock poisoned"))
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Result<Option<Cookie>> {
        let map = self.lock()?;
        Ok(map.get(name).filter(|c| !c.is_expired()).cloned())
    }

    fn set(&self, cookie: Cookie) -> Result<()> {
        let mut map = self.lock()?;
        map.insert(cookie.name.clone(), cookie);
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let mut map = self.lock()?;
        map.remove(name);
        Ok(())
    }
}

/// Jar persisted as a JSON file, so a session resumes across restarts.
#[derive(Debug)]
pub struct FileCookieJar {
    path: PathBuf,
    inner: Mutex<HashMap<String, Cookie>>,
}

impl FileCookieJar {
    /// Opens (or initializes) the jar at `path`. Expired cookies are
    /// dropped on load; an unreadable jar starts empty rather than wedging
    /// the caller.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut map: HashMap<String, Cookie> = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(err) => {
                    warn!(path = %path.display(), "cookie jar is corrupt, starting empty: {err}");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read cookie jar at {}", path.display()))
            }
        };
        map.retain(|_, cookie| !cookie.is_expired());

        Ok(Self {
            path,
            inner: Mutex::new(map),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Cookie>>> {
        self.inner.lock().map_err(|_| anyhow!("cookie jar lock poisoned"))
    }

    fn persist(&self, map: &HashMap<String, Cookie>) -> Result<()> {
        let raw = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write cookie jar at {}", self.path.display()))
    }
}

impl CookieJar for FileCookieJar {
    fn get(&self, name: &str) -> Result<Option<Cookie>> {
        let map = self.lock()?;
        Ok(map.get(name).filter(|c| !c.is_expired()).cloned())
    }

    fn set(&self, cookie: Cookie) -> Result<()> {
        let mut map = self.lock()?;
        map.insert(cookie.name.clone(), cookie);
        self.persist(&map)
    }

    fn remove(&self, name: &str) -> Result<()> {
        let mut map = self.lock()?;
        map.remove(name);
        self.persist(&map)
    }
}
