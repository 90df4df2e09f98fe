use anyhow::{ensure, Context, Result};
use dotenvy::dotenv;
use std::env;

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub signin_rate_limit_max: usize,
    pub signin_rate_limit_window_secs: u64,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Reads the environment, after loading a `.env` file when one exists.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            access_secret: env::var("JWT_ACCESS_SECRET")
                .context("JWT_ACCESS_SECRET must be set")?,
            refresh_secret: env::var("JWT_REFRESH_SECRET")
                .context("JWT_REFRESH_SECRET must be set")?,
            access_ttl_secs: env::var("JWT_ACCESS_TTL_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .context("JWT_ACCESS_TTL_SECS must be a valid number")?,
            refresh_ttl_secs: env::var("JWT_REFRESH_TTL_SECS")
                .unwrap_or_else(|_| "604800".to_string())
                .parse()
                .context("JWT_REFRESH_TTL_SECS must be a valid number")?,
            signin_rate_limit_max: env::var("SIGNIN_RATE_LIMIT_MAX")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("SIGNIN_RATE_LIMIT_MAX must be a valid number")?,
            signin_rate_limit_window_secs: env::var("SIGNIN_RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .context("SIGNIN_RATE_LIMIT_WINDOW_SECS must be a valid number")?,
            bcrypt_cost: env::var("BCRYPT_COST")
                .unwrap_or_else(|_| bcrypt::DEFAULT_COST.to_string())
                .parse()
                .context("BCRYPT_COST must be a valid number")?,
        };

        // A leaked refresh key must never be able to mint access tokens
        ensure!(
            config.access_secret != config.refresh_secret,
            "JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ"
        );

        Ok(config)
    }
}
