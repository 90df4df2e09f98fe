use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use server_core::domains::auth::TokenService;
use server_core::kernel::{PgStore, ServerDeps};
use server_core::server::middleware::SigninRateLimiter;
use server_core::server::build_app;
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    info!("connecting to postgres");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("database connection failed")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("migrations failed")?;
    info!("database ready");

    let store = Arc::new(PgStore::new(pool.clone()));
    let tokens = TokenService::new(
        &config.access_secret,
        &config.refresh_secret,
        config.access_ttl_secs,
        config.refresh_ttl_secs,
    );
    let deps = Arc::new(ServerDeps::new(
        store.clone(),
        store.clone(),
        store,
        tokens,
        config.bcrypt_cost,
    ));
    let signin_limiter = Arc::new(SigninRateLimiter::new(
        config.signin_rate_limit_max,
        Duration::from_secs(config.signin_rate_limit_window_secs),
    ));

    let app = build_app(deps, Some(pool), signin_limiter);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    info!(%addr, "rolodex api listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("server exited")?;

    Ok(())
}
