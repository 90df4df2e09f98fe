use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::warn;

/// Sliding-window limiter for sign-in attempts, keyed by client IP.
///
/// An attempt is counted whether or not the credentials were valid; the
/// point is to slow down password guessing, not to meter traffic.
#[derive(Debug)]
pub struct SigninRateLimiter {
    window: Duration,
    limit: usize,
    inner: Mutex<HashMap<IpAddr, VecDeque<Instant>>>,
}

impl SigninRateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            window,
            limit,
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub async fn allow(&self, key: IpAddr) -> bool {
        let now = Instant::now();
        let mut map = self.inner.lock().await;
        let deque = map.entry(key).or_insert_with(VecDeque::new);
        // purge attempts that fell out of the window
        while let Some(&front) = deque.front() {
            if now.duration_since(front) > self.window {
                deque.pop_front();
            } else {
                break;
            }
        }
        if deque.len() < self.limit {
            deque.push_back(now);
            true
        } else {
            false
        }
    }
}

/// Middleware guarding the sign-in route.
///
/// Reads the IP placed in extensions by `extract_client_ip`; requests that
/// somehow arrive without one all share a single bucket.
pub async fn signin_rate_limit(
    limiter: Arc<SigninRateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<super::ip_extractor::ClientIp>()
        .map(|client| client.0)
        .unwrap_or(IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if !limiter.allow(ip).await {
        warn!(%ip, "sign-in rate limit hit");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "success": false,
                "message": "Too many sign-in attempts, please try again later",
            })),
        )
            .into_response();
    }

    next.run(request).await
}
