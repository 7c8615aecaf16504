//! # Per-Client Rate Limiting
//!
//! Fixed-window rate limiter keyed by client address. The first request
//! from a key opens a window; requests beyond `max_requests` inside that
//! window get `429 Too Many Requests` until `window_secs` have elapsed.
//!
//! The key is the first address in `X-Forwarded-For` when present (the
//! portal runs behind a reverse proxy in production), otherwise the peer
//! socket address.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::RwLock;

use crate::error::AppError;

/// Message served with every 429 response.
const RATE_LIMITED_MESSAGE: &str = "Too many requests from this IP, please try again later.";

/// Rate limiting configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum number of requests allowed per window.
    pub max_requests: u64,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 900, // 15 minutes
        }
    }
}

/// Request count for one client key within the current window.
#[derive(Debug, Clone)]
struct BucketState {
    count: u64,
    window_start: Instant,
}

/// Fixed-window rate limiter shared across all requests.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<RwLock<HashMap<String, BucketState>>>,
}

impl RateLimiter {
    /// Create a rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record a request for `key` and report whether it is within budget.
    ///
    /// Returns `false` when the key has exhausted `max_requests` for the
    /// current window. The window resets on the first check after
    /// `window_secs` have elapsed.
    pub fn check(&self, key: &str) -> bool {
        let mut buckets = self.buckets.write();
        let now = Instant::now();

        let bucket = buckets.entry(key.to_string()).or_insert(BucketState {
            count: 0,
            window_start: now,
        });

        if now.duration_since(bucket.window_start).as_secs() >= self.config.window_secs {
            bucket.count = 0;
            bucket.window_start = now;
        }

        if bucket.count >= self.config.max_requests {
            return false;
        }

        bucket.count += 1;
        true
    }
}

/// Derive the limiter key for a request.
///
/// Prefers the first (client-most) entry of `X-Forwarded-For`; falls back
/// to the peer address recorded by `ConnectInfo`, then to a shared bucket
/// when neither is available (only happens in tests without a real socket).
fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Axum middleware enforcing the per-client rate limit.
///
/// Expects a [`RateLimiter`] in the request extensions; passes requests
/// through unchanged when none is configured.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let limiter = request.extensions().get::<RateLimiter>().cloned();

    match limiter {
        Some(limiter) => {
            let key = client_key(&request);
            if limiter.check(&key) {
                next.run(request).await
            } else {
                tracing::warn!(client = %key, "rate limit exceeded");
                AppError::RateLimited(RATE_LIMITED_MESSAGE.to_string()).into_response()
            }
        }
        None => next.run(request).await,
    }
}
