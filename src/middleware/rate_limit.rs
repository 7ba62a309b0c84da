use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};
use tracing::{debug, warn};

use crate::api::dtos::ErrorResponse;

const UNKNOWN_CLIENT: &str = "unknown";

/// Fixed-window request counter keyed by client IP.
#[derive(Clone)]
pub struct RateLimit {
    store: Arc<DashMap<String, RateLimitData>>,
    /// Unix seconds of the last eviction pass.
    last_sweep: Arc<AtomicI64>,
    max_requests: u32,
    window_seconds: i64,
}

#[derive(Debug, Clone)]
struct RateLimitData {
    count: u32,
    window_start: DateTime<Utc>,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_seconds: i64) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            last_sweep: Arc::new(AtomicI64::new(Utc::now().timestamp())),
            max_requests,
            window_seconds,
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, 60)
    }

    /// Count one request for `key`; `false` once the window's budget is spent.
    fn admit(&self, key: String, now: DateTime<Utc>) -> bool {
        self.maybe_sweep(now);

        let mut entry = self.store.entry(key).or_insert_with(|| RateLimitData {
            count: 0,
            window_start: now,
        });
        let data = entry.value_mut();

        if now.signed_duration_since(data.window_start) >= Duration::seconds(self.window_seconds) {
            data.count = 0;
            data.window_start = now;
        }

        data.count += 1;
        data.count <= self.max_requests
    }

    /// Evict expired windows, at most once per window length.
    ///
    /// Must not run while an entry guard is held.
    fn maybe_sweep(&self, now: DateTime<Utc>) {
        let last = self.last_sweep.load(Ordering::Relaxed);
        if now.timestamp() - last < self.window_seconds {
            return;
        }
        if self
            .last_sweep
            .compare_exchange(last, now.timestamp(), Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
        {
            self.evict_expired(now);
        }
    }

    fn evict_expired(&self, now: DateTime<Utc>) {
        let window = Duration::seconds(self.window_seconds);
        let before = self.store.len();
        self.store
            .retain(|_, data| now.signed_duration_since(data.window_start) < window);
        let evicted = before.saturating_sub(self.store.len());
        if evicted > 0 {
            debug!(evicted, remaining = self.store.len(), "evicted expired rate limit windows");
        }
    }
}

/// IP-based rate limiting middleware.
///
/// Requests served without connection info (in-process tests, some proxies)
/// share a single bucket.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimit>,
    req: Request,
    next: Next,
) -> Response {
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    if !rate_limit.admit(ip.clone(), Utc::now()) {
        warn!(client = %ip, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new("Rate limit exceeded")),
        )
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    fn app(limit: RateLimit) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(limit, rate_limit_middleware))
    }

    fn request(addr: Option<SocketAddr>) -> axum::http::Request<Body> {
        let mut req = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        if let Some(addr) = addr {
            req.extensions_mut().insert(ConnectInfo(addr));
        }
        req
    }

    #[tokio::test]
    async fn test_limit_applies_per_ip() {
        let app = app(RateLimit::per_minute(2));
        let first: SocketAddr = "10.0.0.1:5000".parse().unwrap();
        let second: SocketAddr = "10.0.0.2:5000".parse().unwrap();

        for _ in 0..2 {
            let response = app.clone().oneshot(request(Some(first))).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app.clone().oneshot(request(Some(first))).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let response = app.oneshot(request(Some(second))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_connect_info_shares_a_bucket() {
        let app = app(RateLimit::per_minute(1));
        assert_eq!(app.clone().oneshot(request(None)).await.unwrap().status(), StatusCode::OK);
        assert_eq!(
            app.oneshot(request(None)).await.unwrap().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_window_resets() {
        let limit = RateLimit::new(1, 60);
        let start = Utc::now();
        assert!(limit.admit("a".into(), start));
        assert!(!limit.admit("a".into(), start + Duration::seconds(30)));
        assert!(limit.admit("a".into(), start + Duration::seconds(61)));
    }

    #[test]
    fn test_expired_clients_are_evicted() {
        let limit = RateLimit::new(5, 60);
        let start = Utc::now();
        assert!(limit.admit("10.0.0.1".into(), start));
        assert!(limit.admit("10.0.0.2".into(), start + Duration::seconds(30)));
        assert_eq!(limit.store.len(), 2);

        assert!(limit.admit("10.0.0.3".into(), start + Duration::seconds(75)));
        assert!(!limit.store.contains_key("10.0.0.1"));
        assert!(limit.store.contains_key("10.0.0.2"));
        assert!(limit.store.contains_key("10.0.0.3"));

        // no second pass inside the same window
        assert!(limit.admit("10.0.0.4".into(), start + Duration::seconds(95)));
        assert!(limit.store.contains_key("10.0.0.2"));
    }
}
