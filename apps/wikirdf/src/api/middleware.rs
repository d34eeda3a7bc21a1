//! # Middleware Module
//!
//! Rate limiting for the wikirdf HTTP API.
//!
//! One global token bucket is shared by all routes. An `/export` request
//! serializes a whole batch of nodes, so it takes [`EXPORT_COST`] cells
//! while metadata lookups take one.
//!
//! ## Configuration
//!
//! Rate limiting is configured via environment variable:
//! - `WIKIRDF_RATE_LIMIT`: Cells per second (default: 20, 0 disables)

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    InsufficientCapacity, Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Default rate limit: 20 cells per second.
const DEFAULT_RPS: u32 = 20;

/// Cells taken by one `/export` request.
pub const EXPORT_COST: u32 = 4;

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Global rate limiter type alias.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a new global rate limiter.
///
/// # Arguments
/// * `requests_per_second` - Cells replenished per second; zero falls back
///   to the default
///
/// # Returns
/// A thread-safe rate limiter wrapped in Arc.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second)
        .or(NonZeroU32::new(DEFAULT_RPS))
        .unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// Get rate limit from environment variable.
///
/// Returns the value of `WIKIRDF_RATE_LIMIT` or 20 if not set.
pub fn get_rate_limit_from_env() -> u32 {
    std::env::var("WIKIRDF_RATE_LIMIT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_RPS)
}

/// Cells a request to `path` takes from the bucket.
fn request_cost(path: &str) -> NonZeroU32 {
    let cost = if path == "/export" { EXPORT_COST } else { 1 };
    NonZeroU32::new(cost).unwrap_or(NonZeroU32::MIN)
}

/// Take the cost of a request to `path`; false when the bucket is short.
///
/// A quota smaller than the cost is charged its whole burst instead.
fn admit(limiter: &GlobalRateLimiter, path: &str) -> bool {
    match limiter.check_n(request_cost(path)) {
        Ok(decision) => decision.is_ok(),
        Err(InsufficientCapacity(burst)) => NonZeroU32::new(burst)
            .is_some_and(|burst| matches!(limiter.check_n(burst), Ok(Ok(())))),
    }
}

/// Rate limiting middleware.
///
/// Checks the global rate limiter before allowing requests through.
/// Returns 429 Too Many Requests if the limit is exceeded.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let path = request.uri().path().to_string();
    if admit(&limiter, &path) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(event = "rate_limited", path = %path, "Rate limit exceeded");
        Err((StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_allows_first_request() {
        let limiter = create_rate_limiter(5);
        assert!(admit(&limiter, "/health"));
    }

    #[test]
    fn zero_rate_uses_default() {
        let limiter = create_rate_limiter(0);
        for _ in 0..DEFAULT_RPS {
            assert!(admit(&limiter, "/namespaces"));
        }
    }

    #[test]
    fn export_takes_several_cells() {
        let limiter = create_rate_limiter(EXPORT_COST * 2);
        assert!(admit(&limiter, "/export"));
        assert!(admit(&limiter, "/export"));
        assert!(!admit(&limiter, "/export"));
        assert!(!admit(&limiter, "/health"));
    }

    #[test]
    fn export_under_small_quota_drains_bucket() {
        let limiter = create_rate_limiter(2);
        assert!(admit(&limiter, "/export"));
        assert!(!admit(&limiter, "/expand"));
    }

    #[test]
    fn cost_depends_on_route() {
        assert_eq!(request_cost("/export").get(), EXPORT_COST);
        assert_eq!(request_cost("/expand").get(), 1);
    }
}
