//! # Authentication Module
//!
//! API key authentication for the wikirdf HTTP API.
//!
//! Exports can be large and are served from the wiki's own namespace
//! configuration, so a deployment that exposes the server beyond localhost
//! should set a key.
//!
//! ## Configuration
//!
//! Authentication is configured via environment variable:
//! - `WIKIRDF_API_KEY`: If set, every request outside [`PUBLIC_PATHS`]
//!   requires this key
//!
//! ## Usage
//!
//! Send the API key in the Authorization header:
//! ```text
//! Authorization: Bearer <your-api-key>
//! ```

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

/// Paths served without a key (load balancer health checks).
pub const PUBLIC_PATHS: [&str; 1] = ["/health"];

// =============================================================================
// API KEY AUTHENTICATION
// =============================================================================

/// Get API key from environment variable.
///
/// Returns `Some(key)` if `WIKIRDF_API_KEY` is set and non-empty,
/// `None` otherwise (disabling authentication).
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var("WIKIRDF_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// The key sent by the client, as `Bearer <key>` or the raw key.
fn provided_key(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value).trim())
}

/// Compare a provided key against the configured one.
///
/// Constant-time comparison to prevent timing attacks. Both keys are padded
/// to the same length so `ct_eq` always runs over the same number of bytes.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();

    let max_len = provided.len().max(expected.len());
    let mut padded_provided = vec![0u8; max_len];
    let mut padded_expected = vec![0u8; max_len];
    padded_provided[..provided.len()].copy_from_slice(provided);
    padded_expected[..expected.len()].copy_from_slice(expected);

    let bytes_match: bool = padded_provided.ct_eq(&padded_expected).into();
    bytes_match && provided.len() == expected.len()
}

/// API key authentication middleware.
///
/// If `WIKIRDF_API_KEY` is set:
/// - [`PUBLIC_PATHS`] are always allowed
/// - `/export`, `/expand` and `/namespaces` require the key
///
/// If `WIKIRDF_API_KEY` is not set, all requests are allowed.
pub async fn api_key_auth_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let Some(expected) = get_api_key_from_env() else {
        return Ok(next.run(request).await);
    };

    let path = request.uri().path().to_string();
    if PUBLIC_PATHS.contains(&path.as_str()) {
        return Ok(next.run(request).await);
    }

    match provided_key(request.headers()).map(|provided| keys_match(provided, &expected)) {
        Some(true) => Ok(next.run(request).await),
        Some(false) => {
            tracing::warn!(
                event = "auth_failure",
                reason = "invalid_api_key",
                path = %path,
                "Authentication failed: invalid API key"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                path = %path,
                "Missing Authorization header"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
