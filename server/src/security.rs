//! IP-allowlist and API-key middleware (§4.6 steps 2 and 4). Both apply
//! only to the API listener; health and dashboard stay public.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Rejects requests from a source IP outside the configured allowlist.
/// An empty allowlist means "any" (§6).
pub async fn ip_allowlist(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.ip_allowed(addr.ip()) {
        tracing::warn!(target: "security", ip = %addr.ip(), "rejected by IP allowlist");
        return StatusCode::FORBIDDEN.into_response();
    }
    next.run(request).await
}

/// Constant-time `X-API-Key` check. An empty configured key disables
/// auth entirely (§6, dev-only, warned about at startup).
pub async fn api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.api_key.as_deref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !keys_match(expected, provided) {
        tracing::warn!(target: "security", "rejected request with invalid API key");
        return crate::error::ApiError::Auth.into_response();
    }

    next.run(request).await
}

fn keys_match(expected: &str, provided: &str) -> bool {
    // Constant-time across equal-length inputs; a length mismatch alone
    // is not secret-dependent, so it's safe to short-circuit on it.
    expected.len() == provided.len() && expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_keys_compare_equal() {
        assert!(keys_match("secret-key", "secret-key"));
    }

    #[test]
    fn mismatched_keys_compare_unequal() {
        assert!(!keys_match("secret-key", "wrong-key"));
        assert!(!keys_match("secret-key", "secret-ke"));
    }
}
