//! Errors the notifier can hit sending or polling chat messages. Never
//! surfaced to API clients — every call site here logs and carries on
//! (§4.4: notification delivery is best-effort).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("chat transport request timed out")]
    Timeout,
    #[error("chat transport request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat transport returned an unexpected response: {0}")]
    Protocol(String),
    #[error("chat transport not configured")]
    NotConfigured,
}
