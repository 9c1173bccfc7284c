//! `UpstreamError` (§7) — failures talking to geolocation providers and
//! the DNS-trace endpoint. Always recovered locally; never surfaced to
//! the API's callers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {provider} timed out")]
    Timeout { provider: String },

    #[error("request to {provider} failed: {source}")]
    Http {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not parse response from {provider}: {reason}")]
    Parse { provider: String, reason: String },

    #[error("all providers in the fallback chain failed")]
    Exhausted,

    #[error("provider {0} is not a known geolocation provider")]
    UnknownProvider(String),
}
