//! Shared error taxonomy (§7).
//!
//! `ValidationError` is the only variant that crosses the
//! `vpnsentinel-core` boundary; `UpstreamError`/`ConfigError` are
//! defined closer to where they occur (`vpnsentinel-geo`,
//! `vpnsentinel-notifier`, the server/client binaries) since they carry
//! context specific to those call sites.

use thiserror::Error;

/// Malformed-payload errors (HTTP 400 at the API boundary).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("client_id must be non-empty and match [a-z0-9-]{{1,64}}")]
    InvalidClientId,

    #[error("public_ip is not a valid IPv4/IPv6 literal or \"unknown\"")]
    InvalidIp,

    #[error("status must be \"alive\"")]
    InvalidStatus,
}
