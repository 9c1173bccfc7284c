//! Shared types and pure functions for VPNSentinel: the keepalive wire
//! contract, country-code normalization, field sanitization, and the
//! validation-error taxonomy. No I/O lives here — everything is a pure
//! function or a plain data type, consumed by both the client agent and
//! the server.

pub mod country;
pub mod error;
pub mod payload;
pub mod sanitize;

pub use error::ValidationError;
pub use payload::{DnsTest, KeepalivePayload, Location, STATUS_ALIVE, UNKNOWN_IP};
