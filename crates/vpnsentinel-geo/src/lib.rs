//! Geolocation provider fallback chain, DNS-trace probing, and the
//! server's cached self-view (§4.5, §3). All I/O here is recovered
//! locally (`UpstreamError`) — nothing in this crate ever produces a
//! client-visible or API-visible failure.

pub mod dns_trace;
pub mod error;
pub mod fallback;
pub mod providers;
pub mod selfview;

pub use dns_trace::{fetch_dns_trace, parse_trace, DnsTraceResult};
pub use error::UpstreamError;
pub use fallback::{resolve, ProviderMode, Resolution};
pub use providers::GeoObservation;
pub use selfview::ServerSelfView;
