//! Notification schema (§4.4, §6) — the eight message kinds the
//! notifier can render, each with its own required field set.

use chrono::{DateTime, Utc};

/// Fields shared by `Connected`, `IpChanged`, `DnsLeak`, and
/// `DnsUnknown` — everything but `Bypass` needs the client's current
/// network picture (§6).
#[derive(Debug, Clone)]
pub struct ConnectionFields {
    pub client_id: String,
    pub client_version: String,
    pub public_ip: String,
    /// Set when this message also reports an IP change (the
    /// consolidated-notification case, §4.2 tie-breaks).
    pub previous_ip: Option<String>,
    pub city: String,
    pub region: String,
    pub country: String,
    pub provider: String,
    pub dns_location: String,
    pub dns_colo: String,
    pub classification: String,
}

#[derive(Debug, Clone)]
pub struct BypassFields {
    pub client_id: String,
    pub client_ip: String,
    pub server_ip: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone)]
pub struct OfflineFields {
    pub client_id: String,
    pub last_seen_absolute: DateTime<Utc>,
    pub last_seen_humanized: String,
}

#[derive(Debug, Clone)]
pub struct ServerStartedFields {
    pub version: String,
    pub commit: Option<String>,
    pub offline_threshold_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct NoClientsAliveFields {
    pub timestamp: DateTime<Utc>,
}

/// One renderable notification. Variant names match the outbound
/// contract's `kind` enumeration from §4.4/§6 exactly.
#[derive(Debug, Clone)]
pub enum Notification {
    Connected(ConnectionFields),
    IpChanged(ConnectionFields),
    DnsLeak(ConnectionFields),
    DnsUnknown(ConnectionFields),
    Bypass(BypassFields),
    Offline(OfflineFields),
    NoClientsAlive(NoClientsAliveFields),
    ServerStarted(ServerStartedFields),
}

impl Notification {
    /// Short tag used in logs (§7 user-visible failure / operator logs).
    pub fn kind_tag(&self) -> &'static str {
        match self {
            Notification::Connected(_) => "connected",
            Notification::IpChanged(_) => "ip_changed",
            Notification::DnsLeak(_) => "dns_leak",
            Notification::DnsUnknown(_) => "dns_unknown",
            Notification::Bypass(_) => "bypass",
            Notification::Offline(_) => "offline",
            Notification::NoClientsAlive(_) => "no_clients_alive",
            Notification::ServerStarted(_) => "server_started",
        }
    }
}
