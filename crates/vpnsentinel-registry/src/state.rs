//! Per-client state machine (§4.2).

use serde::{Deserialize, Serialize};
use vpnsentinel_core::{payload::KeepalivePayload, UNKNOWN_IP};

/// The six states a [`crate::record::ClientRecord`] can be in. No
/// terminal state — `Offline` can transition back to any `Online*`
/// variant on the next accepted keepalive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientState {
    New,
    OnlineSecure,
    OnlineDnsLeak,
    OnlineDnsUnknown,
    OnlineBypass,
    Offline,
}

impl ClientState {
    /// Human label used by the dashboard status badge.
    pub fn label(&self) -> &'static str {
        match self {
            ClientState::New => "new",
            ClientState::OnlineSecure => "secure",
            ClientState::OnlineDnsLeak => "dns-leak",
            ClientState::OnlineDnsUnknown => "dns-unknown",
            ClientState::OnlineBypass => "bypass",
            ClientState::Offline => "offline",
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(
            self,
            ClientState::OnlineSecure
                | ClientState::OnlineDnsLeak
                | ClientState::OnlineDnsUnknown
                | ClientState::OnlineBypass
        )
    }

    pub fn is_new_or_offline(&self) -> bool {
        matches!(self, ClientState::New | ClientState::Offline)
    }

    /// The [`Classification`] an `Online*` state corresponds to, or
    /// `None` for `New`/`Offline`.
    pub fn classification(&self) -> Option<Classification> {
        match self {
            ClientState::OnlineSecure => Some(Classification::Secure),
            ClientState::OnlineDnsLeak => Some(Classification::DnsLeak),
            ClientState::OnlineDnsUnknown => Some(Classification::DnsUnknown),
            ClientState::OnlineBypass => Some(Classification::Bypass),
            ClientState::New | ClientState::Offline => None,
        }
    }

    fn from_classification(class: Classification) -> Self {
        match class {
            Classification::Secure => ClientState::OnlineSecure,
            Classification::DnsLeak => ClientState::OnlineDnsLeak,
            Classification::DnsUnknown => ClientState::OnlineDnsUnknown,
            Classification::Bypass => ClientState::OnlineBypass,
        }
    }
}

/// The per-observation classification computed by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Secure,
    DnsLeak,
    DnsUnknown,
    Bypass,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Classification::Secure => "SECURE",
            Classification::DnsLeak => "DNS_LEAK",
            Classification::DnsUnknown => "DNS_UNKNOWN",
            Classification::Bypass => "BYPASS",
        };
        write!(f, "{s}")
    }
}

/// Classify one accepted keepalive against the server's own public IP
/// (§4.2, steps 1-5). `server_ip` is `None` when the server's
/// self-view has not resolved yet (treated as "no bypass possible").
pub fn classify(payload: &KeepalivePayload, server_ip: Option<&str>) -> Classification {
    if let Some(server_ip) = server_ip {
        if payload.public_ip != UNKNOWN_IP
            && server_ip != UNKNOWN_IP
            && !server_ip.is_empty()
            && payload.public_ip == server_ip
        {
            return Classification::Bypass;
        }
    }

    if payload.dns_test.is_unknown() {
        return Classification::DnsUnknown;
    }

    if payload.location.normalized_country() == vpnsentinel_core::country::UNKNOWN {
        return Classification::DnsUnknown;
    }

    if vpnsentinel_core::country::equal(&payload.dns_test.location, &payload.location.country) {
        Classification::Secure
    } else {
        Classification::DnsLeak
    }
}

/// The state a client should move to given its current state and the
/// class of the latest observation (§4.2 transition table).
///
/// Returns `None` when the observation produces no state change (the
/// "any (except OFFLINE), class=SECURE, same IP as prior -> same" row
/// and its generalization: an `Online*` client observing the same class
/// again stays put).
pub fn next_state(current: ClientState, class: Classification) -> ClientState {
    if current.is_new_or_offline() {
        return ClientState::from_classification(class);
    }
    let candidate = ClientState::from_classification(class);
    if candidate == current {
        current
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpnsentinel_core::payload::{DnsTest, Location};
    use chrono::DateTime;

    fn payload(public_ip: &str, country: &str, dns_loc: &str) -> KeepalivePayload {
        KeepalivePayload {
            client_id: "agent-1".into(),
            timestamp: DateTime::parse_from_rfc3339("2026-07-27T10:00:00+00:00").unwrap(),
            public_ip: public_ip.to_string(),
            status: "alive".into(),
            client_version: None,
            location: Location {
                country: country.to_string(),
                city: "".into(),
                region: "".into(),
                org: "".into(),
                timezone: "".into(),
            },
            dns_test: DnsTest {
                location: dns_loc.to_string(),
                colo: "OTP".into(),
            },
        }
    }

    #[test]
    fn secure_when_countries_match_across_encodings() {
        let p = payload("1.2.3.4", "Romania", "RO");
        assert_eq!(classify(&p, None), Classification::Secure);
    }

    #[test]
    fn leak_when_countries_differ() {
        let p = payload("1.2.3.4", "ES", "DE");
        assert_eq!(classify(&p, None), Classification::DnsLeak);
    }

    #[test]
    fn bypass_overrides_dns_leak() {
        let p = payload("203.0.113.5", "ES", "DE");
        assert_eq!(
            classify(&p, Some("203.0.113.5")),
            Classification::Bypass
        );
    }

    #[test]
    fn unknown_public_ip_skips_bypass_check() {
        let p = payload("unknown", "Romania", "RO");
        assert_eq!(classify(&p, Some("unknown")), Classification::Secure);
    }

    #[test]
    fn empty_country_is_dns_unknown_not_leak() {
        let p = payload("1.2.3.4", "", "RO");
        assert_eq!(classify(&p, None), Classification::DnsUnknown);
    }

    #[test]
    fn missing_dns_location_is_dns_unknown() {
        let p = payload("1.2.3.4", "Romania", "");
        assert_eq!(classify(&p, None), Classification::DnsUnknown);
    }

    #[test]
    fn online_state_holds_when_class_repeats() {
        assert_eq!(
            next_state(ClientState::OnlineSecure, Classification::Secure),
            ClientState::OnlineSecure
        );
    }

    #[test]
    fn new_always_moves_to_matching_online_state() {
        assert_eq!(
            next_state(ClientState::New, Classification::Bypass),
            ClientState::OnlineBypass
        );
        assert_eq!(
            next_state(ClientState::Offline, Classification::DnsLeak),
            ClientState::OnlineDnsLeak
        );
    }
}
