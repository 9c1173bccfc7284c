//! Keepalive payload (§3) — the wire contract between client and server.

use std::net::IpAddr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::country;
use crate::error::ValidationError;
use crate::sanitize::sanitize_field;

/// Literal the client sends when it has no public IP observation.
pub const UNKNOWN_IP: &str = "unknown";

/// The only value `status` accepts today.
pub const STATUS_ALIVE: &str = "alive";

/// Geolocation snapshot reported alongside a keepalive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// Full country name or 2-letter ISO code, provider-dependent.
    pub country: String,
    pub city: String,
    pub region: String,
    pub org: String,
    pub timezone: String,
}

impl Location {
    fn sanitized(self) -> Self {
        Self {
            country: sanitize_field(&self.country),
            city: sanitize_field(&self.city),
            region: sanitize_field(&self.region),
            org: sanitize_field(&self.org),
            timezone: sanitize_field(&self.timezone),
        }
    }

    /// The country normalized to a 2-letter code, or `UNKNOWN`.
    pub fn normalized_country(&self) -> String {
        country::normalize(&self.country)
    }
}

/// DNS-trace probe result: where the resolver the client actually used
/// is located, plus the data-center colo that answered the trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DnsTest {
    /// 2-letter ISO code from the trace endpoint, or empty if unknown.
    pub location: String,
    /// 3-letter data-center code.
    pub colo: String,
}

impl DnsTest {
    fn sanitized(self) -> Self {
        Self {
            location: sanitize_field(&self.location),
            colo: sanitize_field(&self.colo),
        }
    }

    /// True if the trace produced no usable location.
    pub fn is_unknown(&self) -> bool {
        self.location.trim().is_empty() || country::normalize(&self.location) == country::UNKNOWN
    }
}

/// A single client → server keepalive observation (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepalivePayload {
    pub client_id: String,
    pub timestamp: DateTime<FixedOffset>,
    #[serde(default = "default_ip")]
    pub public_ip: String,
    pub status: String,
    #[serde(default)]
    pub client_version: Option<String>,
    pub location: Location,
    pub dns_test: DnsTest,
}

fn default_ip() -> String {
    UNKNOWN_IP.to_string()
}

impl KeepalivePayload {
    /// Validate and sanitize a just-deserialized payload in place.
    ///
    /// `client_id` is lowercased before the character-class check, per
    /// §3 ("matches `[a-z0-9-]{1,64}` after lowercasing").
    pub fn validate_and_normalize(mut self) -> Result<Self, ValidationError> {
        self.client_id = self.client_id.to_ascii_lowercase();
        if self.client_id.is_empty()
            || self.client_id.chars().count() > 64
            || !self
                .client_id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ValidationError::InvalidClientId);
        }

        if self.status != STATUS_ALIVE {
            return Err(ValidationError::InvalidStatus);
        }

        if self.public_ip.trim().is_empty() {
            self.public_ip = UNKNOWN_IP.to_string();
        }
        if self.public_ip != UNKNOWN_IP && self.public_ip.parse::<IpAddr>().is_err() {
            return Err(ValidationError::InvalidIp);
        }

        self.location = self.location.sanitized();
        self.dns_test = self.dns_test.sanitized();

        if let Some(ref v) = self.client_version {
            if v.chars().count() > crate::sanitize::MAX_FIELD_LEN {
                self.client_version = Some(sanitize_field(v));
            }
        }

        Ok(self)
    }

    /// `client_version`, or the literal `"Unknown"` when absent (§9.1).
    pub fn version_or_unknown(&self) -> &str {
        self.client_version.as_deref().unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(client_id: &str) -> KeepalivePayload {
        KeepalivePayload {
            client_id: client_id.to_string(),
            timestamp: DateTime::parse_from_rfc3339("2026-07-27T10:00:00+00:00").unwrap(),
            public_ip: "203.0.113.5".to_string(),
            status: STATUS_ALIVE.to_string(),
            client_version: Some("1.2.3".to_string()),
            location: Location {
                country: "Romania".to_string(),
                city: "Bucharest".to_string(),
                region: "".to_string(),
                org: "".to_string(),
                timezone: "".to_string(),
            },
            dns_test: DnsTest {
                location: "RO".to_string(),
                colo: "OTP".to_string(),
            },
        }
    }

    #[test]
    fn accepts_64_char_client_id() {
        let id = "a".repeat(64);
        assert!(sample(&id).validate_and_normalize().is_ok());
    }

    #[test]
    fn rejects_65_char_client_id() {
        let id = "a".repeat(65);
        assert_eq!(
            sample(&id).validate_and_normalize().unwrap_err(),
            ValidationError::InvalidClientId
        );
    }

    #[test]
    fn lowercases_client_id() {
        let p = sample("Agent-ONE").validate_and_normalize().unwrap();
        assert_eq!(p.client_id, "agent-one");
    }

    #[test]
    fn empty_country_normalizes_to_unknown() {
        let mut p = sample("agent-1");
        p.location.country = "".to_string();
        let p = p.validate_and_normalize().unwrap();
        assert_eq!(p.location.normalized_country(), country::UNKNOWN);
    }

    #[test]
    fn missing_public_ip_defaults_to_unknown() {
        let mut p = sample("agent-1");
        p.public_ip = "".to_string();
        let p = p.validate_and_normalize().unwrap();
        assert_eq!(p.public_ip, UNKNOWN_IP);
    }

    #[test]
    fn rejects_bad_ip_literal() {
        let mut p = sample("agent-1");
        p.public_ip = "not-an-ip".to_string();
        assert_eq!(
            p.validate_and_normalize().unwrap_err(),
            ValidationError::InvalidIp
        );
    }

    #[test]
    fn rejects_wrong_status() {
        let mut p = sample("agent-1");
        p.status = "dead".to_string();
        assert_eq!(
            p.validate_and_normalize().unwrap_err(),
            ValidationError::InvalidStatus
        );
    }
}
