//! Geolocation providers (§4.5).
//!
//! Each provider is a pure parsing function `raw JSON -> GeoObservation`
//! plus the URL used to fetch it. Field names differ across providers;
//! normalizing them here keeps everything downstream of
//! [`crate::fallback::resolve`] working with one shape.

use serde_json::Value;

use crate::error::UpstreamError;

/// A normalized geolocation observation, field-for-field what §3's
/// `location` object needs plus the provider's own view of the public
/// IP (used by the server's `ServerSelfView`, and cross-checked by the
/// client against its own outbound connection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoObservation {
    pub public_ip: String,
    pub country: String,
    pub city: String,
    pub region: String,
    pub org: String,
    pub timezone: String,
}

fn str_field(v: &Value, key: &str, default: &str) -> String {
    v.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// One entry in the fallback chain: a name, a fetch URL, and a parser.
#[derive(Debug, Clone, Copy)]
pub struct Provider {
    pub name: &'static str,
    pub url: &'static str,
    pub parse: fn(&Value) -> Result<GeoObservation, UpstreamError>,
}

/// `http://ip-api.com/json/` — `country`, `countryCode`, `regionName`,
/// `city`, `timezone`, `isp`, `query` (the IP).
fn parse_ip_api(v: &Value) -> Result<GeoObservation, UpstreamError> {
    if v.get("status").and_then(Value::as_str) == Some("fail") {
        return Err(UpstreamError::Parse {
            provider: "ip-api".to_string(),
            reason: v
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("status=fail")
                .to_string(),
        });
    }
    Ok(GeoObservation {
        public_ip: str_field(v, "query", "unknown"),
        country: str_field(v, "country", "Unknown"),
        city: str_field(v, "city", "Unknown"),
        region: str_field(v, "regionName", "Unknown"),
        org: str_field(v, "isp", "Unknown"),
        timezone: str_field(v, "timezone", "Unknown"),
    })
}

/// `https://ipinfo.io/json` — `ip`, `city`, `region`, `country`, `org`,
/// `timezone`.
fn parse_ipinfo(v: &Value) -> Result<GeoObservation, UpstreamError> {
    Ok(GeoObservation {
        public_ip: str_field(v, "ip", "unknown"),
        country: str_field(v, "country", "Unknown"),
        city: str_field(v, "city", "Unknown"),
        region: str_field(v, "region", "Unknown"),
        org: str_field(v, "org", "Unknown"),
        timezone: str_field(v, "timezone", "Unknown"),
    })
}

/// `https://ipwho.is/` — `success`, `ip`, `country`, `region`, `city`,
/// `connection.isp`, `timezone.id`.
fn parse_ipwhois(v: &Value) -> Result<GeoObservation, UpstreamError> {
    if v.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(UpstreamError::Parse {
            provider: "ipwhois".to_string(),
            reason: v
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("success=false")
                .to_string(),
        });
    }
    let timezone = v
        .get("timezone")
        .and_then(|tz| tz.get("id"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();
    let org = v
        .get("connection")
        .and_then(|c| c.get("isp"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();
    Ok(GeoObservation {
        public_ip: str_field(v, "ip", "unknown"),
        country: str_field(v, "country", "Unknown"),
        city: str_field(v, "city", "Unknown"),
        region: str_field(v, "region", "Unknown"),
        org,
        timezone,
    })
}

/// The fixed fallback order tried in `auto` mode (§4.5).
pub const PROVIDERS: &[Provider] = &[
    Provider {
        name: "ip-api",
        url: "http://ip-api.com/json/",
        parse: parse_ip_api,
    },
    Provider {
        name: "ipinfo",
        url: "https://ipinfo.io/json",
        parse: parse_ipinfo,
    },
    Provider {
        name: "ipwhois",
        url: "https://ipwho.is/",
        parse: parse_ipwhois,
    },
];

/// Look up a provider by name for forced (non-`auto`) mode.
pub fn find_provider(name: &str) -> Result<&'static Provider, UpstreamError> {
    PROVIDERS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| UpstreamError::UnknownProvider(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_ip_api_fields() {
        let raw = json!({
            "status": "success",
            "country": "Romania",
            "countryCode": "RO",
            "regionName": "Bucharest",
            "city": "Bucharest",
            "timezone": "Europe/Bucharest",
            "isp": "RCS & RDS",
            "query": "203.0.113.5",
        });
        let obs = parse_ip_api(&raw).unwrap();
        assert_eq!(obs.public_ip, "203.0.113.5");
        assert_eq!(obs.country, "Romania");
        assert_eq!(obs.org, "RCS & RDS");
    }

    #[test]
    fn ip_api_failure_status_is_error() {
        let raw = json!({"status": "fail", "message": "invalid query"});
        assert!(parse_ip_api(&raw).is_err());
    }

    #[test]
    fn missing_fields_default_to_unknown() {
        let raw = json!({"ip": "203.0.113.5"});
        let obs = parse_ipinfo(&raw).unwrap();
        assert_eq!(obs.country, "Unknown");
        assert_eq!(obs.public_ip, "203.0.113.5");
    }

    #[test]
    fn parses_ipwhois_nested_fields() {
        let raw = json!({
            "success": true,
            "ip": "203.0.113.5",
            "country": "Germany",
            "region": "Hesse",
            "city": "Frankfurt",
            "connection": {"isp": "Hetzner"},
            "timezone": {"id": "Europe/Berlin"},
        });
        let obs = parse_ipwhois(&raw).unwrap();
        assert_eq!(obs.org, "Hetzner");
        assert_eq!(obs.timezone, "Europe/Berlin");
    }

    #[test]
    fn find_provider_is_case_insensitive() {
        assert!(find_provider("IP-API").is_ok());
        assert!(find_provider("nonexistent").is_err());
    }
}
