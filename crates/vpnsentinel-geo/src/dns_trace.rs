//! DNS-trace probe (§4.5) — determines where the DNS resolver the
//! client actually used is physically located, by hitting a well-known
//! trace endpoint and reading back which edge location answered.

use std::time::Duration;

use crate::error::UpstreamError;

/// Well-known line-oriented trace endpoint.
pub const TRACE_URL: &str = "https://www.cloudflare.com/cdn-cgi/trace";

const TRACE_TIMEOUT: Duration = Duration::from_secs(10);

/// Parsed `loc=`/`colo=` pair from a trace response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsTraceResult {
    /// 2-letter ISO code, empty if the trace didn't include one.
    pub location: String,
    /// 3-letter data-center code, empty if absent.
    pub colo: String,
}

/// Parse `key=value` line-oriented trace output, pulling out `loc` and
/// `colo`. Unknown/missing fields are left empty — classification (§4.2)
/// treats an empty `location` as `DNS_UNKNOWN`, not an error.
pub fn parse_trace(body: &str) -> DnsTraceResult {
    let mut result = DnsTraceResult::default();
    for line in body.lines() {
        if let Some((key, value)) = line.split_once('=') {
            match key {
                "loc" => result.location = value.trim().to_string(),
                "colo" => result.colo = value.trim().to_string(),
                _ => {}
            }
        }
    }
    result
}

pub async fn fetch_dns_trace(client: &reqwest::Client) -> Result<DnsTraceResult, UpstreamError> {
    let response = client
        .get(TRACE_URL)
        .timeout(TRACE_TIMEOUT)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout {
                    provider: "dns-trace".to_string(),
                }
            } else {
                UpstreamError::Http {
                    provider: "dns-trace".to_string(),
                    source: e,
                }
            }
        })?;

    if !response.status().is_success() {
        return Err(UpstreamError::Parse {
            provider: "dns-trace".to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let body = response.text().await.map_err(|e| UpstreamError::Http {
        provider: "dns-trace".to_string(),
        source: e,
    })?;

    Ok(parse_trace(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loc_and_colo() {
        let body = "fl=123abc\nh=www.cloudflare.com\nip=203.0.113.5\nts=1234.5\nvisit_scheme=https\nloc=RO\ntls=TLSv1.3\nsni=plaintext\nwarp=off\ngateway=off\nrbi=off\nkex=X25519\ncolo=OTP\n";
        let result = parse_trace(body);
        assert_eq!(result.location, "RO");
        assert_eq!(result.colo, "OTP");
    }

    #[test]
    fn missing_fields_are_empty() {
        let result = parse_trace("fl=123abc\nip=203.0.113.5\n");
        assert_eq!(result.location, "");
        assert_eq!(result.colo, "");
    }
}
