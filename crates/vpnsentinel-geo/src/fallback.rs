//! Provider fallback chain (§4.5).

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::UpstreamError;
use crate::providers::{find_provider, GeoObservation, Provider, PROVIDERS};

/// Per-provider call timeout.
pub const PER_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Total budget across the whole fallback chain for one cycle.
pub const TOTAL_BUDGET: Duration = Duration::from_secs(30);

/// Which provider(s) to try for one sampling cycle.
#[derive(Debug, Clone)]
pub enum ProviderMode {
    /// Try providers in [`PROVIDERS`] order; accept the first 2xx,
    /// parseable response.
    Auto,
    /// Only try the named provider; a failure is reported, not
    /// recovered by falling back.
    Forced(String),
}

impl ProviderMode {
    pub fn from_config_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("auto") {
            ProviderMode::Auto
        } else {
            ProviderMode::Forced(s.to_string())
        }
    }
}

/// Result of a successful resolution: the observation plus which
/// provider produced it (logged for operators, §4.5).
#[derive(Debug, Clone)]
pub struct Resolution {
    pub observation: GeoObservation,
    pub provider_name: &'static str,
}

async fn try_provider(client: &reqwest::Client, provider: &Provider) -> Result<GeoObservation, UpstreamError> {
    let response = client
        .get(provider.url)
        .timeout(PER_CALL_TIMEOUT)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout {
                    provider: provider.name.to_string(),
                }
            } else {
                UpstreamError::Http {
                    provider: provider.name.to_string(),
                    source: e,
                }
            }
        })?;

    if !response.status().is_success() {
        return Err(UpstreamError::Parse {
            provider: provider.name.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let body: serde_json::Value = response.json().await.map_err(|e| UpstreamError::Http {
        provider: provider.name.to_string(),
        source: e,
    })?;

    (provider.parse)(&body)
}

/// Resolve a geolocation observation per `mode`, respecting
/// [`PER_CALL_TIMEOUT`] and [`TOTAL_BUDGET`].
pub async fn resolve(client: &reqwest::Client, mode: &ProviderMode) -> Result<Resolution, UpstreamError> {
    match mode {
        ProviderMode::Forced(name) => {
            let provider = find_provider(name)?;
            let observation = try_provider(client, provider).await?;
            Ok(Resolution {
                observation,
                provider_name: provider.name,
            })
        }
        ProviderMode::Auto => {
            let deadline = tokio::time::Instant::now() + TOTAL_BUDGET;
            for provider in PROVIDERS {
                if tokio::time::Instant::now() >= deadline {
                    warn!("geolocation fallback chain exhausted its total time budget");
                    break;
                }
                match try_provider(client, provider).await {
                    Ok(observation) => {
                        debug!(provider = provider.name, "geolocation provider succeeded");
                        return Ok(Resolution {
                            observation,
                            provider_name: provider.name,
                        });
                    }
                    Err(e) => {
                        warn!(provider = provider.name, error = %e, "geolocation provider failed, trying next");
                    }
                }
            }
            Err(UpstreamError::Exhausted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_config_str() {
        assert!(matches!(ProviderMode::from_config_str("auto"), ProviderMode::Auto));
        assert!(matches!(ProviderMode::from_config_str("AUTO"), ProviderMode::Auto));
        assert!(matches!(
            ProviderMode::from_config_str("ip-api"),
            ProviderMode::Forced(ref n) if n == "ip-api"
        ));
    }
}
