//! The per-cycle sampling loop: resolve geolocation, probe DNS, and
//! POST a keepalive to the server (§3, §4.5).

use chrono::Utc;
use vpnsentinel_core::{DnsTest, KeepalivePayload, Location};
use vpnsentinel_geo::{fallback, ProviderMode};

use crate::config::ClientConfig;

/// One sampling attempt: resolve geolocation + DNS trace, build the
/// payload, and POST it. Every failure is recovered here — a bad cycle
/// is logged and skipped, never propagated up to kill the loop.
pub async fn sample_once(http: &reqwest::Client, config: &ClientConfig, mode: &ProviderMode) {
    let resolution = match fallback::resolve(http, mode).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(target: "client", error = %e, "geolocation resolution failed this cycle");
            return;
        }
    };

    let dns_test = match vpnsentinel_geo::fetch_dns_trace(http).await {
        Ok(trace) => DnsTest {
            location: trace.location,
            colo: trace.colo,
        },
        Err(e) => {
            tracing::warn!(target: "client", error = %e, "DNS-trace probe failed this cycle, reporting unknown");
            DnsTest {
                location: String::new(),
                colo: String::new(),
            }
        }
    };

    tracing::debug!(
        target: "client",
        provider = resolution.provider_name,
        ip = %resolution.observation.public_ip,
        "geolocation resolved"
    );

    let payload = KeepalivePayload {
        client_id: config.client_id.clone(),
        timestamp: Utc::now().into(),
        public_ip: resolution.observation.public_ip,
        status: vpnsentinel_core::STATUS_ALIVE.to_string(),
        client_version: Some(env!("CARGO_PKG_VERSION").to_string()),
        location: Location {
            country: resolution.observation.country,
            city: resolution.observation.city,
            region: resolution.observation.region,
            org: resolution.observation.org,
            timezone: resolution.observation.timezone,
        },
        dns_test,
    };

    send_keepalive(http, config, &payload).await;
}

async fn send_keepalive(http: &reqwest::Client, config: &ClientConfig, payload: &KeepalivePayload) {
    let mut request = http.post(config.keepalive_url()).json(payload);
    if let Some(ref key) = config.api_key {
        request = request.header("X-API-Key", key);
    }

    match request.send().await {
        Ok(response) if response.status().is_success() => {
            tracing::info!(target: "client", client_id = %config.client_id, "keepalive delivered");
        }
        Ok(response) => {
            tracing::warn!(
                target: "client",
                status = %response.status(),
                "server rejected keepalive"
            );
        }
        Err(e) => {
            tracing::error!(target: "client", error = %e, "failed to reach server");
        }
    }
}

/// Runs `sample_once` on `config.check_interval`, forever, until
/// `shutdown` fires.
pub async fn run(
    http: reqwest::Client,
    config: std::sync::Arc<ClientConfig>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mode = ProviderMode::from_config_str(&config.geo_provider);
    let mut ticker = tokio::time::interval(config.check_interval);
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!(target: "client", "sampling loop shutting down");
                    return;
                }
            }
            _ = ticker.tick() => {
                sample_once(&http, &config, &mode).await;
            }
        }
    }
}
