//! `ServerSelfView` (§3) — the server's own cached public IP/geolocation,
//! used exclusively for VPN-bypass detection. Reuses the same provider
//! fallback chain the client uses, since determining "what is my public
//! IP" is the same problem either side of the tunnel.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::fallback::{resolve, ProviderMode, Resolution};
use crate::providers::GeoObservation;

/// Minimum time between refreshes; stale values are acceptable (§3).
pub const MIN_REFRESH_TTL: Duration = Duration::from_secs(300);

struct Cached {
    observation: GeoObservation,
    provider_name: &'static str,
    fetched_at: Instant,
}

pub struct ServerSelfView {
    client: reqwest::Client,
    mode: ProviderMode,
    ttl: Duration,
    cached: RwLock<Option<Cached>>,
}

impl ServerSelfView {
    pub fn new(client: reqwest::Client, mode: ProviderMode, ttl: Duration) -> Self {
        Self {
            client,
            mode,
            ttl: ttl.max(MIN_REFRESH_TTL),
            cached: RwLock::new(None),
        }
    }

    /// Best-effort eager refresh at startup (§3 Lifecycle). Failure is
    /// logged, not fatal — the view stays empty until the next on-demand
    /// refresh succeeds.
    pub async fn initialize(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "initial server self-view resolution failed, will retry on demand");
        }
    }

    /// Current cached public IP, refreshing first if stale. `None` until
    /// the first successful resolution.
    pub async fn ip(&self) -> Option<String> {
        self.refresh_if_stale().await;
        self.cached
            .read()
            .await
            .as_ref()
            .map(|c| c.observation.public_ip.clone())
    }

    /// Full cached observation plus the provider that produced it, for
    /// the `/status` response's `server` panel.
    pub async fn snapshot(&self) -> Option<(GeoObservation, &'static str)> {
        self.refresh_if_stale().await;
        self.cached
            .read()
            .await
            .as_ref()
            .map(|c| (c.observation.clone(), c.provider_name))
    }

    async fn refresh_if_stale(&self) {
        let needs_refresh = {
            let guard = self.cached.read().await;
            match guard.as_ref() {
                None => true,
                Some(c) => c.fetched_at.elapsed() >= self.ttl,
            }
        };
        if needs_refresh {
            if let Err(e) = self.refresh().await {
                warn!(error = %e, "server self-view refresh failed, keeping stale value");
            }
        }
    }

    async fn refresh(&self) -> Result<(), crate::error::UpstreamError> {
        let Resolution {
            observation,
            provider_name,
        } = resolve(&self.client, &self.mode).await?;
        info!(provider = provider_name, ip = %observation.public_ip, "server self-view refreshed");
        let mut guard = self.cached.write().await;
        *guard = Some(Cached {
            observation,
            provider_name,
            fetched_at: Instant::now(),
        });
        Ok(())
    }
}
