//! Per-source-IP sliding-window rate limiter (§4.6, §5, §9). A sharded
//! `DashMap` keyed by IP, each entry guarded by its own `Mutex`, so
//! unrelated source IPs never contend — the same shape as
//! `file-backend`'s `DashMap`-backed session store, generalized from a
//! single global mutex to per-key locks per §9's "map of ring buffers ...
//! with per-key locks" redesign note.

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;

const WINDOW: Duration = Duration::from_secs(60);

pub struct RateLimitState {
    limit_per_window: u32,
    entries: DashMap<IpAddr, Mutex<VecDeque<Instant>>>,
}

impl RateLimitState {
    pub fn new(limit_per_window: u32) -> Self {
        Self {
            limit_per_window,
            entries: DashMap::new(),
        }
    }

    /// Record one request from `ip` now. Returns `Ok(())` if it's within
    /// the limit, or `Err(retry_after_secs)` if it should be rejected.
    /// Prunes timestamps outside the window opportunistically on access.
    pub fn check(&self, ip: IpAddr) -> Result<(), u64> {
        let now = Instant::now();
        let entry = self
            .entries
            .entry(ip)
            .or_insert_with(|| Mutex::new(VecDeque::new()));
        let mut timestamps = entry.lock().expect("rate limit entry lock poisoned");

        while let Some(&front) = timestamps.front() {
            if now.duration_since(front) > WINDOW {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() as u32 >= self.limit_per_window {
            let oldest = *timestamps.front().expect("len >= limit > 0");
            let retry_after = WINDOW.saturating_sub(now.duration_since(oldest));
            return Err(retry_after.as_secs().max(1));
        }

        timestamps.push_back(now);
        Ok(())
    }
}

/// Axum middleware: reject with 429 once the sliding window for this
/// source IP is exhausted.
pub async fn rate_limit(
    axum::extract::State(state): axum::extract::State<std::sync::Arc<crate::state::AppState>>,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use axum::response::IntoResponse;
    match state.rate_limit.check(addr.ip()) {
        Ok(()) => next.run(request).await,
        Err(retry_after_secs) => {
            tracing::warn!(target: "security", ip = %addr.ip(), "rate limit exceeded");
            crate::error::ApiError::RateLimited { retry_after_secs }.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(203, 0, 113, 5))
    }

    #[test]
    fn allows_up_to_the_limit_then_rejects() {
        let state = RateLimitState::new(30);
        for _ in 0..30 {
            assert!(state.check(ip()).is_ok());
        }
        assert!(state.check(ip()).is_err());
    }

    #[test]
    fn distinct_ips_have_independent_windows() {
        let state = RateLimitState::new(1);
        assert!(state.check(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))).is_ok());
        assert!(state.check(IpAddr::V4(Ipv4Addr::new(2, 2, 2, 2))).is_ok());
    }
}
