//! `ClientRecord` (§3) — one entry per `client_id`.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use vpnsentinel_core::payload::KeepalivePayload;

use crate::state::ClientState;

/// A server-side record for one client, created on first keepalive and
/// mutated in place on every subsequent one. Never evicted in the core
/// (§9.1).
#[derive(Debug, Clone, Serialize)]
pub struct ClientRecord {
    pub client_id: String,
    pub client_version: Option<String>,
    pub last_payload: KeepalivePayload,
    pub last_seen: DateTime<Utc>,
    #[serde(skip)]
    pub last_seen_instant: Instant,
    pub state: ClientState,
    pub previous_public_ip: Option<String>,
    pub ever_seen_online: bool,
    pub offline_notified: bool,
}

impl ClientRecord {
    /// Create the initial `NEW` record for a client's first accepted
    /// keepalive. The caller still runs the transition engine against
    /// it immediately afterward.
    pub fn new(payload: KeepalivePayload, now_wall: DateTime<Utc>, now_instant: Instant) -> Self {
        Self {
            client_id: payload.client_id.clone(),
            client_version: payload.client_version.clone(),
            last_payload: payload,
            last_seen: now_wall,
            last_seen_instant: now_instant,
            state: ClientState::New,
            previous_public_ip: None,
            ever_seen_online: false,
            offline_notified: false,
        }
    }

    /// `client_version`, or the literal `"Unknown"` when absent (§9.1).
    pub fn version_or_unknown(&self) -> &str {
        self.client_version.as_deref().unwrap_or("Unknown")
    }

    /// Humanized "last seen" relative to `now` (dashboard use): "just
    /// now", "N min ago", "Nh ago".
    pub fn humanized_last_seen(&self, now: DateTime<Utc>) -> String {
        let delta = now.signed_duration_since(self.last_seen);
        let secs = delta.num_seconds().max(0);
        if secs < 60 {
            "just now".to_string()
        } else if secs < 3600 {
            format!("{} min ago", secs / 60)
        } else {
            format!("{}h ago", secs / 3600)
        }
    }
}
