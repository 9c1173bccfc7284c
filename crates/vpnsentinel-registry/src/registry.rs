//! `ClientRegistry` (§4.3) — owns the set of `ClientRecord`s and the
//! lock that guards them.
//!
//! A single `RwLock<HashMap<...>>` backs the registry, per §5's "one
//! logical lock per registry; held only around structural mutations and
//! snapshot copies." Distinct clients still proceed largely in
//! parallel in practice since the critical sections are short
//! (hash-map lookup + in-place mutation, no I/O).

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use vpnsentinel_core::payload::KeepalivePayload;
use vpnsentinel_core::ValidationError;

use crate::record::ClientRecord;
use crate::state::ClientState;
use crate::transition::{detect, Transition};

/// The result of one `sweep()` call (§4.7).
#[derive(Debug, Default)]
pub struct SweepResult {
    /// Clients newly marked `OFFLINE` this tick.
    pub offline_transitions: Vec<Transition>,
    /// Set exactly on the tick where "no client is online" first
    /// becomes true for longer than the configured threshold; cleared
    /// (not repeated) until a client comes back online.
    pub no_clients_alive: bool,
}

struct NoClientsAliveTracker {
    since: Option<Instant>,
    notified: bool,
}

/// Owns every `ClientRecord`, keyed by `client_id`.
pub struct ClientRegistry {
    clients: RwLock<HashMap<String, ClientRecord>>,
    no_clients_alive: RwLock<NoClientsAliveTracker>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            no_clients_alive: RwLock::new(NoClientsAliveTracker {
                since: None,
                notified: false,
            }),
        }
    }

    /// Validate, normalize, and apply one keepalive. Returns the
    /// notification-worthy transition, if any.
    pub fn apply(
        &self,
        payload: KeepalivePayload,
        server_ip: Option<&str>,
    ) -> Result<Option<Transition>, ValidationError> {
        let payload = payload.validate_and_normalize()?;
        let now_wall = Utc::now();
        let now_instant = Instant::now();

        let mut clients = self.clients.write().expect("registry lock poisoned");

        let entry = clients.entry(payload.client_id.clone());
        let (previous_state, previous_ip, record) = match entry {
            std::collections::hash_map::Entry::Occupied(mut occ) => {
                let previous_state = occ.get().state;
                let previous_ip = Some(occ.get().last_payload.public_ip.clone());
                let record = occ.get_mut();
                // §5: last_seen never moves backward, even on a reordered
                // retry whose payload.timestamp is stale; the server's
                // arrival time is authoritative (§9.1).
                record.last_seen = now_wall.max(record.last_seen);
                record.last_seen_instant = now_instant;
                record.client_version = payload.client_version.clone();
                record.last_payload = payload;
                (previous_state, previous_ip, record)
            }
            std::collections::hash_map::Entry::Vacant(vac) => {
                let record = vac.insert(ClientRecord::new(payload, now_wall, now_instant));
                (ClientState::New, None, record)
            }
        };

        let transition = detect(record, previous_state, previous_ip, server_ip);
        if let Some(ref t) = transition {
            debug!(client_id = %t.client_id, ?t.previous_state, ?t.new_state, "transition applied");
        }

        drop(clients);
        self.refresh_no_clients_alive_after_update();

        Ok(transition)
    }

    /// A consistent point-in-time copy of every record, including those
    /// still in `NEW` (§9.1, Open Question 1).
    pub fn snapshot(&self) -> Vec<ClientRecord> {
        let clients = self.clients.read().expect("registry lock poisoned");
        clients.values().cloned().collect()
    }

    /// Mark every record whose `last_seen` predates `now - offline_threshold`
    /// as `OFFLINE`, provided it isn't already. Also evaluates the
    /// `NoClientsAlive` condition (§4.7).
    pub fn sweep(&self, offline_threshold: Duration) -> SweepResult {
        let now_instant = Instant::now();
        let mut offline_transitions = Vec::new();

        {
            let mut clients = self.clients.write().expect("registry lock poisoned");
            for record in clients.values_mut() {
                if record.state == ClientState::Offline {
                    continue;
                }
                if now_instant.duration_since(record.last_seen_instant) > offline_threshold {
                    let previous_state = record.state;
                    record.state = ClientState::Offline;
                    record.offline_notified = true;
                    info!(client_id = %record.client_id, "client went offline");
                    offline_transitions.push(Transition {
                        client_id: record.client_id.clone(),
                        previous_state,
                        new_state: ClientState::Offline,
                        ip_changed: None,
                        is_initial_connect: false,
                        record: record.clone(),
                    });
                }
            }
        }

        let no_clients_alive = self.refresh_no_clients_alive_after_update();

        SweepResult {
            offline_transitions,
            no_clients_alive,
        }
    }

    /// Recompute the `NoClientsAlive` condition and flip `notified` at
    /// most once per transition into/out of it. Returns true only on
    /// the tick where the condition newly fires.
    fn refresh_no_clients_alive_after_update(&self) -> bool {
        const NO_CLIENTS_ALIVE_THRESHOLD: Duration = Duration::from_secs(300);

        let any_online = {
            let clients = self.clients.read().expect("registry lock poisoned");
            if clients.is_empty() {
                // No records at all: condition doesn't apply (§4.7 requires
                // "the registry holds any ClientRecord").
                None
            } else {
                Some(clients.values().any(|r| r.state.is_online()))
            }
        };

        let mut tracker = self.no_clients_alive.write().expect("lock poisoned");
        match any_online {
            None => {
                tracker.since = None;
                tracker.notified = false;
                false
            }
            Some(true) => {
                tracker.since = None;
                tracker.notified = false;
                false
            }
            Some(false) => {
                let now = Instant::now();
                let since = *tracker.since.get_or_insert(now);
                if !tracker.notified && now.duration_since(since) >= NO_CLIENTS_ALIVE_THRESHOLD {
                    tracker.notified = true;
                    true
                } else {
                    false
                }
            }
        }
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use vpnsentinel_core::payload::{DnsTest, Location};

    fn payload(client_id: &str, public_ip: &str, country: &str, dns_loc: &str) -> KeepalivePayload {
        KeepalivePayload {
            client_id: client_id.to_string(),
            timestamp: DateTime::parse_from_rfc3339("2026-07-27T10:00:00+00:00").unwrap(),
            public_ip: public_ip.to_string(),
            status: "alive".into(),
            client_version: Some("1.0".into()),
            location: Location {
                country: country.to_string(),
                city: "Bucharest".into(),
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
    fn rejects_invalid_client_id() {
        let registry = ClientRegistry::new();
        let bad = payload(&"x".repeat(65), "1.2.3.4", "RO", "RO");
        assert!(registry.apply(bad, None).is_err());
    }

    #[test]
    fn snapshot_includes_new_clients() {
        let registry = ClientRegistry::new();
        registry
            .apply(payload("agent-1", "1.2.3.4", "RO", "RO"), None)
            .unwrap();
        let snap = registry.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].state, ClientState::OnlineSecure);
    }

    #[test]
    fn last_seen_monotonic_across_keepalives() {
        let registry = ClientRegistry::new();
        registry
            .apply(payload("agent-1", "1.2.3.4", "RO", "RO"), None)
            .unwrap();
        let first = registry.snapshot()[0].last_seen;
        registry
            .apply(payload("agent-1", "1.2.3.4", "RO", "RO"), None)
            .unwrap();
        let second = registry.snapshot()[0].last_seen;
        assert!(second >= first);
    }

    #[test]
    fn idempotent_apply_produces_no_extra_transition() {
        let registry = ClientRegistry::new();
        let t1 = registry
            .apply(payload("agent-1", "1.2.3.4", "RO", "RO"), None)
            .unwrap();
        assert!(t1.is_some());
        let t2 = registry
            .apply(payload("agent-1", "1.2.3.4", "RO", "RO"), None)
            .unwrap();
        assert!(t2.is_none());
    }

    #[test]
    fn distinct_clients_independent() {
        let registry = ClientRegistry::new();
        registry
            .apply(payload("agent-1", "1.2.3.4", "RO", "RO"), None)
            .unwrap();
        registry
            .apply(payload("agent-2", "5.6.7.8", "ES", "DE"), None)
            .unwrap();
        let snap = registry.snapshot();
        assert_eq!(snap.len(), 2);
    }
}
