//! Transition detection (§4.2) — what changed on one accepted keepalive,
//! and whether it warrants a notification.

use crate::record::ClientRecord;
use crate::state::{classify, next_state, ClientState};

/// One detected change on a `ClientRecord`, carrying enough context for
/// the notifier to render a message. `None` is returned by
/// [`detect`] when nothing warrants a notification (the "same class,
/// same IP" row of the transition table).
#[derive(Debug, Clone)]
pub struct Transition {
    pub client_id: String,
    pub previous_state: ClientState,
    pub new_state: ClientState,
    /// Set when `public_ip` changed since the last keepalive and this is
    /// not the client's first-ever observation.
    pub ip_changed: Option<(String, String)>,
    /// A fresh connection out of `NEW`/`OFFLINE`, as opposed to a state
    /// change between two `Online*` variants.
    pub is_initial_connect: bool,
    /// The up-to-date record, for rendering.
    pub record: ClientRecord,
}

/// Apply the transition table to `record` (already updated with the
/// latest payload/last_seen) given its state *before* this observation.
/// Mutates `record.state`/`ever_seen_online`/`offline_notified`/
/// `previous_public_ip` and returns a `Transition` describing what
/// happened, or `None` if nothing changed that warrants a notification.
pub fn detect(
    record: &mut ClientRecord,
    previous_state: ClientState,
    previous_ip: Option<String>,
    server_ip: Option<&str>,
) -> Option<Transition> {
    let class = classify(&record.last_payload, server_ip);
    let new_state = next_state(previous_state, class);

    let current_ip = record.last_payload.public_ip.clone();
    let ip_changed = if record.ever_seen_online && previous_ip.as_deref() != Some(current_ip.as_str())
    {
        previous_ip.clone().map(|prev| (prev, current_ip.clone()))
    } else {
        None
    };

    record.state = new_state;
    record.previous_public_ip = previous_ip;
    record.ever_seen_online = true;
    // Any accepted keepalive clears the offline-notification gate,
    // regardless of whether a transition fired (§4.2 tie-breaks).
    record.offline_notified = false;

    let is_initial_connect = previous_state.is_new_or_offline();
    let class_changed = !is_initial_connect && new_state != previous_state;

    if !is_initial_connect && !class_changed && ip_changed.is_none() {
        return None;
    }

    Some(Transition {
        client_id: record.client_id.clone(),
        previous_state,
        new_state,
        ip_changed,
        is_initial_connect,
        record: record.clone(),
    })
}
