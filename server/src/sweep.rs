//! Offline-sweep background worker (§4.7): wakes every `sweep_interval`
//! seconds, marks stale clients `OFFLINE`, and hands the notifier one
//! message per transition plus at most one `NoClientsAlive` per episode.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;
use vpnsentinel_notifier::{NoClientsAliveFields, Notification};

use crate::state::AppState;

pub async fn run(state: Arc<AppState>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(state.config.sweep_interval);
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    debug!(target: "sweep", "offline sweep loop shutting down");
                    return;
                }
            }
            _ = ticker.tick() => {
                let result = state.registry.sweep(state.config.offline_threshold);
                debug!(target: "sweep", offline_count = result.offline_transitions.len(), "sweep tick complete");

                for transition in &result.offline_transitions {
                    state.notifier.notify_transition(transition).await;
                }

                if result.no_clients_alive {
                    state
                        .notifier
                        .notify(Notification::NoClientsAlive(NoClientsAliveFields {
                            timestamp: chrono::Utc::now(),
                        }))
                        .await;
                }
            }
        }
    }
}
