//! Top-level orchestrator: renders and best-effort sends notifications,
//! and drives the inbound command poll loop (§4.4, §5.1).

use std::sync::Arc;

use tracing::{info, warn};
use vpnsentinel_registry::{ClientRegistry, Transition};

use crate::from_transition::notification_for;
use crate::kind::Notification;
use crate::render::render;
use crate::transport::ChatTransport;

/// A disabled or enabled notifier, chosen once at startup per the
/// tri-state resolution in [`crate::config`]. `Disabled` makes every
/// operation a no-op so call sites never branch on "is notifier on".
pub enum Notifier {
    Enabled {
        transport: Arc<dyn ChatTransport>,
        registry: Arc<ClientRegistry>,
    },
    Disabled,
}

impl Notifier {
    pub fn enabled(transport: Arc<dyn ChatTransport>, registry: Arc<ClientRegistry>) -> Self {
        Notifier::Enabled { transport, registry }
    }

    pub fn disabled() -> Self {
        Notifier::Disabled
    }

    /// Convert and best-effort send one transition. Never returns an
    /// error: a send failure is logged at `warn` and dropped (§5 Bounded
    /// growth — "drop to logging at warn level rather than buffer
    /// indefinitely").
    pub async fn notify_transition(&self, transition: &Transition) {
        let Some(notification) = notification_for(transition) else {
            return;
        };
        self.send(&notification).await;
    }

    pub async fn notify(&self, notification: Notification) {
        self.send(&notification).await;
    }

    async fn send(&self, notification: &Notification) {
        let Notifier::Enabled { transport, .. } = self else {
            return;
        };
        let html = render(notification);
        match transport.send(&html).await {
            Ok(()) => {
                info!(kind = notification.kind_tag(), "notification sent");
            }
            Err(err) => {
                warn!(kind = notification.kind_tag(), error = %err, "notification send failed");
            }
        }
    }

    /// Run the inbound poll loop until `shutdown` resolves. A no-op
    /// future that returns immediately when disabled.
    pub async fn run_inbound_loop(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let Notifier::Enabled { transport, registry } = self else {
            return;
        };
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("notifier inbound loop shutting down");
                        return;
                    }
                }
                result = transport.poll_inbound() => {
                    match result {
                        Ok(messages) => {
                            for message in messages {
                                let reply = crate::commands::dispatch(&message.text, registry);
                                if let Err(err) = transport.send(&reply).await {
                                    warn!(error = %err, "failed to send command reply");
                                }
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, "inbound poll failed");
                        }
                    }
                }
            }
        }
    }
}
