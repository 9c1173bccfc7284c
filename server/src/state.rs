//! Shared application state injected into every Axum handler (§5, §9:
//! "explicit state owned by a single struct instantiated at startup").

use std::sync::Arc;

use chrono::{DateTime, Utc};
use vpnsentinel_geo::ServerSelfView;
use vpnsentinel_notifier::Notifier;
use vpnsentinel_registry::ClientRegistry;

use crate::config::Config;
use crate::ratelimit::RateLimitState;

pub struct AppState {
    pub registry: Arc<ClientRegistry>,
    pub self_view: Arc<ServerSelfView>,
    pub notifier: Arc<Notifier>,
    pub config: Arc<Config>,
    pub rate_limit: Arc<RateLimitState>,
    pub started_at: DateTime<Utc>,
}
