//! Notification schema, rendering, and chat transport (§4.4, §6).
//!
//! Translates registry [`Transition`](vpnsentinel_registry::Transition)s
//! into rendered chat messages, sends them best-effort over a
//! [`ChatTransport`], and dispatches inbound commands back against the
//! registry.

pub mod commands;
pub mod config;
pub mod error;
pub mod from_transition;
pub mod kind;
pub mod notifier;
pub mod parse;
pub mod render;
pub mod transport;

pub use config::{resolve as resolve_enabled, EnabledSetting, NotifierConfigError};
pub use error::UpstreamError;
pub use from_transition::notification_for;
pub use kind::{
    BypassFields, ConnectionFields, Notification, NoClientsAliveFields, OfflineFields,
    ServerStartedFields,
};
pub use notifier::Notifier;
pub use transport::{ChatTransport, HttpChatTransport, InboundMessage};
