//! Authenticated, rate-limited API surface (§4.6): keepalive ingestion
//! and status snapshot.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use vpnsentinel_core::payload::KeepalivePayload;
use vpnsentinel_registry::ClientRecord;

use crate::error::{ApiError, ValidatedJson};
use crate::state::AppState;

#[derive(Serialize)]
pub struct KeepaliveResponse {
    status: &'static str,
    server_time: DateTime<Utc>,
}

pub async fn keepalive(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<KeepalivePayload>,
) -> Result<Json<KeepaliveResponse>, ApiError> {
    let server_ip = state.self_view.ip().await;
    let transition = state
        .registry
        .apply(payload, server_ip.as_deref())
        .map_err(ApiError::Validation)?;

    if let Some(transition) = transition {
        state.notifier.notify_transition(&transition).await;
    }

    Ok(Json(KeepaliveResponse {
        status: "ok",
        server_time: Utc::now(),
    }))
}

#[derive(Serialize)]
pub struct ServerInfo {
    ip: Option<String>,
    country: String,
    city: String,
    dns_location: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    clients: Vec<ClientRecord>,
    server: ServerInfo,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let clients = state.registry.snapshot();
    let server = match state.self_view.snapshot().await {
        Some((observation, _provider)) => ServerInfo {
            ip: Some(observation.public_ip),
            country: observation.country,
            city: observation.city,
            dns_location: "unknown".to_string(),
        },
        None => ServerInfo {
            ip: None,
            country: "Unknown".to_string(),
            city: "Unknown".to_string(),
            dns_location: "unknown".to_string(),
        },
    };

    Json(StatusResponse { clients, server })
}
