//! Read-only HTML dashboard (§4.6) rendered from `snapshot()` via
//! Askama, with client-side auto-refresh (`meta http-equiv=refresh`).

use std::sync::Arc;

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::Utc;

use crate::state::AppState;

struct ClientRow {
    client_id: String,
    version: String,
    status_class: &'static str,
    status_label: &'static str,
    public_ip: String,
    city: String,
    country: String,
    provider: String,
    last_seen: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    server_ip: String,
    server_city: String,
    server_country: String,
    rows: Vec<ClientRow>,
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Response {
    let now = Utc::now();
    let records = state.registry.snapshot();
    let rows = records
        .into_iter()
        .map(|record| {
            let status_class = record.state.label();
            ClientRow {
                client_id: record.client_id.clone(),
                version: record.version_or_unknown().to_string(),
                status_class,
                status_label: status_class,
                public_ip: record.last_payload.public_ip.clone(),
                city: record.last_payload.location.city.clone(),
                country: record.last_payload.location.country.clone(),
                provider: record.last_payload.location.org.clone(),
                last_seen: record.humanized_last_seen(now),
            }
        })
        .collect();

    let (server_ip, server_city, server_country) = match state.self_view.snapshot().await {
        Some((observation, _provider)) => (observation.public_ip, observation.city, observation.country),
        None => ("Unknown".to_string(), "Unknown".to_string(), "Unknown".to_string()),
    };

    let template = DashboardTemplate {
        server_ip,
        server_city,
        server_country,
        rows,
    };

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::error!(target: "api", error = %err, "failed to render dashboard template");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
