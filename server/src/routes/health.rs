//! Public, unauthenticated, unrate-limited health endpoints (§4.6) for
//! container orchestrators.

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn ready() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}

pub async fn startup() -> Json<Value> {
    Json(json!({ "status": "started" }))
}
