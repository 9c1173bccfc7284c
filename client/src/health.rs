//! Optional local health listener for container orchestrators (§6.1).
//! Only bound when `VPNSENTINEL_HEALTH_BIND` is set.

use axum::routing::get;
use axum::Router;
use serde_json::json;

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(json!({"status": "ok"}))
}

pub async fn run(bind: std::net::SocketAddr, mut shutdown: tokio::sync::watch::Receiver<bool>) {
    let app = Router::new().route("/health", get(health));
    let listener = match tokio::net::TcpListener::bind(bind).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(target: "client", addr = %bind, error = %e, "failed to bind local health listener, continuing without it");
            return;
        }
    };
    tracing::info!(target: "client", addr = %bind, "local health listener up");

    let shutdown_fut = async move {
        let _ = shutdown.changed().await;
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_fut)
        .await
    {
        tracing::error!(target: "client", error = %e, "health listener exited with an error");
    }
}
