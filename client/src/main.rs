//! `vpnsentinel-client` — the agent that samples its own geolocation
//! and DNS-trace location on an interval and reports them to a
//! VPNSentinel server (§2, §4.5).

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vpnsentinel_client::config::ClientConfig;
use vpnsentinel_client::{health, sampler};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vpnsentinel_client=info".into()),
        )
        .init();

    let config = match ClientConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(target: "client", error = %e, "fatal configuration error");
            std::process::exit(1);
        }
    };

    tracing::info!(
        target: "client",
        client_id = %config.client_id,
        server = %config.server_url,
        interval_secs = config.check_interval.as_secs(),
        "starting"
    );

    let mut http_builder = reqwest::Client::builder().timeout(Duration::from_secs(30));
    if let Some(ref bundle) = config.tls_ca_bundle {
        let cert = reqwest::Certificate::from_pem(bundle)
            .unwrap_or_else(|e| {
                tracing::error!(target: "client", error = %e, "VPNSENTINEL_TLS_CA_PATH does not contain a valid PEM certificate");
                std::process::exit(1);
            });
        http_builder = http_builder.add_root_certificate(cert);
    }
    if config.insecure_tls {
        http_builder = http_builder.danger_accept_invalid_certs(true);
    }
    let http = http_builder
        .build()
        .expect("reqwest client builds with the configured TLS options");

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let config = Arc::new(config);

    let health_handle = config.health_bind.map(|bind| {
        tokio::spawn(health::run(bind, shutdown_rx.clone()))
    });

    let sampler_handle = tokio::spawn(sampler::run(http, config.clone(), shutdown_rx));

    wait_for_signal().await;
    tracing::info!(target: "client", "shutdown signal received");
    let _ = shutdown_tx.send(true);

    let _ = sampler_handle.await;
    if let Some(handle) = health_handle {
        let _ = handle.await;
    }
}

async fn wait_for_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
