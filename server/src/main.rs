//! `vpnsentinel-server` — three HTTP listeners (API, Health, Dashboard)
//! sharing one client registry, plus an offline-sweep loop and the
//! notifier's inbound command poll loop (§2, §5.1).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vpnsentinel_geo::ServerSelfView;
use vpnsentinel_notifier::{HttpChatTransport, Notifier};
use vpnsentinel_registry::ClientRegistry;
use vpnsentinel_server::config::Config;
use vpnsentinel_server::ratelimit::RateLimitState;
use vpnsentinel_server::state::AppState;
use vpnsentinel_server::{build_api_router, build_dashboard_router, build_health_router, sweep};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vpnsentinel_server=info,tower_http=info".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(target: "security", error = %e, "fatal configuration error");
            std::process::exit(1);
        }
    };

    let http_client = reqwest::Client::builder()
        .build()
        .expect("reqwest client builds with static TLS config");
    let self_view = Arc::new(ServerSelfView::new(
        http_client,
        vpnsentinel_geo::ProviderMode::Auto,
        Duration::from_secs(300),
    ));
    self_view.initialize().await;

    let registry = Arc::new(ClientRegistry::new());

    let notifier = if config.notifier.enabled {
        let token = config
            .notifier
            .token
            .clone()
            .expect("resolve_enabled guarantees credentials when enabled");
        let chat_id = config
            .notifier
            .chat_id
            .clone()
            .expect("resolve_enabled guarantees credentials when enabled");
        let transport = Arc::new(HttpChatTransport::new(&token, &chat_id));
        Arc::new(Notifier::enabled(transport, registry.clone()))
    } else {
        Arc::new(Notifier::disabled())
    };

    let app_state = Arc::new(AppState {
        registry,
        self_view,
        notifier,
        config: Arc::new(config.clone()),
        rate_limit: Arc::new(RateLimitState::new(config.rate_limit_per_minute)),
        started_at: chrono::Utc::now(),
    });

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let sweep_handle = tokio::spawn(sweep::run(app_state.clone(), shutdown_rx.clone()));
    let notifier_for_poll = app_state.notifier.clone();
    let inbound_handle = tokio::spawn(async move {
        notifier_for_poll.run_inbound_loop(shutdown_rx).await;
    });

    let api_app = build_api_router(app_state.clone());
    let health_app = build_health_router();
    let dashboard_app = build_dashboard_router(app_state.clone());

    let api_listener = tokio::net::TcpListener::bind(config.api_bind).await.unwrap_or_else(|e| {
        tracing::error!(target: "security", bind = %config.api_bind, error = %e, "failed to bind API listener");
        std::process::exit(1);
    });
    let health_listener = tokio::net::TcpListener::bind(config.health_bind).await.unwrap_or_else(|e| {
        tracing::error!(target: "security", bind = %config.health_bind, error = %e, "failed to bind health listener");
        std::process::exit(1);
    });
    let dashboard_listener = tokio::net::TcpListener::bind(config.dashboard_bind).await.unwrap_or_else(|e| {
        tracing::error!(target: "security", bind = %config.dashboard_bind, error = %e, "failed to bind dashboard listener");
        std::process::exit(1);
    });

    tracing::info!(addr = %config.api_bind, "API listener up");
    tracing::info!(addr = %config.health_bind, "health listener up");
    tracing::info!(addr = %config.dashboard_bind, "dashboard listener up");

    app_state
        .notifier
        .notify(vpnsentinel_notifier::Notification::ServerStarted(
            vpnsentinel_notifier::ServerStartedFields {
                version: env!("CARGO_PKG_VERSION").to_string(),
                commit: std::env::var("VPNSENTINEL_COMMIT").ok(),
                offline_threshold_secs: config.offline_threshold.as_secs(),
                sweep_interval_secs: config.sweep_interval.as_secs(),
            },
        ))
        .await;

    let api_shutdown = shutdown_signal(shutdown_tx.clone());
    let health_shutdown = wait_for_shutdown(shutdown_tx.subscribe());
    let dashboard_shutdown = wait_for_shutdown(shutdown_tx.subscribe());

    let api_server = axum::serve(
        api_listener,
        api_app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(api_shutdown);
    let health_server = axum::serve(
        health_listener,
        health_app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(health_shutdown);
    let dashboard_server = axum::serve(
        dashboard_listener,
        dashboard_app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(dashboard_shutdown);

    let (api_result, health_result, dashboard_result) =
        tokio::join!(api_server, health_server, dashboard_server);
    api_result?;
    health_result?;
    dashboard_result?;

    let _ = sweep_handle.await;
    let _ = inbound_handle.await;

    Ok(())
}

async fn shutdown_signal(shutdown_tx: tokio::sync::watch::Sender<bool>) {
    wait_for_signal().await;
    tracing::info!("shutdown signal received, draining listeners");
    let _ = shutdown_tx.send(true);
}

async fn wait_for_shutdown(mut rx: tokio::sync::watch::Receiver<bool>) {
    let _ = rx.changed().await;
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
