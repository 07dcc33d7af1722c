mod cache;
mod config;
mod handlers;
mod models;
mod power;
mod rack;
mod registry;
mod report;
mod router;
mod store;

use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache::LayoutCache;
use config::Config;
use registry::TypeRegistry;
use store::Store;

/// Application state shared across handlers
pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub registry: TypeRegistry,
    pub layouts: LayoutCache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rack_report=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let cfg = Config::load();
    tracing::info!("Starting RackReport Server");
    tracing::info!("Listen: {}", cfg.listen_addr);
    tracing::info!(
        "Utilization thresholds: critical>={} warning>={} moderate>={}",
        cfg.utilization.critical,
        cfg.utilization.warning,
        cfg.utilization.moderate
    );

    // Create app state
    let state = Arc::new(AppState {
        store: Store::new(),
        registry: TypeRegistry::default(),
        layouts: LayoutCache::new(cfg.cache_capacity),
        config: cfg.clone(),
    });

    // Build router
    let app = router::build(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("RackReport listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("RackReport shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
