use anyhow::Result;
use arc_swap::ArcSwap;
use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, quotes::AppState},
    metrics,
    pricing::{Catalog, CarrierClient},
    signals::setup_signal_handlers,
};

/// Start the pricing server
///
/// This function:
/// 1. Initializes metrics
/// 2. Loads the pricing catalog
/// 3. Sets up signal handlers for graceful shutdown and catalog reload
/// 4. Serves requests with graceful shutdown support
pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing Prometheus metrics...");
    let metrics_handle = Arc::new(metrics::init_metrics()?);

    let catalog_path = PathBuf::from(&config.catalog.path);
    let catalog = Arc::new(ArcSwap::from_pointee(Catalog::load(&catalog_path)?));

    let (shutdown_tx, signal_handle) = setup_signal_handlers(catalog.clone(), catalog_path)?;
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app_state = AppState {
        catalog: catalog.clone(),
        predictor: Arc::new(CarrierClient::new(config.carrier.clone())?),
        lookup_timeout: Duration::from_secs(config.carrier.timeout_seconds),
    };

    let app = create_router(app_state, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting transport pricing service on {}", addr);
    info!(
        "Configuration: carrier {}, {} tenants",
        config.carrier.base_url,
        catalog.load().tenant_ids().len()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    app_state: AppState,
    metrics_handle: Arc<metrics_exporter_prometheus::PrometheusHandle>,
) -> Router {
    let pricing_routes = Router::new()
        .route("/v1/quotes", post(handlers::quotes::handle_create_quote))
        .route("/ready", get(handlers::health::readiness_check))
        .with_state(app_state);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics_handler::metrics))
        .with_state(metrics_handle)
        .merge(pricing_routes)
        // Quote requests are small; cap bodies at 1MB
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
}
