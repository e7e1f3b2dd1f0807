use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    config::{Config, CorsConfig, ServerConfig},
    handlers::{self, predict::AppState},
    metrics,
    pipeline::AppraisalPipeline,
    providers::openai::OpenAiClient,
    signals::setup_signal_handlers,
};

/// Start the appraisal server
///
/// This function:
/// 1. Initializes metrics
/// 2. Sets up signal handlers for graceful shutdown
/// 3. Builds the pipeline around an OpenAI client
/// 4. Binds to the configured address and serves until shutdown
pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing Prometheus metrics...");
    let metrics_handle = Arc::new(metrics::init_metrics()?);

    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let http_client = reqwest::Client::new();
    let api = Arc::new(OpenAiClient::new(http_client, &config.openai));
    let app_state = AppState {
        pipeline: AppraisalPipeline::new(api, &config.openai),
    };

    let app = create_router(&config, app_state, metrics_handle)?;

    let addr = resolve_bind_addr(&config.server).await?;

    info!("Starting appraiser on {}", addr);
    info!(
        identification_model = %config.openai.identification_model,
        search_model = %config.openai.search_model,
        origins = config.cors.allowed_origins.len(),
        "Configuration loaded"
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

/// Resolve `server.host` (an IP literal or a hostname such as `localhost`)
pub async fn resolve_bind_addr(server: &ServerConfig) -> Result<SocketAddr> {
    let host = server.host.trim();
    tokio::net::lookup_host((host, server.port))
        .await
        .with_context(|| format!("Cannot resolve server.host '{}'", host))?
        .next()
        .ok_or_else(|| anyhow::anyhow!("server.host '{}' resolved to no addresses", host))
}

/// CORS for the configured origins: any method or header, with credentials.
///
/// Wildcards cannot be combined with credentials, so methods and headers
/// are mirrored from the preflight request.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim())
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    config: &Config,
    app_state: AppState,
    metrics_handle: Arc<PrometheusHandle>,
) -> Result<Router> {
    let api_routes = Router::new()
        .route("/predict", post(handlers::predict::handle_predict))
        .with_state(app_state);

    Ok(Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics_handler::metrics))
        .with_state(metrics_handle)
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(cors_layer(&config.cors)?)
        .layer(TraceLayer::new_for_http()))
}
