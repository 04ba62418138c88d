use anyhow::Context;
use iris_consensus::{
    api::{build_router, AppState},
    config::Config,
    external::ExternalModels,
    ml::LocalModels,
};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    init_tracing(&config);

    tracing::info!(
        service = %config.observability.service_name,
        "Starting Iris consensus service v{}",
        env!("CARGO_PKG_VERSION")
    );

    config.validate().context("Invalid configuration")?;

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = iris_consensus::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        }
    } else {
        tracing::info!("Prometheus metrics disabled in configuration");
    }

    // Train local models; serving without them is not an option
    let model_config = config.models.clone();
    let models = tokio::task::spawn_blocking(move || LocalModels::train(&model_config))
        .await
        .context("Model training task panicked")?
        .context("Failed to train local models")?;

    let external = ExternalModels::from_config(&config.external)
        .context("Failed to create external model clients")?;
    tracing::info!(
        primary = %config.external.primary_url,
        secondary = %config.external.secondary_url,
        timeout_secs = config.external.timeout_secs,
        "External models configured"
    );

    let state = AppState::new(models, external)
        .with_request_timeout(Duration::from_secs(config.server.request_timeout_secs));
    let app = build_router(state);

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("Failed to bind {}", http_addr))?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Metrics: http://{}/metrics", http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Shut down gracefully");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "iris_consensus={},tower_http=info",
            config.observability.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
