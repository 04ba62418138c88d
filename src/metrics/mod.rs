//! Prometheus metrics for the prediction service.
//!
//! All metrics live in one process-wide registry and carry the
//! `iris_consensus` namespace. Collectors are always updated; whether they
//! are registered (and therefore exported at `/metrics`) is decided once at
//! startup by [`init_metrics`].
//!
//! # Example
//! ```no_run
//! use iris_consensus::metrics::PREDICTIONS_TOTAL;
//!
//! PREDICTIONS_TOTAL
//!     .with_label_values(&["svm", "Setosa"])
//!     .inc();
//! ```

pub mod middleware;

pub use middleware::track_metrics;

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry,
};

const NAMESPACE: &str = "iris_consensus";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    /// Number of HTTP requests currently being served
    pub static ref HTTP_REQUESTS_IN_FLIGHT: Gauge = Gauge::with_opts(
        Opts::new("http_requests_in_flight", "Number of HTTP requests currently being served")
            .namespace(NAMESPACE)
    ).expect("Failed to create HTTP_REQUESTS_IN_FLIGHT metric");

    // ============================================================================
    // Model Metrics
    // ============================================================================

    /// Labels produced, per model or combiner
    ///
    /// Labels: model, label
    pub static ref PREDICTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("predictions_total", "Total number of predictions served")
            .namespace(NAMESPACE),
        &["model", "label"]
    ).expect("Failed to create PREDICTIONS_TOTAL metric");

    /// Accuracy on the held-out split, set once after training
    ///
    /// Labels: model
    pub static ref MODEL_HOLDOUT_ACCURACY: GaugeVec = GaugeVec::new(
        Opts::new("model_holdout_accuracy", "Accuracy of each local model on held-out samples")
            .namespace(NAMESPACE),
        &["model"]
    ).expect("Failed to create MODEL_HOLDOUT_ACCURACY metric");

    // ============================================================================
    // External Model Metrics
    // ============================================================================

    /// Outbound calls to external models
    ///
    /// Labels: endpoint, outcome (success, timeout, unreachable, status, schema)
    pub static ref EXTERNAL_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("external_requests_total", "Total number of external model requests")
            .namespace(NAMESPACE),
        &["endpoint", "outcome"]
    ).expect("Failed to create EXTERNAL_REQUESTS_TOTAL metric");

    /// Outbound call duration in seconds
    ///
    /// Labels: endpoint
    pub static ref EXTERNAL_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "external_request_duration_seconds",
            "External model request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["endpoint"]
    ).expect("Failed to create EXTERNAL_REQUEST_DURATION_SECONDS metric");

    // ============================================================================
    // Error Metrics
    // ============================================================================

    /// Total number of errors
    ///
    /// Labels: component, error_type
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("errors_total", "Total number of errors")
            .namespace(NAMESPACE),
        &["component", "error_type"]
    ).expect("Failed to create ERRORS_TOTAL metric");

    // ============================================================================
    // System Metrics
    // ============================================================================

    /// Application build info
    ///
    /// Labels: version
    pub static ref BUILD_INFO: GaugeVec = GaugeVec::new(
        Opts::new("build_info", "Application build information")
            .namespace(NAMESPACE),
        &["version"]
    ).expect("Failed to create BUILD_INFO metric");

    /// Application uptime in seconds
    pub static ref UPTIME_SECONDS: Gauge = Gauge::with_opts(
        Opts::new("uptime_seconds", "Application uptime in seconds")
            .namespace(NAMESPACE)
    ).expect("Failed to create UPTIME_SECONDS metric");
}

/// Register all metrics with the Prometheus registry.
///
/// Safe to call more than once; collectors that are already registered are
/// left alone.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;
    register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))?;

    register(Box::new(PREDICTIONS_TOTAL.clone()))?;
    register(Box::new(MODEL_HOLDOUT_ACCURACY.clone()))?;

    register(Box::new(EXTERNAL_REQUESTS_TOTAL.clone()))?;
    register(Box::new(EXTERNAL_REQUEST_DURATION_SECONDS.clone()))?;

    register(Box::new(ERRORS_TOTAL.clone()))?;

    register(Box::new(BUILD_INFO.clone()))?;
    register(Box::new(UPTIME_SECONDS.clone()))?;

    BUILD_INFO
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .set(1.0);

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

fn register(collector: Box<dyn prometheus::core::Collector>) -> Result<(), prometheus::Error> {
    match PROMETHEUS_REGISTRY.register(collector) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Generate Prometheus text format metrics
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
