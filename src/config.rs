use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AppError, Result};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Local model training configuration
    #[serde(default)]
    pub models: ModelConfig,

    /// External model endpoints
    pub external: ExternalConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());
        Self::load_from(&config_path)
    }

    /// Load configuration, layering `path` (if it exists) and the environment
    /// over the embedded defaults
    pub fn load_from(path: &str) -> std::result::Result<Self, config::ConfigError> {
        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::new(path, config::FileFormat::Toml).required(false))
            // Override with environment variables (prefix: IRIS)
            .add_source(
                config::Environment::with_prefix("IRIS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.external.timeout_secs == 0 {
            return Err(AppError::Configuration(
                "external.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.external.primary_url.trim().is_empty()
            || self.external.secondary_url.trim().is_empty()
        {
            return Err(AppError::Configuration(
                "external.primary_url and external.secondary_url must be set".to_string(),
            ));
        }
        if !(self.models.test_ratio > 0.0 && self.models.test_ratio < 1.0) {
            return Err(AppError::Configuration(format!(
                "models.test_ratio must lie in (0, 1), got {}",
                self.models.test_ratio
            )));
        }
        if let Some(eps) = self.models.svm_kernel_eps {
            if !(eps.is_finite() && eps > 0.0) {
                return Err(AppError::Configuration(format!(
                    "models.svm_kernel_eps must be a positive number, got {}",
                    eps
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Seed for the train/test permutation
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    /// Fraction of the reference dataset held out for evaluation
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,

    /// Gaussian kernel width; derived from the training data when unset
    #[serde(default)]
    pub svm_kernel_eps: Option<f64>,

    /// Maximum decision tree depth; unbounded when unset
    #[serde(default)]
    pub tree_max_depth: Option<u16>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            random_seed: default_random_seed(),
            test_ratio: default_test_ratio(),
            svm_kernel_eps: None,
            tree_max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    /// Base URL of the first external model
    pub primary_url: String,

    /// Base URL of the second external model
    pub secondary_url: String,

    /// Outbound request timeout (seconds)
    #[serde(default = "default_external_timeout")]
    pub timeout_secs: u64,
}

impl ExternalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_random_seed() -> u64 {
    42
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_external_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "iris-consensus".to_string()
}

fn default_true() -> bool {
    true
}
