use crate::error::{AppError, ExternalFailure, Result};
use crate::external::models::{ExternalPrediction, ExternalResponse};
use crate::metrics::{EXTERNAL_REQUESTS_TOTAL, EXTERNAL_REQUEST_DURATION_SECONDS};
use crate::ml::features::FeatureVector;
use crate::ml::models::N_CLASSES;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A remote classifier reporting a label and its own accuracy
#[async_trait]
pub trait ExternalPredictor: Send + Sync {
    /// URL the predictor calls, used in errors and logs
    fn endpoint(&self) -> &str;

    async fn predict(&self, features: &FeatureVector) -> Result<ExternalPrediction>;
}

/// HTTP client for one external model
pub struct ExternalModelClient {
    name: String,
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl ExternalModelClient {
    /// Create a client with a bounded request timeout
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("iris-consensus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into(),
            client,
            timeout,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        features: &FeatureVector,
    ) -> std::result::Result<ExternalPrediction, ExternalFailure> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&features.to_query_pairs())
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExternalFailure::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.transport_failure(e))?;
        let parsed: ExternalResponse = serde_json::from_str(&body)
            .map_err(|e| ExternalFailure::Schema(e.to_string()))?;

        let prediction = parsed.prediction_int;
        if !(0..N_CLASSES as i64).contains(&prediction.label) {
            return Err(ExternalFailure::Schema(format!(
                "label {} is not a known class",
                prediction.label
            )));
        }

        Ok(prediction)
    }

    fn transport_failure(&self, e: reqwest::Error) -> ExternalFailure {
        if e.is_timeout() {
            debug!(
                endpoint = %self.base_url,
                timeout_ms = self.timeout.as_millis() as u64,
                "External model timed out"
            );
            ExternalFailure::Timeout
        } else if e.is_connect() {
            ExternalFailure::Unreachable(format!("connection failed: {}", e))
        } else {
            ExternalFailure::Unreachable(e.to_string())
        }
    }
}

#[async_trait]
impl ExternalPredictor for ExternalModelClient {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn predict(&self, features: &FeatureVector) -> Result<ExternalPrediction> {
        let start = Instant::now();
        let result = self.fetch(features).await;

        EXTERNAL_REQUEST_DURATION_SECONDS
            .with_label_values(&[&self.name])
            .observe(start.elapsed().as_secs_f64());

        let outcome = match &result {
            Ok(_) => "success",
            Err(ExternalFailure::Timeout) => "timeout",
            Err(ExternalFailure::Unreachable(_)) => "unreachable",
            Err(ExternalFailure::Status(_)) => "status",
            Err(ExternalFailure::Schema(_)) => "schema",
        };
        EXTERNAL_REQUESTS_TOTAL
            .with_label_values(&[&self.name, outcome])
            .inc();

        match result {
            Ok(prediction) => {
                debug!(
                    model = %self.name,
                    label = prediction.label,
                    accuracy = prediction.accuracy,
                    "External prediction received"
                );
                Ok(prediction)
            }
            Err(failure) => {
                warn!(
                    model = %self.name,
                    endpoint = %self.base_url,
                    error = %failure,
                    "External prediction failed"
                );
                Err(AppError::external(self.base_url.clone(), failure))
            }
        }
    }
}
