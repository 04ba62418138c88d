//! Shared test doubles and helpers for the HTTP and client tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use iris_consensus::{
    api::{build_router, AppState},
    error::{AppError, ExternalFailure, Result},
    external::{ExternalModels, ExternalPrediction, ExternalPredictor},
    ml::{Classifier, LocalModels, ModelMetadata, ModelType},
};
use ndarray::Array2;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Classifier that always answers the same class code
pub struct FixedClassifier {
    label: usize,
    metadata: ModelMetadata,
}

impl FixedClassifier {
    pub fn new(label: usize, model_type: ModelType) -> Self {
        let mut metadata = ModelMetadata::new(format!("fixed-{}", label), model_type);
        metadata.holdout_accuracy = 1.0;
        Self { label, metadata }
    }
}

impl Classifier for FixedClassifier {
    fn predict_records(&self, records: &Array2<f64>) -> Result<Vec<usize>> {
        Ok(vec![self.label; records.nrows()])
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// External model double answering a canned result
pub struct StubPredictor {
    endpoint: String,
    outcome: std::result::Result<ExternalPrediction, ExternalFailure>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubPredictor {
    pub fn answering(label: i64, accuracy: f64) -> Self {
        Self::with_outcome(Ok(ExternalPrediction::new(label, accuracy)))
    }

    pub fn failing(failure: ExternalFailure) -> Self {
        Self::with_outcome(Err(failure))
    }

    fn with_outcome(outcome: std::result::Result<ExternalPrediction, ExternalFailure>) -> Self {
        Self {
            endpoint: "http://stub/predict".to_string(),
            outcome,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExternalPredictor for StubPredictor {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn predict(&self, _features: &iris_consensus::ml::FeatureVector) -> Result<ExternalPrediction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome
            .clone()
            .map_err(|failure| AppError::external(self.endpoint.clone(), failure))
    }
}

pub fn local_models(svm: usize, tree: usize) -> LocalModels {
    LocalModels::new(
        Arc::new(FixedClassifier::new(svm, ModelType::SupportVectorMachine)),
        Arc::new(FixedClassifier::new(tree, ModelType::DecisionTree)),
    )
}

pub fn external_models(primary: Arc<StubPredictor>, secondary: Arc<StubPredictor>) -> ExternalModels {
    ExternalModels::new(primary, secondary)
}

/// Router over fixed local labels and the given external doubles
pub fn app(svm: usize, tree: usize, primary: Arc<StubPredictor>, secondary: Arc<StubPredictor>) -> Router {
    build_router(AppState::new(
        local_models(svm, tree),
        external_models(primary, secondary),
    ))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub const SETOSA_QUERY: &str =
    "sepal_length=5.1&sepal_width=3.5&petal_length=1.4&petal_width=0.2";

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Parse Prometheus exposition text into metric name -> lines
pub fn parse_prometheus_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut metrics = HashMap::new();
    let mut current_metric = String::new();

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("# HELP") || line.starts_with("# TYPE") {
            if let Some(name) = line.split_whitespace().nth(2) {
                current_metric = name.to_string();
            }
        } else if !line.starts_with('#') && !current_metric.is_empty() {
            metrics
                .entry(current_metric.clone())
                .or_insert_with(Vec::new)
                .push(line.to_string());
        }
    }

    metrics
}
