use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::{gather_metrics, PREDICTIONS_TOTAL, UPTIME_SECONDS};
use crate::ml::consensus::local_consensus;
use crate::ml::features::{FeatureQuery, FeatureVector};
use crate::ml::models::{ClassLabel, ModelMetadata};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

type FeatureParams = std::result::Result<Query<FeatureQuery>, QueryRejection>;

/// Predict with the support vector machine
pub async fn predict_svm(
    State(state): State<AppState>,
    params: FeatureParams,
) -> Result<Json<PredictionResponse>> {
    let features = decode_features(params)?;
    let label = state.models.svm.predict(&features)?;
    record_prediction("svm", label);

    Ok(Json(PredictionResponse { prediction: label }))
}

/// Predict with the decision tree
pub async fn predict_decision_tree(
    State(state): State<AppState>,
    params: FeatureParams,
) -> Result<Json<PredictionResponse>> {
    let features = decode_features(params)?;
    let label = state.models.decision_tree.predict(&features)?;
    record_prediction("decision_tree", label);

    Ok(Json(PredictionResponse { prediction: label }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: ClassLabel,
}

/// Truncated mean of the two local models
pub async fn predict_consensus(
    State(state): State<AppState>,
    params: FeatureParams,
) -> Result<Json<ConsensusResponse>> {
    let features = decode_features(params)?;
    let tree = state.models.decision_tree.predict(&features)?;
    let svm = state.models.svm.predict(&features)?;
    let label = local_consensus(tree, svm)?;

    debug!(decision_tree = %tree, svm = %svm, consensus = %label, "Local consensus");
    record_prediction("local_consensus", label);

    Ok(Json(ConsensusResponse {
        consensus_prediction: label,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConsensusResponse {
    pub consensus_prediction: ClassLabel,
}

/// Accuracy-weighted consensus of the two external models
pub async fn predict_external_consensus(
    State(state): State<AppState>,
    params: FeatureParams,
) -> Result<Json<ExternalConsensusResponse>> {
    let features = decode_features(params)?;
    features.validate()?;

    let consensus = state.external.weighted_consensus(&features).await?;
    record_prediction("external_consensus", consensus.label);

    Ok(Json(ExternalConsensusResponse {
        consensus_prediction_with_ext: consensus.label,
        consensus_predict_with_ext_int: consensus.label.index(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExternalConsensusResponse {
    pub consensus_prediction_with_ext: ClassLabel,
    pub consensus_predict_with_ext_int: usize,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Describe the loaded local models
pub async fn list_models(State(state): State<AppState>) -> Result<Json<ModelsResponse>> {
    Ok(Json(ModelsResponse {
        models: state.models.metadata(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelMetadata>,
}

/// Prometheus scrape endpoint
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    UPTIME_SECONDS.set(state.started_at.elapsed().as_secs_f64());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

fn decode_features(params: FeatureParams) -> Result<FeatureVector> {
    let Query(query) =
        params.map_err(|rejection| AppError::invalid_feature("query", rejection.body_text()))?;
    FeatureVector::from_query(&query)
}

fn record_prediction(model: &str, label: ClassLabel) {
    PREDICTIONS_TOTAL
        .with_label_values(&[model, label.name()])
        .inc();
}
