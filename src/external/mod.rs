//! Clients for the two remote classifiers and their fan-out.

pub mod client;
pub mod models;

pub use client::{ExternalModelClient, ExternalPredictor};
pub use models::{ExternalPrediction, ExternalResponse};

use crate::config::ExternalConfig;
use crate::error::Result;
use crate::ml::consensus::{weighted_consensus, WeightedConsensus};
use crate::ml::features::FeatureVector;
use std::sync::Arc;

/// The pair of external models consulted by the weighted consensus
#[derive(Clone)]
pub struct ExternalModels {
    pub primary: Arc<dyn ExternalPredictor>,
    pub secondary: Arc<dyn ExternalPredictor>,
}

impl ExternalModels {
    pub fn new(primary: Arc<dyn ExternalPredictor>, secondary: Arc<dyn ExternalPredictor>) -> Self {
        Self { primary, secondary }
    }

    pub fn from_config(config: &ExternalConfig) -> Result<Self> {
        let primary = ExternalModelClient::new("primary", &config.primary_url, config.timeout())?;
        let secondary =
            ExternalModelClient::new("secondary", &config.secondary_url, config.timeout())?;
        Ok(Self::new(Arc::new(primary), Arc::new(secondary)))
    }

    /// Ask both models concurrently; the first failure aborts the whole call
    pub async fn predict_both(
        &self,
        features: &FeatureVector,
    ) -> Result<(ExternalPrediction, ExternalPrediction)> {
        tokio::try_join!(self.primary.predict(features), self.secondary.predict(features))
    }

    pub async fn weighted_consensus(&self, features: &FeatureVector) -> Result<WeightedConsensus> {
        let (a, b) = self.predict_both(features).await?;
        weighted_consensus(&a, &b)
    }
}
