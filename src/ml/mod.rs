//! Local Iris classifiers and the combiners built on top of them.

pub mod classifier;
pub mod consensus;
pub mod dataset;
pub mod features;
pub mod models;
pub mod service;

pub use classifier::{Classifier, DecisionTreeClassifierWrapper, SupportVectorClassifier};
pub use consensus::{local_consensus, weighted_consensus, WeightedConsensus};
pub use features::{FeatureQuery, FeatureVector};
pub use models::{ClassLabel, ModelMetadata, ModelType};
pub use service::LocalModels;
