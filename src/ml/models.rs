use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumIter, IntoStaticStr};

/// Number of measurements per sample
pub const N_FEATURES: usize = 4;

/// Number of Iris species
pub const N_CLASSES: usize = 3;

/// Iris species, indexed by the integer code the models emit
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
pub enum ClassLabel {
    Setosa = 0,
    Versicolor = 1,
    Virginica = 2,
}

impl ClassLabel {
    /// Map an integer code to its species; `None` outside {0, 1, 2}
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ClassLabel::Setosa),
            1 => Some(ClassLabel::Versicolor),
            2 => Some(ClassLabel::Virginica),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Kind of local model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModelType {
    SupportVectorMachine,
    DecisionTree,
}

/// Descriptive information about a trained model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,

    /// Model type
    pub model_type: ModelType,

    /// When the model finished training
    pub trained_at: DateTime<Utc>,

    /// Number of samples the model was fit on
    pub n_training_samples: usize,

    /// Number of held-out samples used for evaluation
    pub n_test_samples: usize,

    /// Number of input features
    pub n_features: usize,

    /// Fraction of held-out samples classified correctly
    pub holdout_accuracy: f64,

    /// Hyperparameters used for training
    pub hyperparameters: HashMap<String, String>,
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            name: name.into(),
            model_type,
            trained_at: Utc::now(),
            n_training_samples: 0,
            n_test_samples: 0,
            n_features: N_FEATURES,
            holdout_accuracy: 0.0,
            hyperparameters: HashMap::new(),
        }
    }

    pub fn with_hyperparameter(mut self, key: &str, value: impl ToString) -> Self {
        self.hyperparameters.insert(key.to_string(), value.to_string());
        self
    }
}
