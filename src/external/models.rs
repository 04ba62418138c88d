use serde::{Deserialize, Serialize};

/// One external model's answer: its predicted class code and the accuracy
/// it reports for itself
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExternalPrediction {
    pub label: i64,
    pub accuracy: f64,
}

impl ExternalPrediction {
    pub fn new(label: i64, accuracy: f64) -> Self {
        Self { label, accuracy }
    }
}

/// Wire body of an external model response. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalResponse {
    pub prediction_int: ExternalPrediction,
}
