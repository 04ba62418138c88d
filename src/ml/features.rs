use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::ml::models::N_FEATURES;

/// Query parameter names, in model input order
pub const FEATURE_NAMES: [&str; N_FEATURES] =
    ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// Raw measurement query parameters, as received
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureQuery {
    pub sepal_length: Option<String>,
    pub sepal_width: Option<String>,
    pub petal_length: Option<String>,
    pub petal_width: Option<String>,
}

/// Four flower measurements in centimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl FeatureVector {
    pub fn new(sepal_length: f64, sepal_width: f64, petal_length: f64, petal_width: f64) -> Self {
        Self {
            sepal_length,
            sepal_width,
            petal_length,
            petal_width,
        }
    }

    /// Decode the four measurements, reporting the first missing or
    /// unparsable field in canonical order
    pub fn from_query(query: &FeatureQuery) -> Result<Self> {
        Ok(Self {
            sepal_length: parse_field(FEATURE_NAMES[0], query.sepal_length.as_deref())?,
            sepal_width: parse_field(FEATURE_NAMES[1], query.sepal_width.as_deref())?,
            petal_length: parse_field(FEATURE_NAMES[2], query.petal_length.as_deref())?,
            petal_width: parse_field(FEATURE_NAMES[3], query.petal_width.as_deref())?,
        })
    }

    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [a, b, c, d] => Ok(Self::new(*a, *b, *c, *d)),
            _ => Err(AppError::invalid_feature(
                "features",
                format!("expected {} measurements, got {}", N_FEATURES, values.len()),
            )),
        }
    }

    pub fn as_array(&self) -> [f64; N_FEATURES] {
        [
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ]
    }

    /// Single-row record matrix for model input
    pub fn to_records(&self) -> Array2<f64> {
        ndarray::arr2(&[self.as_array()])
    }

    /// Reject measurements no model can score
    pub fn validate(&self) -> Result<()> {
        for (name, value) in FEATURE_NAMES.iter().zip(self.as_array()) {
            if !value.is_finite() {
                return Err(AppError::invalid_feature(
                    *name,
                    format!("value {} is not a finite number", value),
                ));
            }
        }
        Ok(())
    }

    /// Named pairs for an outbound query string
    pub fn to_query_pairs(&self) -> [(&'static str, f64); N_FEATURES] {
        let values = self.as_array();
        [
            (FEATURE_NAMES[0], values[0]),
            (FEATURE_NAMES[1], values[1]),
            (FEATURE_NAMES[2], values[2]),
            (FEATURE_NAMES[3], values[3]),
        ]
    }
}

impl TryFrom<&FeatureQuery> for FeatureVector {
    type Error = AppError;

    fn try_from(query: &FeatureQuery) -> Result<Self> {
        Self::from_query(query)
    }
}

fn parse_field(name: &str, raw: Option<&str>) -> Result<f64> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::invalid_feature(name, "missing required query parameter"))?;

    raw.parse::<f64>().map_err(|_| {
        AppError::invalid_feature(name, format!("`{}` is not a number", raw))
    })
}
