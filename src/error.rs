use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

use crate::metrics::ERRORS_TOTAL;

/// Why a call to an external model failed
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalFailure {
    /// Connection refused, DNS failure or any other transport error
    Unreachable(String),

    /// No response within the configured timeout
    Timeout,

    /// The remote answered with a non-2xx status
    Status(u16),

    /// The body did not match the documented prediction schema
    Schema(String),
}

impl fmt::Display for ExternalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalFailure::Unreachable(reason) => write!(f, "unreachable ({})", reason),
            ExternalFailure::Timeout => write!(f, "timed out"),
            ExternalFailure::Status(code) => write!(f, "returned HTTP {}", code),
            ExternalFailure::Schema(reason) => write!(f, "invalid response ({})", reason),
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// A measurement is missing, unparsable or not finite
    #[error("Invalid feature `{field}`: {reason}")]
    InvalidFeature { field: String, reason: String },

    /// An external model call failed; aborts the whole consensus
    #[error("External model at {endpoint} {failure}")]
    ExternalService {
        endpoint: String,
        failure: ExternalFailure,
    },

    /// External accuracies cannot be normalised into weights
    #[error("Degenerate weights: accuracy sum {total} is not positive")]
    DegenerateWeight { total: f64 },

    /// Training or inference failure inside a local model
    #[error("Model error: {0}")]
    Model(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_feature(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::InvalidFeature {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn external(endpoint: impl Into<String>, failure: ExternalFailure) -> Self {
        AppError::ExternalService {
            endpoint: endpoint.into(),
            failure,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidFeature { .. } => StatusCode::BAD_REQUEST,
            AppError::ExternalService {
                failure: ExternalFailure::Timeout,
                ..
            } => StatusCode::GATEWAY_TIMEOUT,
            AppError::ExternalService { .. } => StatusCode::BAD_GATEWAY,
            AppError::DegenerateWeight { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::InvalidFeature { .. } => "INVALID_FEATURE",
            AppError::ExternalService {
                failure: ExternalFailure::Timeout,
                ..
            } => "EXTERNAL_SERVICE_TIMEOUT",
            AppError::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            AppError::DegenerateWeight { .. } => "DEGENERATE_WEIGHT",
            AppError::Model(_) => "MODEL_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(
                error_code = %error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_code = %error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request rejected"
            );
        }

        ERRORS_TOTAL
            .with_label_values(&["http", error_code.as_str()])
            .inc();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::invalid_feature("sepal_length", "missing").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::external("http://a", ExternalFailure::Timeout).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            AppError::external("http://a", ExternalFailure::Status(500)).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::external("http://a", ExternalFailure::Unreachable("refused".into()))
                .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::DegenerateWeight { total: 0.0 }.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Model("bad".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::invalid_feature("petal_width", "missing").error_code(),
            "INVALID_FEATURE"
        );
        assert_eq!(
            AppError::external("http://a", ExternalFailure::Schema("no label".into()))
                .error_code(),
            "EXTERNAL_SERVICE_ERROR"
        );
        assert_eq!(
            AppError::external("http://a", ExternalFailure::Timeout).error_code(),
            "EXTERNAL_SERVICE_TIMEOUT"
        );
        assert_eq!(
            AppError::DegenerateWeight { total: 0.0 }.error_code(),
            "DEGENERATE_WEIGHT"
        );
    }

    #[test]
    fn test_messages_name_the_field() {
        let err = AppError::invalid_feature("sepal_length", "missing");
        assert!(err.to_string().contains("sepal_length"));

        let err = AppError::external("http://remote/predict", ExternalFailure::Status(503));
        assert!(err.to_string().contains("http://remote/predict"));
        assert!(err.to_string().contains("503"));
    }
}
