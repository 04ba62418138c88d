//! Iris species prediction service.
//!
//! Two locally trained classifiers (support vector machine and decision
//! tree) are served over HTTP alongside a consensus of the two, plus an
//! accuracy-weighted consensus of two remote classifiers.

pub mod api;
pub mod config;
pub mod error;
pub mod external;
pub mod metrics;
pub mod ml;

pub use error::{AppError, ExternalFailure, Result};
