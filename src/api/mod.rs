pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::external::ExternalModels;
use crate::ml::LocalModels;
use std::time::{Duration, Instant};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub models: LocalModels,
    pub external: ExternalModels,
    pub started_at: Instant,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(models: LocalModels, external: ExternalModels) -> Self {
        Self {
            models,
            external,
            started_at: Instant::now(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the per-request timeout applied to every route
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
