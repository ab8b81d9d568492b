//! HTTP surface of the service.
//!
//! The loaded classifier is carried in [`AppState`] and handed to each
//! handler by axum; there is no global model handle.

mod error;
mod handlers;

use std::sync::Arc;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::classifier::Classifier;

pub use error::{ApiError, INVALID_FILE_TYPE, MODEL_NOT_LOADED};
pub use handlers::{HealthResponse, LabelsResponse, PredictResponse};

/// Shared application context.
#[derive(Clone, Default)]
pub struct AppState {
    classifier: Option<Arc<Classifier>>,
}

impl AppState {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier: Some(Arc::new(classifier)) }
    }

    /// State for a server running without a model; health and predict report 503.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn classifier(&self) -> Option<&Arc<Classifier>> {
        self.classifier.as_ref()
    }
}

/// Builds the service router.
pub fn router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .route("/labels", get(handlers::labels))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(state)
}
