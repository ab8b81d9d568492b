//! Traffic sign classification over HTTP.
//!
//! An ONNX model trained on GTSRB is loaded once at startup and served through
//! a small axum API: upload an image to `/predict` and get back the best class
//! plus its top-3 alternatives.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use signsight::Classifier;
//!
//! let classifier = Classifier::builder()
//!     .with_model_path("models/traffic_sign_model.onnx")?
//!     .build()?;
//!
//! let image = std::fs::read("sign.jpg")?;
//! let prediction = classifier.predict(&image)?;
//! println!("Predicted class: {} ({})", prediction.best.class_id, prediction.best.label);
//! for alt in &prediction.top {
//!     println!("  {}: {:.2}", alt.label, alt.confidence);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Serving
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use signsight::{api, Classifier};
//!
//! let classifier = Classifier::builder()
//!     .with_model_path("models/traffic_sign_model.onnx")?
//!     .build()?;
//! let app = api::router(api::AppState::new(classifier), 10 * 1024 * 1024);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:7001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod classifier;
pub mod config;
pub mod labels;
mod runtime;
pub mod model_manager;

pub use api::{router, AppState};
pub use classifier::{
    ClassScore, Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo, InputSpec,
    OnnxModel, Prediction, SignModel, TensorLayout,
};
pub use config::ServerConfig;
pub use runtime::{RuntimeConfig, create_session_builder};
pub use model_manager::{ModelManager, ModelError};

/// Initializes `env_logger`, defaulting to `info` when `RUST_LOG` is unset.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
