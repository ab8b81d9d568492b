//! Image classification: preprocessing, model execution and response shaping.

mod builder;
#[allow(clippy::module_inception)]
mod classifier;
mod error;
mod model;
mod preprocess;
mod utils;

use serde::Serialize;

pub use builder::{ClassifierBuilder, DEFAULT_TOP_K};
pub use classifier::{ClassScore, Classifier, Prediction};
pub use error::ClassifierError;
pub use model::{OnnxModel, SignModel};
pub use preprocess::{preprocess, InputSpec, TensorLayout, DEFAULT_INPUT_SIZE};

/// Snapshot of a classifier's configuration
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierInfo {
    pub model_path: Option<String>,
    pub num_classes: usize,
    pub input_spec: InputSpec,
    pub top_k: usize,
}
