use std::path::Path;
use std::sync::Arc;
use log::{info, error};

use super::error::ClassifierError;
use super::classifier::Classifier;
use super::model::{OnnxModel, SignModel};
use crate::runtime::RuntimeConfig;

/// Number of alternatives returned alongside the best class.
pub const DEFAULT_TOP_K: usize = 3;

/// A builder for constructing a Classifier with a fluent interface.
pub struct ClassifierBuilder {
    model_path: Option<String>,
    model: Option<Arc<dyn SignModel>>,
    top_k: usize,
    runtime_config: RuntimeConfig,
}

impl Default for ClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use signsight::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            model_path: None,
            model: None,
            top_k: DEFAULT_TOP_K,
            runtime_config: RuntimeConfig::default(),
        }
    }

    /// Sets the runtime configuration for ONNX model execution.
    ///
    /// Must be called before [`with_model_path`](Self::with_model_path) to take effect.
    ///
    /// # Example
    /// ```
    /// use signsight::{ClassifierBuilder, RuntimeConfig};
    ///
    /// let config = RuntimeConfig::default();
    /// let builder = ClassifierBuilder::new()
    ///     .with_runtime_config(config);
    /// ```
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Loads an ONNX model from disk
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - The path is empty
    ///   - A model is already set
    ///   - The file doesn't exist
    ///   - The model failed to load or has an invalid structure
    ///
    /// # Example
    /// ```no_run
    /// use signsight::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new()
    ///     .with_model_path("models/traffic_sign_model.onnx");
    /// ```
    pub fn with_model_path<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ClassifierError::BuildError("Model path cannot be empty".to_string()));
        }
        if self.model.is_some() {
            return Err(ClassifierError::BuildError("Model already set".to_string()));
        }

        info!("Loading model from {}", path.display());
        let model = OnnxModel::load(path, &self.runtime_config).map_err(|e| {
            error!("Failed to load model: {}", e);
            e
        })?;
        info!("Model loaded successfully");

        self.model_path = Some(path.to_string_lossy().to_string());
        self.model = Some(Arc::new(model));
        Ok(self)
    }

    /// Uses an already constructed model, such as a custom runtime or a test double.
    pub fn with_model(mut self, model: Arc<dyn SignModel>) -> Self {
        self.model_path = model.source().map(|p| p.to_string_lossy().to_string());
        self.model = Some(model);
        self
    }

    /// Sets how many ranked alternatives each prediction carries
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Builds and returns the final Classifier instance
    ///
    /// # Returns
    /// * `Result<Classifier, ClassifierError>` - The constructed Classifier if successful, or an error if:
    ///   - No model has been set
    ///   - `top_k` is zero
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        let model = self.model
            .ok_or_else(|| ClassifierError::BuildError("A model must be set".to_string()))?;
        if self.top_k == 0 {
            return Err(ClassifierError::ValidationError("top_k must be at least 1".to_string()));
        }

        Ok(Classifier {
            model_path: self.model_path,
            model,
            top_k: self.top_k,
        })
    }
}
