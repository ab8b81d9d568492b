use std::collections::HashMap;
use std::path::{Path, PathBuf};
use log::info;
use ndarray::Array4;
use ort::session::Session;
use ort::value::{Tensor, ValueType};

use super::error::ClassifierError;
use super::preprocess::InputSpec;
use crate::runtime::{RuntimeConfig, create_session_builder};

/// Runs a single forward pass over a preprocessed image tensor.
///
/// Implementations must be shareable across request handlers, hence
/// `Send + Sync`. The ONNX-backed [`OnnxModel`] is the production
/// implementation; anything else (e.g. a fixed-output model in tests) can be
/// plugged into the classifier through `ClassifierBuilder::with_model`.
pub trait SignModel: Send + Sync {
    /// Shape of the input tensor this model expects
    fn input_spec(&self) -> InputSpec;

    /// Returns one raw score per class for a `[1, ...]` input batch
    fn infer(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifierError>;

    /// Where the model was loaded from, if anywhere
    fn source(&self) -> Option<&Path> {
        None
    }
}

/// An image classifier backed by an ONNX Runtime session.
///
/// The model is expected to:
/// - Accept one image input of shape `[batch, H, W, 3]` or `[batch, 3, H, W]`
/// - Output one score per class of shape `[batch, num_classes]`
#[derive(Debug)]
pub struct OnnxModel {
    path: PathBuf,
    session: Session,
    input_name: String,
    input_spec: InputSpec,
}

impl OnnxModel {
    /// Loads the model at `path` and validates its input/output structure.
    pub fn load<P: AsRef<Path>>(path: P, config: &RuntimeConfig) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::BuildError(format!("Model file not found: {}", path.display())));
        }

        let session = create_session_builder(config)?
            .commit_from_file(path)?;

        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        let input = &session.inputs[0];
        let input_name = input.name.clone();
        let input_spec = match &input.input_type {
            ValueType::Tensor { dimensions, .. } => InputSpec::from_dimensions(dimensions),
            other => {
                return Err(ClassifierError::ModelError(
                    format!("Model input '{}' must be a tensor, found {:?}", input_name, other)
                ));
            }
        };
        info!(
            "Model input '{}' expects {}x{} images ({:?})",
            input_name, input_spec.width, input_spec.height, input_spec.layout
        );

        Ok(Self {
            path: path.to_path_buf(),
            session,
            input_name,
            input_spec,
        })
    }

    /// Validates that the model has the expected input/output structure
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        if session.inputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 input for the image tensor".to_string()
            ));
        }
        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 output for class scores".to_string()
            ));
        }
        Ok(())
    }
}

impl SignModel for OnnxModel {
    fn input_spec(&self) -> InputSpec {
        self.input_spec
    }

    fn infer(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let input_dyn = input.into_dyn();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(self.input_name.as_str(), Tensor::from_array(input_dyn)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to create input tensor: {}", e)))?);

        let outputs = self.session.run(input_tensors)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e)))?;

        Ok(output_tensor.iter().cloned().collect())
    }

    fn source(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file() {
        let result = OnnxModel::load("/nonexistent/signsight/model.onnx", &RuntimeConfig::default());
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
    }

    #[test]
    fn test_invalid_model_file() {
        let path = std::env::temp_dir().join("signsight-invalid-model.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();

        let result = OnnxModel::load(&path, &RuntimeConfig::default());
        assert!(result.is_err());

        let _ = std::fs::remove_file(&path);
    }
}
