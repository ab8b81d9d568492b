use std::sync::Arc;
use log::debug;
use serde::Serialize;

use super::error::ClassifierError;
use super::model::SignModel;
use super::preprocess::preprocess;
use super::utils::{to_probabilities, top_k_indices};
use crate::labels::{label_for, NUM_CLASSES};

/// One class with its confidence score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassScore {
    pub class_id: usize,
    pub label: String,
    pub confidence: f32,
}

/// Result of classifying one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The highest scoring class
    pub best: ClassScore,
    /// The top-k classes, highest confidence first; `top[0] == best`
    pub top: Vec<ClassScore>,
}

/// A thread-safe traffic sign classifier.
///
/// # Thread Safety
///
/// The model is held behind an `Arc<dyn SignModel>` and `SignModel` requires
/// `Send + Sync`, so a `Classifier` can be shared across request handlers
/// with `Arc` and used concurrently.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use signsight::Classifier;
///
/// let classifier = Classifier::builder()
///     .with_model_path("models/traffic_sign_model.onnx")?
///     .build()?;
///
/// let bytes = std::fs::read("stop.png")?;
/// let prediction = classifier.predict(&bytes)?;
/// println!("{} ({:.1}%)", prediction.best.label, prediction.best.confidence * 100.0);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Classifier {
    pub(super) model_path: Option<String>,
    pub(super) model: Arc<dyn SignModel>,
    pub(super) top_k: usize,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("model_path", &self.model_path)
            .field("input_spec", &self.model.input_spec())
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Path the model was loaded from, if it came from disk
    pub fn model_path(&self) -> Option<&str> {
        self.model_path.as_deref()
    }

    /// Number of ranked alternatives each prediction carries
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            model_path: self.model_path.clone(),
            num_classes: NUM_CLASSES,
            input_spec: self.model.input_spec(),
            top_k: self.top_k,
        }
    }

    /// Classifies an encoded image (PNG, JPEG, ...).
    ///
    /// # Errors
    /// - `ImageError` if the bytes cannot be decoded as an image
    /// - `ModelError` if the forward pass fails
    /// - `PredictionError` if the model returns no scores or non-finite scores
    pub fn predict(&self, image_bytes: &[u8]) -> Result<Prediction, ClassifierError> {
        let input = preprocess(image_bytes, &self.model.input_spec())?;
        let scores = self.model.infer(input)?;
        self.rank(scores)
    }

    /// Shapes raw model scores into the best class and its top-k alternatives.
    pub fn rank(&self, scores: Vec<f32>) -> Result<Prediction, ClassifierError> {
        if scores.is_empty() {
            return Err(ClassifierError::PredictionError("Model returned no class scores".into()));
        }
        if let Some(pos) = scores.iter().position(|s| !s.is_finite()) {
            return Err(ClassifierError::PredictionError(
                format!("Model returned a non-finite score for class {}", pos)
            ));
        }

        let probabilities = to_probabilities(scores);
        let top: Vec<ClassScore> = top_k_indices(&probabilities, self.top_k)
            .into_iter()
            .map(|class_id| ClassScore {
                class_id,
                label: label_for(class_id),
                confidence: probabilities[class_id],
            })
            .collect();

        let best = top.first().cloned().ok_or_else(|| {
            ClassifierError::PredictionError("No classes ranked (top_k is 0)".into())
        })?;
        debug!("Predicted class {} ({}) with confidence {:.4}", best.class_id, best.label, best.confidence);

        Ok(Prediction { best, top })
    }
}
