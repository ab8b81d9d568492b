use image::imageops::FilterType;
use ndarray::Array4;
use serde::Serialize;

use super::error::ClassifierError;

/// Default spatial size the GTSRB models are trained on.
pub const DEFAULT_INPUT_SIZE: u32 = 32;

/// Memory layout of the model's image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TensorLayout {
    /// `[batch, height, width, channels]`, the Keras default
    Nhwc,
    /// `[batch, channels, height, width]`
    Nchw,
}

/// Shape of the image tensor a model expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputSpec {
    pub width: u32,
    pub height: u32,
    pub layout: TensorLayout,
}

impl Default for InputSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_INPUT_SIZE,
            height: DEFAULT_INPUT_SIZE,
            layout: TensorLayout::Nhwc,
        }
    }
}

impl InputSpec {
    /// Derives the input spec from a rank-4 tensor shape as reported by the runtime.
    ///
    /// Dynamic dimensions are reported as non-positive values; those fall back
    /// to the default 32x32 size. A shape with no 3-channel axis at either end
    /// is assumed to be NHWC.
    pub fn from_dimensions(dims: &[i64]) -> Self {
        let mut spec = Self::default();
        if dims.len() != 4 {
            return spec;
        }

        let (layout, h, w) = if dims[1] == 3 && dims[3] != 3 {
            (TensorLayout::Nchw, dims[2], dims[3])
        } else {
            (TensorLayout::Nhwc, dims[1], dims[2])
        };

        spec.layout = layout;
        if h > 0 {
            spec.height = h as u32;
        }
        if w > 0 {
            spec.width = w as u32;
        }
        spec
    }
}

/// Decodes image bytes into a normalized `[1, ...]` float tensor.
///
/// The image is converted to RGB, resized to `spec.width x spec.height` with
/// bilinear filtering and scaled to `[0, 1]`.
pub fn preprocess(bytes: &[u8], spec: &InputSpec) -> Result<Array4<f32>, ClassifierError> {
    if bytes.is_empty() {
        return Err(ClassifierError::ImageError("Uploaded file is empty".into()));
    }
    if spec.width == 0 || spec.height == 0 {
        return Err(ClassifierError::ValidationError(
            format!("Invalid model input size {}x{}", spec.width, spec.height)
        ));
    }

    let img = image::load_from_memory(bytes)?;
    let rgb = img
        .resize_exact(spec.width, spec.height, FilterType::Triangle)
        .to_rgb8();

    let (w, h) = (spec.width as usize, spec.height as usize);
    let pixels: Vec<f32> = rgb.into_raw().into_iter().map(|p| p as f32 / 255.0).collect();
    let nhwc = Array4::from_shape_vec((1, h, w, 3), pixels)
        .map_err(|e| ClassifierError::ImageError(format!("Failed to create input array: {}", e)))?;

    Ok(match spec.layout {
        TensorLayout::Nhwc => nhwc,
        TensorLayout::Nchw => nhwc.permuted_axes([0, 3, 1, 2]).as_standard_layout().to_owned(),
    })
}
