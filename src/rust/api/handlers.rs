use std::collections::BTreeMap;
use std::time::Instant;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use log::info;
use serde::Serialize;
use serde_json::{json, Value};

use super::error::{ApiError, INVALID_FILE_TYPE};
use super::AppState;
use crate::classifier::ClassScore;
use crate::labels::label_map;

const SERVICE_NAME: &str = "Traffic Sign Classification API";
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub model_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: ClassScore,
    pub top_3_predictions: Vec<ClassScore>,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LabelsResponse {
    pub total_classes: usize,
    pub labels: &'static BTreeMap<usize, &'static str>,
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/": "Service information",
            "/health": "Health check",
            "/predict": "Traffic sign prediction (POST, multipart field 'file')",
            "/labels": "Class id to label table",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let classifier = state.classifier().ok_or_else(ApiError::model_not_loaded)?;
    Ok(Json(HealthResponse {
        status: "healthy",
        model_loaded: true,
        model_path: classifier.model_path().map(str::to_string),
    }))
}

pub async fn labels() -> Json<LabelsResponse> {
    let labels = label_map();
    Json(LabelsResponse {
        total_classes: labels.len(),
        labels,
    })
}

/// An uploaded image pulled out of the multipart body.
struct Upload {
    filename: Option<String>,
    bytes: Vec<u8>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let is_image = field
            .content_type()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false);
        if !is_image {
            return Err(ApiError::BadRequest(INVALID_FILE_TYPE.to_string()));
        }

        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?.to_vec();
        return Ok(Upload { filename, bytes });
    }

    Err(ApiError::BadRequest(format!("No '{}' field in upload", FILE_FIELD)))
}

pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let classifier = state.classifier().cloned().ok_or_else(ApiError::model_not_loaded)?;
    let mut multipart = multipart?;
    let upload = read_upload(&mut multipart).await?;

    let start = Instant::now();
    let bytes = upload.bytes;
    let prediction = tokio::task::spawn_blocking(move || classifier.predict(&bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("Error during prediction: {}", e)))??;

    info!(
        "Predicted {:?} as class {} ({}) with confidence {:.4} in {:.2?}",
        upload.filename.as_deref().unwrap_or("<unnamed>"),
        prediction.best.class_id,
        prediction.best.label,
        prediction.best.confidence,
        start.elapsed()
    );

    Ok(Json(PredictResponse {
        success: true,
        prediction: prediction.best,
        top_3_predictions: prediction.top,
        filename: upload.filename,
    }))
}
