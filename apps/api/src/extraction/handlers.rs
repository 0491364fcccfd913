//! Axum route handlers for the Extraction API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::extraction::extractor::{extract, Bullet};
use crate::extraction::pdf::{ensure_readable, extract_text_from_pdf, PDF_CONTENT_TYPE};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub raw_text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub bullets: Vec<Bullet>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_name: Option<String>,
    pub extracted_text: String,
    pub bullets: Vec<Bullet>,
}

struct UploadedFile {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/bullets/extract
///
/// Runs the extractor over already-extracted text. Zero bullets is a valid answer.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    let bullets = extract(&request.raw_text, &state.rules);
    Ok(Json(ExtractResponse {
        total: bullets.len(),
        bullets,
    }))
}

/// POST /api/v1/resumes/upload
///
/// Accepts a multipart `file` field holding a PDF, extracts its text layer, and
/// returns the text alongside the bullets found in it.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = read_pdf_field(multipart).await?;
    info!(
        "Received PDF upload {:?} ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let extracted_text = extract_text_from_pdf(upload.bytes).await?;
    ensure_readable(&extracted_text, state.config.min_extracted_chars)?;

    let bullets = extract(&extracted_text, &state.rules);
    info!("Upload {:?} yielded {} bullets", upload.file_name, bullets.len());

    Ok(Json(UploadResponse {
        file_name: upload.file_name,
        extracted_text,
        bullets,
    }))
}

async fn read_pdf_field(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        if field.content_type() != Some(PDF_CONTENT_TYPE) {
            return Err(AppError::Validation(
                "Only PDF files are accepted".to_string(),
            ));
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        return Ok(UploadedFile {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::Validation("No file provided".to_string()))
}
