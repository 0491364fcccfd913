//! PDF text source — uploaded PDF bytes to a line-oriented raw document string.
//!
//! Byte-level parsing is delegated to `pdf-extract`. Decoding is CPU-bound and runs
//! inside `tokio::task::spawn_blocking`.

use tracing::{debug, warn};

use crate::errors::AppError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Decodes a PDF and returns its text, pages separated by newlines.
pub async fn extract_text_from_pdf(bytes: Vec<u8>) -> Result<String, AppError> {
    let byte_len = bytes.len();
    let result = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| {
        if e.is_panic() {
            warn!("pdf-extract panicked on a {byte_len}-byte upload");
            AppError::Pdf("The PDF could not be parsed".to_string())
        } else {
            AppError::Internal(anyhow::anyhow!(
                "spawn_blocking failed in PDF extraction: {e}"
            ))
        }
    })?;

    let text = result.map_err(|e| AppError::Pdf(format!("Failed to extract text: {e}")))?;
    debug!("Extracted {} chars from {byte_len}-byte PDF", text.len());

    Ok(normalize_page_breaks(&text))
}

/// Form feeds separate pages in `pdf-extract` output; the extractor splits on newlines.
fn normalize_page_breaks(text: &str) -> String {
    text.replace('\u{c}', "\n")
}

/// Rejects uploads whose text layer is missing or nearly empty (scanned images).
pub fn ensure_readable(text: &str, min_chars: usize) -> Result<(), AppError> {
    if text.trim().chars().count() < min_chars {
        return Err(AppError::Validation(
            "Could not extract text from PDF. Please ensure it's not a scanned image.".to_string(),
        ));
    }
    Ok(())
}
