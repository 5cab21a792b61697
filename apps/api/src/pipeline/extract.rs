//! Text Extractor — wraps the external PDF parser behind an injectable trait.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::timeout;

use crate::errors::AppError;

/// Parsing runs on a blocking thread; cap it so a pathological PDF cannot pin
/// a request forever.
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// PDF text extraction capability.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extracts plain text from PDF bytes. Single attempt, fail-fast.
    async fn extract_text(&self, resume: Bytes) -> Result<String, AppError>;
}

/// Production extractor backed by the `pdf-extract` parser.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, resume: Bytes) -> Result<String, AppError> {
        let parsed = timeout(
            EXTRACTION_TIMEOUT,
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&resume)),
        )
        .await
        .map_err(|_| AppError::ExtractionFailed("extraction timed out".to_string()))?
        .map_err(|e| AppError::ExtractionFailed(format!("extraction task failed: {e}")))?
        .map_err(|e| AppError::ExtractionFailed(e.to_string()))?;

        let text = parsed.trim();
        if text.is_empty() {
            return Err(AppError::ExtractionEmpty);
        }

        Ok(text.to_string())
    }
}
