//! Text extraction, selected by MIME type.
//!
//! Every extractor reads through a [`DocumentSource`] and finishes within
//! its own deadline. When the deadline passes the shared cancellation token
//! is cancelled, so a pending read or a page scan on the blocking pool
//! stops instead of running on unobserved.

mod pdf;
mod plain_text;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::models::{DocumentSource, ExtractionResult, MIME_DOC, MIME_DOCX, MIME_PDF, MIME_TEXT};
use crate::services::policy::ValidationPolicy;

pub use pdf::{extract_pages_fallback, scan_document, scan_pages, PageScan, PdfExtractor};
pub use plain_text::PlainTextExtractor;

#[async_trait]
pub trait TextExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract(&self, source: &dyn DocumentSource) -> AppResult<ExtractionResult>;
}

/// Pick the extractor able to produce text for `mime_type`.
pub fn extractor_for(
    mime_type: &str,
    policy: &ValidationPolicy,
) -> AppResult<Box<dyn TextExtractor>> {
    match mime_type {
        MIME_PDF => Ok(Box::new(PdfExtractor::new(policy.pdf))),
        MIME_TEXT | MIME_DOC | MIME_DOCX => Ok(Box::new(PlainTextExtractor::new(policy.plain_text))),
        other => Err(AppError::UnsupportedType {
            mime_type: other.to_string(),
        }),
    }
}

/// Race `work` against `timeout`. On expiry `cancel` is cancelled before
/// the timeout error is returned.
pub(crate) async fn with_deadline<T, F>(
    timeout: Duration,
    cancel: &CancellationToken,
    work: F,
) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(timeout, work).await {
        Ok(result) => result,
        Err(_) => {
            cancel.cancel();
            let timeout_ms = timeout.as_millis() as u64;
            warn!(timeout_ms, "Extraction deadline exceeded, cancelling");
            Err(AppError::ExtractionTimeout { timeout_ms })
        }
    }
}
