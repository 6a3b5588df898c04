use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{with_deadline, TextExtractor};
use crate::error::AppResult;
use crate::models::{DocumentSource, ExtractionMethod, ExtractionResult};
use crate::services::policy::PlainTextLimits;

/// Decodes text and Word uploads as raw UTF-8 and keeps a leading sample.
pub struct PlainTextExtractor {
    limits: PlainTextLimits,
}

impl PlainTextExtractor {
    pub fn new(limits: PlainTextLimits) -> Self {
        Self { limits }
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new(PlainTextLimits::default())
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "plain_text"
    }

    async fn extract(&self, source: &dyn DocumentSource) -> AppResult<ExtractionResult> {
        let start = Instant::now();
        let cancel = CancellationToken::new();

        let work = async { Ok(source.read_bytes(cancel.child_token()).await?) };
        let content = with_deadline(self.limits.timeout, &cancel, work).await?;

        let text: String = String::from_utf8_lossy(&content)
            .chars()
            .take(self.limits.char_cap)
            .collect();
        debug!(
            bytes = content.len(),
            sample_chars = text.chars().count(),
            "Decoded text sample"
        );

        let processing_time = start.elapsed().as_millis() as u64;
        info!(
            file_name = source.name(),
            processing_time_ms = processing_time,
            "Text extraction completed"
        );

        Ok(ExtractionResult {
            text,
            pages_read: 1,
            succeeded: true,
            method: ExtractionMethod::PlainText,
            processing_time_ms: processing_time,
        })
    }
}
