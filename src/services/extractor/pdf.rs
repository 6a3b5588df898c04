use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use async_trait::async_trait;
use lopdf::Document;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{with_deadline, TextExtractor};
use crate::error::{AppError, AppResult};
use crate::models::{DocumentSource, ExtractionMethod, ExtractionResult};
use crate::services::policy::PdfLimits;

const UNREADABLE_PDF: &str =
    "Unable to extract readable text from PDF. The document may be scanned or image-based";

/// Outcome of scanning the leading pages of a PDF.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageScan {
    pub text: String,
    pub pages_read: usize,
    pub pages_with_text: usize,
    pub total_pages: usize,
}

pub struct PdfExtractor {
    limits: PdfLimits,
}

impl PdfExtractor {
    pub fn new(limits: PdfLimits) -> Self {
        Self { limits }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new(PdfLimits::default())
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    async fn extract(&self, source: &dyn DocumentSource) -> AppResult<ExtractionResult> {
        let start = Instant::now();
        let limits = self.limits;
        let cancel = CancellationToken::new();

        info!(
            "Starting PDF text extraction for file: {} ({} bytes)",
            source.name(),
            source.size_bytes()
        );

        let work = async {
            let content = source.read_bytes(cancel.child_token()).await?;
            let scan_cancel = cancel.clone();
            tokio::task::spawn_blocking(move || {
                scan_document(&content, &limits, &scan_cancel, extract_pages_fallback)
            })
            .await?
        };
        let (scan, method) = with_deadline(limits.timeout, &cancel, work).await?;

        let processing_time = start.elapsed().as_millis() as u64;
        info!(
            pages_read = scan.pages_read,
            total_pages = scan.total_pages,
            text_length = scan.text.chars().count(),
            processing_time_ms = processing_time,
            "PDF extraction completed"
        );

        Ok(ExtractionResult {
            text: scan.text,
            pages_read: scan.pages_read,
            succeeded: true,
            method,
            processing_time_ms: processing_time,
        })
    }
}

/// Scan a PDF held in memory.
///
/// Documents lopdf can load are read page by page. Anything else goes through
/// `fallback`, which returns the text of every page in one call; cancellation
/// is checked before that call and between the pages it returns, but not
/// while it runs.
pub fn scan_document<F>(
    content: &[u8],
    limits: &PdfLimits,
    cancel: &CancellationToken,
    fallback: F,
) -> AppResult<(PageScan, ExtractionMethod)>
where
    F: FnOnce(&[u8]) -> AppResult<Vec<String>>,
{
    let (scan, method) = match Document::load_mem(content) {
        Ok(doc) => {
            let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
            let scan = scan_pages(
                &page_numbers,
                |page| doc.extract_text(&[page]).map_err(|e| e.to_string()),
                limits,
                cancel,
            )?;
            (scan, ExtractionMethod::PageScan)
        }
        Err(e) => {
            warn!("PDF structure load failed: {}, falling back to whole-document extraction", e);
            if cancel.is_cancelled() {
                return Err(AppError::ExtractionTimeout {
                    timeout_ms: limits.timeout.as_millis() as u64,
                });
            }
            let pages = fallback(content)?;
            let page_numbers: Vec<u32> = (1..=pages.len() as u32).collect();
            let scan = scan_pages(
                &page_numbers,
                |page| Ok(pages[(page - 1) as usize].clone()),
                limits,
                cancel,
            )?;
            (scan, ExtractionMethod::WholeDocument)
        }
    };

    if scan.pages_with_text == 0 || scan.text.trim().chars().count() < limits.min_text_chars {
        warn!(
            pages_read = scan.pages_read,
            text_length = scan.text.trim().chars().count(),
            "PDF yielded no readable text"
        );
        return Err(AppError::extraction_failed(UNREADABLE_PDF));
    }

    Ok((scan, method))
}

/// Walk the first `limits.page_cap` pages, joining their text with spaces.
///
/// A page that fails to parse is logged and skipped. The walk stops as soon
/// as the accumulated text is longer than `limits.early_exit_chars`, and
/// aborts with a timeout error once `cancel` fires.
pub fn scan_pages<F>(
    page_numbers: &[u32],
    mut extract_page: F,
    limits: &PdfLimits,
    cancel: &CancellationToken,
) -> AppResult<PageScan>
where
    F: FnMut(u32) -> Result<String, String>,
{
    let mut scan = PageScan {
        total_pages: page_numbers.len(),
        ..PageScan::default()
    };

    for &page in page_numbers.iter().take(limits.page_cap) {
        if cancel.is_cancelled() {
            debug!(page, "Page scan cancelled");
            return Err(AppError::ExtractionTimeout {
                timeout_ms: limits.timeout.as_millis() as u64,
            });
        }

        match extract_page(page) {
            Ok(page_text) => {
                scan.pages_read += 1;
                let page_text = page_text.trim();
                if !page_text.is_empty() {
                    if !scan.text.is_empty() {
                        scan.text.push(' ');
                    }
                    scan.text.push_str(page_text);
                    scan.pages_with_text += 1;
                }
            }
            Err(e) => {
                warn!(page, error = %e, "Failed to extract text from page, skipping");
                continue;
            }
        }

        if scan.text.chars().count() > limits.early_exit_chars {
            debug!(page, "Collected enough text, stopping early");
            break;
        }
    }

    Ok(scan)
}

/// Per-page text through pdf-extract, for files lopdf cannot load.
/// pdf-extract panics on some malformed input; that surfaces as an error.
pub fn extract_pages_fallback(data: &[u8]) -> AppResult<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(AppError::extraction_failed(format!(
            "PDF extraction failed: {}",
            e
        ))),
        Err(_) => Err(AppError::extraction_failed(
            "PDF extraction failed: malformed document",
        )),
    }
}
