//! Fixed thresholds of the validation pipeline.
//!
//! The service always runs with [`ValidationPolicy::default`]; the struct
//! exists so tests can shrink timeouts without touching the constants.

use std::time::Duration;

use crate::models::{MIME_DOC, MIME_DOCX, MIME_PDF, MIME_TEXT};

pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const ALLOWED_MIME_TYPES: [&str; 4] = [MIME_PDF, MIME_DOC, MIME_DOCX, MIME_TEXT];

pub const PDF_PAGE_CAP: usize = 3;
pub const PDF_EARLY_EXIT_CHARS: usize = 2000;
pub const PDF_MIN_TEXT_CHARS: usize = 50;
pub const PDF_TIMEOUT: Duration = Duration::from_millis(10_000);

pub const PLAIN_TEXT_CHAR_CAP: usize = 5000;
pub const PLAIN_TEXT_TIMEOUT: Duration = Duration::from_millis(5_000);

pub const MIN_CONTENT_CHARS: usize = 300;
pub const EARLY_ACCEPT_SCORE: u32 = 10;
pub const ACCEPT_SCORE: u32 = 8;
pub const EARLY_ACCEPT_CONFIDENCE_FACTOR: u32 = 8;
pub const ACCEPT_CONFIDENCE_FACTOR: u32 = 10;
pub const MAX_CONFIDENCE: u32 = 100;

#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    pub max_file_size_bytes: u64,
    pub allowed_mime_types: Vec<&'static str>,
    pub pdf: PdfLimits,
    pub plain_text: PlainTextLimits,
}

#[derive(Debug, Clone, Copy)]
pub struct PdfLimits {
    pub page_cap: usize,
    pub early_exit_chars: usize,
    pub min_text_chars: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct PlainTextLimits {
    pub char_cap: usize,
    pub timeout: Duration,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            allowed_mime_types: ALLOWED_MIME_TYPES.to_vec(),
            pdf: PdfLimits::default(),
            plain_text: PlainTextLimits::default(),
        }
    }
}

impl Default for PdfLimits {
    fn default() -> Self {
        Self {
            page_cap: PDF_PAGE_CAP,
            early_exit_chars: PDF_EARLY_EXIT_CHARS,
            min_text_chars: PDF_MIN_TEXT_CHARS,
            timeout: PDF_TIMEOUT,
        }
    }
}

impl Default for PlainTextLimits {
    fn default() -> Self {
        Self {
            char_cap: PLAIN_TEXT_CHAR_CAP,
            timeout: PLAIN_TEXT_TIMEOUT,
        }
    }
}
