//! Text extraction and pipeline assembly

mod common;

use std::time::Duration;

use poligap::{
    error::AppError,
    models::{CandidateFile, ExtractionMethod, VerdictCode, MIME_DOCX, MIME_PDF, MIME_TEXT},
    services::{
        extractor::{extractor_for, scan_document, scan_pages},
        policy::{PdfLimits, ValidationPolicy},
        PdfExtractor, PlainTextExtractor, TextExtractor, ValidationPipeline,
    },
};
use tokio_util::sync::CancellationToken;

use common::{build_pdf, filler, BrokenSource, CountingSource, StalledSource, POLICY_TEXT};

fn pdf_file(pages: &[&str]) -> CandidateFile {
    CandidateFile::new("policy.pdf".to_string(), build_pdf(pages)).with_mime_type(MIME_PDF)
}

#[tokio::test]
async fn test_pdf_reads_at_most_three_pages() {
    let pages = [
        "First page about privacy and the handling of customer records.",
        "Second page about security controls and access reviews.",
        "Third page about compliance audits and retention schedules.",
        "Fourth page that should never be read by the extractor.",
        "Fifth page that should never be read by the extractor.",
    ];
    let result = PdfExtractor::default().extract(&pdf_file(&pages)).await.unwrap();

    assert!(result.succeeded);
    assert_eq!(result.method, ExtractionMethod::PageScan);
    assert_eq!(result.pages_read, 3);
    assert!(result.text.contains("First page"));
    assert!(result.text.contains("Third page"));
    assert!(!result.text.contains("Fourth page"));
}

#[tokio::test]
async fn test_pdf_stops_early_once_enough_text() {
    let long_page = format!("{} {}", POLICY_TEXT, filler(80));
    let pages = [long_page.as_str(), "Second page text that is not needed at all."];
    let result = PdfExtractor::default().extract(&pdf_file(&pages)).await.unwrap();

    assert_eq!(result.pages_read, 1);
    assert!(result.text.chars().count() > 2000);
    assert!(!result.text.contains("Second page"));
}

#[tokio::test]
async fn test_pdf_without_text_fails() {
    let result = PdfExtractor::default().extract(&pdf_file(&["", "", ""])).await;
    match result {
        Err(AppError::ExtractionFailed { message }) => {
            assert!(message.to_lowercase().contains("unable to extract readable text"));
        }
        other => panic!("Expected ExtractionFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pdf_with_too_little_text_fails() {
    let result = PdfExtractor::default().extract(&pdf_file(&["Short page."])).await;
    assert!(matches!(result, Err(AppError::ExtractionFailed { .. })));
}

#[tokio::test]
async fn test_garbage_pdf_fails_cleanly() {
    let file = CandidateFile::new("fake.pdf".to_string(), "this is not a pdf at all".repeat(20))
        .with_mime_type(MIME_PDF);
    let result = PdfExtractor::default().extract(&file).await;
    assert!(matches!(result, Err(AppError::ExtractionFailed { .. })));
}

#[test]
fn test_unloadable_pdf_scanned_through_fallback() {
    let garbage = b"%PDF-1.7 truncated beyond repair".to_vec();
    let pages: Vec<String> = (1..=5)
        .map(|n| format!("Fallback page {} covering privacy and security controls.", n))
        .collect();
    let mut fallback_input = 0;

    let (scan, method) = scan_document(
        &garbage,
        &PdfLimits::default(),
        &CancellationToken::new(),
        |data| {
            fallback_input = data.len();
            Ok(pages.clone())
        },
    )
    .unwrap();

    assert_eq!(fallback_input, garbage.len());
    assert_eq!(method, ExtractionMethod::WholeDocument);
    assert_eq!(scan.total_pages, 5);
    assert_eq!(scan.pages_read, 3);
    assert!(scan.text.starts_with("Fallback page 1"));
    assert!(scan.text.contains("Fallback page 3"));
    assert!(!scan.text.contains("Fallback page 4"));
}

#[test]
fn test_fallback_not_started_after_cancellation() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut called = false;

    let result = scan_document(b"not a pdf", &PdfLimits::default(), &cancel, |_| {
        called = true;
        Ok(vec!["unused".to_string()])
    });

    assert!(matches!(result, Err(AppError::ExtractionTimeout { .. })));
    assert!(!called);
}

#[test]
fn test_fallback_output_still_needs_readable_text() {
    let result = scan_document(
        b"not a pdf",
        &PdfLimits::default(),
        &CancellationToken::new(),
        |_| Ok(vec![String::new(), "  ".to_string()]),
    );
    assert!(matches!(result, Err(AppError::ExtractionFailed { .. })));
}

#[test]
fn test_scan_pages_skips_failed_pages() {
    let limits = PdfLimits::default();
    let scan = scan_pages(
        &[1, 2, 3],
        |page| match page {
            2 => Err("broken content stream".to_string()),
            n => Ok(format!("page {} text", n)),
        },
        &limits,
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(scan.text, "page 1 text page 3 text");
    assert_eq!(scan.pages_read, 2);
    assert_eq!(scan.pages_with_text, 2);
    assert_eq!(scan.total_pages, 3);
}

#[test]
fn test_scan_pages_respects_page_cap() {
    let limits = PdfLimits::default();
    let mut visited = Vec::new();
    let scan = scan_pages(
        &[1, 2, 3, 4, 5, 6],
        |page| {
            visited.push(page);
            Ok("x".to_string())
        },
        &limits,
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(visited, vec![1, 2, 3]);
    assert_eq!(scan.text, "x x x");
    assert_eq!(scan.total_pages, 6);
}

#[test]
fn test_scan_pages_early_exit() {
    let limits = PdfLimits::default();
    let mut calls = 0;
    let scan = scan_pages(
        &[1, 2, 3],
        |_| {
            calls += 1;
            Ok("y".repeat(1500))
        },
        &limits,
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(calls, 2);
    assert_eq!(scan.pages_read, 2);
    assert_eq!(scan.text.chars().count(), 3001);
}

#[test]
fn test_scan_pages_stops_when_cancelled() {
    let limits = PdfLimits::default();
    let cancel = CancellationToken::new();
    let mut calls = 0;
    let result = scan_pages(
        &[1, 2, 3],
        |_| {
            calls += 1;
            cancel.cancel();
            Ok("page".to_string())
        },
        &limits,
        &cancel,
    );

    assert!(matches!(result, Err(AppError::ExtractionTimeout { timeout_ms: 10_000 })));
    assert_eq!(calls, 1);
}

#[tokio::test]
async fn test_plain_text_truncated_to_cap() {
    let file = CandidateFile::new("long.txt".to_string(), "é".repeat(6000));
    let result = PlainTextExtractor::default().extract(&file).await.unwrap();

    assert_eq!(result.method, ExtractionMethod::PlainText);
    assert_eq!(result.text.chars().count(), 5000);
}

#[tokio::test]
async fn test_word_documents_are_decoded_as_raw_text() {
    let file = CandidateFile::new("handbook.docx".to_string(), POLICY_TEXT.as_bytes().to_vec());
    assert_eq!(file.mime_type, MIME_DOCX);

    let extractor = extractor_for(&file.mime_type, &ValidationPolicy::default()).unwrap();
    assert_eq!(extractor.name(), "plain_text");
    let result = extractor.extract(&file).await.unwrap();
    assert_eq!(result.text, POLICY_TEXT);
}

#[tokio::test]
async fn test_read_error_becomes_extraction_failure() {
    let result = PlainTextExtractor::default().extract(&BrokenSource).await;
    match result {
        Err(AppError::ExtractionFailed { message }) => assert!(message.contains("disk unplugged")),
        other => panic!("Expected ExtractionFailed, got {:?}", other),
    }
}

#[test]
fn test_unsupported_type() {
    let result = extractor_for("image/png", &ValidationPolicy::default());
    assert!(matches!(result, Err(AppError::UnsupportedType { .. })));
    assert_eq!(
        extractor_for(MIME_PDF, &ValidationPolicy::default()).map(|e| e.name()).ok(),
        Some("pdf")
    );
}

#[tokio::test(start_paused = true)]
async fn test_plain_text_timeout_cancels_read() {
    let source = StalledSource::new(MIME_TEXT, Duration::from_secs(60));
    let result = PlainTextExtractor::default().extract(&source).await;

    assert!(matches!(result, Err(AppError::ExtractionTimeout { timeout_ms: 5_000 })));
    assert!(source.was_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_slow_pdf_surfaces_timeout_verdict() {
    let source = StalledSource::new(MIME_PDF, Duration::from_secs(11));
    let verdict = ValidationPipeline::default().validate(&source).await.unwrap();

    assert!(!verdict.is_valid);
    assert_eq!(verdict.code, VerdictCode::ExtractionError);
    assert!(verdict.reason.starts_with("Error analyzing document: "));
    assert!(verdict.reason.contains("timed out after 10000ms"));
    assert!(verdict.details.is_none());
    assert!(source.was_cancelled());
}

#[tokio::test]
async fn test_oversized_file_is_never_read() {
    let source = CountingSource::new(MIME_PDF, 15 * 1024 * 1024);
    let result = ValidationPipeline::default().validate(&source).await;

    assert!(matches!(result, Err(AppError::FileTooLarge { .. })));
    assert_eq!(source.reads(), 0);
}

#[tokio::test]
async fn test_invalid_type_is_never_read() {
    let source = CountingSource::new("text/html", 100);
    let result = ValidationPipeline::default().validate(&source).await;

    assert!(matches!(result, Err(AppError::InvalidFileType { .. })));
    assert_eq!(source.reads(), 0);
}

#[tokio::test]
async fn test_image_only_pdf_never_reaches_classifier() {
    let verdict = ValidationPipeline::default()
        .validate(&pdf_file(&["", "", ""]))
        .await
        .unwrap();

    assert!(!verdict.is_valid);
    assert_eq!(verdict.code, VerdictCode::ExtractionError);
    assert!(verdict.reason.contains("Unable to extract readable text"));
    assert!(verdict.details.is_none());
}

#[tokio::test]
async fn test_policy_pdf_is_accepted() {
    let verdict = ValidationPipeline::default()
        .validate(&pdf_file(&[POLICY_TEXT]))
        .await
        .unwrap();

    assert!(verdict.is_valid, "{:?}", verdict);
    assert_eq!(verdict.code, VerdictCode::Accepted);
    assert!(verdict.confidence().unwrap() >= 80);
}

#[tokio::test]
async fn test_short_text_file_is_rejected_as_too_short() {
    let file = CandidateFile::new("note.txt".to_string(), "Our privacy policy.");
    let verdict = ValidationPipeline::default().validate(&file).await.unwrap();

    assert_eq!(verdict.code, VerdictCode::DocumentTooShort);
    assert_eq!(verdict.details.unwrap().content_length, 19);
}
