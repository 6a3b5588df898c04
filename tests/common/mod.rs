//! Shared fixtures: in-memory PDFs and instrumented document sources.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tokio_util::sync::CancellationToken;

pub const POLICY_TEXT: &str = "This privacy policy explains how we collect, use and share personal \
information. Our data protection procedures follow GDPR and other regulation. We use cookies to \
operate our services and keep your information secure under our security and compliance program. \
You may contact our data protection officer at any time to exercise your rights.";

/// `count` repetitions of a phrase containing none of the classifier keywords.
pub fn filler(count: usize) -> String {
    "lorem ipsum dolor sit amet ".repeat(count)
}

/// Build a PDF with one page per entry. An empty entry yields a page with
/// no text operators, like a scanned image page.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_id),
        },
    });

    let mut kids = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            vec![Operation::new("q", vec![]), Operation::new("Q", vec![])]
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(10)]),
                Operation::new("Td", vec![Object::Integer(50), Object::Integer(700)]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            lopdf::Dictionary::new(),
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(resources_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save pdf");
    buffer
}

/// Source whose read never finishes on its own. Records the token it was
/// given so tests can check it was cancelled.
pub struct StalledSource {
    pub mime_type: &'static str,
    pub delay: Duration,
    pub seen_token: Mutex<Option<CancellationToken>>,
}

impl StalledSource {
    pub fn new(mime_type: &'static str, delay: Duration) -> Self {
        Self {
            mime_type,
            delay,
            seen_token: Mutex::new(None),
        }
    }

    pub fn was_cancelled(&self) -> bool {
        self.seen_token
            .lock()
            .unwrap()
            .as_ref()
            .map(|t| t.is_cancelled())
            .unwrap_or(false)
    }
}

#[async_trait]
impl poligap::models::DocumentSource for StalledSource {
    fn name(&self) -> &str {
        "stalled"
    }

    fn mime_type(&self) -> &str {
        self.mime_type
    }

    fn size_bytes(&self) -> u64 {
        1024
    }

    async fn read_bytes(&self, cancel: CancellationToken) -> std::io::Result<Bytes> {
        *self.seen_token.lock().unwrap() = Some(cancel.clone());
        tokio::time::sleep(self.delay).await;
        Ok(Bytes::from_static(b"late content"))
    }
}

/// Source that reports a size without holding content and counts reads.
pub struct CountingSource {
    pub mime_type: &'static str,
    pub size: u64,
    pub reads: AtomicUsize,
}

impl CountingSource {
    pub fn new(mime_type: &'static str, size: u64) -> Self {
        Self {
            mime_type,
            size,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl poligap::models::DocumentSource for CountingSource {
    fn name(&self) -> &str {
        "counting.pdf"
    }

    fn mime_type(&self) -> &str {
        self.mime_type
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }

    async fn read_bytes(&self, _cancel: CancellationToken) -> std::io::Result<Bytes> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Bytes::new())
    }
}

/// Source whose read fails.
pub struct BrokenSource;

#[async_trait]
impl poligap::models::DocumentSource for BrokenSource {
    fn name(&self) -> &str {
        "broken.txt"
    }

    fn mime_type(&self) -> &str {
        "text/plain"
    }

    fn size_bytes(&self) -> u64 {
        10
    }

    async fn read_bytes(&self, _cancel: CancellationToken) -> std::io::Result<Bytes> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "disk unplugged"))
    }
}
