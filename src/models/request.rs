use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_UNKNOWN: &str = "application/octet-stream";

/// A file handed to the validation pipeline.
///
/// Metadata is available synchronously so the gate can run before any
/// content is touched; the bytes themselves are only reachable through
/// [`DocumentSource::read_bytes`], which callers may cancel.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    fn name(&self) -> &str;
    fn mime_type(&self) -> &str;
    fn size_bytes(&self) -> u64;

    async fn read_bytes(&self, cancel: CancellationToken) -> std::io::Result<Bytes>;
}

/// In-memory upload, as received from a multipart field or a raw body.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub content: Bytes,
}

impl CandidateFile {
    pub fn new(name: String, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        let mime_type = infer_mime_type(&name).to_string();
        Self {
            name,
            mime_type,
            size: content.len() as u64,
            content,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        if !mime_type.trim().is_empty() {
            self.mime_type = normalize_mime_type(&mime_type);
        }
        self
    }
}

#[async_trait]
impl DocumentSource for CandidateFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }

    async fn read_bytes(&self, cancel: CancellationToken) -> std::io::Result<Bytes> {
        if cancel.is_cancelled() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Interrupted,
                "read cancelled",
            ));
        }
        Ok(self.content.clone())
    }
}

/// Guess a MIME type from the file extension, for uploads that arrive
/// without a content type.
pub fn infer_mime_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => MIME_PDF,
        "doc" => MIME_DOC,
        "docx" => MIME_DOCX,
        "txt" => MIME_TEXT,
        _ => MIME_UNKNOWN,
    }
}

/// Strip parameters such as `; charset=utf-8` and lowercase the essence.
pub fn normalize_mime_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
