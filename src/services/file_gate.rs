use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::services::policy::ValidationPolicy;

/// MIME type and size admission check, run before any content is read.
#[derive(Debug, Clone)]
pub struct FileGate {
    max_size_bytes: u64,
    allowed_mime_types: Vec<&'static str>,
}

impl FileGate {
    pub fn new(policy: &ValidationPolicy) -> Self {
        Self {
            max_size_bytes: policy.max_file_size_bytes,
            allowed_mime_types: policy.allowed_mime_types.clone(),
        }
    }

    pub fn check(&self, mime_type: &str, size_bytes: u64) -> AppResult<()> {
        if size_bytes > self.max_size_bytes {
            warn!(
                file_size = size_bytes,
                max_size = self.max_size_bytes,
                "File size exceeds limit"
            );
            return Err(AppError::FileTooLarge {
                size: size_bytes,
                limit: self.max_size_bytes,
            });
        }

        if !self.allows(mime_type) {
            warn!(mime_type = mime_type, "File type not allowed");
            return Err(AppError::InvalidFileType {
                mime_type: mime_type.to_string(),
            });
        }

        debug!(mime_type = mime_type, file_size = size_bytes, "File passed gate");
        Ok(())
    }

    pub fn allows(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|allowed| *allowed == mime_type)
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }
}

impl Default for FileGate {
    fn default() -> Self {
        Self::new(&ValidationPolicy::default())
    }
}
