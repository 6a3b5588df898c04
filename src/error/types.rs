use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid file type: {mime_type}. Please upload PDF, Word, or text files only")]
    InvalidFileType { mime_type: String },

    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Document processing timed out after {timeout_ms}ms")]
    ExtractionTimeout { timeout_ms: u64 },

    #[error("{message}")]
    ExtractionFailed { message: String },

    #[error("Unsupported file type for text extraction: {mime_type}")]
    UnsupportedType { mime_type: String },

    #[error("Rate limit exceeded: maximum concurrent requests reached")]
    RateLimitExceeded,

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid upload: {message}")]
    InvalidUpload { message: String },

    #[error("Upload session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidFileType { .. } => "INVALID_FILE_TYPE",
            AppError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::ExtractionTimeout { .. } => "EXTRACTION_TIMEOUT",
            AppError::ExtractionFailed { .. } => "EXTRACTION_FAILED",
            AppError::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            AppError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            AppError::MissingFile => "MISSING_FILE",
            AppError::InvalidUpload { .. } => "INVALID_UPLOAD",
            AppError::SessionNotFound { .. } => "SESSION_NOT_FOUND",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidFileType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ExtractionTimeout { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ExtractionFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UnsupportedType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::InvalidUpload { .. } => StatusCode::BAD_REQUEST,
            AppError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();
        let request_id = Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().to_rfc3339();

        tracing::error!(
            error_code = error_code,
            status_code = %status,
            request_id = %request_id,
            error_message = %message,
            "API error occurred"
        );

        let body = Json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message,
                "request_id": request_id,
                "timestamp": timestamp
            },
            "data": null
        }));

        (status, body).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::ExtractionFailed {
            message: format!("Failed to read file: {}", err),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            AppError::ExtractionFailed {
                message: "Document parser crashed on malformed input".to_string(),
            }
        } else {
            AppError::internal(format!("Extraction task cancelled: {}", err))
        }
    }
}

impl AppError {
    pub fn extraction_failed(message: impl Into<String>) -> Self {
        AppError::ExtractionFailed {
            message: message.into(),
        }
    }

    pub fn invalid_upload(message: impl Into<String>) -> Self {
        AppError::InvalidUpload {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
