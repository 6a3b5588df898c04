use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartError,
        rejection::BytesRejection,
        Multipart, State,
    },
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    response::Json,
};
use std::time::Instant;
use tracing::{info, warn, debug, error};

use super::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{CandidateFile, DocumentSource, ValidateData, ValidateResponse};

pub const SESSION_HEADER: &str = "x-upload-session";
pub const FILE_NAME_HEADER: &str = "x-file-name";

pub async fn validate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Json<ValidateResponse>> {
    let start = Instant::now();
    let request_id = request_id(&headers);

    info!(request_id = %request_id, "Starting document validation request");

    let file = match extract_file_from_multipart(&state, &headers, &mut multipart).await {
        Ok(file) => {
            info!(
                request_id = %request_id,
                file_name = %file.name,
                file_size = file.size,
                mime_type = %file.mime_type,
                "File extracted from multipart form"
            );
            file
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Failed to extract file from multipart");
            return Err(e);
        }
    };

    run_validation(&state, &headers, &request_id, file, start).await
}

/// Direct binary upload: the body is the document, `Content-Type` its MIME
/// type and `x-file-name` its name.
pub async fn validate_binary_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<ValidateResponse>> {
    let start = Instant::now();
    let request_id = request_id(&headers);

    info!(request_id = %request_id, "Starting binary document validation request");

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            warn!(request_id = %request_id, "Body exceeds upload limit");
            body_too_large(&state, &headers)
        } else {
            AppError::invalid_upload(format!("Failed to read request body: {}", rejection.body_text()))
        }
    })?;

    if body.is_empty() {
        warn!(request_id = %request_id, "Empty body received");
        return Err(AppError::MissingFile);
    }

    let file_name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("upload")
        .to_string();
    let content_type = headers
        .get("content-type")
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("");

    let file = CandidateFile::new(file_name, body).with_mime_type(content_type);

    run_validation(&state, &headers, &request_id, file, start).await
}

async fn run_validation(
    state: &AppState,
    headers: &HeaderMap,
    request_id: &str,
    file: CandidateFile,
    start: Instant,
) -> AppResult<Json<ValidateResponse>> {
    let session = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(|session_id| state.sessions.session(session_id.trim()));
    let request_token = session.as_ref().map(|s| s.begin());

    let verdict = match state.pipeline.validate(&file).await {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "File rejected at gate");
            if let (Some(session), Some(token)) = (&session, request_token) {
                session.reject(token, &e);
            }
            return Err(e);
        }
    };

    let applied = match (&session, request_token) {
        (Some(session), Some(token)) => session.apply(token, verdict.clone()),
        _ => false,
    };
    if request_token.is_some() && !applied {
        debug!(request_id = %request_id, ?request_token, "Newer upload in flight, verdict not applied");
    }

    let total_time = start.elapsed().as_millis() as u64;

    info!(
        request_id = %request_id,
        is_valid = verdict.is_valid,
        confidence = ?verdict.confidence(),
        total_time_ms = total_time,
        "Request completed successfully"
    );

    Ok(Json(ValidateResponse::new(
        ValidateData {
            file_name: file.name().to_string(),
            mime_type: file.mime_type().to_string(),
            size_bytes: file.size_bytes(),
            request_token,
            applied,
            verdict,
        },
        total_time,
    )))
}

async fn extract_file_from_multipart(
    state: &AppState,
    headers: &HeaderMap,
    multipart: &mut Multipart,
) -> AppResult<CandidateFile> {
    let read_error = |e: MultipartError, what: &str| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            body_too_large(state, headers)
        } else {
            AppError::invalid_upload(format!("Failed to read {}: {}", what, e))
        }
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| read_error(e, "multipart field"))?
    {
        let field_name = field.name().unwrap_or("");

        if field_name == "file" {
            let file_name = field.file_name()
                .unwrap_or("upload")
                .to_string();

            let content_type = field.content_type()
                .map(|ct| ct.to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| read_error(e, "file data"))?;

            if data.is_empty() {
                return Err(AppError::MissingFile);
            }

            let mut file = CandidateFile::new(file_name, data);
            if let Some(mime_type) = content_type {
                file = file.with_mime_type(mime_type);
            }

            debug!(
                "Extracted file: {} ({} bytes, type: {})",
                file.name,
                file.size,
                file.mime_type
            );

            return Ok(file);
        }
    }

    Err(AppError::MissingFile)
}

/// Bodies over `MAX_UPLOAD_BODY_MB` are cut off before the gate sees them,
/// so they are reported with the gate's own error.
fn body_too_large(state: &AppState, headers: &HeaderMap) -> AppError {
    let size = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(state.config.max_upload_body_bytes() as u64);
    AppError::FileTooLarge {
        size,
        limit: state.pipeline.gate().max_size_bytes(),
    }
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(crate::middleware::REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()[..8].to_string())
}
