use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use super::AppState;
use crate::error::AppResult;

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    info!("Health check requested");

    let timestamp = chrono::Utc::now().to_rfc3339();
    let policy = state.pipeline.policy();

    let limiter = state.limiter.metrics();

    let response = json!({
        "status": "healthy",
        "timestamp": timestamp,
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "file_gate": true,
            "pdf_extractor": true,
            "plain_text_extractor": true,
            "policy_classifier": true
        },
        "limits": {
            "max_file_size_bytes": policy.max_file_size_bytes,
            "allowed_mime_types": policy.allowed_mime_types,
            "pdf_page_cap": policy.pdf.page_cap,
            "pdf_timeout_ms": policy.pdf.timeout.as_millis() as u64,
            "plain_text_timeout_ms": policy.plain_text.timeout.as_millis() as u64
        },
        "sessions": {
            "active": state.sessions.len(),
            "capacity": state.sessions.capacity()
        },
        "rate_limiting": {
            "max_concurrent_requests": limiter.max_concurrent,
            "total_requests": limiter.total_requests,
            "rejected_requests": limiter.rejected_requests,
            "available_permits": limiter.available_permits,
            "rejection_rate": limiter.rejection_rate()
        }
    });

    info!(
        total_requests = limiter.total_requests,
        rejected_requests = limiter.rejected_requests,
        "Health check completed"
    );

    Ok(Json(response))
}

/// Readiness check endpoint
pub async fn ready_handler(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    if state.pipeline.gate().max_size_bytes() > 0 {
        info!("Readiness check passed");
        Ok(StatusCode::OK)
    } else {
        info!("Readiness check failed - validation pipeline misconfigured");
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
