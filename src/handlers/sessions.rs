use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::debug;

use super::AppState;
use crate::error::{AppError, AppResult};
use crate::models::SessionVerdictResponse;

/// Outcome of the latest upload of a session: its verdict, or the gate
/// rejection if the file never got that far.
pub async fn session_verdict_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<SessionVerdictResponse>> {
    let (request_token, outcome) = state
        .sessions
        .get(&session_id)
        .and_then(|session| session.current())
        .ok_or_else(|| AppError::SessionNotFound {
            session_id: session_id.clone(),
        })?;

    debug!(session_id = %session_id, request_token, "Returning session verdict");

    Ok(Json(SessionVerdictResponse::new(session_id, request_token, outcome)))
}
