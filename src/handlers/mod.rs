pub mod health;
pub mod sessions;
pub mod validate;

pub use health::*;
pub use sessions::*;
pub use validate::*;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{logging_middleware, rate_limit_middleware, ConcurrencyLimiter};
use crate::services::{SessionRegistry, ValidationPipeline};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<ValidationPipeline>,
    pub sessions: Arc<SessionRegistry>,
    pub limiter: Arc<ConcurrencyLimiter>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sessions = SessionRegistry::new(config.max_sessions, config.session_idle_ttl());
        let limiter = ConcurrencyLimiter::new(config.max_concurrent_requests);
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(ValidationPipeline::default()),
            sessions: Arc::new(sessions),
            limiter: Arc::new(limiter),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_body_bytes();

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api/v1/validate", post(validate_handler))
        .route("/api/v1/validate/binary", post(validate_binary_handler))
        .route("/api/v1/sessions/:session_id/verdict", get(session_verdict_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(axum::middleware::from_fn(logging_middleware))
                .layer(axum::middleware::from_fn_with_state(
                    state.limiter.clone(),
                    rate_limit_middleware,
                )),
        )
        .with_state(state)
}
