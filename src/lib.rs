//! PoliGap document validation service
//!
//! Gates, samples and classifies uploaded documents to decide whether they
//! read like policy documents before they enter the gap analysis.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::{create_router, AppState};
