use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use stt_application::SttUseCase;

pub mod error;
pub mod handlers;

pub use error::{error_mapper, HttpError};
pub use handlers::*;

/// Form values applied when the client omits a field.
#[derive(Debug, Clone)]
pub struct FormDefaults {
    pub language: String,
    pub task: String,
}

#[derive(Clone)]
pub struct AppState {
    pub usecase: Arc<dyn SttUseCase>,
    pub defaults: FormDefaults,
}

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let transcribe_route =
        post(transcribe_audio).layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/api/health", get(health))
        .route("/api/transcribe", transcribe_route)
        .with_state(state)
}
