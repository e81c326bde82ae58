use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tts_application::TtsUseCase;

pub mod error;
pub mod handlers;

pub use error::{error_mapper, HttpError};
pub use handlers::*;

#[derive(Clone)]
pub struct AppState {
    pub usecase: Arc<dyn TtsUseCase>,
}

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let tts_route = post(synthesize_speech).layer(DefaultBodyLimit::max(max_body_bytes));

    Router::new()
        .route("/api/health", get(health))
        .route("/api/voices", get(list_voices))
        .route("/api/tts", tts_route)
        .with_state(state)
}
