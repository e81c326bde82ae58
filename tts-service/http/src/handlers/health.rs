use axum::{extract::State, response::Json};

use tts_application::HealthResponse;

use crate::AppState;

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.usecase.health())
}
