use axum::{extract::State, response::Json};

use tts_application::VoiceInfo;

use crate::{
    error::{error_mapper, HttpError},
    AppState,
};

pub async fn list_voices(State(state): State<AppState>) -> Result<Json<Vec<VoiceInfo>>, HttpError> {
    state.usecase.list_voices().map(Json).map_err(|error| {
        tracing::warn!(error = %error, "voice listing failed");
        error_mapper(error)
    })
}
