use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use shared::ValidatedJson;

use tts_application::SynthesizeSpeechRequest;

use crate::{
    error::{error_mapper, HttpError},
    AppState,
};

pub const PROCESS_TIME_HEADER: &str = "x-process-time";
pub const AUDIO_DURATION_HEADER: &str = "x-audio-duration";

fn seconds_header(seconds: f64) -> HeaderValue {
    HeaderValue::from_str(&format!("{seconds:.3}")).unwrap_or(HeaderValue::from_static("0.000"))
}

pub async fn synthesize_speech(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SynthesizeSpeechRequest>,
) -> Result<Response, HttpError> {
    tracing::info!(
        text_chars = request.text.chars().count(),
        voice = request.voice.as_deref().unwrap_or("default"),
        temperature = request.temperature,
        max_chars_chunk = request.max_chars_chunk,
        "received tts request"
    );

    match state.usecase.synthesize(request).await {
        Ok(audio) => {
            tracing::info!(
                voice = %audio.voice,
                bytes = audio.wav.len(),
                duration = audio.duration_seconds,
                process_time = audio.process_time_seconds,
                "tts request completed"
            );
            let headers = [
                (header::CONTENT_TYPE, HeaderValue::from_static("audio/wav")),
                (
                    header::CONTENT_DISPOSITION,
                    HeaderValue::from_static("attachment; filename=speech.wav"),
                ),
            ];
            let timings = [
                (PROCESS_TIME_HEADER, seconds_header(audio.process_time_seconds)),
                (AUDIO_DURATION_HEADER, seconds_header(audio.duration_seconds)),
            ];
            Ok((StatusCode::OK, headers, timings, audio.wav).into_response())
        }
        Err(error) => {
            tracing::error!(error = %error, "tts request failed");
            Err(error_mapper(error))
        }
    }
}
