use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::Json,
};

use stt_application::{TranscribeAudioRequest, TranscribeAudioResponse};

use crate::{
    error::{error_mapper, HttpError},
    AppState,
};

#[derive(Default)]
struct TranscribeForm {
    audio: Option<Vec<u8>>,
    filename: Option<String>,
    language: Option<String>,
    task: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<TranscribeForm, HttpError> {
    let mut form = TranscribeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|err| HttpError::Validation {
        message: err.body_text(),
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|err| HttpError::Validation {
                    message: err.body_text(),
                })?;
                form.audio = Some(bytes.to_vec());
            }
            "language" => form.language = Some(field_text(field).await?),
            "task" => form.task = Some(field_text(field).await?),
            other => {
                tracing::debug!(field = other, "ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

async fn field_text(field: Field<'_>) -> Result<String, HttpError> {
    field.text().await.map_err(|err| HttpError::Validation {
        message: err.body_text(),
    })
}

pub async fn transcribe_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<TranscribeAudioResponse>), HttpError> {
    let multipart = multipart.map_err(|rejection| HttpError::Validation {
        message: rejection.body_text(),
    })?;
    let form = read_form(multipart).await.inspect_err(|error| {
        tracing::warn!(error = ?error, "rejected transcribe upload");
    })?;
    let Some(audio) = form.audio else {
        tracing::warn!("transcribe upload has no `file` part");
        return Err(HttpError::Validation {
            message: "file: field required".to_string(),
        });
    };

    let request = TranscribeAudioRequest {
        audio,
        filename: form.filename,
        language: form
            .language
            .unwrap_or_else(|| state.defaults.language.clone()),
        task: form.task.unwrap_or_else(|| state.defaults.task.clone()),
    };

    tracing::info!(
        bytes = request.audio.len(),
        filename = request.filename.as_deref().unwrap_or("-"),
        language = %request.language,
        task = %request.task,
        "received transcribe request"
    );

    match state.usecase.transcribe(request).await {
        Ok(result) => {
            tracing::info!(
                segment_count = result.segments.len(),
                duration = result.duration,
                process_time = result.process_time,
                "transcribe request completed"
            );
            Ok((StatusCode::OK, Json(result)))
        }
        Err(error) => {
            tracing::error!(error = %error, "transcribe request failed");
            Err(error_mapper(error))
        }
    }
}
