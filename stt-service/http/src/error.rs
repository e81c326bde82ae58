use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use stt_application::ApplicationError;

#[derive(Debug)]
pub enum HttpError {
    Validation { message: String },
    ServiceUnavailable { message: String },
    Internal { message: String },
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::Validation { message } => (StatusCode::UNPROCESSABLE_ENTITY, message),
            HttpError::ServiceUnavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            HttpError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (
            status,
            Json(json!({
                "detail": message,
            })),
        )
            .into_response()
    }
}

pub fn error_mapper(error: ApplicationError) -> HttpError {
    match error {
        ApplicationError::Validation(message) => HttpError::Validation { message },
        ApplicationError::ModelNotReady => HttpError::ServiceUnavailable {
            message: error.to_string(),
        },
        ApplicationError::Inference(message) => HttpError::Internal { message },
    }
}
