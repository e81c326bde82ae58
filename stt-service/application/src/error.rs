use stt_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("{0}")]
    Validation(String),

    #[error("Model not loaded yet")]
    ModelNotReady,

    #[error("{0}")]
    Inference(String),
}

impl ApplicationError {
    pub fn inference(error: impl std::fmt::Display) -> Self {
        ApplicationError::Inference(error.to_string())
    }
}

impl From<DomainError> for ApplicationError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidInput(message) => ApplicationError::Validation(message),
            other => ApplicationError::Inference(other.to_string()),
        }
    }
}
