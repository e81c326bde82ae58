use thiserror::Error;
use tts_domain::DomainError;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("{0}")]
    Validation(String),

    #[error("Voice '{voice}' not found. Available: {available:?}")]
    UnknownVoice {
        voice: String,
        available: Vec<String>,
    },

    #[error("Model not loaded yet")]
    ModelNotReady,

    #[error("{0}")]
    Inference(String),
}

impl ApplicationError {
    pub fn synthesis_failed(error: impl std::fmt::Display) -> Self {
        ApplicationError::Inference(format!("Synthesis failed: {error}"))
    }
}

impl From<DomainError> for ApplicationError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidInput(message) => ApplicationError::Validation(message),
            other => ApplicationError::synthesis_failed(other),
        }
    }
}
