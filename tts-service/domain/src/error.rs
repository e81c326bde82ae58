use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{service} error: {message}")]
    ExternalService { service: String, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid_input(message: &str) -> Self {
        DomainError::InvalidInput(message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        DomainError::NotFound(message.to_string())
    }

    pub fn external_service_error(service: &str, message: &str) -> Self {
        DomainError::ExternalService {
            service: service.to_string(),
            message: message.to_string(),
        }
    }

    pub fn internal_error(message: &str) -> Self {
        DomainError::Internal(message.to_string())
    }
}
