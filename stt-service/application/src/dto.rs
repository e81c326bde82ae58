use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use stt_domain::{TranscriptSegment, TranscriptionTask};

#[derive(Debug, Clone, Validate)]
pub struct TranscribeAudioRequest {
    #[validate(length(min = 1, message = "uploaded audio file is empty"))]
    pub audio: Vec<u8>,
    pub filename: Option<String>,
    #[validate(length(min = 1, max = 16))]
    pub language: String,
    #[validate(custom(function = "validate_task"))]
    pub task: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeAudioResponse {
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
    pub language: String,
    pub language_probability: f64,
    pub duration: f64,
    pub process_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub device: String,
    pub uptime_seconds: f64,
}

fn validate_task(task: &str) -> Result<(), ValidationError> {
    task.parse::<TranscriptionTask>()
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("task")
                .with_message("task must be `transcribe` or `translate`".into())
        })
}
