use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionTask {
    Transcribe,
    Translate,
}

impl TranscriptionTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionTask::Transcribe => "transcribe",
            TranscriptionTask::Translate => "translate",
        }
    }
}

impl FromStr for TranscriptionTask {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "transcribe" => Ok(TranscriptionTask::Transcribe),
            "translate" => Ok(TranscriptionTask::Translate),
            other => Err(DomainError::invalid_input(&format!(
                "task must be `transcribe` or `translate`, got `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSelection {
    Auto,
    Code(String),
}

impl LanguageSelection {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "" => Err(DomainError::invalid_input("language cannot be empty")),
            "auto" => Ok(LanguageSelection::Auto),
            _ => Ok(LanguageSelection::Code(normalized)),
        }
    }

    /// `None` asks the model to detect the language.
    pub fn code(&self) -> Option<&str> {
        match self {
            LanguageSelection::Auto => None,
            LanguageSelection::Code(code) => Some(code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VadOptions {
    pub min_silence_duration_ms: u32,
}

impl VadOptions {
    pub const DEFAULT_MIN_SILENCE_MS: u32 = 500;
}

impl Default for VadOptions {
    fn default() -> Self {
        Self {
            min_silence_duration_ms: Self::DEFAULT_MIN_SILENCE_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio_path: PathBuf,
    pub language: LanguageSelection,
    pub task: TranscriptionTask,
    pub vad: Option<VadOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionInfo {
    pub language: String,
    pub language_probability: f64,
    pub duration: f64,
}

/// Segments as the model yields them, in chronological order.
pub type SegmentStream = Box<dyn Iterator<Item = Result<TranscriptSegment, DomainError>> + Send>;

pub struct TranscriptionOutput {
    pub segments: SegmentStream,
    pub info: TranscriptionInfo,
}

impl TranscriptionOutput {
    pub fn from_segments(segments: Vec<TranscriptSegment>, info: TranscriptionInfo) -> Self {
        Self {
            segments: Box::new(segments.into_iter().map(Ok)),
            info,
        }
    }
}

impl fmt::Debug for TranscriptionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptionOutput")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}
