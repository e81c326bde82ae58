pub mod audio;
#[cfg(feature = "whisper-runtime")]
mod whisper;

use std::sync::Arc;

use stt_domain::{DomainError, TranscriptionPort};

pub use audio::{decode_audio_file, DecodedAudio, WHISPER_SAMPLE_RATE};
#[cfg(feature = "whisper-runtime")]
pub use whisper::WhisperTranscriptionAdapter;

#[derive(Debug, Clone)]
pub struct WhisperAdapterConfig {
    pub model_path: String,
    /// Name reported by health checks, e.g. `medium`.
    pub model_id: String,
    pub device: String,
    pub threads: usize,
    pub vad_model_path: Option<String>,
}

/// Builds the transcription port for the configured model. Blocking.
pub fn load_transcription_port(
    config: WhisperAdapterConfig,
) -> Result<Arc<dyn TranscriptionPort>, DomainError> {
    #[cfg(feature = "whisper-runtime")]
    {
        let adapter = WhisperTranscriptionAdapter::load(config)?;
        Ok(Arc::new(adapter))
    }

    #[cfg(not(feature = "whisper-runtime"))]
    {
        Err(DomainError::external_service_error(
            "whisper",
            &format!(
                "cannot load `{}`: built without the `whisper-runtime` feature",
                config.model_path
            ),
        ))
    }
}
