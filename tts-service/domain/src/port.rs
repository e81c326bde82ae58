use std::sync::Arc;

use async_trait::async_trait;
use shared::ModelHandle;

use crate::{DomainError, SynthesisRequest, VoiceReference, VoiceSummary};

/// Read-only table of voice presets, fixed after load.
pub trait VoiceCatalogPort: Send + Sync {
    /// Voices in catalog order.
    fn list_voices(&self) -> Vec<VoiceSummary>;

    fn voice_reference(&self, voice_id: &str) -> Result<VoiceReference, DomainError>;

    fn contains(&self, voice_id: &str) -> bool {
        self.list_voices().iter().any(|voice| voice.id == voice_id)
    }
}

#[async_trait]
pub trait SpeechSynthesisPort: Send + Sync {
    /// Mono waveform for one chunk, at [`SpeechSynthesisPort::sample_rate_hz`].
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<f32>, DomainError>;

    fn sample_rate_hz(&self) -> u32;

    async fn close(&self) {}
}

/// The loaded synthesis model together with the voices it was loaded with.
#[derive(Clone)]
pub struct TtsModel {
    pub catalog: Arc<dyn VoiceCatalogPort>,
    pub synthesizer: Arc<dyn SpeechSynthesisPort>,
}

#[async_trait]
impl ModelHandle for TtsModel {
    async fn close(&self) {
        self.synthesizer.close().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct EmptyCatalog;

    impl VoiceCatalogPort for EmptyCatalog {
        fn list_voices(&self) -> Vec<VoiceSummary> {
            vec![VoiceSummary {
                id: "Doan".to_string(),
                description: "Nữ miền Nam".to_string(),
            }]
        }

        fn voice_reference(&self, voice_id: &str) -> Result<VoiceReference, DomainError> {
            Err(DomainError::not_found(voice_id))
        }
    }

    #[derive(Default)]
    struct CountingSynth {
        closes: AtomicUsize,
    }

    #[async_trait]
    impl SpeechSynthesisPort for CountingSynth {
        async fn synthesize(&self, _request: SynthesisRequest) -> Result<Vec<f32>, DomainError> {
            Ok(Vec::new())
        }

        fn sample_rate_hz(&self) -> u32 {
            crate::SPEECH_SAMPLE_RATE_HZ
        }

        async fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn closing_the_model_closes_the_synthesizer() {
        let synth = Arc::new(CountingSynth::default());
        let model = TtsModel {
            catalog: Arc::new(EmptyCatalog),
            synthesizer: synth.clone(),
        };

        assert!(model.catalog.contains("Doan"));
        assert!(!model.catalog.contains("Vinh"));
        model.close().await;
        assert_eq!(synth.closes.load(Ordering::SeqCst), 1);
    }
}
