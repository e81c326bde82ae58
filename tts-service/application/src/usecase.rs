use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use shared::{describe_validation_errors, ModelSlot, Uptime};
use tokio::sync::Mutex;
use uuid::Uuid;
use validator::Validate;

use tts_domain::{split_text_into_chunks, SynthesisRequest, TtsModel, VoicePreset};

use crate::{
    encode_wav_pcm16, ApplicationError, HealthResponse, SynthesizeSpeechRequest,
    SynthesizedAudio, VoiceInfo,
};

#[async_trait]
pub trait TtsUseCase: Send + Sync {
    async fn synthesize(
        &self,
        request: SynthesizeSpeechRequest,
    ) -> Result<SynthesizedAudio, ApplicationError>;

    fn list_voices(&self) -> Result<Vec<VoiceInfo>, ApplicationError>;

    fn health(&self) -> HealthResponse;
}

#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// Backbone repository id, reported as the model name.
    pub model: String,
    pub default_voice: String,
}

pub struct TtsUseCaseImpl {
    model: Arc<ModelSlot<TtsModel>>,
    descriptor: ModelDescriptor,
    uptime: Uptime,
    inference_lock: Mutex<()>,
}

impl TtsUseCaseImpl {
    pub fn new(model: Arc<ModelSlot<TtsModel>>, descriptor: ModelDescriptor) -> Self {
        Self {
            model,
            descriptor,
            uptime: Uptime::start(),
            inference_lock: Mutex::new(()),
        }
    }

    fn loaded_model(&self) -> Result<Arc<TtsModel>, ApplicationError> {
        self.model.get().ok_or(ApplicationError::ModelNotReady)
    }

    fn resolve_preset(
        &self,
        model: &TtsModel,
        requested: Option<&str>,
    ) -> Result<VoicePreset, ApplicationError> {
        // Only a missing or empty id falls back; anything else must match exactly.
        let voice_id = requested
            .filter(|voice| !voice.is_empty())
            .unwrap_or(self.descriptor.default_voice.as_str());

        let voices = model.catalog.list_voices();
        let Some(summary) = voices.iter().find(|voice| voice.id == voice_id).cloned() else {
            return Err(ApplicationError::UnknownVoice {
                voice: voice_id.to_string(),
                available: voices.into_iter().map(|voice| voice.id).collect(),
            });
        };

        let reference = model
            .catalog
            .voice_reference(voice_id)
            .map_err(ApplicationError::synthesis_failed)?;
        Ok(VoicePreset::new(summary, reference))
    }
}

#[async_trait]
impl TtsUseCase for TtsUseCaseImpl {
    async fn synthesize(
        &self,
        request: SynthesizeSpeechRequest,
    ) -> Result<SynthesizedAudio, ApplicationError> {
        request
            .validate()
            .map_err(|errors| ApplicationError::Validation(describe_validation_errors(&errors)))?;
        let model = self.loaded_model()?;
        let preset = self.resolve_preset(&model, request.voice.as_deref())?;

        let request_id = Uuid::new_v4();
        let started = Instant::now();
        let chunks = split_text_into_chunks(&request.text, request.max_chars_chunk);
        tracing::debug!(
            %request_id,
            voice = %preset.id,
            text_chars = request.text.chars().count(),
            chunk_count = chunks.len(),
            "starting synthesis"
        );

        let mut waveform = Vec::new();
        {
            let _inference = self.inference_lock.lock().await;
            for (index, chunk) in chunks.into_iter().enumerate() {
                let samples = model
                    .synthesizer
                    .synthesize(SynthesisRequest {
                        text: chunk,
                        ref_codes: preset.ref_codes.clone(),
                        ref_text: preset.ref_text.clone(),
                        temperature: request.temperature,
                    })
                    .await
                    .map_err(|err| {
                        tracing::error!(
                            %request_id,
                            chunk = index,
                            error = %err,
                            "chunk synthesis failed"
                        );
                        ApplicationError::synthesis_failed(err)
                    })?;
                waveform.extend(samples);
            }
        }

        if waveform.is_empty() {
            return Err(ApplicationError::Inference(
                "Failed to generate audio".to_string(),
            ));
        }

        let sample_rate_hz = model.synthesizer.sample_rate_hz();
        let wav = encode_wav_pcm16(&waveform, sample_rate_hz)?;
        let duration_seconds = waveform.len() as f64 / sample_rate_hz as f64;
        let process_time_seconds = started.elapsed().as_secs_f64();

        tracing::info!(
            %request_id,
            voice = %preset.id,
            text_len = request.text.chars().count(),
            audio_seconds = duration_seconds,
            process_seconds = process_time_seconds,
            rtf = duration_seconds / process_time_seconds.max(f64::EPSILON),
            "synthesis completed"
        );

        Ok(SynthesizedAudio {
            wav,
            voice: preset.id,
            duration_seconds,
            process_time_seconds,
        })
    }

    fn list_voices(&self) -> Result<Vec<VoiceInfo>, ApplicationError> {
        let model = self.loaded_model()?;

        let voices = model
            .catalog
            .list_voices()
            .into_iter()
            .map(|voice| {
                let ref_text = match model.catalog.voice_reference(&voice.id) {
                    Ok(reference) => reference.text,
                    Err(err) => {
                        tracing::warn!(
                            voice = %voice.id,
                            error = %err,
                            "voice data unavailable; listing without reference text"
                        );
                        String::new()
                    }
                };
                VoiceInfo {
                    id: voice.id,
                    description: voice.description,
                    ref_text,
                }
            })
            .collect();
        Ok(voices)
    }

    fn health(&self) -> HealthResponse {
        let status = if self.model.is_ready() { "ok" } else { "loading" };
        HealthResponse {
            status: status.to_string(),
            model: self.descriptor.model.clone(),
            default_voice: self.descriptor.default_voice.clone(),
            uptime_seconds: self.uptime.seconds(),
        }
    }
}
