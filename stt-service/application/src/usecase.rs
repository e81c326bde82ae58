use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use shared::{describe_validation_errors, ModelSlot, Uptime};
use tokio::sync::Mutex;
use uuid::Uuid;
use validator::Validate;

use stt_domain::{
    normalize_segment, round_to, transcript_text, LanguageSelection, TranscriptionOutput,
    TranscriptionPort, TranscriptionRequest, TranscriptionTask, VadOptions,
};

use crate::{
    ApplicationError, HealthResponse, ScopedUpload, TranscribeAudioRequest,
    TranscribeAudioResponse,
};

#[async_trait]
pub trait SttUseCase: Send + Sync {
    async fn transcribe(
        &self,
        request: TranscribeAudioRequest,
    ) -> Result<TranscribeAudioResponse, ApplicationError>;

    fn health(&self) -> HealthResponse;
}

/// What the health endpoint reports, known before the model finishes loading.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    pub model: String,
    pub device: String,
}

pub struct SttUseCaseImpl {
    model: Arc<ModelSlot<dyn TranscriptionPort>>,
    descriptor: ModelDescriptor,
    vad: VadOptions,
    uptime: Uptime,
    inference_lock: Mutex<()>,
}

impl SttUseCaseImpl {
    pub fn new(
        model: Arc<ModelSlot<dyn TranscriptionPort>>,
        descriptor: ModelDescriptor,
        vad: VadOptions,
    ) -> Self {
        Self {
            model,
            descriptor,
            vad,
            uptime: Uptime::start(),
            inference_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl SttUseCase for SttUseCaseImpl {
    async fn transcribe(
        &self,
        request: TranscribeAudioRequest,
    ) -> Result<TranscribeAudioResponse, ApplicationError> {
        request
            .validate()
            .map_err(|errors| ApplicationError::Validation(describe_validation_errors(&errors)))?;

        let TranscribeAudioRequest {
            audio,
            filename,
            language,
            task,
        } = request;
        let language = LanguageSelection::parse(&language)?;
        let task = task.parse::<TranscriptionTask>()?;
        let model = self.model.get().ok_or(ApplicationError::ModelNotReady)?;

        let request_id = Uuid::new_v4();
        tracing::debug!(
            %request_id,
            bytes = audio.len(),
            filename = filename.as_deref().unwrap_or("-"),
            language = language.code().unwrap_or("auto"),
            task = task.as_str(),
            "starting transcription"
        );

        let upload = tokio::task::spawn_blocking(move || {
            ScopedUpload::create(&audio, filename.as_deref())
        })
        .await
        .map_err(|err| ApplicationError::inference(format!("upload staging task failed: {err}")))?
        .map_err(|err| ApplicationError::inference(format!("failed to stage upload: {err}")))?;

        let started = Instant::now();
        let (segments, info) = {
            let _inference = self.inference_lock.lock().await;
            let TranscriptionOutput { segments, info } = model
                .transcribe(TranscriptionRequest {
                    audio_path: upload.path().to_path_buf(),
                    language,
                    task,
                    vad: Some(self.vad),
                })
                .await
                .map_err(ApplicationError::inference)?;
            let segments = segments
                .map(|segment| segment.map(normalize_segment))
                .collect::<Result<Vec<_>, _>>()
                .map_err(ApplicationError::inference)?;
            (segments, info)
        };
        let elapsed = started.elapsed().as_secs_f64();
        drop(upload);

        let text = transcript_text(&segments);
        tracing::info!(
            %request_id,
            language = %info.language,
            audio_seconds = info.duration,
            process_seconds = elapsed,
            segment_count = segments.len(),
            "transcription completed"
        );

        Ok(TranscribeAudioResponse {
            text,
            segments,
            language: info.language,
            language_probability: round_to(info.language_probability, 3),
            duration: round_to(info.duration, 2),
            process_time: round_to(elapsed, 2),
        })
    }

    fn health(&self) -> HealthResponse {
        let status = if self.model.is_ready() { "ok" } else { "loading" };
        HealthResponse {
            status: status.to_string(),
            model: self.descriptor.model.clone(),
            device: self.descriptor.device.clone(),
            uptime_seconds: self.uptime.seconds(),
        }
    }
}
