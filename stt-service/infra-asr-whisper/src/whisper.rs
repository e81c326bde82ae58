use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::ModelHandle;
use stt_domain::{
    segment_from_centiseconds, DomainError, LanguageSelection, TranscriptionInfo, TranscriptionOutput,
    TranscriptionPort, TranscriptionRequest, TranscriptionTask,
};
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState,
    WhisperVadParams,
};

use crate::{audio::decode_audio_file, WhisperAdapterConfig};

fn whisper_error(stage: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::external_service_error("whisper", &format!("{stage}: {err}"))
}

pub struct WhisperTranscriptionAdapter {
    config: WhisperAdapterConfig,
    runtime: Arc<Mutex<Option<WhisperContext>>>,
}

impl WhisperTranscriptionAdapter {
    /// Loads the ggml model from disk. Blocking; run it off the async workers.
    pub fn load(config: WhisperAdapterConfig) -> Result<Self, DomainError> {
        let mut context_params = WhisperContextParameters::default();
        context_params.use_gpu = !config.device.eq_ignore_ascii_case("cpu");

        tracing::info!(
            model = %config.model_id,
            path = %config.model_path,
            device = %config.device,
            "loading whisper model"
        );
        let context = WhisperContext::new_with_params(&config.model_path, context_params)
            .map_err(|err| whisper_error("failed to load model", err))?;

        Ok(Self {
            config,
            runtime: Arc::new(Mutex::new(Some(context))),
        })
    }
}

#[async_trait]
impl ModelHandle for WhisperTranscriptionAdapter {
    async fn close(&self) {
        let released = match self.runtime.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if released.is_some() {
            tracing::info!(model = %self.config.model_id, "whisper context freed");
        }
    }
}

#[async_trait]
impl TranscriptionPort for WhisperTranscriptionAdapter {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionOutput, DomainError> {
        let config = self.config.clone();
        let runtime = Arc::clone(&self.runtime);

        tokio::task::spawn_blocking(move || transcribe_with_runtime(&config, &runtime, request))
            .await
            .map_err(|err| DomainError::internal_error(&format!("whisper task failed: {err}")))?
    }
}

fn transcribe_with_runtime(
    config: &WhisperAdapterConfig,
    runtime: &Mutex<Option<WhisperContext>>,
    request: TranscriptionRequest,
) -> Result<TranscriptionOutput, DomainError> {
    let audio = decode_audio_file(&request.audio_path)?;

    let guard = runtime
        .lock()
        .map_err(|_| DomainError::internal_error("whisper runtime lock poisoned"))?;
    let context = guard
        .as_ref()
        .ok_or_else(|| DomainError::internal_error("whisper model already released"))?;
    let mut state = context
        .create_state()
        .map_err(|err| whisper_error("failed to create state", err))?;

    let threads = config.threads.max(1);
    let (language, language_probability) = match &request.language {
        LanguageSelection::Code(code) => (code.clone(), 1.0),
        LanguageSelection::Auto => detect_language(&mut state, &audio.samples, threads)?,
    };

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_n_threads(threads as i32);
    params.set_language(Some(language.as_str()));
    params.set_translate(request.task == TranscriptionTask::Translate);
    params.set_no_timestamps(false);
    params.set_print_realtime(false);
    params.set_print_progress(false);
    params.set_print_timestamps(false);
    params.set_print_special(false);

    match (&config.vad_model_path, request.vad) {
        (Some(vad_model), Some(vad)) => {
            let mut vad_params = WhisperVadParams::new();
            vad_params.set_min_silence_duration(vad.min_silence_duration_ms as i32);
            params.enable_vad(true);
            params.set_vad_model_path(Some(vad_model.as_str()));
            params.set_vad_params(vad_params);
        }
        (None, Some(_)) => {
            tracing::debug!("no VAD model configured; decoding without silence filtering");
        }
        _ => {}
    }

    state
        .full(params, &audio.samples)
        .map_err(|err| whisper_error("full decode failed", err))?;

    let mut segments = Vec::new();
    for idx in 0..state.full_n_segments() {
        let Some(segment) = state.get_segment(idx) else {
            continue;
        };
        let text = segment
            .to_str_lossy()
            .map(|cow| cow.to_string())
            .unwrap_or_default();
        segments.push(segment_from_centiseconds(
            segment.start_timestamp(),
            segment.end_timestamp(),
            text,
        ));
    }

    Ok(TranscriptionOutput::from_segments(
        segments,
        TranscriptionInfo {
            language,
            language_probability,
            duration: audio.duration_seconds,
        },
    ))
}

fn detect_language(
    state: &mut WhisperState,
    samples: &[f32],
    threads: usize,
) -> Result<(String, f64), DomainError> {
    state
        .pcm_to_mel(samples, threads)
        .map_err(|err| whisper_error("mel spectrogram failed", err))?;
    let (lang_id, probabilities) = state
        .lang_detect(0, threads)
        .map_err(|err| whisper_error("language detection failed", err))?;

    let language = whisper_rs::get_lang_str(lang_id)
        .ok_or_else(|| whisper_error("language detection failed", format!("unknown id {lang_id}")))?
        .to_string();
    let probability = usize::try_from(lang_id)
        .ok()
        .and_then(|idx| probabilities.get(idx).copied())
        .unwrap_or(0.0) as f64;

    tracing::debug!(language = %language, probability, "detected language");
    Ok((language, probability))
}
