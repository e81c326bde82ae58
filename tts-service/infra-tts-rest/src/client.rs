use std::{io::Cursor, time::Duration};

use async_trait::async_trait;
use hound::{SampleFormat, WavReader};
use reqwest::{Client, Response};
use serde::Serialize;
use tts_domain::{DomainError, SpeechSynthesisPort, SynthesisRequest, SPEECH_SAMPLE_RATE_HZ};

const SERVICE: &str = "tts-runtime";

#[derive(Debug, Clone)]
pub struct RestRuntimeConfig {
    pub base_url: String,
    pub backbone_repo: String,
    pub backbone_device: String,
    pub codec_repo: String,
    pub codec_device: String,
    pub memory_util: f32,
    pub request_timeout: Duration,
    pub readiness_attempts: u32,
    pub readiness_delay: Duration,
}

#[derive(Debug, Serialize)]
struct LoadModelBody<'a> {
    backbone_repo: &'a str,
    backbone_device: &'a str,
    codec_repo: &'a str,
    codec_device: &'a str,
    memory_util: f32,
}

/// Client for an acoustic-model runtime process that speaks the `/v1` REST protocol.
pub struct RestSynthesisClient {
    client: Client,
    config: RestRuntimeConfig,
}

fn runtime_error(message: String) -> DomainError {
    DomainError::external_service_error(SERVICE, &message)
}

impl RestSynthesisClient {
    pub fn new(config: RestRuntimeConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| runtime_error(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, config })
    }

    /// Asks the runtime to load the model, then waits until it reports healthy.
    pub async fn connect(config: RestRuntimeConfig) -> Result<Self, DomainError> {
        let runtime = Self::new(config)?;
        runtime.load_model().await?;
        runtime.wait_until_ready().await?;
        Ok(runtime)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn load_model(&self) -> Result<(), DomainError> {
        tracing::info!(
            runtime = %self.config.base_url,
            backbone = %self.config.backbone_repo,
            backbone_device = %self.config.backbone_device,
            codec = %self.config.codec_repo,
            codec_device = %self.config.codec_device,
            "requesting TTS model load"
        );

        let body = LoadModelBody {
            backbone_repo: &self.config.backbone_repo,
            backbone_device: &self.config.backbone_device,
            codec_repo: &self.config.codec_repo,
            codec_device: &self.config.codec_device,
            memory_util: self.config.memory_util,
        };
        let response = self
            .client
            .post(self.url("/v1/load"))
            .json(&body)
            .send()
            .await
            .map_err(|err| runtime_error(format!("load request failed: {err}")))?;
        ensure_success(response, "load").await?;
        Ok(())
    }

    async fn wait_until_ready(&self) -> Result<(), DomainError> {
        let attempts = self.config.readiness_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.client.get(self.url("/v1/health")).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::info!(attempt, "TTS runtime ready");
                    return Ok(());
                }
                Ok(response) => last_error = format!("health returned {}", response.status()),
                Err(err) => last_error = err.to_string(),
            }

            tracing::debug!(attempt, attempts, error = %last_error, "TTS runtime not ready yet");
            if attempt < attempts {
                tokio::time::sleep(self.config.readiness_delay).await;
            }
        }

        Err(runtime_error(format!(
            "runtime not ready after {attempts} attempts: {last_error}"
        )))
    }
}

async fn ensure_success(response: Response, operation: &str) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(runtime_error(format!("{operation} returned {status}: {}", body.trim())))
}

/// Decodes the runtime's WAV reply into mono `f32` samples at the expected rate.
fn decode_waveform(bytes: &[u8]) -> Result<Vec<f32>, DomainError> {
    let mut reader = WavReader::new(Cursor::new(bytes))
        .map_err(|err| runtime_error(format!("infer returned invalid WAV: {err}")))?;
    let spec = reader.spec();
    if spec.sample_rate != SPEECH_SAMPLE_RATE_HZ {
        return Err(runtime_error(format!(
            "infer returned {} Hz audio, expected {SPEECH_SAMPLE_RATE_HZ} Hz",
            spec.sample_rate
        )));
    }
    if spec.channels != 1 {
        return Err(runtime_error(format!(
            "infer returned {} channels, expected mono",
            spec.channels
        )));
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<Vec<_>, _>>(),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|sample| sample.map(|value| value as f32 / i16::MAX as f32))
            .collect(),
        (format, bits) => {
            return Err(runtime_error(format!(
                "infer returned unsupported WAV encoding {format:?} {bits}-bit"
            )))
        }
    };
    samples.map_err(|err| runtime_error(format!("failed to read WAV samples: {err}")))
}

#[async_trait]
impl SpeechSynthesisPort for RestSynthesisClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<f32>, DomainError> {
        let response = self
            .client
            .post(self.url("/v1/infer"))
            .json(&request)
            .send()
            .await
            .map_err(|err| runtime_error(format!("infer request failed: {err}")))?;
        let response = ensure_success(response, "infer").await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| runtime_error(format!("failed to read infer response: {err}")))?;

        let samples = decode_waveform(&bytes)?;
        tracing::debug!(
            text_chars = request.text.chars().count(),
            sample_count = samples.len(),
            "chunk synthesized"
        );
        Ok(samples)
    }

    fn sample_rate_hz(&self) -> u32 {
        SPEECH_SAMPLE_RATE_HZ
    }

    async fn close(&self) {
        match self.client.post(self.url("/v1/unload")).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!("TTS runtime unloaded model");
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "TTS runtime unload rejected");
            }
            Err(err) => {
                tracing::warn!(error = %err, "TTS runtime unload failed");
            }
        }
    }
}
