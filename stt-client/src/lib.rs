pub mod tone;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::Deserialize;

pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
pub const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(120);

/// Sends one audio file to the speech-to-text service and prints the transcript.
#[derive(Parser, Debug, Clone)]
#[command(name = "stt-client", version, about, long_about = None)]
pub struct Args {
    /// Base URL of the speech-to-text service
    #[arg(long, env = "STT_BASE_URL", default_value = "http://localhost:7861")]
    pub base_url: String,

    /// Audio file to upload; a 3 s test tone is generated when omitted
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Language code, or `auto` to detect
    #[arg(long, default_value = "vi")]
    pub language: String,

    /// `transcribe` or `translate`
    #[arg(long, default_value = "transcribe")]
    pub task: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentReply {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionReply {
    pub text: String,
    pub language: String,
    pub language_probability: f64,
    pub duration: f64,
    pub process_time: f64,
    #[serde(default)]
    pub segments: Vec<SegmentReply>,
}

pub struct SttClient {
    client: Client,
    base_url: String,
}

impl SttClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn health(&self) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("service unreachable at {}", self.base_url))?;
        let status = response.status();
        if !status.is_success() {
            bail!("health check returned {status}");
        }
        response.json().await.context("health response is not JSON")
    }

    /// Uploads `path` and returns the raw JSON body alongside its typed view.
    pub async fn transcribe(
        &self,
        path: &Path,
        language: &str,
        task: &str,
    ) -> Result<(serde_json::Value, TranscriptionReply)> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("file", part)
            .text("language", language.to_string())
            .text("task", task.to_string());

        let response = self
            .client
            .post(format!("{}/api/transcribe", self.base_url))
            .multipart(form)
            .timeout(TRANSCRIBE_TIMEOUT)
            .send()
            .await
            .context("transcription request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("transcription returned {status}: {}", body.trim());
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .context("transcription response is not JSON")?;
        let reply = serde_json::from_value(raw.clone())
            .context("transcription response has an unexpected shape")?;
        Ok((raw, reply))
    }
}

pub fn render_report(raw: &serde_json::Value, reply: &TranscriptionReply) -> String {
    let mut out = String::new();
    out.push_str(&serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string()));
    out.push('\n');
    out.push_str(&format!("Text: {}\n", reply.text));
    out.push_str(&format!(
        "Language: {} ({:.3})\n",
        reply.language, reply.language_probability
    ));
    out.push_str(&format!("Duration: {:.2}s\n", reply.duration));
    out.push_str(&format!("Process time: {:.2}s\n", reply.process_time));
    out.push_str(&format!("Segments: {}\n", reply.segments.len()));
    for segment in &reply.segments {
        out.push_str(&format!(
            "  [{:.2}s -> {:.2}s] {}\n",
            segment.start, segment.end, segment.text
        ));
    }
    out
}

/// Checks health, uploads the audio and returns the printable report.
pub async fn run(args: Args) -> Result<String> {
    let client = SttClient::new(&args.base_url)?;

    let health = client.health().await?;
    tracing::info!(base_url = %args.base_url, health = %health, "service reachable");

    // Keeps the generated tone alive until the upload finishes.
    let scratch;
    let path = match args.file {
        Some(path) => path,
        None => {
            scratch = tempfile::tempdir().context("failed to create temp dir")?;
            let path = scratch.path().join("test_tone.wav");
            tone::generate_test_tone(&path).await?;
            path
        }
    };

    tracing::info!(
        file = %path.display(),
        language = %args.language,
        task = %args.task,
        "uploading audio"
    );
    let (raw, reply) = client.transcribe(&path, &args.language, &args.task).await?;
    Ok(render_report(&raw, &reply))
}
