use std::{f32::consts::PI, path::Path};

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use tokio::process::Command;

pub const TONE_FREQUENCY_HZ: u32 = 500;
pub const TONE_DURATION_SECS: u32 = 3;
pub const TONE_SAMPLE_RATE_HZ: u32 = 16_000;

/// Writes the test tone to `path`, preferring ffmpeg and falling back to an in-process writer.
pub async fn generate_test_tone(path: &Path) -> Result<()> {
    match ffmpeg_tone(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "test tone generated with ffmpeg");
            Ok(())
        }
        Err(err) => {
            tracing::warn!(error = %err, "ffmpeg unavailable, writing sine tone directly");
            write_sine_wav(
                path,
                TONE_FREQUENCY_HZ as f32,
                TONE_DURATION_SECS as f32,
                TONE_SAMPLE_RATE_HZ,
            )
        }
    }
}

async fn ffmpeg_tone(path: &Path) -> Result<()> {
    let output = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error", "-f", "lavfi", "-i"])
        .arg(format!(
            "sine=frequency={TONE_FREQUENCY_HZ}:duration={TONE_DURATION_SECS}"
        ))
        .args(["-acodec", "pcm_s16le", "-ar"])
        .arg(TONE_SAMPLE_RATE_HZ.to_string())
        .args(["-ac", "1"])
        .arg(path)
        .output()
        .await
        .context("failed to spawn ffmpeg")?;

    if !output.status.success() {
        bail!(
            "ffmpeg exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

/// Mono 16-bit PCM sine at half scale.
pub fn write_sine_wav(path: &Path, frequency_hz: f32, duration_secs: f32, sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let total = (duration_secs * sample_rate as f32).round() as usize;
    let amplitude = i16::MAX as f32 * 0.5;
    for n in 0..total {
        let t = n as f32 / sample_rate as f32;
        let value = (2.0 * PI * frequency_hz * t).sin() * amplitude;
        writer.write_sample(value.round() as i16)?;
    }
    writer.finalize().context("failed to finalize WAV")?;
    Ok(())
}
