use std::{
    fs::File,
    io::{ErrorKind, Read},
    path::Path,
};

use hound::{SampleFormat, WavReader};
use stt_domain::DomainError;
use symphonia::core::{
    audio::SampleBuffer,
    codecs::{DecoderOptions, CODEC_TYPE_NULL},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};

/// Sample rate whisper models are trained on.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples at [`WHISPER_SAMPLE_RATE`].
    pub samples: Vec<f32>,
    /// Length of the original recording in seconds.
    pub duration_seconds: f64,
}

/// Decodes an uploaded recording to mono samples at [`WHISPER_SAMPLE_RATE`].
///
/// RIFF/WAVE files are read with hound. Anything else is sniffed by symphonia, using the
/// file extension as a hint.
pub fn decode_audio_file(path: &Path) -> Result<DecodedAudio, DomainError> {
    let pcm = match WavReader::open(path) {
        Ok(reader) => read_wav(reader)?,
        Err(hound::Error::FormatError(_)) => decode_with_symphonia(path)?,
        Err(err) => {
            return Err(audio_error(format!(
                "failed to open {}: {err}",
                path.display()
            )))
        }
    };
    if pcm.channels == 0 || pcm.sample_rate == 0 {
        return Err(audio_error("upload declares no audio".to_string()));
    }

    let mono = downmix(&pcm.interleaved, pcm.channels);
    let duration_seconds = mono.len() as f64 / pcm.sample_rate as f64;
    let samples = resample_linear(&mono, pcm.sample_rate, WHISPER_SAMPLE_RATE);

    tracing::debug!(
        path = %path.display(),
        source_rate_hz = pcm.sample_rate,
        channels = pcm.channels,
        duration_seconds,
        "decoded upload"
    );

    Ok(DecodedAudio {
        samples,
        duration_seconds,
    })
}

struct InterleavedPcm {
    interleaved: Vec<f32>,
    sample_rate: u32,
    channels: usize,
}

fn audio_error(message: String) -> DomainError {
    DomainError::external_service_error("audio", &message)
}

fn read_wav<R: Read>(mut reader: WavReader<R>) -> Result<InterleavedPcm, DomainError> {
    let spec = reader.spec();
    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(read_error)?,
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|sample| sample.map(|value| value as f32 / i8::MAX as f32))
            .collect::<Result<_, _>>()
            .map_err(read_error)?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|sample| sample.map(|value| value as f32 / i16::MAX as f32))
            .collect::<Result<_, _>>()
            .map_err(read_error)?,
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|sample| sample.map(|value| value as f32 / 8_388_608.0))
            .collect::<Result<_, _>>()
            .map_err(read_error)?,
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|sample| sample.map(|value| value as f32 / i32::MAX as f32))
            .collect::<Result<_, _>>()
            .map_err(read_error)?,
        (format, bits) => {
            return Err(audio_error(format!(
                "unsupported WAV encoding: {format:?} {bits}-bit"
            )))
        }
    };

    Ok(InterleavedPcm {
        interleaved,
        sample_rate: spec.sample_rate,
        channels: spec.channels as usize,
    })
}

fn read_error(err: hound::Error) -> DomainError {
    audio_error(format!("failed to read WAV samples: {err}"))
}

fn decode_with_symphonia(path: &Path) -> Result<InterleavedPcm, DomainError> {
    let file = File::open(path)
        .map_err(|err| audio_error(format!("failed to open {}: {err}", path.display())))?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let detected = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| audio_error(format!("unsupported audio container: {err}")))?;
    let mut format = detected.format;
    let track = format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| audio_error("upload has no audio track".to_string()))?;
    let track_id = track.id;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|err| audio_error(format!("unsupported audio codec: {err}")))?;

    let mut interleaved = Vec::new();
    let mut layout: Option<(u32, usize)> = None;
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(audio_error(format!("failed to read audio packet: {err}"))),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(err)) => {
                tracing::debug!(error = err, "skipping undecodable audio packet");
                continue;
            }
            Err(err) => return Err(audio_error(format!("failed to decode audio: {err}"))),
        };
        let spec = *decoded.spec();
        layout.get_or_insert((spec.rate, spec.channels.count()));

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(buffer.samples());
    }

    let (sample_rate, channels) =
        layout.ok_or_else(|| audio_error("upload contains no decodable audio".to_string()))?;
    Ok(InterleavedPcm {
        interleaved,
        sample_rate,
        channels,
    })
}

pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

pub fn resample_linear(samples: &[f32], from_hz: u32, to_hz: u32) -> Vec<f32> {
    if from_hz == to_hz || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_hz as f64 / to_hz as f64;
    let out_len = ((samples.len() as f64) / ratio).round().max(1.0) as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|idx| {
            let position = idx as f64 * ratio;
            let left = (position.floor() as usize).min(last);
            let right = (left + 1).min(last);
            let fraction = (position - left as f64) as f32;
            samples[left] + (samples[right] - samples[left]) * fraction
        })
        .collect()
}
