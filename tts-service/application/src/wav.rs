use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::ApplicationError;

/// Encodes a mono waveform as 16-bit PCM WAV in memory. Samples are clamped to [-1, 1].
pub fn encode_wav_pcm16(samples: &[f32], sample_rate_hz: u32) -> Result<Vec<u8>, ApplicationError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: sample_rate_hz,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    let mut writer = WavWriter::new(&mut cursor, spec).map_err(encode_error)?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer.write_sample(value).map_err(encode_error)?;
    }
    writer.finalize().map_err(encode_error)?;

    Ok(cursor.into_inner())
}

fn encode_error(err: hound::Error) -> ApplicationError {
    ApplicationError::synthesis_failed(format!("WAV encoding failed: {err}"))
}

#[cfg(test)]
mod tests {
    use hound::WavReader;

    use super::*;

    #[test]
    fn encodes_mono_pcm16_at_requested_rate() {
        let wav = encode_wav_pcm16(&[0.0, 0.5, -0.5, 2.0], 24_000).expect("encoded");
        assert_eq!(&wav[..4], b"RIFF");

        let mut reader = WavReader::new(Cursor::new(wav)).expect("readable");
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.bits_per_sample, 16);

        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.expect("sample")).collect();
        assert_eq!(samples, vec![0, 16384, -16384, i16::MAX]);
    }
}
