use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SynthesizeSpeechRequest {
    #[validate(length(min = 1, max = 5000), custom(function = "validate_speakable"))]
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default = "default_temperature")]
    #[validate(range(min = 0.1, max = 1.5))]
    pub temperature: f32,
    #[serde(default = "default_max_chars_chunk")]
    #[validate(range(min = 64, max = 512))]
    pub max_chars_chunk: usize,
    #[serde(default = "default_format")]
    #[validate(custom(function = "validate_format"))]
    pub format: String,
}

impl SynthesizeSpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            temperature: default_temperature(),
            max_chars_chunk: default_max_chars_chunk(),
            format: default_format(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub id: String,
    pub description: String,
    pub ref_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub default_voice: String,
    pub uptime_seconds: f64,
}

/// An encoded WAV plus the timings reported in response headers.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub wav: Vec<u8>,
    pub voice: String,
    pub duration_seconds: f64,
    pub process_time_seconds: f64,
}

fn default_temperature() -> f32 {
    1.0
}

fn default_max_chars_chunk() -> usize {
    256
}

fn default_format() -> String {
    "wav".to_string()
}

fn validate_speakable(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        Err(ValidationError::new("text").with_message("text has nothing to speak".into()))
    } else {
        Ok(())
    }
}

fn validate_format(format: &str) -> Result<(), ValidationError> {
    if format.eq_ignore_ascii_case("wav") {
        Ok(())
    } else {
        Err(ValidationError::new("format").with_message("only `wav` output is supported".into()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> SynthesizeSpeechRequest {
        serde_json::from_value(value).expect("request deserializes")
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let request = parse(json!({ "text": "xin chào" }));
        assert_eq!(request.voice, None);
        assert_eq!(request.temperature, 1.0);
        assert_eq!(request.max_chars_chunk, 256);
        assert_eq!(request.format, "wav");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn text_length_bounds() {
        assert!(SynthesizeSpeechRequest::new("a".repeat(5000)).validate().is_ok());
        assert!(SynthesizeSpeechRequest::new("a".repeat(5001)).validate().is_err());
        assert!(SynthesizeSpeechRequest::new("").validate().is_err());
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        let errors = SynthesizeSpeechRequest::new(" \n\t ")
            .validate()
            .expect_err("blank text");
        assert!(errors.field_errors().contains_key("text"));
        assert!(SynthesizeSpeechRequest::new("  ừ  ").validate().is_ok());
    }

    #[test]
    fn temperature_bounds() {
        for (temperature, valid) in [(0.1, true), (1.5, true), (0.09, false), (1.51, false)] {
            let request = SynthesizeSpeechRequest {
                temperature,
                ..SynthesizeSpeechRequest::new("xin chào")
            };
            assert_eq!(request.validate().is_ok(), valid, "temperature {temperature}");
        }
    }

    #[test]
    fn chunk_size_bounds() {
        for (max_chars_chunk, valid) in [(64, true), (512, true), (63, false), (513, false)] {
            let request = SynthesizeSpeechRequest {
                max_chars_chunk,
                ..SynthesizeSpeechRequest::new("xin chào")
            };
            assert_eq!(request.validate().is_ok(), valid, "max_chars_chunk {max_chars_chunk}");
        }
    }

    #[test]
    fn only_wav_format_is_accepted() {
        let request = parse(json!({ "text": "xin chào", "format": "mp3" }));
        assert!(request.validate().is_err());
    }
}
