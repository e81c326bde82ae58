use serde::{Deserialize, Serialize};

/// Output rate of the acoustic codec.
pub const SPEECH_SAMPLE_RATE_HZ: u32 = 24_000;

/// Catalog entry as listed by `voices.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSummary {
    pub id: String,
    pub description: String,
}

/// Conditioning data for one voice: the codec tokens of a reference clip and its transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceReference {
    pub text: String,
    pub codes: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePreset {
    pub id: String,
    pub description: String,
    pub ref_text: String,
    pub ref_codes: Vec<i64>,
}

impl VoicePreset {
    pub fn new(summary: VoiceSummary, reference: VoiceReference) -> Self {
        Self {
            id: summary.id,
            description: summary.description,
            ref_text: reference.text,
            ref_codes: reference.codes,
        }
    }
}

/// One chunk of text to synthesize with a given voice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub ref_codes: Vec<i64>,
    pub ref_text: String,
    pub temperature: f32,
}
