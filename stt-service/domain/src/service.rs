use crate::TranscriptSegment;

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Trims the text and rounds both timestamps to centiseconds. `end` never precedes `start`.
pub fn normalize_segment(segment: TranscriptSegment) -> TranscriptSegment {
    let start = round_to(segment.start, 2);
    TranscriptSegment {
        start,
        end: round_to(segment.end, 2).max(start),
        text: segment.text.trim().to_string(),
    }
}

/// Builds a segment from decoder timestamps counted in centiseconds.
pub fn segment_from_centiseconds(start_cs: i64, end_cs: i64, text: String) -> TranscriptSegment {
    let start = start_cs.max(0) as f64 / 100.0;
    let end = (end_cs.max(0) as f64 / 100.0).max(start);
    TranscriptSegment { start, end, text }
}

/// Segment texts joined by single spaces, empty segments included.
pub fn transcript_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
