//! Data models for transcription.

use serde::{Deserialize, Serialize};

/// A span of recognized speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Recognized text; may carry surrounding whitespace.
    pub text: String,
}

impl Segment {
    /// Create a new segment.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Shift the segment by `offset` seconds.
    pub fn shifted(mut self, offset: f64) -> Self {
        self.start += offset;
        self.end += offset;
        self
    }
}

/// Output document of the whisper command line tool (`--output_format json`).
#[derive(Debug, Clone, Deserialize)]
pub struct WhisperOutput {
    #[serde(default)]
    pub text: String,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_shift() {
        let segment = Segment::new(2.0, 5.5, " Hallo ");

        let shifted = segment.shifted(600.0);
        assert_eq!(shifted.start, 602.0);
        assert_eq!(shifted.end, 605.5);
        assert_eq!(shifted.text, " Hallo ");
    }

    #[test]
    fn test_parse_whisper_output() {
        let json = r#"{
            "text": " Guten Morgen. Heute geht es um Graphen.",
            "segments": [
                {"id": 0, "seek": 0, "start": 0.0, "end": 2.4, "text": " Guten Morgen.", "tokens": [1, 2], "temperature": 0.0},
                {"id": 1, "seek": 0, "start": 2.4, "end": 6.0, "text": " Heute geht es um Graphen.", "tokens": [3], "temperature": 0.0}
            ],
            "language": "de"
        }"#;

        let output: WhisperOutput = serde_json::from_str(json).unwrap();
        assert_eq!(output.segments.len(), 2);
        assert_eq!(output.segments[1], Segment::new(2.4, 6.0, " Heute geht es um Graphen."));
        assert_eq!(output.language.as_deref(), Some("de"));
    }
}
