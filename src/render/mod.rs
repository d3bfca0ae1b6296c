//! Output rendering: plain text, subtitles and PDF transcripts.

mod pdf;

pub use pdf::{build_pdf_html, format_duration, PdfRenderer, WkhtmltopdfRenderer};

use crate::transcription::Segment;

/// Subtitle file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
}

impl SubtitleFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
        }
    }
}

/// Join the trimmed text of each segment with newlines, in segment order.
pub fn render_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one cue per segment.
///
/// Timestamps are truncated to whole seconds. SRT cues are numbered from 1,
/// VTT cues carry no number. Cues are separated by a blank line.
pub fn render_subtitles(segments: &[Segment], format: SubtitleFormat) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let timing = format!("{},000 --> {},000", format_clock(s.start), format_clock(s.end));
            match format {
                SubtitleFormat::Srt => format!("{}\n{}\n{}", i + 1, timing, s.text.trim()),
                SubtitleFormat::Vtt => format!("{}\n{}", timing, s.text.trim()),
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format seconds as `H:MM:SS`, dropping the fractional part.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Segment> {
        vec![
            Segment::new(0.0, 2.0, "Hello"),
            Segment::new(2.0, 5.0, "world"),
            Segment::new(5.0, 5.0, "!"),
        ]
    }

    #[test]
    fn test_vtt_cues_are_unnumbered() {
        let vtt = render_subtitles(&sample(), SubtitleFormat::Vtt);
        let cues: Vec<&str> = vtt.split("\n\n").collect();

        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0], "0:00:00,000 --> 0:00:02,000\nHello");
        assert_eq!(cues[2], "0:00:05,000 --> 0:00:05,000\n!");
        assert!(!vtt.starts_with("WEBVTT"));
    }

    #[test]
    fn test_srt_cues_are_numbered_from_one() {
        let srt = render_subtitles(&sample(), SubtitleFormat::Srt);
        let cues: Vec<&str> = srt.split("\n\n").collect();

        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0], "1\n0:00:00,000 --> 0:00:02,000\nHello");
        assert_eq!(cues[1], "2\n0:00:02,000 --> 0:00:05,000\nworld");
    }

    #[test]
    fn test_timestamps_truncate() {
        let segments = vec![Segment::new(3661.9, 7322.4, " Pause ")];
        let srt = render_subtitles(&segments, SubtitleFormat::Srt);
        assert_eq!(srt, "1\n1:01:01,000 --> 2:02:02,000\nPause");
    }

    #[test]
    fn test_empty_segments() {
        assert_eq!(render_subtitles(&[], SubtitleFormat::Vtt), "");
        assert_eq!(render_text(&[]), "");
    }

    #[test]
    fn test_render_text_trims_and_keeps_order() {
        let segments = vec![
            Segment::new(0.0, 1.0, " Guten Morgen. "),
            Segment::new(1.0, 2.0, "Heute: Graphen\t"),
        ];
        assert_eq!(render_text(&segments), "Guten Morgen.\nHeute: Graphen");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00:00");
        assert_eq!(format_clock(59.99), "0:00:59");
        assert_eq!(format_clock(36000.0), "10:00:00");
        assert_eq!(format_clock(-1.0), "0:00:00");
    }
}
