//! Normalized lecture records.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Untyped per-lecture entry as it appears in a catalog's `result` array.
pub type RawRecord = serde_json::Value;

/// Source institution of a catalog, which determines its record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSchema {
    /// University of Vienna (u:stream).
    #[value(name = "uw")]
    #[serde(rename = "uw")]
    UniWien,
    /// TU Wien.
    #[value(name = "tu")]
    Tu,
}

impl std::fmt::Display for CatalogSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSchema::UniWien => write!(f, "uw"),
            CatalogSchema::Tu => write!(f, "tu"),
        }
    }
}

/// A recorded lecture, reconciled from one of the supported catalog schemas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LectureRecord {
    /// Lecture title, used for display and file naming.
    pub title: String,
    /// Creator(s) of the recording.
    pub author: String,
    /// Contributor(s), only exposed by some catalogs.
    pub contributors: Option<String>,
    /// Title of the course the lecture belongs to.
    pub series_title: String,
    /// Recording length in milliseconds.
    pub duration_millis: u64,
    /// When the lecture was recorded, in the catalog's own offset.
    pub recorded_at: DateTime<FixedOffset>,
    /// Highest-resolution MP4 track.
    pub video_link: String,
    /// Highest-bitrate MP3 track, if the catalog exposes one.
    pub audio_link: Option<String>,
}

impl LectureRecord {
    /// Link the audio should be fetched from: the direct audio track when
    /// present, otherwise the video track (audio is extracted from it).
    pub fn audio_source_link(&self) -> &str {
        self.audio_link.as_deref().unwrap_or(&self.video_link)
    }

    /// Whether a direct audio track is available.
    pub fn has_audio_track(&self) -> bool {
        self.audio_link.is_some()
    }

    /// Title made safe for use as a file name.
    pub fn file_stem(&self) -> String {
        sanitize_file_stem(&self.title)
    }
}

/// Replace characters that cannot appear in a file name.
pub fn sanitize_file_stem(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "untitled".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(audio: Option<&str>) -> LectureRecord {
        LectureRecord {
            title: "Lecture 1".to_string(),
            author: "Doe, Jane".to_string(),
            contributors: None,
            series_title: "Algorithms".to_string(),
            duration_millis: 1000,
            recorded_at: DateTime::parse_from_rfc3339("2022-12-20T10:00:00+01:00").unwrap(),
            video_link: "https://media.example.org/video.mp4".to_string(),
            audio_link: audio.map(str::to_string),
        }
    }

    #[test]
    fn test_audio_source_prefers_audio_track() {
        let r = record(Some("https://media.example.org/audio.mp3"));
        assert!(r.has_audio_track());
        assert_eq!(r.audio_source_link(), "https://media.example.org/audio.mp3");
    }

    #[test]
    fn test_audio_source_falls_back_to_video() {
        let r = record(None);
        assert!(!r.has_audio_track());
        assert_eq!(r.audio_source_link(), "https://media.example.org/video.mp4");
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("2. Aufzeichnung vom 20.12.2022"), "2. Aufzeichnung vom 20.12.2022");
        assert_eq!(sanitize_file_stem("Part 1/2: Intro"), "Part 1_2_ Intro");
        assert_eq!(sanitize_file_stem("  "), "untitled");
        assert_eq!(sanitize_file_stem(".."), "untitled");
    }
}
