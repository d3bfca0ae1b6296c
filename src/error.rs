//! Error types for Hoersaal.

use thiserror::Error;

/// Library-level error type for Hoersaal operations.
#[derive(Error, Debug)]
pub enum HoersaalError {
    #[error("No catalog source given: pass either a data file path or a data link")]
    NoSource,

    #[error("Could not load lecture catalog: {0}")]
    Load(String),

    #[error("Malformed catalog record{}: {reason}", .title.as_deref().map(|t| format!(" '{t}'")).unwrap_or_default())]
    MalformedRecord {
        title: Option<String>,
        reason: String,
    },

    #[error("Media download failed: {0}")]
    Fetch(String),

    #[error("Transcription failed: {0}")]
    Transcribe(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl HoersaalError {
    /// Build a `MalformedRecord` error for a record whose title may not be known yet.
    pub fn malformed(title: Option<&str>, reason: impl Into<String>) -> Self {
        HoersaalError::MalformedRecord {
            title: title.map(str::to_string),
            reason: reason.into(),
        }
    }
}

/// Result type alias for Hoersaal operations.
pub type Result<T> = std::result::Result<T, HoersaalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display_with_title() {
        let err = HoersaalError::malformed(Some("Lecture 1"), "missing seriestitle");
        assert_eq!(
            err.to_string(),
            "Malformed catalog record 'Lecture 1': missing seriestitle"
        );
    }

    #[test]
    fn test_malformed_display_without_title() {
        let err = HoersaalError::malformed(None, "missing title");
        assert_eq!(err.to_string(), "Malformed catalog record: missing title");
    }
}
