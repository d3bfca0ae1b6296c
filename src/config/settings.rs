//! Configuration settings for Hoersaal.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub catalog: CatalogSettings,
    pub download: DownloadSettings,
    pub transcription: TranscriptionSettings,
    pub pdf: PdfSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory receiving audio files, transcriptions and the log file.
    pub output_dir: String,
    /// Name of the log file inside the output directory.
    pub log_file: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            log_file: "hoersaal.log".to_string(),
        }
    }
}

/// Catalog retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Timeout for fetching a remote catalog.
    pub timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self { timeout_secs: 5 }
    }
}

/// External download tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Path or name of the yt-dlp executable.
    pub ytdlp_binary: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            ytdlp_binary: "yt-dlp".to_string(),
        }
    }
}

/// Transcription provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProvider {
    /// Local openai-whisper installation (default).
    #[default]
    Local,
    /// OpenAI Whisper API.
    OpenAi,
}

impl std::fmt::Display for TranscriptionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptionProvider::Local => write!(f, "local"),
            TranscriptionProvider::OpenAi => write!(f, "openai"),
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Transcription provider (local, openai).
    pub provider: TranscriptionProvider,
    /// Whisper model name for the local provider (tiny, base, small, medium, large).
    pub model: String,
    /// Spoken language; `auto` lets the model detect it.
    pub language: String,
    /// Path or name of the whisper executable.
    pub whisper_binary: String,
    /// Model used by the openai provider.
    pub openai_model: String,
    /// Chunk length used when uploading long audio to the openai provider.
    pub chunk_duration_seconds: u32,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptionProvider::Local,
            model: "tiny".to_string(),
            language: "de".to_string(),
            whisper_binary: "whisper".to_string(),
            openai_model: "whisper-1".to_string(),
            chunk_duration_seconds: 600,
        }
    }
}

impl TranscriptionSettings {
    /// Language hint to pass to the model, `None` for auto-detection.
    pub fn language_hint(&self) -> Option<&str> {
        language_hint(&self.language)
    }
}

/// Interpret a language option, mapping `auto` (or an empty value) to `None`.
pub fn language_hint(language: &str) -> Option<&str> {
    let language = language.trim();
    if language.is_empty() || language.eq_ignore_ascii_case("auto") || language.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(language)
    }
}

/// PDF rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfSettings {
    /// Path or name of the wkhtmltopdf executable.
    pub wkhtmltopdf_binary: String,
    pub page_size: String,
    /// Margin applied to all four page edges.
    pub margin_mm: u32,
    /// Directory with `lecture.html` / `plain.html` overriding the built-in templates.
    pub template_dir: Option<String>,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            wkhtmltopdf_binary: "wkhtmltopdf".to_string(),
            page_size: "A4".to_string(),
            margin_mm: 15,
            template_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&Path>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else if path.is_some() {
            Err(crate::error::HoersaalError::Config(format!(
                "configuration file {} does not exist",
                config_path.display()
            )))
        } else {
            Ok(Settings::default())
        }
    }

    /// Serialize the effective settings as TOML.
    pub fn to_toml(&self) -> crate::error::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::error::HoersaalError::Config(e.to_string()))
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hoersaal")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    /// Get the expanded custom template directory, if configured.
    pub fn template_dir(&self) -> Option<PathBuf> {
        self.pdf.template_dir.as_deref().map(Self::expand_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.catalog.timeout_secs, 5);
        assert_eq!(settings.transcription.model, "tiny");
        assert_eq!(settings.transcription.provider, TranscriptionProvider::Local);
        assert_eq!(settings.transcription.language_hint(), Some("de"));
        assert_eq!(settings.pdf.margin_mm, 15);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[transcription]\nprovider = \"openai\"\nlanguage = \"auto\"").unwrap();

        let settings = Settings::load_from(Some(file.path())).unwrap();
        assert_eq!(settings.transcription.provider, TranscriptionProvider::OpenAi);
        assert_eq!(settings.transcription.language_hint(), None);
        assert_eq!(settings.transcription.model, "tiny");
        assert_eq!(settings.general.log_file, "hoersaal.log");
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load_from(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_language_hint() {
        assert_eq!(language_hint("en"), Some("en"));
        assert_eq!(language_hint(" Auto "), None);
        assert_eq!(language_hint("None"), None);
        assert_eq!(language_hint(""), None);
    }

    #[test]
    fn test_roundtrip_toml() {
        let settings = Settings::default();
        let toml = settings.to_toml().unwrap();
        assert!(toml.contains("[transcription]"));
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.pdf.page_size, "A4");
    }
}
