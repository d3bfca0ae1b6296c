//! Local Whisper transcription via the openai-whisper command line tool.

use super::{Segment, Transcriber, WhisperOutput};
use crate::error::{HoersaalError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Transcriber backed by a locally installed `whisper` executable.
pub struct LocalWhisperTranscriber {
    binary: String,
    model: String,
}

impl LocalWhisperTranscriber {
    /// Create a transcriber running `binary` with the given model name.
    pub fn new(binary: &str, model: &str) -> Self {
        Self {
            binary: binary.to_string(),
            model: model.to_string(),
        }
    }

    /// Arguments passed to whisper for one file.
    fn build_args(&self, audio_path: &Path, output_dir: &Path, language: Option<&str>) -> Vec<String> {
        let mut args = vec![
            audio_path.to_string_lossy().to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--task".to_string(),
            "transcribe".to_string(),
            "--fp16".to_string(),
            "False".to_string(),
            "--verbose".to_string(),
            "False".to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
        ];

        if let Some(lang) = language {
            args.push("--language".to_string());
            args.push(lang.to_string());
        }

        args
    }
}

#[async_trait]
impl Transcriber for LocalWhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display(), model = %self.model))]
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Vec<Segment>> {
        if !audio_path.is_file() {
            return Err(HoersaalError::Transcribe(format!(
                "audio file {} does not exist",
                audio_path.display()
            )));
        }

        let output_dir = tempfile::tempdir()?;
        let args = self.build_args(audio_path, output_dir.path(), language);
        debug!("Running {} {}", self.binary, args.join(" "));

        let result = Command::new(&self.binary)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HoersaalError::ToolNotFound(self.binary.clone()));
            }
            Err(e) => {
                return Err(HoersaalError::Transcribe(format!("whisper execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HoersaalError::Transcribe(format!(
                "whisper failed: {}",
                last_lines(&stderr, 5)
            )));
        }

        let json_path = find_output_json(output_dir.path(), audio_path)?;
        let content = tokio::fs::read_to_string(&json_path).await?;
        let parsed = parse_whisper_json(&content)?;

        if let Some(lang) = &parsed.language {
            debug!("Whisper reported language '{}'", lang);
        }
        info!("Transcribed {} segments", parsed.segments.len());

        Ok(parsed.segments)
    }
}

/// Parse whisper's JSON output document.
pub fn parse_whisper_json(content: &str) -> Result<WhisperOutput> {
    serde_json::from_str(content)
        .map_err(|e| HoersaalError::Transcribe(format!("unexpected whisper output: {e}")))
}

/// Whisper names its output after the input file's stem.
fn find_output_json(dir: &Path, audio_path: &Path) -> Result<PathBuf> {
    if let Some(stem) = audio_path.file_stem() {
        let mut name = stem.to_os_string();
        name.push(".json");
        let candidate = dir.join(name);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    // Fallback: the only JSON file in the output directory
    let entries = std::fs::read_dir(dir)?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            return Ok(path);
        }
    }

    Err(HoersaalError::Transcribe("whisper produced no output file".into()))
}

fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(count)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_with_language() {
        let transcriber = LocalWhisperTranscriber::new("whisper", "small");
        let args = transcriber.build_args(Path::new("/out/audios/Lecture 1.mp3"), Path::new("/tmp/w"), Some("de"));

        assert_eq!(args[0], "/out/audios/Lecture 1.mp3");
        assert!(args.windows(2).any(|w| w == ["--model", "small"]));
        assert!(args.windows(2).any(|w| w == ["--fp16", "False"]));
        assert!(args.windows(2).any(|w| w == ["--output_format", "json"]));
        assert!(args.windows(2).any(|w| w == ["--language", "de"]));
    }

    #[test]
    fn test_build_args_auto_language() {
        let transcriber = LocalWhisperTranscriber::new("whisper", "tiny");
        let args = transcriber.build_args(Path::new("a.mp3"), Path::new("/tmp/w"), None);
        assert!(!args.iter().any(|a| a == "--language"));
    }

    #[test]
    fn test_find_output_json_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2. Aufzeichnung vom 20.12.2022.json"), "{}").unwrap();

        let found = find_output_json(dir.path(), Path::new("/x/2. Aufzeichnung vom 20.12.2022.mp3")).unwrap();
        assert!(found.ends_with("2. Aufzeichnung vom 20.12.2022.json"));
    }

    #[test]
    fn test_find_output_json_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_output_json(dir.path(), Path::new("a.mp3")).is_err());
    }

    #[test]
    fn test_parse_whisper_json_rejects_garbage() {
        assert!(matches!(parse_whisper_json("[]"), Err(HoersaalError::Transcribe(_))));
    }

    #[test]
    fn test_last_lines() {
        assert_eq!(last_lines("a\n\nb\nc\n", 2), "b\nc");
        assert_eq!(last_lines("only", 5), "only");
    }

    #[tokio::test]
    async fn test_missing_audio_file() {
        let transcriber = LocalWhisperTranscriber::new("whisper", "tiny");
        let result = transcriber.transcribe(Path::new("/nonexistent/audio.mp3"), None).await;
        assert!(matches!(result, Err(HoersaalError::Transcribe(_))));
    }
}
