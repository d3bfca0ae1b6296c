//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before a batch starts, rather than failing on the first lecture.

use crate::config::{Settings, TranscriptionProvider};
use crate::error::{HoersaalError, Result};
use crate::transcription::is_api_key_configured;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Downloading lectures from a catalog and transcribing them.
    Run { pdf: bool },
    /// Transcribing local audio files.
    Transcribe { pdf: bool },
    /// Rendering PDFs from existing transcriptions.
    Pdf,
}

/// External tools an operation needs with the given settings.
pub fn required_tools(operation: Operation, settings: &Settings) -> Vec<String> {
    let mut tools = Vec::new();
    let transcription = &settings.transcription;

    let (download, transcribe, pdf) = match operation {
        Operation::Run { pdf } => (true, true, pdf),
        Operation::Transcribe { pdf } => (false, true, pdf),
        Operation::Pdf => (false, false, true),
    };

    if download {
        tools.push(settings.download.ytdlp_binary.clone());
        tools.push("ffmpeg".to_string());
    }
    if transcribe {
        match transcription.provider {
            TranscriptionProvider::Local => tools.push(transcription.whisper_binary.clone()),
            TranscriptionProvider::OpenAi => {
                if !download {
                    tools.push("ffmpeg".to_string());
                }
                tools.push("ffprobe".to_string());
            }
        }
    }
    if pdf {
        tools.push(settings.pdf.wkhtmltopdf_binary.clone());
    }

    tools
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    let transcribes = matches!(operation, Operation::Run { .. } | Operation::Transcribe { .. });
    if transcribes && settings.transcription.provider == TranscriptionProvider::OpenAi {
        check_api_key()?;
    }

    for tool in required_tools(operation, settings) {
        check_tool(&tool)?;
    }
    Ok(())
}

fn check_api_key() -> Result<()> {
    if is_api_key_configured() {
        Ok(())
    } else {
        Err(HoersaalError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        ))
    }
}

/// Argument that makes a tool print its version and exit.
pub fn version_arg(name: &str) -> &'static str {
    let base = std::path::Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    match base {
        "ffmpeg" | "ffprobe" => "-version",
        "whisper" => "--help",
        _ => "--version",
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg(version_arg(name)).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(HoersaalError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(HoersaalError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(HoersaalError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_local_provider() {
        let settings = Settings::default();
        let tools = required_tools(Operation::Run { pdf: false }, &settings);
        assert_eq!(tools, vec!["yt-dlp", "ffmpeg", "whisper"]);
    }

    #[test]
    fn test_transcribe_with_openai_and_pdf() {
        let mut settings = Settings::default();
        settings.transcription.provider = TranscriptionProvider::OpenAi;

        let tools = required_tools(Operation::Transcribe { pdf: true }, &settings);
        assert_eq!(tools, vec!["ffmpeg", "ffprobe", "wkhtmltopdf"]);
    }

    #[test]
    fn test_pdf_needs_only_wkhtmltopdf() {
        let tools = required_tools(Operation::Pdf, &Settings::default());
        assert_eq!(tools, vec!["wkhtmltopdf"]);
    }

    #[test]
    fn test_version_arg() {
        assert_eq!(version_arg("ffprobe"), "-version");
        assert_eq!(version_arg("/usr/local/bin/ffmpeg"), "-version");
        assert_eq!(version_arg("yt-dlp"), "--version");
        assert_eq!(version_arg("whisper"), "--help");
    }

    #[test]
    fn test_missing_tool() {
        assert!(matches!(
            check_tool("hoersaal-no-such-tool"),
            Err(HoersaalError::ToolNotFound(_))
        ));
    }
}
