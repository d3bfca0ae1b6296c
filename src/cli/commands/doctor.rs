//! Doctor command - verify system requirements and configuration.

use crate::cli::preflight::version_arg;
use crate::cli::Output;
use crate::config::{Settings, TranscriptionProvider};
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Hoersaal Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();
    let local = settings.transcription.provider == TranscriptionProvider::Local;

    println!("{}", style("External Tools").bold());
    let tool_checks = vec![
        check_tool(&settings.download.ytdlp_binary, install_hint_ytdlp(), true),
        check_tool("ffmpeg", install_hint_ffmpeg(), true),
        // ffprobe is only used to split audio for the openai provider
        check_tool("ffprobe", install_hint_ffmpeg(), !local),
        check_tool(&settings.transcription.whisper_binary, install_hint_whisper(), local),
        // PDFs are optional output
        check_tool(&settings.pdf.wkhtmltopdf_binary, install_hint_wkhtmltopdf(), false),
    ];
    for check in &tool_checks {
        check.print();
    }
    checks.extend(tool_checks);

    println!();

    println!("{}", style("Transcription").bold());
    let provider_check = CheckResult::ok(
        "Provider",
        &format!(
            "{} (model {})",
            settings.transcription.provider,
            if local {
                &settings.transcription.model
            } else {
                &settings.transcription.openai_model
            }
        ),
    );
    provider_check.print();
    checks.push(provider_check);

    if !local {
        let api_check = check_openai_api_key();
        api_check.print();
        checks.push(api_check);
    }

    println!();

    println!("{}", style("Directories").bold());
    let dir_check = check_output_dir(settings);
    dir_check.print();
    checks.push(dir_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Hoersaal.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Hoersaal is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available. Missing optional tools are warnings.
fn check_tool(name: &str, hint: &str, required: bool) -> CheckResult {
    let missing = |message: &str| {
        if required {
            CheckResult::error(name, message, hint)
        } else {
            CheckResult::warning(name, message, hint)
        }
    };

    match Command::new(name).arg(version_arg(name)).output() {
        Ok(output) if output.status.success() => {
            let version = first_line(&output.stdout).unwrap_or_else(|| "installed".to_string());
            CheckResult::ok(name, &truncate(&version, 50))
        }
        Ok(_) => missing("installed but not working"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => missing("not found"),
        Err(e) => missing(&format!("error: {}", e)),
    }
}

fn first_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check the default output directory.
fn check_output_dir(settings: &Settings) -> CheckResult {
    let output_dir = settings.output_dir();
    if output_dir.is_dir() {
        CheckResult::ok("Output directory", &format!("{}", output_dir.display()))
    } else {
        CheckResult::warning(
            "Output directory",
            &format!("{} (does not exist)", output_dir.display()),
            "Create it or pass --output-folder",
        )
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create one with: hoersaal config show > {}", config_path.display()),
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

fn install_hint_whisper() -> &'static str {
    "Install with: pip install openai-whisper"
}

fn install_hint_wkhtmltopdf() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install wkhtmltopdf"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install wkhtmltopdf (or your package manager)"
    } else {
        "Install from: https://wkhtmltopdf.org/downloads.html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_missing_optional_tool_is_warning() {
        let result = check_tool("hoersaal-no-such-tool", "install it", false);
        assert_eq!(result.status, CheckStatus::Warning);
        assert_eq!(result.message, "not found");
    }

    #[test]
    fn test_missing_required_tool_is_error() {
        let result = check_tool("hoersaal-no-such-tool", "install it", true);
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("install it".to_string()));
    }

    #[test]
    fn test_first_line_and_truncate() {
        assert_eq!(first_line(b"\nffmpeg version 6.1\nbuilt with gcc"), Some("ffmpeg version 6.1".to_string()));
        assert_eq!(first_line(b""), None);
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
