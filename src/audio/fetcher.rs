//! Media download via yt-dlp.

use crate::error::{HoersaalError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Audio formats yt-dlp may leave behind after extraction.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "opus", "ogg", "webm", "aac", "wav"];

/// Retrieves the audio of a media link.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download `link` and store its audio track as MP3 at `destination`.
    async fn fetch_audio(&self, link: &str, destination: &Path) -> Result<()>;
}

/// Fetcher running yt-dlp, with ffmpeg for format conversion.
pub struct YtDlpFetcher {
    binary: String,
}

impl YtDlpFetcher {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }

    fn build_args(&self, link: &str, output_template: &Path) -> Vec<String> {
        vec![
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
            "--audio-quality".to_string(),
            "0".to_string(),
            "--output".to_string(),
            output_template.to_string_lossy().to_string(),
            "--no-playlist".to_string(),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            link.to_string(),
        ]
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    #[instrument(skip(self), fields(destination = %destination.display()))]
    async fn fetch_audio(&self, link: &str, destination: &Path) -> Result<()> {
        let parent = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        tokio::fs::create_dir_all(parent).await?;

        // Download into a staging directory so an interrupted run never leaves
        // a partial file at the destination.
        let staging = tempfile::tempdir_in(parent)?;
        let template = staging.path().join("download.%(ext)s");

        info!("Downloading audio from {}", link);

        let result = Command::new(&self.binary)
            .args(self.build_args(link, &template))
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
                return Err(HoersaalError::Fetch(format!("yt-dlp execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HoersaalError::Fetch(format!("yt-dlp failed: {}", stderr.trim())));
        }

        let downloaded = find_audio_file(staging.path())?;

        if downloaded.extension().is_some_and(|ext| ext == "mp3") {
            tokio::fs::rename(&downloaded, destination).await?;
        } else {
            normalize_to_mp3(&downloaded, destination).await?;
        }

        debug!("Stored audio at {}", destination.display());
        Ok(())
    }
}

/// Locates the audio file yt-dlp produced in `dir`.
fn find_audio_file(dir: &Path) -> Result<PathBuf> {
    for ext in AUDIO_EXTENSIONS {
        let candidate = dir.join(format!("download.{}", ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| HoersaalError::Fetch(format!("Cannot read directory: {e}")))?;

    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().starts_with("download.") {
            return Ok(entry.path());
        }
    }

    Err(HoersaalError::Fetch("Audio file not found after download".into()))
}

/// Converts an audio file to MP3 using ffmpeg.
async fn normalize_to_mp3(source: &Path, dest: &Path) -> Result<()> {
    debug!("Converting {:?} to MP3", source);

    let result = Command::new("ffmpeg")
        .arg("-i")
        .arg(source)
        .arg("-vn")
        .arg("-codec:a")
        .arg("libmp3lame")
        .arg("-qscale:a")
        .arg("2")
        .arg("-y")
        .arg("-loglevel")
        .arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(HoersaalError::Fetch(format!("ffmpeg conversion failed: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(HoersaalError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(HoersaalError::Fetch(format!("ffmpeg error: {e}"))),
    }
}
