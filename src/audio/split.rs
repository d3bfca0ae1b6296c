//! Splitting long recordings with ffmpeg.

use crate::error::{HoersaalError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Splits an audio file into chunks of at most `chunk_seconds`.
///
/// Returns `(chunk_path, offset_seconds)` pairs in playback order. Audio that
/// fits into a single chunk is returned as-is.
#[instrument(skip_all, fields(source = %source.display()))]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    tokio::fs::create_dir_all(output_dir).await?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let windows = chunk_windows(total_duration, chunk_seconds as f64);
    if windows.len() <= 1 {
        return Ok(vec![(source.to_path_buf(), 0.0)]);
    }

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut chunks = Vec::with_capacity(windows.len());
    for (idx, (offset, length)) in windows.into_iter().enumerate() {
        let chunk_path = output_dir.join(format!("{}_{:04}.mp3", base_name, idx));
        extract_segment(source, &chunk_path, offset, length).await?;

        debug!("Created chunk {} at offset {:.1}s", idx, offset);
        chunks.push((chunk_path, offset));
    }

    info!("Created {} audio chunks", chunks.len());
    Ok(chunks)
}

/// `(offset, length)` of each chunk covering `total` seconds.
fn chunk_windows(total: f64, chunk_len: f64) -> Vec<(f64, f64)> {
    if chunk_len <= 0.0 || total <= chunk_len {
        return vec![(0.0, total.max(0.0))];
    }

    let mut windows = Vec::new();
    let mut offset = 0.0;
    while offset < total {
        windows.push((offset, chunk_len.min(total - offset)));
        offset += chunk_len;
    }
    windows
}

/// Extracts a time range from an audio file.
async fn extract_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    let copy_result = Command::new("ffmpeg")
        .arg("-ss")
        .arg(format!("{:.3}", start))
        .arg("-i")
        .arg(source)
        .arg("-t")
        .arg(format!("{:.3}", length))
        .arg("-c")
        .arg("copy")
        .arg("-y")
        .arg("-loglevel")
        .arg("warning")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match copy_result {
        Ok(status) if status.success() && dest.exists() => return Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HoersaalError::ToolNotFound("ffmpeg".into()));
        }
        _ => {}
    }

    warn!("Stream copy failed, re-encoding chunk");

    let encode_result = Command::new("ffmpeg")
        .arg("-ss")
        .arg(format!("{:.3}", start))
        .arg("-i")
        .arg(source)
        .arg("-t")
        .arg(format!("{:.3}", length))
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

    match encode_result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(HoersaalError::Transcribe(format!("Chunk extraction failed: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(HoersaalError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(HoersaalError::Transcribe(format!("ffmpeg error: {e}"))),
    }
}

/// Queries the duration of an audio file in seconds using ffprobe.
async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v")
        .arg("quiet")
        .arg("-print_format")
        .arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HoersaalError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(HoersaalError::Transcribe(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(HoersaalError::Transcribe(format!(
            "ffprobe could not read {}",
            path.display()
        )));
    }

    parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
}

fn parse_probe_duration(json: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json)
        .map_err(|_| HoersaalError::Transcribe("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| HoersaalError::Transcribe("Could not determine audio duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_windows_short_audio() {
        assert_eq!(chunk_windows(42.0, 600.0), vec![(0.0, 42.0)]);
        assert_eq!(chunk_windows(600.0, 600.0), vec![(0.0, 600.0)]);
    }

    #[test]
    fn test_chunk_windows_cover_whole_recording() {
        let windows = chunk_windows(1500.0, 600.0);
        assert_eq!(windows, vec![(0.0, 600.0), (600.0, 600.0), (1200.0, 300.0)]);
    }

    #[test]
    fn test_parse_probe_duration() {
        let json = r#"{"format": {"filename": "a.mp3", "duration": "5423.412245"}}"#;
        let duration = parse_probe_duration(json).unwrap();
        assert!((duration - 5423.412245).abs() < 1e-6);
    }

    #[test]
    fn test_parse_probe_duration_missing() {
        assert!(parse_probe_duration(r#"{"format": {}}"#).is_err());
        assert!(parse_probe_duration("not json").is_err());
    }
}
