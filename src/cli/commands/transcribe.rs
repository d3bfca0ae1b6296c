//! Transcribe command - transcribe local audio files.

use super::{build_pipeline, existing_output_folder};
use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, TranscribeArgs};
use crate::config::Settings;
use crate::pipeline::OutputLayout;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Audio extensions picked up when no files are named.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "ogg", "opus", "flac", "webm", "mp4"];

/// Run the transcribe command.
pub async fn run_transcribe(args: &TranscribeArgs, settings: Settings) -> Result<()> {
    let output_folder = existing_output_folder(args.output_folder.as_ref(), &settings)?;
    info!("Starting");

    let input_folder = Settings::expand_path(&args.input_folder.to_string_lossy());
    let files = if args.files.is_empty() {
        audio_files_in(&input_folder)?
    } else {
        args.files.iter().map(|f| input_folder.join(f)).collect()
    };

    if files.is_empty() {
        Output::warning(&format!("No audio files found in {}", input_folder.display()));
        return Ok(());
    }

    let options = args.formats.to_options();
    if let Err(e) = preflight::check(Operation::Transcribe { pdf: options.pdf }, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'hoersaal doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let layout = OutputLayout {
        audio_dir: input_folder,
        transcription_dir: output_folder,
    };
    let pipeline = build_pipeline(&settings, &args.model, &args.formats, layout)?;

    Output::info(&format!("Transcribing {} file(s)", files.len()));
    let summary = pipeline.run_files(&files).await?;

    Output::batch_summary(&summary);
    info!("Finished");
    Ok(())
}

/// Audio files directly inside `dir`, sorted by name.
fn audio_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_files_in() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.MP3", "a.wav", "notes.txt", "c.json"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.mp3")).unwrap();

        let files = audio_files_in(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.wav", "b.MP3"]);
    }
}
