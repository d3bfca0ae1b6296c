//! CLI command implementations.

mod config;
mod doctor;
mod pdf;
mod run;
mod transcribe;

pub use config::run_config;
pub use doctor::run_doctor;
pub use pdf::run_pdf;
pub use run::run_lectures;
pub use transcribe::run_transcribe;

use crate::audio::YtDlpFetcher;
use crate::cli::{FormatArgs, ModelArgs, Output};
use crate::config::{language_hint, Settings, Templates};
use crate::pipeline::{OutputLayout, Pipeline};
use crate::render::WkhtmltopdfRenderer;
use crate::transcription::create_transcriber;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The output folder for a command, which must already exist.
fn existing_output_folder(folder: Option<&PathBuf>, settings: &Settings) -> anyhow::Result<PathBuf> {
    let folder = match folder {
        Some(f) => Settings::expand_path(&f.to_string_lossy()),
        None => settings.output_dir(),
    };
    if !folder.is_dir() {
        Output::error(&format!(
            "Output folder '{}' does not exist. Please create it first.",
            folder.display()
        ));
        anyhow::bail!("output folder {} does not exist", folder.display());
    }
    Ok(folder)
}

/// Language to request from the model, CLI flag first.
fn effective_language(model: &ModelArgs, settings: &Settings) -> Option<String> {
    match &model.language {
        Some(lang) => language_hint(lang).map(str::to_string),
        None => settings.transcription.language_hint().map(str::to_string),
    }
}

fn pdf_renderer(settings: &Settings) -> crate::Result<WkhtmltopdfRenderer> {
    let templates = Templates::load(settings.template_dir().as_deref())?;
    Ok(WkhtmltopdfRenderer::new(&settings.pdf, templates))
}

/// Assemble the pipeline from settings and command-line overrides.
fn build_pipeline(
    settings: &Settings,
    model: &ModelArgs,
    formats: &FormatArgs,
    layout: OutputLayout,
) -> anyhow::Result<Pipeline> {
    let model_name = model
        .model_name
        .clone()
        .unwrap_or_else(|| settings.transcription.model.clone());
    let transcriber = create_transcriber(&settings.transcription, &model_name)?;
    let fetcher = Arc::new(YtDlpFetcher::new(&settings.download.ytdlp_binary));
    let renderer = Arc::new(pdf_renderer(settings)?);

    let options = formats.to_options();
    if !options.any() {
        Output::warning("No output format selected (--txt, --srt, --vtt, --pdf); nothing will be written.");
    }

    Ok(Pipeline::new(
        fetcher,
        transcriber,
        renderer,
        options,
        effective_language(model, settings),
        layout,
    )?)
}

/// Stem of a path as an owned string.
fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_language() {
        let settings = Settings::default();
        let mut model = ModelArgs {
            model_name: None,
            language: None,
        };
        assert_eq!(effective_language(&model, &settings), Some("de".to_string()));

        model.language = Some("auto".to_string());
        assert_eq!(effective_language(&model, &settings), None);

        model.language = Some("en".to_string());
        assert_eq!(effective_language(&model, &settings), Some("en".to_string()));
    }

    #[test]
    fn test_missing_output_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(existing_output_folder(Some(&missing), &Settings::default()).is_err());

        let found = existing_output_folder(Some(&dir.path().to_path_buf()), &Settings::default()).unwrap();
        assert_eq!(found, dir.path());
    }
}
