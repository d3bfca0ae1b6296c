//! Pdf command - render existing transcriptions as PDFs.

use super::{file_stem, pdf_renderer};
use crate::catalog::{normalize_all, CatalogLoader, LectureRecord};
use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, PdfArgs};
use crate::config::Settings;
use crate::pipeline::BatchSummary;
use crate::render::PdfRenderer;
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

/// Run the pdf command.
pub async fn run_pdf(args: &PdfArgs, settings: Settings) -> Result<()> {
    if let Some(folder) = &args.output_folder {
        if !folder.is_dir() {
            Output::error(&format!("Output folder '{}' does not exist.", folder.display()));
            anyhow::bail!("output folder {} does not exist", folder.display());
        }
    }

    if let Err(e) = preflight::check(Operation::Pdf, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'hoersaal doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let lectures = match args.uni {
        Some(schema) if args.catalog.is_given() => {
            let loader = CatalogLoader::new(Duration::from_secs(settings.catalog.timeout_secs))?;
            let raw = loader.load(&args.catalog.source()?).await?;
            lectures_by_stem(normalize_all(&raw, schema))
        }
        _ => HashMap::new(),
    };

    let renderer = pdf_renderer(&settings)?;
    let page_numbers = !args.no_page_numbers;
    let mut summary = BatchSummary::default();

    for file in &args.files {
        let target = pdf_target(file, args.output_folder.as_deref());
        let metadata = lectures.get(&file_stem(file));

        match render_file(&renderer, file, &target, metadata, page_numbers).await {
            Ok(()) => {
                Output::success(&format!("{}", target.display()));
                summary.processed += 1;
            }
            Err(e) => {
                error!("Failed to render {}: {}", file.display(), e);
                Output::error(&format!("{}: {}", file.display(), e));
                summary.failed += 1;
            }
        }
    }

    Output::batch_summary(&summary);
    Ok(())
}

async fn render_file(
    renderer: &dyn PdfRenderer,
    source: &Path,
    target: &Path,
    metadata: Option<&LectureRecord>,
    page_numbers: bool,
) -> crate::Result<()> {
    let text = tokio::fs::read_to_string(source).await?;
    let title = file_stem(source);

    if metadata.is_some() {
        info!("Using catalog metadata for '{}'", title);
    }

    let bytes = renderer.render_pdf(metadata, &title, &text, page_numbers).await?;
    tokio::fs::write(target, bytes).await?;
    Ok(())
}

/// Index lectures by the file stem their transcriptions are written under.
fn lectures_by_stem(records: Vec<LectureRecord>) -> HashMap<String, LectureRecord> {
    records.into_iter().map(|r| (r.file_stem(), r)).collect()
}

/// `<stem>.pdf` in the output folder, or next to the source file.
fn pdf_target(source: &Path, output_folder: Option<&Path>) -> PathBuf {
    let name = format!("{}.pdf", file_stem(source));
    match output_folder {
        Some(dir) => dir.join(name),
        None => source.with_file_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::Mutex;

    struct RecordingRenderer {
        seen: Mutex<Vec<(Option<String>, String, String)>>,
    }

    #[async_trait]
    impl PdfRenderer for RecordingRenderer {
        async fn render_pdf(
            &self,
            metadata: Option<&LectureRecord>,
            fallback_title: &str,
            transcription: &str,
            _page_numbers: bool,
        ) -> crate::Result<Vec<u8>> {
            self.seen.lock().unwrap().push((
                metadata.map(|m| m.series_title.clone()),
                fallback_title.to_string(),
                transcription.to_string(),
            ));
            Ok(b"%PDF".to_vec())
        }
    }

    fn lecture(title: &str) -> LectureRecord {
        LectureRecord {
            title: title.to_string(),
            author: "Doe, Jane".to_string(),
            contributors: None,
            series_title: "Algorithmen".to_string(),
            duration_millis: 1000,
            recorded_at: DateTime::parse_from_rfc3339("2022-12-20T10:00:00+01:00").unwrap(),
            video_link: "https://media.example.org/v.mp4".to_string(),
            audio_link: None,
        }
    }

    #[test]
    fn test_pdf_target() {
        assert_eq!(
            pdf_target(Path::new("/t/Lecture 1.txt"), None),
            PathBuf::from("/t/Lecture 1.pdf")
        );
        assert_eq!(
            pdf_target(Path::new("/t/Lecture 1.txt"), Some(Path::new("/out"))),
            PathBuf::from("/out/Lecture 1.pdf")
        );
    }

    #[test]
    fn test_lectures_by_sanitized_stem() {
        let lectures = lectures_by_stem(vec![lecture("Teil 1/2"), lecture("Lecture 1")]);
        assert!(lectures.contains_key("Teil 1_2"));
        assert!(lectures.contains_key("Lecture 1"));
    }

    #[tokio::test]
    async fn test_render_file_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Lecture 1.txt");
        std::fs::write(&source, "Hallo\nWelt").unwrap();
        let target = dir.path().join("Lecture 1.pdf");
        let renderer = RecordingRenderer {
            seen: Mutex::new(Vec::new()),
        };
        let record = lecture("Lecture 1");

        render_file(&renderer, &source, &target, Some(&record), true).await.unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"%PDF");
        let seen = renderer.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            (Some("Algorithmen".to_string()), "Lecture 1".to_string(), "Hallo\nWelt".to_string())
        );
    }

    #[tokio::test]
    async fn test_render_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = RecordingRenderer {
            seen: Mutex::new(Vec::new()),
        };

        let result = render_file(
            &renderer,
            &dir.path().join("missing.txt"),
            &dir.path().join("missing.pdf"),
            None,
            false,
        )
        .await;
        assert!(result.is_err());
        assert!(renderer.seen.lock().unwrap().is_empty());
    }
}
