//! Lecture processing pipeline for Hoersaal.
//!
//! Processes lectures one at a time: fetch the audio, transcribe it, then write
//! the requested output files. A failing lecture is logged and skipped.

use crate::audio::MediaFetcher;
use crate::catalog::{sanitize_file_stem, LectureRecord};
use crate::error::{HoersaalError, Result};
use crate::render::{render_subtitles, render_text, PdfRenderer, SubtitleFormat};
use crate::transcription::{Segment, Transcriber};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Which files to produce per transcription.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub txt: bool,
    pub srt: bool,
    pub vtt: bool,
    pub pdf: bool,
    /// Add a page number footer to PDFs.
    pub page_numbers: bool,
}

impl OutputOptions {
    /// True if at least one output file is requested.
    pub fn any(&self) -> bool {
        self.txt || self.srt || self.vtt || self.pdf
    }
}

/// Where audio and transcription files are stored.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub audio_dir: PathBuf,
    pub transcription_dir: PathBuf,
}

impl OutputLayout {
    /// `audios/` and `transcriptions/` below `output_dir`.
    pub fn under(output_dir: &Path) -> Self {
        Self {
            audio_dir: output_dir.join("audios"),
            transcription_dir: output_dir.join("transcriptions"),
        }
    }

    /// Cached audio location for a lecture.
    pub fn audio_path(&self, record: &LectureRecord) -> PathBuf {
        self.audio_dir.join(format!("{}.mp3", record.file_stem()))
    }
}

/// Result of processing one lecture or audio file.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub title: String,
    pub segments: usize,
    pub files: Vec<PathBuf>,
    /// Audio came from an earlier run.
    pub cached_audio: bool,
}

/// Counts reported after a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Fetch, transcribe and render pipeline.
pub struct Pipeline {
    fetcher: Arc<dyn MediaFetcher>,
    transcriber: Arc<dyn Transcriber>,
    pdf_renderer: Arc<dyn PdfRenderer>,
    options: OutputOptions,
    language: Option<String>,
    layout: OutputLayout,
}

impl Pipeline {
    /// Create a pipeline writing into `layout`, creating its directories.
    pub fn new(
        fetcher: Arc<dyn MediaFetcher>,
        transcriber: Arc<dyn Transcriber>,
        pdf_renderer: Arc<dyn PdfRenderer>,
        options: OutputOptions,
        language: Option<String>,
        layout: OutputLayout,
    ) -> Result<Self> {
        std::fs::create_dir_all(&layout.audio_dir)?;
        std::fs::create_dir_all(&layout.transcription_dir)?;

        Ok(Self {
            fetcher,
            transcriber,
            pdf_renderer,
            options,
            language,
            layout,
        })
    }

    /// Get the output layout.
    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Process the given lectures in order.
    ///
    /// Per-lecture failures are logged and counted; a missing external tool
    /// aborts the batch since every following lecture would fail the same way.
    pub async fn run_batch(&self, records: &[LectureRecord]) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for (idx, record) in records.iter().enumerate() {
            info!("Lecture {}/{}: {}", idx + 1, records.len(), record.title);

            match self.process_lecture(record).await {
                Ok(result) => {
                    info!("Finished '{}' ({} files written)", result.title, result.files.len());
                    summary.processed += 1;
                }
                Err(e @ HoersaalError::ToolNotFound(_)) => {
                    error!("Aborting batch: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    error!("Failed to process '{}': {}", record.title, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Transcribe local audio files in order, naming outputs after each file.
    pub async fn run_files(&self, files: &[PathBuf]) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for (idx, path) in files.iter().enumerate() {
            info!("File {}/{}: {}", idx + 1, files.len(), path.display());

            let stem = sanitize_file_stem(
                &path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );

            let result = if path.is_file() {
                self.transcribe_file(path, &stem, None).await
            } else {
                Err(HoersaalError::InvalidInput(format!(
                    "{} is not a file",
                    path.display()
                )))
            };

            match result {
                Ok(result) => {
                    info!("Finished '{}' ({} files written)", result.title, result.files.len());
                    summary.processed += 1;
                }
                Err(e @ HoersaalError::ToolNotFound(_)) => {
                    error!("Aborting batch: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    error!("Failed to transcribe {}: {}", path.display(), e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Fetch, transcribe and render a single lecture.
    #[instrument(skip(self, record), fields(title = %record.title))]
    pub async fn process_lecture(&self, record: &LectureRecord) -> Result<ProcessResult> {
        let audio_path = self.layout.audio_path(record);
        let cached_audio = audio_path.is_file();

        if cached_audio {
            info!("Using cached audio file {}", audio_path.display());
        } else {
            if !record.has_audio_track() {
                warn!("No audio track in catalog, extracting audio from the video");
            }
            let started = Instant::now();
            self.fetcher
                .fetch_audio(record.audio_source_link(), &audio_path)
                .await?;
            info!("Download took {:.1}s", started.elapsed().as_secs_f64());
        }

        let mut result = self
            .transcribe_file(&audio_path, &record.file_stem(), Some(record))
            .await?;
        result.title = record.title.clone();
        result.cached_audio = cached_audio;
        Ok(result)
    }

    /// Transcribe an audio file and write outputs named `<stem>.<ext>`.
    #[instrument(skip(self, metadata), fields(audio_path = %audio_path.display()))]
    pub async fn transcribe_file(
        &self,
        audio_path: &Path,
        stem: &str,
        metadata: Option<&LectureRecord>,
    ) -> Result<ProcessResult> {
        let started = Instant::now();
        let segments = self
            .transcriber
            .transcribe(audio_path, self.language.as_deref())
            .await?;
        info!(
            "Transcription took {:.1}s ({} segments)",
            started.elapsed().as_secs_f64(),
            segments.len()
        );

        let files = self.write_outputs(stem, &segments, metadata).await?;

        Ok(ProcessResult {
            title: stem.to_string(),
            segments: segments.len(),
            files,
            cached_audio: false,
        })
    }

    async fn write_outputs(
        &self,
        stem: &str,
        segments: &[Segment],
        metadata: Option<&LectureRecord>,
    ) -> Result<Vec<PathBuf>> {
        let dir = &self.layout.transcription_dir;
        let mut files = Vec::new();
        let text = render_text(segments);

        if self.options.txt {
            let path = dir.join(format!("{stem}.txt"));
            tokio::fs::write(&path, &text).await?;
            files.push(path);
        }

        for (enabled, format) in [
            (self.options.srt, SubtitleFormat::Srt),
            (self.options.vtt, SubtitleFormat::Vtt),
        ] {
            if enabled {
                let path = dir.join(format!("{stem}.{}", format.extension()));
                tokio::fs::write(&path, render_subtitles(segments, format)).await?;
                files.push(path);
            }
        }

        if self.options.pdf {
            let bytes = self
                .pdf_renderer
                .render_pdf(metadata, stem, &text, self.options.page_numbers)
                .await?;
            let path = dir.join(format!("{stem}.pdf"));
            tokio::fs::write(&path, bytes).await?;
            files.push(path);
        }

        for file in &files {
            info!("Wrote {}", file.display());
        }
        Ok(files)
    }
}
