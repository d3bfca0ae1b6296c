//! Hoersaal - Lecture Downloader and Transcriber
//!
//! A CLI tool that downloads recorded university lectures and turns them into
//! transcriptions, subtitles and PDFs.
//!
//! The name "Hoersaal" is the German word for "lecture hall."
//!
//! # Overview
//!
//! Hoersaal allows you to:
//! - Read lecture catalogs published by TU Wien and the University of Vienna
//! - Pick the best video and audio track of each recorded lecture
//! - Download the audio and transcribe it with Whisper
//! - Write plain text, SRT/VTT subtitles and PDF transcripts
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and PDF templates
//! - `catalog` - Catalog loading, schema normalization and lecture selection
//! - `audio` - Audio download and splitting
//! - `transcription` - Speech-to-text transcription
//! - `render` - Text, subtitle and PDF rendering
//! - `pipeline` - Per-lecture processing
//! - `logging` - Console and log file output
//!
//! # Example
//!
//! ```rust,no_run
//! use hoersaal::catalog::{normalize_all, CatalogLoader, CatalogSchema, Source};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let loader = CatalogLoader::new(Duration::from_secs(5))?;
//!     let raw = loader.load(&Source::File("catalog.json".into())).await?;
//!
//!     for lecture in normalize_all(&raw, CatalogSchema::Tu) {
//!         println!("{} ({})", lecture.title, lecture.video_link);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod transcription;

pub use error::{HoersaalError, Result};
