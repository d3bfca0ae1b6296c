//! CLI module for Hoersaal.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::catalog::{CatalogSchema, Source};
use crate::config::Settings;
use crate::pipeline::OutputOptions;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

/// Hoersaal - Lecture Downloader and Transcriber
///
/// Downloads recorded university lectures listed in a catalog and transcribes
/// them into text, subtitles and PDFs.
#[derive(Parser, Debug)]
#[command(name = "hoersaal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and transcribe lectures from a catalog
    Run(RunArgs),

    /// Transcribe local audio files
    Transcribe(TranscribeArgs),

    /// Convert transcription text files into PDFs
    Pdf(PdfArgs),

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

/// Where the lecture catalog comes from.
#[derive(Args, Debug, Clone)]
#[group(id = "catalog_source")]
pub struct CatalogArgs {
    /// Path to a catalog JSON file
    #[arg(short = 'p', long, conflicts_with = "data_link")]
    pub data_path: Option<PathBuf>,

    /// Link to a catalog JSON document
    #[arg(short = 'k', long)]
    pub data_link: Option<Url>,
}

impl CatalogArgs {
    /// True if either a path or a link was given.
    pub fn is_given(&self) -> bool {
        self.data_path.is_some() || self.data_link.is_some()
    }

    pub fn source(&self) -> crate::Result<Source> {
        Source::from_options(self.data_path.clone(), self.data_link.clone())
    }
}

/// Speech recognition options.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Whisper model name (tiny, base, small, medium, large)
    #[arg(short = 'm', long)]
    pub model_name: Option<String>,

    /// Spoken language, or "auto" to detect it
    #[arg(short, long)]
    pub language: Option<String>,
}

/// Which output files to write.
#[derive(Args, Debug, Clone, Default)]
pub struct FormatArgs {
    /// Write a plain text transcription
    #[arg(long)]
    pub txt: bool,

    /// Write WebVTT-style subtitles
    #[arg(long)]
    pub vtt: bool,

    /// Write SRT subtitles
    #[arg(long)]
    pub srt: bool,

    /// Write a PDF with page numbers
    #[arg(long, conflicts_with = "pdf_no_num")]
    pub pdf: bool,

    /// Write a PDF without page numbers
    #[arg(long)]
    pub pdf_no_num: bool,
}

impl FormatArgs {
    pub fn to_options(&self) -> OutputOptions {
        OutputOptions {
            txt: self.txt,
            srt: self.srt,
            vtt: self.vtt,
            pdf: self.pdf || self.pdf_no_num,
            page_numbers: self.pdf,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// University whose catalog format is used
    #[arg(long, value_enum)]
    pub uni: CatalogSchema,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Title of a lecture to transcribe (repeatable)
    #[arg(long = "vo", value_name = "TITLE")]
    pub vos: Vec<String>,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub formats: FormatArgs,

    /// Existing folder receiving audio files, transcriptions and the log
    #[arg(short, long)]
    pub output_folder: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TranscribeArgs {
    /// Audio files to transcribe, relative to the input folder (default: all audio files in it)
    pub files: Vec<PathBuf>,

    /// Folder containing the audio files
    #[arg(short, long, default_value = ".")]
    pub input_folder: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub formats: FormatArgs,

    /// Existing folder receiving the transcriptions and the log
    #[arg(short, long)]
    pub output_folder: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PdfArgs {
    /// Transcription text files to convert
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// University whose catalog provides lecture metadata
    #[arg(long, value_enum, requires = "catalog_source")]
    pub uni: Option<CatalogSchema>,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Omit page numbers
    #[arg(long)]
    pub no_page_numbers: bool,

    /// Folder receiving the PDFs (default: next to each text file)
    #[arg(short, long)]
    pub output_folder: Option<PathBuf>,
}

impl Commands {
    /// Folder whose log file receives this command's log lines.
    ///
    /// `default` is the configured output directory, used when a pipeline
    /// command was given no explicit output folder.
    pub fn log_dir(&self, default: PathBuf) -> Option<PathBuf> {
        let expand = |folder: &PathBuf| Settings::expand_path(&folder.to_string_lossy());
        match self {
            Commands::Run(args) => Some(args.output_folder.as_ref().map(expand).unwrap_or(default)),
            Commands::Transcribe(args) => {
                Some(args.output_folder.as_ref().map(expand).unwrap_or(default))
            }
            Commands::Pdf(args) => args.output_folder.as_ref().map(expand),
            Commands::Doctor | Commands::Config { .. } => None,
        }
    }
}
