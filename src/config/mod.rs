//! Configuration module for Hoersaal.
//!
//! Handles loading and managing application settings and PDF page templates.

mod settings;
mod templates;

pub use settings::{
    language_hint, CatalogSettings, DownloadSettings, GeneralSettings, PdfSettings, Settings,
    TranscriptionProvider, TranscriptionSettings,
};
pub use templates::Templates;
