//! Transcription module for Hoersaal.
//!
//! Turns an audio file into time-stamped [`Segment`]s.
//!
//! # Providers
//!
//! - **Local** (default): runs the openai-whisper command line tool with a
//!   pretrained model (`tiny`, `base`, `small`, ...). Output is deterministic for
//!   identical weights, audio and options, but may change between model versions.
//! - **OpenAI**: uploads the audio to the Whisper API, splitting long recordings
//!   into chunks that are transcribed one after another.

mod local;
mod models;
mod openai;

pub use local::LocalWhisperTranscriber;
pub use models::{Segment, WhisperOutput};
pub use openai::{is_api_key_configured, OpenAiTranscriber};

use crate::config::{TranscriptionProvider, TranscriptionSettings};
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file. `language` of `None` lets the model detect it.
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Vec<Segment>>;
}

/// Build the transcriber selected in the settings, using `model` for the local provider.
pub fn create_transcriber(
    settings: &TranscriptionSettings,
    model: &str,
) -> Result<Arc<dyn Transcriber>> {
    let transcriber: Arc<dyn Transcriber> = match settings.provider {
        TranscriptionProvider::Local => Arc::new(LocalWhisperTranscriber::new(
            &settings.whisper_binary,
            model,
        )),
        TranscriptionProvider::OpenAi => Arc::new(OpenAiTranscriber::with_config(
            &settings.openai_model,
            settings.chunk_duration_seconds,
        )?),
    };
    Ok(transcriber)
}
