//! OpenAI Whisper API transcription.

use super::{Segment, Transcriber};
use crate::audio::split_audio;
use crate::error::{HoersaalError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Timeout for a single upload (5 minutes).
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Returns true if an OpenAI API key is available in the environment.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.trim().is_empty())
}

fn create_client(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}

/// Transcriber uploading audio to the OpenAI Whisper API.
pub struct OpenAiTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    chunk_duration_seconds: u32,
}

impl OpenAiTranscriber {
    /// Create a transcriber for `model`, splitting audio longer than `chunk_duration_seconds`.
    pub fn with_config(model: &str, chunk_duration_seconds: u32) -> Result<Self> {
        if chunk_duration_seconds == 0 {
            return Err(HoersaalError::Config(
                "transcription.chunk_duration_seconds must be greater than 0".into(),
            ));
        }

        Ok(Self {
            client: create_client(Duration::from_secs(REQUEST_TIMEOUT_SECS))?,
            model: model.to_string(),
            chunk_duration_seconds,
        })
    }

    /// Transcribe one file without splitting.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path, language: Option<&str>) -> Result<Vec<Segment>> {
        let file_bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(file_name, file_bytes))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson);

        if let Some(lang) = language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| HoersaalError::Transcribe(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| HoersaalError::Transcribe(format!("Whisper API error: {}", e)))?;

        let segments = match response.segments {
            Some(segs) => segs
                .iter()
                .map(|s| Segment::new(s.start as f64, s.end as f64, s.text.clone()))
                .collect(),
            // Single segment covering the whole response
            None => vec![Segment::new(0.0, response.duration as f64, response.text)],
        };

        debug!("Transcribed {} segments", segments.len());
        Ok(segments)
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display(), model = %self.model))]
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Vec<Segment>> {
        let temp_dir = tempfile::tempdir()?;
        let chunks = split_audio(audio_path, temp_dir.path(), self.chunk_duration_seconds).await?;

        if chunks.len() == 1 {
            return self.transcribe_single(audio_path, language).await;
        }

        let chunk_count = chunks.len();
        info!("Processing {} audio chunks with {}", chunk_count, self.model);

        let pb = ProgressBar::new(chunk_count as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("  {spinner:.green} Whisper   [{bar:30.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }

        // Chunks go one at a time so segment order follows the audio
        let mut all_segments = Vec::new();
        for (idx, (chunk_path, offset)) in chunks.into_iter().enumerate() {
            match self.transcribe_single(&chunk_path, language).await {
                Ok(segments) => {
                    all_segments.extend(segments.into_iter().map(|s| s.shifted(offset)));
                    pb.inc(1);
                }
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(HoersaalError::Transcribe(format!(
                        "Chunk {} at {:.0}s failed: {}",
                        idx, offset, e
                    )));
                }
            }
        }

        pb.finish_and_clear();
        Ok(all_segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_chunk_duration_rejected() {
        let result = OpenAiTranscriber::with_config("whisper-1", 0);
        assert!(matches!(result, Err(HoersaalError::Config(_))));
    }

    #[test]
    fn test_with_config() {
        let transcriber = OpenAiTranscriber::with_config("whisper-1", 600).unwrap();
        assert_eq!(transcriber.model, "whisper-1");
        assert_eq!(transcriber.chunk_duration_seconds, 600);
    }
}
