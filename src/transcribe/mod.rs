use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;

use crate::config::OpenAiConfig;
use crate::extractors::AudioFormat;
use crate::Result;

/// Converts an audio file into plain text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe_audio(&self, audio_path: &Path) -> Result<String>;
}

/// Whisper transcription through the OpenAI `/audio/transcriptions` endpoint
pub struct WhisperTranscriber {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl WhisperTranscriber {
    pub fn new(client: Client, config: &OpenAiConfig) -> Self {
        Self {
            client,
            api_url: format!(
                "{}/audio/transcriptions",
                config.api_base.trim_end_matches('/')
            ),
            api_key: config.api_key.clone(),
            model: config.whisper_model.clone(),
        }
    }

    async fn build_form(&self, audio_path: &Path) -> Result<Form> {
        let content = tokio::fs::read(audio_path)
            .await
            .with_context(|| format!("Failed to read {}", audio_path.display()))?;

        let format = audio_path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(AudioFormat::from_extension)
            .unwrap_or(AudioFormat::Mp3);

        let filename = audio_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("audio.{}", format.as_str()));

        let file = Part::bytes(content)
            .file_name(filename)
            .mime_str(format.mime_type())?;

        Ok(Form::new()
            .text("model", self.model.clone())
            .text("response_format", "text")
            .part("file", file))
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe_audio(&self, audio_path: &Path) -> Result<String> {
        tracing::info!("Transcribing {} with {}", audio_path.display(), self.model);

        let form = self.build_form(audio_path).await?;
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("Transcription request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read transcription response")?;

        if !status.is_success() {
            anyhow::bail!("Transcription failed: HTTP {}: {}", status, body.trim());
        }

        tracing::info!("Transcription completed. Length: {} characters", body.len());
        tracing::debug!("Transcript:\n{}", body);

        Ok(body)
    }
}
