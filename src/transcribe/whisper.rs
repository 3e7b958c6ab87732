use crate::config::{DEFAULT_BASE_URL, DEFAULT_TRANSCRIPTION_MODEL};
use crate::error::{Result, SubtoolError};
use crate::transcribe::{TranscriptSegment, Transcriber};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Maximum file size for the Whisper API (25 MB).
pub const MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

/// OpenAI Whisper API client.
pub struct WhisperClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl WhisperClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn build_form(&self, audio_path: &Path, language: Option<&str>) -> Result<Form> {
        let file_bytes = fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let mime_type = match audio_path.extension().and_then(|e| e.to_str()) {
            Some("wav") => "audio/wav",
            Some("mp3") => "audio/mpeg",
            Some("m4a") => "audio/mp4",
            Some("flac") => "audio/flac",
            _ => "application/octet-stream",
        };

        let file_part = Part::bytes(file_bytes)
            .file_name(file_name)
            .mime_str(mime_type)?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment");

        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        Ok(form)
    }

    async fn call_api(&self, form: Form) -> Result<WhisperResponse> {
        let url = format!("{}/audio/transcriptions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        debug!("Whisper API response status: {}", status);
        let body = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
            return Err(SubtoolError::Api(format!(
                "Whisper API error ({}): {}",
                status, api_error.error.message
            )));
        }

        Err(SubtoolError::Api(format!(
            "Whisper API error ({}): {}",
            status, body
        )))
    }
}

/// Whisper segments map directly; a response without segments becomes a
/// single segment spanning the whole audio.
fn parse_response(response: WhisperResponse) -> Vec<TranscriptSegment> {
    match response.segments {
        Some(segments) => segments
            .into_iter()
            .map(|s| TranscriptSegment::new(s.start, s.end, s.text))
            .collect(),
        None if response.text.trim().is_empty() => Vec::new(),
        None => vec![TranscriptSegment::new(
            0.0,
            response.duration.unwrap_or(0.0),
            response.text,
        )],
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(
        &self,
        audio: &Path,
        language: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>> {
        debug!("Transcribing {} with Whisper", audio.display());

        let metadata = fs::metadata(audio)
            .await
            .map_err(|_| SubtoolError::FileNotFound(audio.display().to_string()))?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(SubtoolError::Transcription(format!(
                "File too large for Whisper API: {} bytes (max {} bytes)",
                metadata.len(),
                MAX_FILE_SIZE
            )));
        }

        let form = self.build_form(audio, language).await?;
        let segments = parse_response(self.call_api(form).await?);

        debug!("Whisper returned {} segments", segments.len());
        Ok(segments)
    }

    fn name(&self) -> &'static str {
        "OpenAI Whisper"
    }
}

// API response types

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Option<Vec<WhisperSegment>>,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
