//! Translation through the OpenAI Chat Completions API.

use crate::config::{DEFAULT_BASE_URL, DEFAULT_TRANSLATION_MODEL};
use crate::error::{Result, SubtoolError};
use crate::translate::Translator;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Translator backed by an OpenAI chat model.
pub struct OpenAiTranslator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiTranslator {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: DEFAULT_TRANSLATION_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Use a different chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a different API root (e.g. a proxy or a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn system_prompt(target_language: &str) -> String {
        format!(
            "Translate the following English subtitles into {}. Maintain the original subtitle numbering and timing. Translate accurately.",
            target_language
        )
    }

    fn build_request(&self, target_language: &str, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Self::system_prompt(target_language),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize, Debug)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(&self, target_language: &str, text: &str) -> Result<String> {
        debug!(
            "Translating {} bytes to {} with {}",
            text.len(),
            target_language,
            self.model
        );

        let request = self.build_request(target_language, text);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SubtoolError::Api(format!("Translation request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubtoolError::Api(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(SubtoolError::Api(format!(
                    "Translation API error ({}): {}",
                    status, api_error.error.message
                )));
            }
            return Err(SubtoolError::Api(format!(
                "Translation API error ({}): {}",
                status, body
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SubtoolError::Api("Translation response had no content".to_string()))?;

        Ok(content.trim().to_string())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
