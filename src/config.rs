use crate::error::{Result, SubtoolError};
use crate::subtitle::batch::DEFAULT_BATCH_SIZE;
use crate::transcribe::WhisperClient;
use crate::translate::{OpenAiTranslator, Translator};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TRANSLATION_MODEL: &str = "gpt-3.5-turbo-0125";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub api_base_url: String,
    pub translation_model: String,
    pub transcription_model: String,
    pub batch_size: usize,
    pub language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            api_base_url: DEFAULT_BASE_URL.to_string(),
            translation_model: DEFAULT_TRANSLATION_MODEL.to_string(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            language: "en".to_string(),
        }
    }
}

impl Config {
    /// Load from the user config directory, then apply environment overrides.
    pub fn load() -> Self {
        let config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::read_or_default(&path),
            _ => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Load from an explicit file, then apply environment overrides.
    pub fn load_from(path: &Path) -> Self {
        Self::read_or_default(path).with_env_overrides()
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SubtoolError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn read_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                self.openai_api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("SUBTOOL_BASE_URL") {
            self.api_base_url = url;
        }
        if let Ok(size) = std::env::var("SUBTOOL_BATCH_SIZE") {
            match size.parse() {
                Ok(n) => self.batch_size = n,
                Err(_) => warn!("Ignoring invalid SUBTOOL_BATCH_SIZE: {}", size),
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(SubtoolError::Config(
                "Batch size must be greater than 0".to_string(),
            ));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(SubtoolError::Config("API base URL is empty".to_string()));
        }
        Ok(())
    }

    fn api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                SubtoolError::Config(
                    "OPENAI_API_KEY not set. Export it or add openai_api_key to config.toml"
                        .to_string(),
                )
            })
    }

    /// Build the translation capability, or `None` when no credential is configured.
    pub fn translator(&self) -> Option<Arc<dyn Translator>> {
        match self.api_key() {
            Ok(key) => Some(Arc::new(
                OpenAiTranslator::new(key.to_string())
                    .with_model(self.translation_model.clone())
                    .with_base_url(self.api_base_url.clone()),
            )),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    pub fn transcriber(&self) -> Result<WhisperClient> {
        let key = self.api_key()?;
        Ok(WhisperClient::new(key.to_string())
            .with_model(self.transcription_model.clone())
            .with_base_url(self.api_base_url.clone()))
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("subtool").join("config.toml"))
    }
}
