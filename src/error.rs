use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtoolError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("External tool failed: {0}")]
    ExternalTool(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SubtoolError>;
