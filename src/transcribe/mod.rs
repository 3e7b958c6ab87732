pub mod assembler;
pub mod whisper;

pub use assembler::TranscriptionAssembler;
pub use whisper::WhisperClient;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// A timed piece of transcribed speech. Times are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// A speech-to-text model producing ordered segments.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &Path, language: Option<&str>)
        -> Result<Vec<TranscriptSegment>>;
    fn name(&self) -> &'static str;
}
