pub mod openai;
pub mod pipeline;

pub use openai::OpenAiTranslator;
pub use pipeline::{translated_output_path, TranslationPipeline};

use crate::error::Result;
use async_trait::async_trait;

/// A remote text translation capability.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language` (a language name such as "Swedish").
    async fn translate(&self, target_language: &str, text: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}
