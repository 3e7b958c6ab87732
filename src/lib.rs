pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod subtitle;
pub mod transcribe;
pub mod translate;

pub use config::Config;
pub use error::{Result, SubtoolError};
pub use pipeline::{Action, FolderSummary, Workflow};
pub use subtitle::SubtitleBlock;
pub use translate::{TranslationPipeline, Translator};
