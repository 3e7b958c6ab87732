use crate::error::{Result, SubtoolError};
use crate::subtitle::{BatchAccumulator, ChunkParser, DEFAULT_BATCH_SIZE};
use crate::translate::Translator;
use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

/// Output path for a translated file: `{source without extension}.{language}.srt`.
pub fn translated_output_path(source: &Path, target_language: &str) -> PathBuf {
    let mut name: OsString = source.with_extension("").into_os_string();
    name.push(format!(".{}.srt", target_language.to_lowercase()));
    PathBuf::from(name)
}

/// Streams an SRT file through the chunk parser and batch accumulator,
/// translating one batch at a time.
pub struct TranslationPipeline {
    translator: Option<Arc<dyn Translator>>,
    batch_size: usize,
    show_progress: bool,
}

impl TranslationPipeline {
    pub fn new(translator: Option<Arc<dyn Translator>>) -> Self {
        Self {
            translator,
            batch_size: DEFAULT_BATCH_SIZE,
            show_progress: true,
        }
    }

    /// Set the number of chunks per request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Enable or disable the progress spinner.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.translator.is_some()
    }

    /// Translate `source` into `target_language`, reporting any failure.
    ///
    /// Returns the output path, or `None` if the file could not be
    /// translated. A failure after the output was opened leaves it truncated.
    pub async fn translate(&self, source: &Path, target_language: &str) -> Option<PathBuf> {
        match self.try_translate(source, target_language).await {
            Ok(output) => {
                info!("Translated subtitle saved to: {}", output.display());
                Some(output)
            }
            Err(e) => {
                error!("Translation of {} failed: {}", source.display(), e);
                None
            }
        }
    }

    pub async fn try_translate(&self, source: &Path, target_language: &str) -> Result<PathBuf> {
        let translator = self.translator.as_ref().ok_or_else(|| {
            SubtoolError::Config("No translator configured. Cannot translate.".to_string())
        })?;

        if !source.exists() {
            return Err(SubtoolError::FileNotFound(source.display().to_string()));
        }

        let output = translated_output_path(source, target_language);
        info!(
            "Translating {} to {} ({} blocks per request, {})",
            source.display(),
            target_language,
            self.batch_size,
            translator.name()
        );

        let spinner = self.show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                pb.set_style(style);
            }
            pb.set_message(format!("Translating to {}...", target_language));
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        let outcome = self
            .stream_batches(
                translator.as_ref(),
                source,
                &output,
                target_language,
                spinner.as_ref(),
            )
            .await;
        if let Some(pb) = &spinner {
            finish_spinner(pb, &outcome);
        }
        let (blocks, batches) = outcome?;

        info!("Translated {} blocks in {} requests", blocks, batches);

        Ok(output)
    }

    /// Parse, batch and translate `source` into `output`. Returns the number
    /// of blocks and requests.
    async fn stream_batches(
        &self,
        translator: &dyn Translator,
        source: &Path,
        output: &Path,
        target_language: &str,
        spinner: Option<&ProgressBar>,
    ) -> Result<(usize, usize)> {
        let input = File::open(source).await?;
        let mut lines = BufReader::new(input).lines();
        let mut out = File::create(output).await?;

        let mut parser = ChunkParser::new();
        let mut accumulator = BatchAccumulator::new(self.batch_size);
        let mut batches = 0usize;
        let mut blocks = 0usize;

        while let Some(line) = lines.next_line().await? {
            let Some(chunk) = parser.feed(&line) else {
                continue;
            };
            if let Some(batch) = accumulator.push(chunk) {
                let translated = translate_batch(translator, target_language, &batch).await?;
                out.write_all(format!("{}\n\n", translated).as_bytes()).await?;

                batches += 1;
                blocks += batch.len();
                if let Some(pb) = spinner {
                    pb.set_message(format!("Translated {} blocks", blocks));
                }
            }
        }

        // The last batch is either completed by the final chunk or flushed short.
        let last = parser
            .finish()
            .and_then(|chunk| accumulator.push(chunk))
            .or_else(|| accumulator.flush());

        if let Some(batch) = last {
            let translated = translate_batch(translator, target_language, &batch).await?;
            out.write_all(format!("{}\n", translated).as_bytes()).await?;
            batches += 1;
            blocks += batch.len();
        }
        out.flush().await?;

        Ok((blocks, batches))
    }
}

/// Send one batch as a single request. The reply is trusted; a block-count
/// mismatch is only logged.
async fn translate_batch(
    translator: &dyn Translator,
    target_language: &str,
    batch: &[String],
) -> Result<String> {
    let payload = batch.join("\n");
    debug!("Sending batch of {} blocks ({} bytes)", batch.len(), payload.len());

    let translated = translator.translate(target_language, &payload).await?;
    let translated = translated.trim().to_string();

    let returned = count_timing_lines(&translated);
    if returned != batch.len() {
        warn!(
            "Translation returned {} timed blocks for a batch of {}",
            returned,
            batch.len()
        );
    }

    Ok(translated)
}

/// Stop the spinner; on failure clear it so no stale progress line remains.
fn finish_spinner(pb: &ProgressBar, outcome: &Result<(usize, usize)>) {
    match outcome {
        Ok((blocks, _)) => pb.finish_with_message(format!("✓ Translated {} blocks", blocks)),
        Err(_) => pb.finish_and_clear(),
    }
}

fn count_timing_lines(text: &str) -> usize {
    text.lines().filter(|l| l.contains("-->")).count()
}
