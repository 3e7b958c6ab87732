use crate::error::{Result, SubtoolError};
use crate::media::audio::{extract_audio_segment, plan_segments, wav_duration};
use crate::media::{extract_audio, extract_subtitles, is_video_file};
use crate::transcribe::whisper::MAX_FILE_SIZE;
use crate::transcribe::{Transcriber, TranscriptSegment, TranscriptionAssembler};
use crate::translate::TranslationPipeline;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// What to do with each matching file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Extract embedded subtitle tracks next to the video.
    Extract,
    /// Transcribe the video's audio into `{video}.srt`.
    Transcribe,
    /// Translate an SRT file into the given language.
    Translate { target_language: String },
}

impl Action {
    /// Whether a file found during a folder walk is handled by this action.
    pub fn applies_to(&self, path: &Path) -> bool {
        match self {
            Action::Extract | Action::Transcribe => is_video_file(path),
            Action::Translate { .. } => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("srt"))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Extract => write!(f, "extract"),
            Action::Transcribe => write!(f, "transcribe"),
            Action::Translate { target_language } => write!(f, "translate to {}", target_language),
        }
    }
}

/// Counts from a folder run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Audio longer than the upload limit is transcribed in windows of this length.
pub const SEGMENT_DURATION: Duration = Duration::from_secs(600);

/// Output path for a transcription: `{video without extension}.srt`.
pub fn transcript_output_path(video: &Path) -> PathBuf {
    video.with_extension("srt")
}

/// Holds the long-lived capabilities and runs one action per file.
pub struct Workflow {
    transcriber: Option<Box<dyn Transcriber>>,
    translation: TranslationPipeline,
    language: String,
    show_progress: bool,
}

impl Workflow {
    pub fn new(translation: TranslationPipeline) -> Self {
        Self {
            transcriber: None,
            translation,
            language: "en".to_string(),
            show_progress: true,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Box<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Language hint passed to the transcriber.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn spinner(&self, message: &str) -> Option<ProgressBar> {
        self.show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                pb.set_style(style);
            }
            pb.set_message(message.to_string());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        })
    }

    /// Run one action on one file. Failures are reported and yield no output.
    pub async fn run(&self, path: &Path, action: &Action) -> Option<Vec<PathBuf>> {
        match action {
            Action::Extract => self.extract(path).await,
            Action::Transcribe => self.generate_subtitles(path).await.map(|p| vec![p]),
            Action::Translate { target_language } => self
                .translation
                .translate(path, target_language)
                .await
                .map(|p| vec![p]),
        }
    }

    /// Extract all subtitle tracks next to the video.
    pub async fn extract(&self, video: &Path) -> Option<Vec<PathBuf>> {
        if !video.exists() {
            error!("File does not exist: {}", video.display());
            return None;
        }
        let output_dir = video
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        match extract_subtitles(video, &output_dir).await {
            Ok(paths) => Some(paths),
            Err(e) => {
                error!("Subtitle extraction from {} failed: {}", video.display(), e);
                None
            }
        }
    }

    /// Transcribe a video into `{video}.srt`, reporting any failure.
    pub async fn generate_subtitles(&self, video: &Path) -> Option<PathBuf> {
        match self.try_generate_subtitles(video).await {
            Ok(output) => {
                info!("Subtitle file saved to: {}", output.display());
                Some(output)
            }
            Err(e) => {
                error!("Error generating subtitles for {}: {}", video.display(), e);
                None
            }
        }
    }

    pub async fn try_generate_subtitles(&self, video: &Path) -> Result<PathBuf> {
        let start_time = Instant::now();

        if !video.exists() {
            return Err(SubtoolError::FileNotFound(video.display().to_string()));
        }
        let transcriber = self.transcriber.as_ref().ok_or_else(|| {
            SubtoolError::Config("No transcriber configured. Cannot transcribe.".to_string())
        })?;

        // Dropping the temp dir removes the intermediate audio on every exit path.
        let temp_dir = TempDir::new()?;
        let audio_path = temp_dir.path().join("audio.wav");
        debug!("Using temp directory: {:?}", temp_dir.path());

        info!("Stage 1/3: Extracting audio from {}", video.display());
        let pb = self.spinner("Extracting audio...");
        let extracted = extract_audio(video, &audio_path).await;
        if let (Some(pb), Err(_)) = (&pb, &extracted) {
            pb.finish_and_clear();
        }
        extracted?;
        if let Some(pb) = pb {
            pb.finish_with_message("✓ Audio extracted");
        }

        info!("Stage 2/3: Transcribing with {}", transcriber.name());
        let pb = self.spinner("Transcribing...");
        let segments = self
            .transcribe_audio(transcriber.as_ref(), &audio_path, temp_dir.path())
            .await;
        if let (Some(pb), Err(_)) = (&pb, &segments) {
            pb.finish_and_clear();
        }
        let segments = segments?;
        if let Some(pb) = pb {
            pb.finish_with_message(format!("✓ Transcribed {} segments", segments.len()));
        }

        info!("Stage 3/3: Writing subtitles");
        let output = transcript_output_path(video);
        let count = TranscriptionAssembler.write(&segments, &output).await?;

        info!(
            "Wrote {} entries in {:.2}s",
            count,
            start_time.elapsed().as_secs_f64()
        );
        Ok(output)
    }

    /// Transcribe `audio`, splitting it into [`SEGMENT_DURATION`] windows under
    /// `scratch` when it is over the upload limit. Segment times are shifted
    /// back onto the full timeline.
    async fn transcribe_audio(
        &self,
        transcriber: &dyn Transcriber,
        audio: &Path,
        scratch: &Path,
    ) -> Result<Vec<TranscriptSegment>> {
        let language = Some(self.language.as_str());
        let size = tokio::fs::metadata(audio).await?.len();
        if size <= MAX_FILE_SIZE {
            return transcriber.transcribe(audio, language).await;
        }

        let windows = plan_segments(wav_duration(size), SEGMENT_DURATION);
        info!(
            "Audio is {} bytes, transcribing in {} segments",
            size,
            windows.len()
        );

        let mut segments = Vec::new();
        for (i, (start, end)) in windows.into_iter().enumerate() {
            let part = scratch.join(format!("segment_{:03}.wav", i));
            extract_audio_segment(audio, &part, start, end).await?;
            let transcribed = transcriber.transcribe(&part, language).await?;
            segments.extend(offset_segments(transcribed, start.as_secs_f64()));
            tokio::fs::remove_file(&part).await?;
        }
        Ok(segments)
    }

    /// Walk `dir` recursively and apply `action` to each matching file, one at a time.
    pub async fn process_folder(&self, dir: &Path, action: &Action) -> Result<FolderSummary> {
        if !dir.is_dir() {
            return Err(SubtoolError::FileNotFound(format!(
                "Invalid folder path: {}",
                dir.display()
            )));
        }

        let files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| action.applies_to(path))
            .collect();

        info!("{} matching files for {} in {}", files.len(), action, dir.display());

        let mut summary = FolderSummary::default();
        for file in files {
            match self.run(&file, action).await {
                Some(_) => summary.processed += 1,
                None => summary.failed += 1,
            }
        }

        info!(
            "Folder done: {} processed, {} failed",
            summary.processed, summary.failed
        );
        Ok(summary)
    }
}

fn offset_segments(segments: Vec<TranscriptSegment>, offset: f64) -> Vec<TranscriptSegment> {
    segments
        .into_iter()
        .map(|s| TranscriptSegment::new(s.start + offset, s.end + offset, s.text))
        .collect()
}
