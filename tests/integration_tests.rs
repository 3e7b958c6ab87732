//! Integration tests for subtool
//!
//! These tests drive the public API end to end with in-memory translators,
//! so they need neither API keys nor external tools.

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use subtool::subtitle::{parse_chunks, serialize, BatchAccumulator, SrtWriter, SubtitleBlock};
use subtool::transcribe::{TranscriptSegment, TranscriptionAssembler};
use subtool::translate::translated_output_path;
use subtool::{Action, SubtoolError, TranslationPipeline, Translator, Workflow};

/// Uppercases every text line and records the payloads it saw.
#[derive(Default)]
struct ShoutingTranslator {
    payloads: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Translator for ShoutingTranslator {
    async fn translate(&self, target_language: &str, text: &str) -> subtool::Result<String> {
        self.payloads
            .lock()
            .unwrap()
            .push((target_language.to_string(), text.to_string()));
        Ok(text
            .lines()
            .map(|l| if l.contains("-->") { l.to_string() } else { l.to_uppercase() })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn name(&self) -> &'static str {
        "shouting"
    }
}

fn sample_blocks(n: usize) -> Vec<SubtitleBlock> {
    (1..=n)
        .map(|i| {
            let start = i as f64 * 2.0;
            SubtitleBlock::new(i, start, start + 1.5, format!("line number {}", i))
        })
        .collect()
}

fn write_srt(dir: &Path, name: &str, blocks: &[SubtitleBlock]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, SrtWriter.format(blocks)).unwrap();
    path
}

// ============================================================================
// Block format
// ============================================================================

mod block_format_tests {
    use super::*;

    #[test]
    fn test_serialized_file_parses_back_per_block() {
        let blocks = sample_blocks(3);
        let content = SrtWriter.format(&blocks);
        let chunks = parse_chunks(content.lines());

        assert_eq!(chunks.len(), 3);
        for (chunk, block) in chunks.iter().zip(&blocks) {
            assert_eq!(*chunk, format!("{}\n", serialize(block).trim_end()));
        }
    }

    #[test]
    fn test_spec_sample_two_chunks() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\nHello\n\n2\n00:00:01,000 --> 00:00:02,000\nWorld\n";
        let chunks = parse_chunks(input.lines());

        assert_eq!(chunks.len(), 2);
        for chunk in &chunks {
            assert_eq!(chunk.lines().count(), 3);
            assert!(!chunk.contains("\n\n"));
        }
    }

    #[test]
    fn test_batches_preserve_order_across_file() {
        let content = SrtWriter.format(&sample_blocks(12));
        let mut acc = BatchAccumulator::new(5);
        let mut sizes = Vec::new();
        let mut seen = Vec::new();

        for chunk in parse_chunks(content.lines()) {
            if let Some(batch) = acc.push(chunk) {
                sizes.push(batch.len());
                seen.extend(batch);
            }
        }
        if let Some(batch) = acc.flush() {
            sizes.push(batch.len());
            seen.extend(batch);
        }

        assert_eq!(sizes, vec![5, 5, 2]);
        let indexes: Vec<String> = seen
            .iter()
            .map(|c| c.lines().next().unwrap().to_string())
            .collect();
        let expected: Vec<String> = (1..=12).map(|i| i.to_string()).collect();
        assert_eq!(indexes, expected);
    }
}

// ============================================================================
// Translation pipeline
// ============================================================================

mod translation_tests {
    use super::*;

    #[tokio::test]
    async fn test_translate_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_srt(dir.path(), "episode.srt", &sample_blocks(6));

        let translator = Arc::new(ShoutingTranslator::default());
        let pipeline = TranslationPipeline::new(Some(translator.clone())).with_progress(false);
        let output = pipeline.translate(&source, "Swedish").await.unwrap();

        assert_eq!(output, dir.path().join("episode.swedish.srt"));

        let payloads = translator.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 2);
        assert!(payloads.iter().all(|(lang, _)| lang == "Swedish"));

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("1\n00:00:02,000 --> 00:00:03,500\nLINE NUMBER 1\n\n2\n"));
        assert!(written.contains("LINE NUMBER 5\n\n6\n00:00:12,000 --> 00:00:13,500\nLINE NUMBER 6\n"));
        assert!(written.ends_with("LINE NUMBER 6\n"));

        // The translated file is itself parseable into the same number of entries.
        assert_eq!(parse_chunks(written.lines()).len(), 6);
    }

    #[tokio::test]
    async fn test_unconfigured_pipeline_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_srt(dir.path(), "episode.srt", &sample_blocks(2));

        let pipeline = TranslationPipeline::new(None).with_progress(false);
        assert!(pipeline.translate(&source, "French").await.is_none());
        assert!(!translated_output_path(&source, "French").exists());
        assert!(matches!(
            pipeline.try_translate(&source, "French").await,
            Err(SubtoolError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_folder_translation_continues_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("season1");
        std::fs::create_dir_all(&nested).unwrap();
        write_srt(dir.path(), "a.srt", &sample_blocks(3));
        write_srt(&nested, "b.SRT", &sample_blocks(7));
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let translator = Arc::new(ShoutingTranslator::default());
        let pipeline = TranslationPipeline::new(Some(translator.clone())).with_progress(false);
        let workflow = Workflow::new(pipeline).with_progress(false);

        let action = Action::Translate {
            target_language: "German".to_string(),
        };
        let summary = workflow.process_folder(dir.path(), &action).await.unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 0);
        assert!(dir.path().join("a.german.srt").exists());
        assert!(nested.join("b.german.srt").exists());
        // 1 request for 3 blocks, 2 requests for 7 blocks.
        assert_eq!(translator.payloads.lock().unwrap().len(), 3);
    }
}

// ============================================================================
// Transcription assembly
// ============================================================================

mod transcription_tests {
    use super::*;

    #[tokio::test]
    async fn test_assemble_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("video.srt");
        let segments = vec![
            TranscriptSegment::new(0.0, 1.2, " Hi "),
            TranscriptSegment::new(1.2, 2.0, "there"),
        ];

        TranscriptionAssembler.write(&segments, &output).await.unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.starts_with(
            "1\n00:00:00,000 --> 00:00:01,200\nHi\n\n2\n00:00:01,200 --> 00:00:02,000\nthere\n\n"
        ));
    }

    #[test]
    fn test_long_recording_timecodes() {
        let segments = vec![TranscriptSegment::new(3661.5, 3725.0, "late line")];
        let blocks = TranscriptionAssembler.assemble(&segments);

        assert_eq!(
            serialize(&blocks[0]),
            "1\n01:01:01,500 --> 01:02:05,000\nlate line\n\n"
        );
    }
}
