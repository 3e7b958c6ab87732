use super::TranscriptSegment;
use crate::error::Result;
use crate::subtitle::{SrtWriter, SubtitleBlock};
use std::path::Path;
use tracing::debug;

/// Turns transcript segments into numbered subtitle blocks.
#[derive(Debug, Default)]
pub struct TranscriptionAssembler;

impl TranscriptionAssembler {
    /// One block per segment, numbered from 1, text trimmed.
    pub fn assemble(&self, segments: &[TranscriptSegment]) -> Vec<SubtitleBlock> {
        segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                SubtitleBlock::new(i + 1, segment.start, segment.end, segment.text.trim())
            })
            .collect()
    }

    /// Serialize the segments and write them to `output`.
    pub async fn write(&self, segments: &[TranscriptSegment], output: &Path) -> Result<usize> {
        let blocks = self.assemble(segments);
        let content = SrtWriter.format(&blocks);
        tokio::fs::write(output, content).await?;

        debug!("Wrote {} blocks to {}", blocks.len(), output.display());
        Ok(blocks.len())
    }
}
