pub mod batch;
pub mod srt;
pub mod timecode;

pub use batch::{BatchAccumulator, DEFAULT_BATCH_SIZE};
pub use srt::{parse_chunks, serialize, ChunkParser, SrtWriter};
pub use timecode::format_timecode;

/// One timed caption entry. Times are fractional seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleBlock {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl SubtitleBlock {
    pub fn new(index: usize, start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            index,
            start,
            end,
            text: text.into(),
        }
    }
}
