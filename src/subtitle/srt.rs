// SRT subtitle format
use super::timecode::format_timecode;
use super::SubtitleBlock;

/// Serialize a single block, including its trailing blank-line separator.
pub fn serialize(block: &SubtitleBlock) -> String {
    format!(
        "{}\n{} --> {}\n{}\n\n",
        block.index,
        format_timecode(block.start),
        format_timecode(block.end),
        block.text
    )
}

pub struct SrtWriter;

impl SrtWriter {
    pub fn format(&self, blocks: &[SubtitleBlock]) -> String {
        blocks.iter().map(serialize).collect()
    }
}

#[derive(Debug, Default)]
enum ParserState {
    #[default]
    NoOpenChunk,
    OpenChunk(String),
}

/// Groups SRT lines into raw per-entry chunks.
///
/// A chunk is closed only when the next numeric index line arrives (or at
/// end of stream). Blank lines are skipped and do NOT close a chunk, so a
/// subtitle text line consisting only of digits starts a new chunk.
/// Lines arriving before any index line open an index-less chunk; nothing
/// is validated. Index lines may use any Unicode numeric characters, not
/// only ASCII digits.
#[derive(Debug, Default)]
pub struct ChunkParser {
    state: ParserState,
}

impl ChunkParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (with or without its line terminator). Returns the
    /// previous chunk when this line starts a new one.
    pub fn feed(&mut self, line: &str) -> Option<String> {
        let line = line.trim_end_matches(['\n', '\r']);
        let trimmed = line.trim();

        if is_index_line(trimmed) {
            let closed = self.finish();
            self.state = ParserState::OpenChunk(format!("{}\n", line));
            return closed;
        }

        if trimmed.is_empty() {
            return None;
        }

        // Timing lines and text lines are both appended verbatim.
        match &mut self.state {
            ParserState::OpenChunk(chunk) => {
                chunk.push_str(line);
                chunk.push('\n');
            }
            ParserState::NoOpenChunk => {
                self.state = ParserState::OpenChunk(format!("{}\n", line));
            }
        }
        None
    }

    /// Close the stream, yielding the open chunk if any.
    pub fn finish(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            ParserState::OpenChunk(chunk) => Some(chunk),
            ParserState::NoOpenChunk => None,
        }
    }
}

fn is_index_line(trimmed: &str) -> bool {
    !trimmed.is_empty() && trimmed.chars().all(char::is_numeric)
}

/// Parse a complete line sequence into chunks.
pub fn parse_chunks<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parser = ChunkParser::new();
    let mut chunks: Vec<String> = lines.into_iter().filter_map(|l| parser.feed(l)).collect();
    chunks.extend(parser.finish());
    chunks
}
