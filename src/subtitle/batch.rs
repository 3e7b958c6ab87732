/// Number of chunks sent per translation request.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Groups consecutive chunks into fixed-size batches, preserving order.
#[derive(Debug)]
pub struct BatchAccumulator {
    batch_size: usize,
    current: Vec<String>,
}

impl Default for BatchAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl BatchAccumulator {
    /// Create an accumulator; a size of 0 is treated as 1.
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            current: Vec::with_capacity(batch_size),
        }
    }

    /// Append a chunk, returning the batch once it is full.
    pub fn push(&mut self, chunk: String) -> Option<Vec<String>> {
        self.current.push(chunk);
        if self.current.len() >= self.batch_size {
            Some(std::mem::replace(
                &mut self.current,
                Vec::with_capacity(self.batch_size),
            ))
        } else {
            None
        }
    }

    /// Take whatever is left at end of input.
    pub fn flush(&mut self) -> Option<Vec<String>> {
        if self.current.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.current))
        }
    }
}
