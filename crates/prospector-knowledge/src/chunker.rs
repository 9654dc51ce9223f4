//! Overlapping fixed-window chunking.
//!
//! Windows of `window` chars advance by `stride` chars. With the defaults
//! (1000/500) every boundary falls in the middle of another chunk, so a
//! section header and the list that follows it always share a chunk.
//! Lengths are counted in chars, never bytes.

use prospector_core::config::IndexConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    pub window: usize,
    pub stride: usize,
    /// Windows with this many chars or fewer are dropped.
    pub min_chars: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self { window: 1000, stride: 500, min_chars: 50 }
    }
}

impl Chunker {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            window: config.window,
            stride: config.stride,
            min_chars: config.min_chunk_chars,
        }
    }

    /// Split text into ordered, overlapping chunks. Same text, same chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if self.window == 0 || self.stride == 0 {
            return Vec::new();
        }
        let chars: Vec<char> = text.chars().collect();
        (0..chars.len())
            .step_by(self.stride)
            .filter_map(|start| {
                let end = (start + self.window).min(chars.len());
                (end - start > self.min_chars).then(|| chars[start..end].iter().collect())
            })
            .collect()
    }
}
