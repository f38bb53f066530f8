//! Fixed-size overlapping windows over the document

use crate::error::ExtractorError;
use docket_domain::Chunk;

/// Splits text into overlapping windows of at most `chunk_size` characters
///
/// Windows start at `0, step, 2 * step, ...` with `step = chunk_size - overlap`
/// and stop once a window reaches the end of the text, so no trailing window
/// is wholly contained in its predecessor. Empty text yields one empty chunk.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new text chunker
    ///
    /// # Errors
    ///
    /// [`ExtractorError::Config`] when `chunk_size <= overlap`, since the
    /// window would never advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ExtractorError> {
        if chunk_size <= overlap {
            return Err(ExtractorError::Config(format!(
                "Chunk size ({}) must be greater than overlap ({})",
                chunk_size, overlap
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Chunk the given text, in document order
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        // Byte offset of every character boundary, plus the end of the text
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = bounds.len() - 1;
        let step = self.chunk_size - self.overlap;

        let mut windows = Vec::new();
        let mut start = 0;
        loop {
            let end = usize::min(start + self.chunk_size, char_len);
            windows.push((start, &text[bounds[start]..bounds[end]]));
            if end >= char_len {
                break;
            }
            start += step;
        }

        let total = windows.len();
        windows
            .into_iter()
            .enumerate()
            .map(|(idx, (start, slice))| Chunk {
                ordinal: idx + 1,
                total,
                start,
                text: slice.to_string(),
            })
            .collect()
    }
}

/// Convenience wrapper: validate and chunk in one call
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>, ExtractorError> {
    Ok(TextChunker::new(chunk_size, overlap)?.chunk(text))
}
