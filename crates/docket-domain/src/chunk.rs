//! Chunk module - a window over the source document

use serde::{Deserialize, Serialize};

/// A contiguous slice of the document, tagged with its position
///
/// Chunks overlap their neighbours by a fixed number of characters so that a
/// fact split across a boundary is fully visible in at least one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 1-based position of this chunk in document order
    pub ordinal: usize,

    /// Total number of chunks the document was split into
    pub total: usize,

    /// Offset of the first character, counted in characters (not bytes)
    pub start: usize,

    /// The chunk text
    pub text: String,
}

impl Chunk {
    /// Number of characters in this chunk
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether this is the final chunk of the document
    pub fn is_last(&self) -> bool {
        self.ordinal == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len_counts_characters() {
        let chunk = Chunk {
            ordinal: 1,
            total: 1,
            start: 0,
            text: "caf\u{e9}".to_string(),
        };
        assert_eq!(chunk.char_len(), 4);
        assert!(chunk.is_last());
    }
}
