//! Text chunking for indexing.
//!
//! Splits text into overlapping windows of at most `chunk_size` characters,
//! preferring to cut right after a sentence terminator or newline. Lengths
//! are counted in `char`s so a window never splits a code point.

use std::ops::Range;

use crate::error::{Result, TailorError};
use crate::types::{Chunk, TailorConfig};

const BOUNDARIES: [char; 4] = ['.', '!', '?', '\n'];

/// Sliding-window splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl TextChunker {
    /// Rejects `chunk_size == 0` and `overlap >= chunk_size`, either of which
    /// would stop the window from advancing.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(TailorError::Config("chunk_size must be positive".into()));
        }
        if overlap >= chunk_size {
            return Err(TailorError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn from_config(config: &TailorConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split into chunk strings.
    pub fn split(&self, text: &str) -> Vec<String> {
        let bytes = ByteOffsets::new(text);
        self.spans(text)
            .into_iter()
            .map(|span| text[bytes.range(span)].to_string())
            .collect()
    }

    /// Split into [`Chunk`]s tagged with `source_index`.
    pub fn chunk(&self, text: &str, source_index: usize) -> Vec<Chunk> {
        let pieces = self.split(text);
        let total_chunks = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| Chunk {
                text,
                source_index,
                chunk_index,
                total_chunks,
            })
            .collect()
    }

    /// Character ranges of each chunk.
    ///
    /// The first range starts at 0, the last ends at the character count, and
    /// each range starts at or before the previous one's end, so together they
    /// cover the whole text.
    pub fn spans(&self, text: &str) -> Vec<Range<usize>> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();

        if len <= self.chunk_size {
            return vec![0..len];
        }

        let mut spans = Vec::new();
        let mut start = 0;

        while start < len {
            let mut end = (start + self.chunk_size).min(len);

            if end < len {
                if let Some(cut) = (start + 1..end)
                    .rev()
                    .find(|&i| BOUNDARIES.contains(&chars[i]))
                {
                    end = cut + 1;
                }
            }

            spans.push(start..end);

            if end >= len {
                break;
            }

            // An early cut can leave `end - overlap` at or behind `start`;
            // drop the overlap for that step instead of stalling.
            let next = end.saturating_sub(self.overlap);
            start = if next > start { next } else { end };
        }

        spans
    }
}

/// Maps char positions to byte offsets.
struct ByteOffsets {
    offsets: Vec<usize>,
    byte_len: usize,
}

impl ByteOffsets {
    fn new(text: &str) -> Self {
        Self {
            offsets: text.char_indices().map(|(i, _)| i).collect(),
            byte_len: text.len(),
        }
    }

    fn at(&self, char_pos: usize) -> usize {
        self.offsets.get(char_pos).copied().unwrap_or(self.byte_len)
    }

    fn range(&self, span: Range<usize>) -> Range<usize> {
        self.at(span.start)..self.at(span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunker = TextChunker::default();
        let text = "Jane Smith, Data Scientist, 6 years, Python, ML";
        assert_eq!(chunker.split(text), vec![text.to_string()]);
        assert_eq!(chunker.split(""), vec![String::new()]);
    }

    #[test]
    fn test_exactly_chunk_size_is_single_chunk() {
        let chunker = TextChunker::new(10, 2).unwrap();
        assert_eq!(chunker.split("abcdefghij").len(), 1);
    }

    #[test]
    fn test_invalid_overlap_rejected() {
        assert!(matches!(
            TextChunker::new(100, 100),
            Err(TailorError::Config(_))
        ));
        assert!(TextChunker::new(100, 250).is_err());
        assert!(TextChunker::new(0, 0).is_err());
    }

    #[test]
    fn test_cuts_after_sentence_boundary() {
        let chunker = TextChunker::new(20, 5).unwrap();
        let text = "First part. Second part is longer than the window";
        let chunks = chunker.split(text);

        assert_eq!(chunks[0], "First part.");
        // next window starts `overlap` chars before the cut
        assert!(chunks[1].starts_with("part."));
    }

    #[test]
    fn test_no_boundary_uses_full_window() {
        let chunker = TextChunker::new(10, 3).unwrap();
        let spans = chunker.spans("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(spans, vec![0..10, 7..17, 14..24, 21..26]);
    }

    #[test]
    fn test_early_cut_still_advances() {
        // Boundary right after the window start; end - overlap would go backwards.
        let chunker = TextChunker::new(10, 8).unwrap();
        let spans = chunker.spans("a.bcdefghijklmnopqrst");
        assert_eq!(spans[0], 0..2);
        assert_eq!(spans[1].start, 2);
        assert_eq!(spans.last().unwrap().end, 21);
    }

    #[test]
    fn test_multibyte_text_slices_on_char_boundaries() {
        let chunker = TextChunker::new(4, 1).unwrap();
        let chunks = chunker.split("日本語のテキスト");
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
        assert_eq!(chunks[0], "日本語の");
    }

    #[test]
    fn test_chunk_metadata_fields() {
        let chunker = TextChunker::new(10, 2).unwrap();
        let chunks = chunker.chunk("abcdefghijklmnopqrstuvwxyz", 3);
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.source_index, 3);
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.total_chunks, chunks.len());
        }
        assert_eq!(chunks[1].vector_id(), "doc_3_chunk_1");
    }

    #[test]
    fn test_deterministic() {
        let chunker = TextChunker::default();
        let text = "Sentence one. ".repeat(300);
        assert_eq!(chunker.split(&text), chunker.split(&text));
    }

    proptest! {
        #[test]
        fn prop_spans_cover_text(
            text in "[a-z .\n!?é]{0,400}",
            size in 1usize..60,
            overlap_seed in 0usize..60,
        ) {
            let overlap = overlap_seed % size;
            let chunker = TextChunker::new(size, overlap).unwrap();
            let len = text.chars().count();
            let spans = chunker.spans(&text);

            prop_assert!(!spans.is_empty());
            prop_assert_eq!(spans[0].start, 0);
            prop_assert_eq!(spans.last().unwrap().end, len);

            for span in &spans {
                prop_assert!(span.end - span.start <= size);
            }
            for pair in spans.windows(2) {
                prop_assert!(pair[1].start > pair[0].start);
                prop_assert!(pair[1].start <= pair[0].end);
            }

            // Rebuild the text by appending the unseen tail of each chunk.
            let chunks = chunker.split(&text);
            let mut rebuilt = String::new();
            let mut covered = 0;
            for (span, chunk) in spans.iter().zip(&chunks) {
                let skip = covered - span.start;
                rebuilt.extend(chunk.chars().skip(skip));
                covered = span.end;
            }
            prop_assert_eq!(rebuilt, text);
        }
    }
}
