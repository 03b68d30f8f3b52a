//! Character-window text splitter.
//!
//! Long documents are split into overlapping chunks sized for embedding and
//! retrieval. The same policy applies to every ingested text regardless of
//! source format.

/// Splits text into fixed-size chunks with overlap.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    min_chunk_size: usize,
}

impl TextSplitter {
    /// Create a splitter with the given window parameters (in characters).
    ///
    /// The overlap is clamped below the chunk size so the window always
    /// advances.
    pub fn new(chunk_size: usize, chunk_overlap: usize, min_chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
            min_chunk_size,
        }
    }

    /// Split `text` into chunks.
    ///
    /// Chunks shorter than the minimum size, and whitespace-only chunks,
    /// are discarded. Multi-byte characters are never split.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();

        if chars.len() <= self.chunk_size {
            let trimmed = text.trim();
            if trimmed.is_empty() || chars.len() < self.min_chunk_size {
                return Vec::new();
            }
            return vec![text.to_string()];
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let chunk: String = chars[start..end].iter().collect();

            if chunk.chars().count() >= self.min_chunk_size && !chunk.trim().is_empty() {
                chunks.push(chunk);
            }

            if end == chars.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let splitter = TextSplitter::new(100, 20, 5);
        let chunks = splitter.split("a short document");
        assert_eq!(chunks, vec!["a short document"]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        let splitter = TextSplitter::new(100, 20, 5);
        assert!(splitter.split("").is_empty());
    }

    #[test]
    fn test_whitespace_only_no_chunks() {
        let splitter = TextSplitter::new(100, 20, 5);
        assert!(splitter.split("    \n\t  ").is_empty());
    }

    #[test]
    fn test_below_min_size_discarded() {
        let splitter = TextSplitter::new(100, 20, 5);
        assert!(splitter.split("abc").is_empty());
    }

    #[test]
    fn test_long_text_produces_multiple_chunks() {
        let splitter = TextSplitter::new(100, 20, 5);
        let text = "word ".repeat(100); // 500 chars
        let chunks = splitter.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let splitter = TextSplitter::new(50, 10, 5);
        let text: String = ('a'..='z').cycle().take(200).collect();
        let chunks = splitter.split(&text);
        assert!(chunks.len() >= 2);

        // The tail of each chunk reappears at the head of the next.
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().rev().take(10).collect::<Vec<_>>()
                .into_iter().rev().collect();
            assert!(pair[1].starts_with(&tail));
        }
    }

    #[test]
    fn test_all_content_covered() {
        let splitter = TextSplitter::new(50, 10, 1);
        let text: String = ('a'..='z').cycle().take(173).collect();
        let chunks = splitter.split(&text);
        // Last chunk must end with the final characters of the input.
        let last = chunks.last().unwrap();
        assert!(text.ends_with(last.as_str()));
    }

    #[test]
    fn test_multibyte_characters_not_split() {
        let splitter = TextSplitter::new(50, 10, 1);
        let text = "\u{4e2d}\u{6587}\u{6587}\u{6863}".repeat(40); // 160 CJK chars
        let chunks = splitter.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50);
        }
    }

    #[test]
    fn test_overlap_clamped_below_chunk_size() {
        // Overlap >= chunk size would stall the window; the constructor clamps.
        let splitter = TextSplitter::new(10, 50, 1);
        let text = "x".repeat(100);
        let chunks = splitter.split(&text);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_exact_chunk_size_single_chunk() {
        let splitter = TextSplitter::new(20, 5, 1);
        let text = "z".repeat(20);
        let chunks = splitter.split(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }
}
