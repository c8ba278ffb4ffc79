//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`]: a sliding character window with configurable overlap
//! - [`RecursiveChunker`]: splits hierarchically by paragraphs, sentences, then words
//!
//! Sizes are measured in characters, never bytes, so multi-byte text is
//! never cut inside a code point.

use serde::{Deserialize, Serialize};

use crate::document::{CHUNK_INDEX_KEY, Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no embeddings.
/// Embeddings are attached later by the ingestor.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    /// Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Selects a [`Chunker`] implementation from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    /// [`FixedSizeChunker`].
    #[default]
    Fixed,
    /// [`RecursiveChunker`].
    Recursive,
}

impl ChunkingStrategy {
    /// Build the chunker for this strategy.
    pub fn chunker(self, chunk_size: usize, chunk_overlap: usize) -> Box<dyn Chunker> {
        match self {
            Self::Fixed => Box::new(FixedSizeChunker::new(chunk_size, chunk_overlap)),
            Self::Recursive => Box::new(RecursiveChunker::new(chunk_size, chunk_overlap)),
        }
    }
}

impl std::str::FromStr for ChunkingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "recursive" => Ok(Self::Recursive),
            other => Err(format!("unknown chunking strategy '{other}'")),
        }
    }
}

/// Splits text into fixed-size chunks by character count with configurable overlap.
///
/// Consecutive chunks share exactly `chunk_overlap` characters. The window
/// stops as soon as it reaches the end of the text, so the last chunk may be
/// shorter than `chunk_size` but is never wholly contained in its predecessor.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`. Each chunk inherits
/// the parent document's metadata plus a `chunk_index` field.
///
/// # Example
///
/// ```rust,ignore
/// use research_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1000, 150);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let pieces = split_by_size(&document.text, self.chunk_size, self.chunk_overlap);
        into_chunks(document, pieces)
    }
}

/// Splits text hierarchically: paragraphs → sentences → words.
///
/// First splits by paragraph separators (`\n\n`). Segments are merged back
/// together while they fit in `chunk_size`; a segment that is still too large
/// is split by sentence boundaries (`. `, `! `, `? `), then by spaces, and
/// finally by the fixed character window. When a chunk is full, the next one
/// starts with as many trailing segments of the previous chunk as fit in
/// `chunk_overlap`.
///
/// # Example
///
/// ```rust,ignore
/// use research_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(1000, 150);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: maximum number of characters carried into the next chunk
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let pieces = split_and_merge(&document.text, self.chunk_size, self.chunk_overlap, &SEPARATORS)
            .into_iter()
            .filter(|piece| !piece.trim().is_empty())
            .collect();
        into_chunks(document, pieces)
    }
}

fn into_chunks(document: &Document, pieces: Vec<String>) -> Vec<Chunk> {
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let mut metadata = document.metadata.clone();
            metadata.insert(CHUNK_INDEX_KEY.to_string(), i.to_string());
            Chunk {
                id: format!("{}_{i}", document.id),
                text,
                embedding: Vec::new(),
                metadata,
                document_id: document.id.clone(),
            }
        })
        .collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text by a separator, then merge segments into chunks that respect
/// `chunk_size`. Segments that exceed `chunk_size` on their own are split
/// further using the next-level separator.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }
    let Some((separator, remaining_separators)) = separators.split_first() else {
        return split_by_size(text, chunk_size, chunk_overlap);
    };

    let mut chunks = Vec::new();
    let mut window: Vec<&str> = Vec::new();
    let mut window_len = 0;

    for segment in split_keeping_separator(text, separator) {
        let segment_len = char_len(segment);

        if segment_len > chunk_size {
            if !window.is_empty() {
                chunks.push(window.concat());
                window.clear();
                window_len = 0;
            }
            chunks.extend(split_and_merge(segment, chunk_size, chunk_overlap, remaining_separators));
            continue;
        }

        if window_len + segment_len > chunk_size && !window.is_empty() {
            chunks.push(window.concat());
            // Carry whole trailing segments into the next chunk as overlap.
            while !window.is_empty()
                && (window_len > chunk_overlap || window_len + segment_len > chunk_size)
            {
                let dropped = window.remove(0);
                window_len -= char_len(dropped);
            }
        }

        window.push(segment);
        window_len += segment_len;
    }

    if !window.is_empty() {
        chunks.push(window.concat());
    }

    chunks
}

/// Split text at a separator while keeping the separator attached to the preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Character-based sliding window with overlap.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    // Byte offset of every character boundary, including the end of the text.
    let boundaries: Vec<usize> =
        text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
    let char_count = boundaries.len() - 1;
    let step = chunk_size.saturating_sub(chunk_overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(char_count);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());
        if end == char_count {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document { id: "doc".to_string(), ..Document::new(text) }
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunks = FixedSizeChunker::new(1000, 150).chunk(&doc("The sky is blue."));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "The sky is blue.");
        assert_eq!(chunks[0].id, "doc_0");
        assert_eq!(chunks[0].metadata.get(CHUNK_INDEX_KEY).map(String::as_str), Some("0"));
        assert!(chunks[0].embedding.is_empty());
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(FixedSizeChunker::new(10, 2).chunk(&doc("")).is_empty());
        assert!(RecursiveChunker::new(10, 2).chunk(&doc("")).is_empty());
    }

    #[test]
    fn window_stops_at_end_of_text() {
        // 10 chars, size 6, overlap 2: [0,6) then [4,10); no third chunk.
        let chunks = FixedSizeChunker::new(6, 2).chunk(&doc("abcdefghij"));
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abcdef", "efghij"]);
    }

    #[test]
    fn text_of_exactly_chunk_size_is_one_chunk() {
        let text = "x".repeat(1000);
        assert_eq!(FixedSizeChunker::new(1000, 150).chunk(&doc(&text)).len(), 1);
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let chunks = FixedSizeChunker::new(3, 1).chunk(&doc("héllo wörld"));
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 3));
        assert_eq!(chunks[0].text, "hél");
        assert_eq!(chunks[1].text, "llo");
    }

    #[test]
    fn recursive_prefers_paragraph_boundaries() {
        let text = "First paragraph here.\n\nSecond paragraph here.";
        let chunks = RecursiveChunker::new(25, 0).chunk(&doc(text));
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["First paragraph here.\n\n", "Second paragraph here."]);
    }

    #[test]
    fn recursive_keeps_spaces_between_words() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let chunks = RecursiveChunker::new(12, 0).chunk(&doc(text));
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 12));
        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn recursive_carries_trailing_segments_as_overlap() {
        let text = "one two three four five six";
        let chunks = RecursiveChunker::new(14, 6).chunk(&doc(text));
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let last_word = pair[0].text.split_whitespace().last().unwrap();
            assert!(pair[1].text.contains(last_word), "{:?}", pair);
        }
    }

    #[test]
    fn strategy_parses_from_str() {
        assert_eq!("fixed".parse::<ChunkingStrategy>().unwrap(), ChunkingStrategy::Fixed);
        assert_eq!("Recursive".parse::<ChunkingStrategy>().unwrap(), ChunkingStrategy::Recursive);
        assert!("markdown".parse::<ChunkingStrategy>().is_err());
    }
}
