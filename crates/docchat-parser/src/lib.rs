//! DocChat Parser - PDF text extraction and chunking
//!
//! Turns an uploaded PDF into the ordered chunk sequence the embedding
//! pipeline consumes:
//! - `PdfLoader` extracts page text from a PDF file
//! - `chunk_text` splits the text into fixed-size overlapping chunks
//!
//! Chunk boundaries are measured in characters, never bytes, so multibyte
//! text is always split on valid boundaries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod pdf;

pub use pdf::{LoadedPdf, PdfLoader};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while loading a document
#[derive(Error, Debug)]
pub enum ParserError {
    /// IO error while reading the file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// PDF parsing error
    #[error("PDF parsing error: {0}")]
    PdfError(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

// ============================================================================
// Chunking
// ============================================================================

/// Configuration for document chunking
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            overlap: 500,
        }
    }
}

impl ChunkConfig {
    /// Create a config with explicit size and overlap
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }
}

/// A chunk of text from a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Chunk content
    pub content: String,

    /// Chunk index within the document
    pub index: u32,

    /// Starting character offset in the original text
    pub start_char: usize,

    /// Ending character offset (exclusive)
    pub end_char: usize,
}

/// Split text into fixed-size overlapping chunks.
///
/// The window advances by `chunk_size - overlap` characters. Text no longer
/// than `chunk_size` (including empty text) yields exactly one chunk; the
/// final window is clamped to the end of the text, so for longer text the
/// chunk count is `ceil((len - chunk_size) / advance) + 1`.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<TextChunk> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    if total <= config.chunk_size {
        // Small enough to be a single chunk
        return vec![TextChunk {
            content: text.to_string(),
            index: 0,
            start_char: 0,
            end_char: total,
        }];
    }

    // Guard against overlap >= chunk_size, which would never advance
    let advance = config.chunk_size.saturating_sub(config.overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + config.chunk_size).min(total);

        chunks.push(TextChunk {
            content: chars[start..end].iter().collect(),
            index: chunks.len() as u32,
            start_char: start,
            end_char: end,
        });

        if end == total {
            break;
        }
        start += advance;
    }

    chunks
}

// ============================================================================
// Tests
// ============================================================================
