//! PDF loading using pdf-extract
//!
//! Extracts text content from PDF files. Multi-page documents are split on
//! the form feed markers pdf-extract emits between pages.

use std::path::Path;

use crate::{ParserError, Result};

/// Loads PDF files and extracts their text
pub struct PdfLoader;

impl PdfLoader {
    /// Create a new PDF loader
    pub fn new() -> Self {
        Self
    }

    /// Load a PDF file and extract its text
    pub fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let bytes = std::fs::read(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        self.load_from_bytes(&bytes)
    }

    /// Extract text from in-memory PDF bytes
    pub fn load_from_bytes(&self, bytes: &[u8]) -> Result<LoadedPdf> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ParserError::PdfError(e.to_string()))?;

        Ok(LoadedPdf::from_text(text))
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracted text of a PDF, page by page
#[derive(Debug, Clone)]
pub struct LoadedPdf {
    /// Page texts in document order
    pub pages: Vec<String>,
}

impl LoadedPdf {
    /// Split extracted text into pages on form feed characters
    fn from_text(text: String) -> Self {
        let mut pages: Vec<String> = text.split('\x0C').map(str::to_string).collect();

        // pdf-extract leaves a trailing form feed on some documents
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }

        Self { pages }
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Full document text with pages joined by newlines
    pub fn text(&self) -> String {
        self.pages.join("\n")
    }
}
