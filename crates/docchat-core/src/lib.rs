//! DocChat Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the DocChat system:
//! - Document models (uploaded PDFs and their derived state)
//! - Common error types
//! - The shared trait for LLM clients
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, EmbeddingConfig, EmbeddingProvider, LlmConfig, LlmProvider,
    LoggingConfig, RagConfig, ServerConfig, StorageConfig,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for DocChat operations
#[derive(Error, Debug)]
pub enum DocChatError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("PDF parse error: {0}")]
    ParseError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Vector index error: {0}")]
    IndexError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DocChatError>;

// ============================================================================
// Document Models
// ============================================================================

/// An uploaded PDF and the on-disk state derived from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfDocument {
    /// Generated identifier (UUID v4, text form)
    pub id: String,

    /// Original filename, sanitized
    pub filename: String,

    /// Where the uploaded bytes were saved
    pub file_path: PathBuf,

    /// Directory holding this document's vector index
    pub index_dir: PathBuf,

    /// Number of chunks the text was split into
    pub chunk_count: usize,

    /// Upload timestamp
    pub created_at: DateTime<Utc>,
}

impl PdfDocument {
    /// Create a new document record
    pub fn new(
        id: impl Into<String>,
        filename: impl Into<String>,
        file_path: impl Into<PathBuf>,
        index_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            file_path: file_path.into(),
            index_dir: index_dir.into(),
            chunk_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Set chunk count
    pub fn with_chunk_count(mut self, chunk_count: usize) -> Self {
        self.chunk_count = chunk_count;
        self
    }

    /// The listing view of this document
    pub fn summary(&self) -> PdfSummary {
        PdfSummary {
            id: self.id.clone(),
            filename: self.filename.clone(),
        }
    }
}

/// Listing entry for a registered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfSummary {
    pub id: String,
    pub filename: String,
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for LLM clients
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the given prompt
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builder() {
        let doc = PdfDocument::new("abc-123", "report.pdf", "uploads/abc-123_report.pdf", "doc_db_abc-123")
            .with_chunk_count(7);

        assert_eq!(doc.id, "abc-123");
        assert_eq!(doc.filename, "report.pdf");
        assert_eq!(doc.chunk_count, 7);
        assert_eq!(doc.file_path, PathBuf::from("uploads/abc-123_report.pdf"));
    }

    #[test]
    fn test_document_summary() {
        let doc = PdfDocument::new("id-1", "paper.pdf", "uploads/id-1_paper.pdf", "doc_db_id-1");
        let summary = doc.summary();

        assert_eq!(
            summary,
            PdfSummary {
                id: "id-1".to_string(),
                filename: "paper.pdf".to_string(),
            }
        );
    }

    #[test]
    fn test_error_display() {
        let err = DocChatError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "Document not found: abc");

        let err = DocChatError::Timeout(60);
        assert_eq!(err.to_string(), "LLM request timed out after 60s");
    }

    #[tokio::test]
    async fn test_llm_client_trait_object() {
        struct EchoLlm;

        #[async_trait::async_trait]
        impl LlmClient for EchoLlm {
            async fn generate(&self, prompt: &str) -> Result<String> {
                Ok(format!("echo: {prompt}"))
            }
        }

        let client: Box<dyn LlmClient> = Box::new(EchoLlm);
        let out = client.generate("hi").await.unwrap();
        assert_eq!(out, "echo: hi");
    }
}
