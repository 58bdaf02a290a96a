//! DocChat Vector - Embeddings and the per-document vector index
//!
//! Provides the embedding client abstraction (Ollama, OpenAI) and a
//! JSON-persisted per-document index with cosine similarity search.

use async_trait::async_trait;
use docchat_core::Result;
use serde::{Deserialize, Serialize};

pub mod disk;
pub mod embedding;

pub use disk::DiskIndex;
pub use embedding::{create_embedding_client, EmbeddingClient, OllamaEmbedding, OpenAiEmbedding};

/// A chunk's text together with its embedding vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkVector {
    /// Chunk index within the document
    pub chunk_index: u32,

    /// Chunk text
    pub content: String,

    /// Embedding vector
    pub vector: Vec<f32>,
}

/// A retrieved chunk with its similarity score
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub content: String,
    pub chunk_index: u32,
    pub score: f32,
}

/// Trait for per-document vector indexes
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return the chunks most similar to the query vector, best first
    async fn search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<RetrievedChunk>>;

    /// Number of chunks in the index
    fn len(&self) -> usize;

    /// Whether the index holds no chunks
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();

    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
