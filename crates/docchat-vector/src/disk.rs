//! JSON-persisted per-document vector index
//!
//! Each uploaded document gets its own directory holding a single
//! `index.json` with every chunk's text and embedding vector. Search is a
//! linear cosine scan, which is adequate at per-document scale.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docchat_core::{DocChatError, Result};
use serde::{Deserialize, Serialize};

use crate::{cosine_similarity, ChunkVector, RetrievedChunk, VectorIndex};

const INDEX_FILE: &str = "index.json";
const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    model: String,
    dimension: usize,
    chunks: Vec<ChunkVector>,
}

/// On-disk vector index for a single document
pub struct DiskIndex {
    dir: PathBuf,
    model: String,
    dimension: usize,
    chunks: Vec<ChunkVector>,
}

impl DiskIndex {
    /// Build a new index from embedded chunks and persist it under `dir`
    pub fn build(
        dir: &Path,
        model: impl Into<String>,
        dimension: usize,
        chunks: Vec<ChunkVector>,
    ) -> Result<Self> {
        let model = model.into();

        for chunk in &chunks {
            if chunk.vector.len() != dimension {
                return Err(DocChatError::IndexError(format!(
                    "Chunk {} has dimension {}, expected {}",
                    chunk.chunk_index,
                    chunk.vector.len(),
                    dimension
                )));
            }
        }

        std::fs::create_dir_all(dir)?;

        let file = IndexFile {
            version: INDEX_FORMAT_VERSION,
            model: model.clone(),
            dimension,
            chunks,
        };
        let json = serde_json::to_string(&file)
            .map_err(|e| DocChatError::IndexError(format!("Failed to serialize index: {e}")))?;
        std::fs::write(dir.join(INDEX_FILE), json)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            model,
            dimension,
            chunks: file.chunks,
        })
    }

    /// Open a previously persisted index
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(INDEX_FILE);
        let json = std::fs::read_to_string(&path)?;

        let file: IndexFile = serde_json::from_str(&json).map_err(|e| {
            DocChatError::IndexError(format!(
                "Failed to parse index file {}: {e}",
                path.display()
            ))
        })?;

        if file.version != INDEX_FORMAT_VERSION {
            return Err(DocChatError::IndexError(format!(
                "Unsupported index format version {}",
                file.version
            )));
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            model: file.model,
            dimension: file.dimension,
            chunks: file.chunks,
        })
    }

    /// Delete a persisted index directory
    pub fn remove(dir: &Path) -> Result<()> {
        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
        }
        Ok(())
    }

    /// Directory this index is persisted under
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Embedding model the vectors were produced with
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Vector dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[async_trait]
impl VectorIndex for DiskIndex {
    async fn search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<RetrievedChunk>> {
        if query_vector.len() != self.dimension {
            return Err(DocChatError::IndexError(format!(
                "Query dimension {} does not match index dimension {}",
                query_vector.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<RetrievedChunk> = self
            .chunks
            .iter()
            .map(|chunk| RetrievedChunk {
                content: chunk.content.clone(),
                chunk_index: chunk.chunk_index,
                score: cosine_similarity(query_vector, &chunk.vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);

        Ok(scored)
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chunks() -> Vec<ChunkVector> {
        vec![
            ChunkVector {
                chunk_index: 0,
                content: "the sky is blue".to_string(),
                vector: vec![1.0, 0.0, 0.0],
            },
            ChunkVector {
                chunk_index: 1,
                content: "grass is green".to_string(),
                vector: vec![0.0, 1.0, 0.0],
            },
            ChunkVector {
                chunk_index: 2,
                content: "roses are red".to_string(),
                vector: vec![0.0, 0.0, 1.0],
            },
        ]
    }

    #[tokio::test]
    async fn test_build_and_search() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("doc_db_test");

        let index = DiskIndex::build(&dir, "test-model", 3, sample_chunks()).unwrap();
        assert_eq!(index.len(), 3);
        assert!(dir.join("index.json").exists());

        let results = index.search(&[0.9, 0.1, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "the sky is blue");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_open_returns_same_results() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("doc_db_test");

        let built = DiskIndex::build(&dir, "test-model", 3, sample_chunks()).unwrap();
        let opened = DiskIndex::open(&dir).unwrap();

        assert_eq!(opened.model(), "test-model");
        assert_eq!(opened.dimension(), 3);
        assert_eq!(opened.len(), built.len());

        let query = [0.0, 1.0, 0.0];
        let from_built = built.search(&query, 3).await.unwrap();
        let from_opened = opened.search(&query, 3).await.unwrap();

        for (a, b) in from_built.iter().zip(from_opened.iter()) {
            assert_eq!(a.chunk_index, b.chunk_index);
            assert_eq!(a.score, b.score);
        }
    }

    #[tokio::test]
    async fn test_search_limit_larger_than_index() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("doc_db_test");

        let index = DiskIndex::build(&dir, "test-model", 3, sample_chunks()).unwrap();
        let results = index.search(&[1.0, 1.0, 1.0], 10).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_build_rejects_dimension_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("doc_db_test");

        let result = DiskIndex::build(&dir, "test-model", 4, sample_chunks());
        assert!(matches!(result, Err(DocChatError::IndexError(_))));
    }

    #[tokio::test]
    async fn test_search_rejects_dimension_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("doc_db_test");

        let index = DiskIndex::build(&dir, "test-model", 3, sample_chunks()).unwrap();
        let result = index.search(&[1.0, 0.0], 2).await;
        assert!(matches!(result, Err(DocChatError::IndexError(_))));
    }

    #[test]
    fn test_open_missing_index() {
        let tmp = tempfile::tempdir().unwrap();
        let result = DiskIndex::open(&tmp.path().join("nope"));
        assert!(matches!(result, Err(DocChatError::IoError(_))));
    }

    #[test]
    fn test_remove_deletes_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("doc_db_test");

        DiskIndex::build(&dir, "test-model", 3, sample_chunks()).unwrap();
        assert!(dir.exists());

        DiskIndex::remove(&dir).unwrap();
        assert!(!dir.exists());

        // Removing an absent directory is not an error
        DiskIndex::remove(&dir).unwrap();
    }
}
