//! Test utilities
//!
//! A router wired to in-process fakes: a deterministic embedder and a canned
//! LLM, so integration tests cover the full upload/chat flow without Ollama
//! or Groq. Enabled for unit tests and behind the `test-utils` feature for
//! the integration test binary.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use docchat_core::{config::AppConfig, LlmClient, PdfDocument, RagConfig, Result};
use docchat_rag::{PipelineBuilder, RetrievalQa};
use docchat_vector::{EmbeddingClient, RetrievedChunk, VectorIndex};

use crate::registry::{InMemoryRegistry, RegisteredPdf};
use crate::state::AppState;

/// Reply returned by the canned LLM
pub const CANNED_REPLY: &str = "It is blue.";

/// Deterministic embedder: letter-frequency histogram over a-z
pub struct StaticEmbedder;

#[async_trait]
impl EmbeddingClient for StaticEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; 26];
        for c in text.to_lowercase().chars() {
            if c.is_ascii_lowercase() {
                vector[(c as u8 - b'a') as usize] += 1.0;
            }
        }
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    fn dimension(&self) -> usize {
        26
    }

    fn model(&self) -> &str {
        "static-embed"
    }
}

/// LLM that returns a fixed reply without any network call
pub struct CannedLlm {
    pub reply: String,
}

#[async_trait]
impl LlmClient for CannedLlm {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.reply.clone())
    }
}

/// Vector index with no contents
pub struct StubIndex;

#[async_trait]
impl VectorIndex for StubIndex {
    async fn search(&self, _query_vector: &[f32], _limit: usize) -> Result<Vec<RetrievedChunk>> {
        Ok(Vec::new())
    }

    fn len(&self) -> usize {
        0
    }
}

/// A registry entry that never touches the network or the disk
pub fn test_entry(id: &str, filename: &str) -> RegisteredPdf {
    let doc = PdfDocument::new(
        id,
        filename,
        format!("/tmp/{id}.pdf"),
        format!("/tmp/doc_db_{id}"),
    );
    let qa = RetrievalQa::new(
        Arc::new(StaticEmbedder),
        Arc::new(StubIndex),
        Arc::new(CannedLlm {
            reply: CANNED_REPLY.to_string(),
        }),
        &RagConfig::default(),
        Duration::from_secs(5),
    );
    RegisteredPdf {
        doc,
        qa: Arc::new(qa),
    }
}

/// Build a router whose uploads and indexes live under `data_dir` and whose
/// embedder and LLM are in-process fakes
pub fn create_router_for_testing(data_dir: &Path) -> Router {
    let mut config = AppConfig::default();
    config.storage.upload_dir = data_dir.join("uploads");
    config.storage.index_root = data_dir.join("indexes");

    let embedder: Arc<dyn EmbeddingClient> = Arc::new(StaticEmbedder);
    let llm: Arc<dyn LlmClient> = Arc::new(CannedLlm {
        reply: CANNED_REPLY.to_string(),
    });
    let pipelines = PipelineBuilder::new(embedder, config.llm.clone(), config.rag.clone())
        .with_llm_client(llm);

    let state = AppState {
        config,
        registry: Box::new(InMemoryRegistry::new()),
        pipelines,
    };
    crate::create_router(Arc::new(state))
}
