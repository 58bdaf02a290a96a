//! Per-document pipeline: index a PDF, then answer questions against it
//!
//! `PipelineBuilder` holds the shared embedder and configuration; each
//! successful `build` produces an independent `RetrievalQa` handle backed by
//! that document's own on-disk vector index.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use docchat_core::{DocChatError, LlmClient, LlmConfig, RagConfig, Result};
use docchat_parser::{chunk_text, ChunkConfig, PdfLoader};
use docchat_vector::{ChunkVector, DiskIndex, EmbeddingClient, RetrievedChunk, VectorIndex};

use crate::llm::create_llm_client;
use crate::{PromptBuilder, ANSWER_SYSTEM_PROMPT};

// ============================================================================
// Pipeline Builder
// ============================================================================

/// Builds a `RetrievalQa` pipeline for each uploaded document
pub struct PipelineBuilder {
    embedder: Arc<dyn EmbeddingClient>,
    llm_config: LlmConfig,
    rag_config: RagConfig,
    llm_override: Option<Arc<dyn LlmClient>>,
}

impl PipelineBuilder {
    /// Create a new builder with the shared embedding client
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        llm_config: LlmConfig,
        rag_config: RagConfig,
    ) -> Self {
        Self {
            embedder,
            llm_config,
            rag_config,
            llm_override: None,
        }
    }

    /// Use a fixed LLM client instead of constructing one per build
    pub fn with_llm_client(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm_override = Some(llm);
        self
    }

    /// Index a PDF and return a ready question-answering handle.
    ///
    /// Extracts text, chunks it, embeds every chunk, and persists the vector
    /// index under `index_dir`. The LLM client is constructed here, per
    /// document, so a missing credential surfaces as a build failure rather
    /// than at the first question.
    pub async fn build(&self, pdf_path: &Path, index_dir: &Path) -> Result<RetrievalQa> {
        tracing::info!(path = %pdf_path.display(), "Processing PDF");

        // Text extraction is CPU-bound, keep it off the async reactor
        let path = pdf_path.to_path_buf();
        let loaded = tokio::task::spawn_blocking(move || PdfLoader::new().load(&path))
            .await
            .map_err(|e| DocChatError::ParseError(format!("Extraction task failed: {e}")))?
            .map_err(|e| DocChatError::ParseError(e.to_string()))?;

        let text = loaded.text();
        let chunk_config = ChunkConfig::new(self.rag_config.chunk_size, self.rag_config.chunk_overlap);
        let chunks = chunk_text(&text, &chunk_config);
        tracing::debug!(
            pages = loaded.page_count(),
            chunks = chunks.len(),
            "Document chunked"
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let records: Vec<ChunkVector> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| ChunkVector {
                chunk_index: chunk.index,
                content: chunk.content.clone(),
                vector,
            })
            .collect();

        let index = DiskIndex::build(
            index_dir,
            self.embedder.model(),
            self.embedder.dimension(),
            records,
        )?;
        tracing::info!(
            dir = %index_dir.display(),
            chunks = index.len(),
            "Vector index written"
        );

        let llm: Arc<dyn LlmClient> = match &self.llm_override {
            Some(llm) => llm.clone(),
            None => Arc::from(create_llm_client(&self.llm_config)?),
        };

        Ok(RetrievalQa::new(
            self.embedder.clone(),
            Arc::new(index),
            llm,
            &self.rag_config,
            Duration::from_secs(self.llm_config.timeout_secs),
        ))
    }
}

// ============================================================================
// Retrieval QA
// ============================================================================

/// Question answering over a single indexed document
pub struct RetrievalQa {
    embedder: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LlmClient>,
    top_k: usize,
    max_context_length: usize,
    timeout: Duration,
}

impl RetrievalQa {
    /// Assemble a pipeline from its parts
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmClient>,
        config: &RagConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            embedder,
            index,
            llm,
            top_k: config.top_k,
            max_context_length: config.max_context_length,
            timeout,
        }
    }

    /// Number of chunks in this document's index
    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    /// Answer a question from the document's content
    pub async fn ask(&self, question: &str) -> Result<String> {
        let query_vector = self.embedder.embed(question).await?;

        let hits = self.index.search(&query_vector, self.top_k).await?;
        tracing::debug!(hits = hits.len(), "Retrieved context chunks");

        let prompt = self.build_prompt(question, &hits);

        tracing::info!(prompt_len = prompt.len(), "Calling LLM");
        let answer = tokio::time::timeout(self.timeout, self.llm.generate(&prompt))
            .await
            .map_err(|_| DocChatError::Timeout(self.timeout.as_secs()))??;
        tracing::info!(answer_len = answer.len(), "LLM response received");

        Ok(answer)
    }

    /// Assemble the generation prompt from retrieved chunks
    fn build_prompt(&self, question: &str, hits: &[RetrievedChunk]) -> String {
        let mut builder = PromptBuilder::new()
            .system(ANSWER_SYSTEM_PROMPT)
            .question(question)
            .add_instruction("Answer using only the information in the context")
            .add_instruction("Keep the answer short and suitable for reading aloud");

        let mut total_length = 0;
        for (i, hit) in hits.iter().enumerate() {
            if total_length + hit.content.len() > self.max_context_length {
                break;
            }
            builder = builder.add_context(format!("[{}]\n{}", i + 1, hit.content));
            total_length += hit.content.len();
        }

        builder.build()
    }
}

// ============================================================================
// Tests
// ============================================================================
