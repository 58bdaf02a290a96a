//! Session registry for uploaded documents
//!
//! Maps each `pdf_id` to its document record and ready question-answering
//! pipeline. The registry abstracts over storage so tests and future
//! persistent backends share the handler code; the in-memory implementation
//! preserves insertion order, which fixes the order of `GET /pdfs`.

use std::sync::Arc;

use async_trait::async_trait;
use docchat_core::{PdfDocument, PdfSummary};
use docchat_rag::RetrievalQa;
use tokio::sync::RwLock;

/// A registered document and its pipeline
#[derive(Clone)]
pub struct RegisteredPdf {
    /// Document record
    pub doc: PdfDocument,
    /// Ready pipeline for answering questions about this document
    pub qa: Arc<RetrievalQa>,
}

/// Storage for active document sessions
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Register a document. Re-registering an existing id replaces the entry
    /// in place, keeping its position in the listing order.
    async fn register(&self, entry: RegisteredPdf);

    /// Look up a document by id
    async fn lookup(&self, id: &str) -> Option<RegisteredPdf>;

    /// All registered documents, oldest first
    async fn list(&self) -> Vec<PdfSummary>;

    /// Remove a document, returning its entry if it existed
    async fn remove(&self, id: &str) -> Option<RegisteredPdf>;
}

/// In-memory registry, lost on restart
#[derive(Default)]
pub struct InMemoryRegistry {
    entries: RwLock<Vec<RegisteredPdf>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRegistry for InMemoryRegistry {
    async fn register(&self, entry: RegisteredPdf) {
        let mut entries = self.entries.write().await;
        match entries.iter().position(|e| e.doc.id == entry.doc.id) {
            Some(pos) => entries[pos] = entry,
            None => entries.push(entry),
        }
    }

    async fn lookup(&self, id: &str) -> Option<RegisteredPdf> {
        let entries = self.entries.read().await;
        entries.iter().find(|e| e.doc.id == id).cloned()
    }

    async fn list(&self) -> Vec<PdfSummary> {
        let entries = self.entries.read().await;
        entries.iter().map(|e| e.doc.summary()).collect()
    }

    async fn remove(&self, id: &str) -> Option<RegisteredPdf> {
        let mut entries = self.entries.write().await;
        let pos = entries.iter().position(|e| e.doc.id == id)?;
        Some(entries.remove(pos))
    }
}
