//! Application state management

use std::sync::Arc;

use docchat_core::config::AppConfig;
use docchat_core::Result;
use docchat_rag::PipelineBuilder;
use docchat_vector::{create_embedding_client, EmbeddingClient};

use crate::registry::{InMemoryRegistry, SessionRegistry};

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Registered documents and their pipelines
    pub registry: Box<dyn SessionRegistry>,
    /// Builds a pipeline for each uploaded document
    pub pipelines: PipelineBuilder,
}

impl AppState {
    /// Create application state from config, wiring the configured
    /// embedding provider into the pipeline builder
    pub fn new(config: AppConfig) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingClient> =
            Arc::from(create_embedding_client(&config.embedding)?);
        let pipelines =
            PipelineBuilder::new(embedder, config.llm.clone(), config.rag.clone());

        Ok(Self {
            config,
            registry: Box::new(InMemoryRegistry::new()),
            pipelines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_default_config() {
        // The default config wires the keyless Ollama embedder, so state
        // construction succeeds without any environment
        let state = AppState::new(AppConfig::default()).unwrap();
        assert_eq!(state.config.server.port, 8080);
    }
}
