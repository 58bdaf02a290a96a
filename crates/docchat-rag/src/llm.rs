//! LLM Client implementations
//!
//! Provides the Groq client (OpenAI-compatible chat completions API) and an
//! Ollama client for local models.

use async_trait::async_trait;
use docchat_core::{DocChatError, LlmClient, LlmConfig, LlmProvider, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

// ============================================================================
// Groq Client
// ============================================================================

/// Groq API client (OpenAI-compatible wire format)
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Choice {
    message: Message,
    finish_reason: Option<String>,
}

impl GroqClient {
    /// Create a new Groq client
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: model.into(),
            max_tokens,
            temperature,
        }
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config.groq_api_key.as_ref().ok_or_else(|| {
            DocChatError::ConfigError("Groq API key required (set GROQ_API_KEY)".to_string())
        })?;

        Ok(Self {
            client: Client::new(),
            api_key: api_key.clone(),
            base_url: config.groq_base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Set custom base URL (for other OpenAI-compatible APIs)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DocChatError::LlmError(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DocChatError::LlmError(format!("Groq error: {error_text}")));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| DocChatError::LlmError(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| DocChatError::LlmError("No response generated".to_string()))
    }
}

// ============================================================================
// Ollama Client
// ============================================================================

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct OllamaResponse {
    response: String,
    done: bool,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(config.ollama_url.clone(), config.model.clone())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| DocChatError::LlmError(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DocChatError::LlmError(format!("Ollama error: {error_text}")));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| DocChatError::LlmError(format!("Failed to parse Ollama response: {e}")))?;

        Ok(result.response)
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create an LLM client from config
pub fn create_llm_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider {
        LlmProvider::Groq => Ok(Box::new(GroqClient::from_config(config)?)),
        LlmProvider::Ollama => Ok(Box::new(OllamaClient::from_config(config))),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_client_creation() {
        let client = GroqClient::new("test-key", "llama-3.1-8b-instant", 1024, 0.0);
        assert_eq!(client.model, "llama-3.1-8b-instant");
        assert_eq!(client.base_url, "https://api.groq.com/openai/v1");

        let client = client.with_base_url("http://localhost:9999/v1");
        assert_eq!(client.base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn test_groq_from_config_requires_key() {
        let config = LlmConfig::default();
        assert!(matches!(
            GroqClient::from_config(&config),
            Err(DocChatError::ConfigError(_))
        ));

        let config = LlmConfig {
            groq_api_key: Some("gsk_test".to_string()),
            ..Default::default()
        };
        let client = GroqClient::from_config(&config).unwrap();
        assert_eq!(client.temperature, 0.0);
    }

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new("http://localhost:11434", "llama3");
        assert_eq!(client.model, "llama3");
    }

    #[test]
    fn test_factory_respects_provider() {
        let config = LlmConfig {
            provider: LlmProvider::Ollama,
            ..Default::default()
        };
        assert!(create_llm_client(&config).is_ok());

        // Groq without a key fails at construction
        let config = LlmConfig {
            provider: LlmProvider::Groq,
            groq_api_key: None,
            ..Default::default()
        };
        assert!(create_llm_client(&config).is_err());
    }
}
