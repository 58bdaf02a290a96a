//! DocChat RAG - Retrieval-Augmented Generation pipeline
//!
//! This crate implements the per-document question-answering pipeline:
//! - `PipelineBuilder` turns an uploaded PDF into a `RetrievalQa` handle
//!   (extract text, chunk, embed, persist the vector index)
//! - `RetrievalQa` answers a question by embedding it, retrieving the most
//!   similar chunks, and calling the configured LLM with an assembled prompt
//!
//! LLM access goes through the `LlmClient` trait with Groq (OpenAI-compatible)
//! and Ollama implementations.

pub mod llm;
pub mod pipeline;

pub use docchat_core::RagConfig;
pub use llm::{create_llm_client, GroqClient, OllamaClient};
pub use pipeline::{PipelineBuilder, RetrievalQa};

/// System instruction included in every generation prompt
pub const ANSWER_SYSTEM_PROMPT: &str = "You are a voice-based chatbot designed to answer questions based on the content of uploaded PDF documents.\nYour responses should be concise and to the point, suitable for voice output.\nIf a question is outside the scope of the uploaded documents, politely inform the user that you can only answer questions related to the uploaded PDFs.";

// ============================================================================
// Prompt Builder
// ============================================================================

/// Builder for constructing generation prompts
pub struct PromptBuilder {
    system_instruction: String,
    context_sections: Vec<String>,
    question: String,
    instructions: Vec<String>,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new() -> Self {
        Self {
            system_instruction: String::new(),
            context_sections: Vec::new(),
            question: String::new(),
            instructions: Vec::new(),
        }
    }

    /// Set system instruction
    pub fn system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Add a context section
    pub fn add_context(mut self, context: impl Into<String>) -> Self {
        self.context_sections.push(context.into());
        self
    }

    /// Set the question
    pub fn question(mut self, q: impl Into<String>) -> Self {
        self.question = q.into();
        self
    }

    /// Add an instruction
    pub fn add_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    /// Build the final prompt
    pub fn build(self) -> String {
        let mut prompt = String::new();

        if !self.system_instruction.is_empty() {
            prompt.push_str("<s>\n");
            prompt.push_str(&self.system_instruction);
            prompt.push_str("\n</s>\n\n");
        }

        if !self.context_sections.is_empty() {
            prompt.push_str("<context>\n");
            for section in &self.context_sections {
                prompt.push_str(section);
                prompt.push_str("\n\n");
            }
            prompt.push_str("</context>\n\n");
        }

        if !self.question.is_empty() {
            prompt.push_str("<question>\n");
            prompt.push_str(&self.question);
            prompt.push_str("\n</question>\n\n");
        }

        if !self.instructions.is_empty() {
            prompt.push_str("<instructions>\n");
            for (i, inst) in self.instructions.iter().enumerate() {
                prompt.push_str(&format!("{}. {}\n", i + 1, inst));
            }
            prompt.push_str("</instructions>\n");
        }

        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_builder() {
        let prompt = PromptBuilder::new()
            .system("You are a helpful assistant.")
            .add_context("[1]\nContext from document A")
            .add_context("[2]\nContext from document B")
            .question("What is the answer?")
            .add_instruction("Be concise")
            .add_instruction("Stay within the context")
            .build();

        assert!(prompt.contains("<s>"));
        assert!(prompt.contains("You are a helpful assistant."));
        assert!(prompt.contains("<context>"));
        assert!(prompt.contains("Context from document B"));
        assert!(prompt.contains("<question>"));
        assert!(prompt.contains("What is the answer?"));
        assert!(prompt.contains("1. Be concise"));
        assert!(prompt.contains("2. Stay within the context"));
    }

    #[test]
    fn test_prompt_builder_skips_empty_sections() {
        let prompt = PromptBuilder::new().question("Just a question").build();

        assert!(!prompt.contains("<s>"));
        assert!(!prompt.contains("<context>"));
        assert!(!prompt.contains("<instructions>"));
        assert!(prompt.contains("<question>"));
    }

    #[test]
    fn test_system_prompt_mentions_pdf_scope() {
        assert!(ANSWER_SYSTEM_PROMPT.contains("uploaded PDF documents"));
        assert!(ANSWER_SYSTEM_PROMPT.contains("concise"));
    }
}
