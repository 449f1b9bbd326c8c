//! Chat-completion client boundary.
//!
//! The code generator talks to the model through the [`ChatClient`] trait: a
//! single system/user message pair in, text plus token accounting out. The
//! production implementation is [`OpenAiClient`]; [`MockChatClient`] is a
//! deterministic stand-in for tests and the CLI's `--mock` mode, so runs can
//! be exercised without incurring real calls.

pub mod mock;
pub mod openai;

use async_trait::async_trait;

use crate::error::Result;

pub use mock::MockChatClient;
pub use openai::OpenAiClient;

/// A single chat-completion request: system instructions plus user content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// System message framing the model's role
    pub system: String,

    /// User message carrying the instructions and reduced page context
    pub user: String,
}

/// The model's response envelope: text plus token accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    /// Raw response text (possibly fenced; the generator strips fences)
    pub text: String,

    /// Prompt-side tokens billed for the request
    pub input_tokens: u64,

    /// Completion-side tokens billed for the response
    pub output_tokens: u64,

    /// Prompt tokens served from the provider's prompt cache
    pub cached_tokens: u64,
}

/// Chat-style request/response capability consumed by the code generator.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends one request and returns the model's response envelope.
    ///
    /// Network and API failures propagate unchanged as generation failures;
    /// the retry loop decides whether budget remains to try again.
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse>;
}
