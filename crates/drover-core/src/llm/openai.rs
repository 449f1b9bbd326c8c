//! OpenAI-compatible chat-completion client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{DroverError, Result};

use super::{ChatClient, ChatRequest, ChatResponse};

/// Chat client for any OpenAI-compatible completions endpoint.
pub struct OpenAiClient {
    /// HTTP client for API requests.
    client: Client,
    /// Base endpoint, e.g. `https://api.openai.com/v1`.
    endpoint: String,
    /// Bearer API key.
    api_key: String,
    /// Model name to use.
    model: String,
}

impl OpenAiClient {
    /// Creates a new client for the given endpoint, key and model.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::default(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

/// Request payload sent to the chat completion API.
#[derive(Debug, Serialize)]
struct CompletionRequest {
    /// Model identifier provided by the service.
    model: String,
    /// Messages that form the conversation for the request.
    messages: Vec<Message>,
}

/// Message delivered to the API.
#[derive(Debug, Serialize)]
struct Message {
    /// Role of the message author (`system` or `user`).
    role: String,
    /// Textual content of the message.
    content: String,
}

/// Response payload returned by the service.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    /// List of candidate completions.
    choices: Vec<Choice>,
    /// Token accounting information for the request.
    usage: Usage,
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
struct Choice {
    /// Message generated for the choice.
    message: ResponseMessage,
}

/// Response message containing the generated text.
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    /// Generated text content.
    content: String,
}

/// Token usage metrics for a response.
#[derive(Debug, Deserialize)]
struct Usage {
    /// Number of tokens in the prompt portion of the request.
    prompt_tokens: u64,
    /// Number of tokens produced in the completion.
    completion_tokens: u64,
    /// Prompt-cache details; absent on providers that do not report them.
    #[serde(default)]
    prompt_tokens_details: PromptTokensDetails,
}

/// Prompt-cache breakdown of the prompt tokens.
#[derive(Debug, Default, Deserialize)]
struct PromptTokensDetails {
    /// Prompt tokens served from the provider's cache.
    #[serde(default)]
    cached_tokens: u64,
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: request.system,
                },
                Message {
                    role: "user".to_string(),
                    content: request.user,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|err| DroverError::generation(format!("API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DroverError::generation(format!(
                "API error {status}: {error_text}"
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|err| DroverError::generation(format!("Failed to parse response: {err}")))?;

        let text = completion
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| DroverError::generation("Response contained no choices"))?;

        Ok(ChatResponse {
            text,
            input_tokens: completion.usage.prompt_tokens,
            output_tokens: completion.usage.completion_tokens,
            cached_tokens: completion.usage.prompt_tokens_details.cached_tokens,
        })
    }
}
