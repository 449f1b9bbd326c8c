//! Mock chat client for testing generation flows.
//!
//! Returns a canned code snippet wrapped in a Markdown fence with fixed
//! token counts, and records every request it receives, enabling end-to-end
//! runs (and "zero generation calls" assertions) without real API calls.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::Result;

use super::{ChatClient, ChatRequest, ChatResponse};

/// Default snippet returned when no canned code is configured.
const DEFAULT_CODE: &str =
    "await expect(page.locator('#btnLogin')).toBeVisible();\nawait page.click('#btnLogin');";

/// Fixed token counts reported by the mock, large enough to be visible in
/// usage summaries and stable enough to assert on.
const MOCK_INPUT_TOKENS: u64 = 320;
const MOCK_OUTPUT_TOKENS: u64 = 90;
const MOCK_CACHED_TOKENS: u64 = 0;

/// Deterministic stand-in for a chat-completion endpoint.
#[derive(Clone)]
pub struct MockChatClient {
    /// Code body returned inside the fenced response
    code: String,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockChatClient {
    /// Creates a mock returning the default snippet.
    pub fn new() -> Self {
        Self {
            code: DEFAULT_CODE.to_string(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a mock returning the given code body.
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of completion calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|reqs| reqs.len()).unwrap_or(0)
    }

    /// The most recent request, if any call was made.
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests
            .lock()
            .ok()
            .and_then(|reqs| reqs.last().cloned())
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        Ok(ChatResponse {
            text: format!("```javascript\n{}\n```", self.code),
            input_tokens: MOCK_INPUT_TOKENS,
            output_tokens: MOCK_OUTPUT_TOKENS,
            cached_tokens: MOCK_CACHED_TOKENS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_fenced_canned_code() {
        let client = MockChatClient::with_code("await page.click('#ok');");
        let response = client
            .complete(ChatRequest {
                system: "sys".to_string(),
                user: "click ok".to_string(),
            })
            .await
            .expect("mock completion");

        assert!(response.text.starts_with("```javascript"));
        assert!(response.text.contains("await page.click('#ok');"));
        assert_eq!(response.input_tokens, MOCK_INPUT_TOKENS);
        assert_eq!(response.output_tokens, MOCK_OUTPUT_TOKENS);
    }

    #[tokio::test]
    async fn records_request_history() {
        let client = MockChatClient::new();
        assert_eq!(client.call_count(), 0);

        client
            .complete(ChatRequest {
                system: "sys".to_string(),
                user: "first".to_string(),
            })
            .await
            .expect("mock completion");
        client
            .complete(ChatRequest {
                system: "sys".to_string(),
                user: "second".to_string(),
            })
            .await
            .expect("mock completion");

        assert_eq!(client.call_count(), 2);
        assert_eq!(client.last_request().map(|req| req.user), Some("second".to_string()));
    }
}
