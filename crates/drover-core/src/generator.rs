//! Code generator: turns a task description into executable page actions.
//!
//! Builds a single prompt from the task, the current location and the
//! reduced page context, invokes the chat client, normalizes the response
//! into directly executable code and persists it into the code cache under
//! the step's fingerprint.

use std::sync::Arc;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::cache::CodeCache;
use crate::error::Result;
use crate::llm::{ChatClient, ChatRequest};
use crate::usage::TokenUsage;

/// System message framing the model's role.
const SYSTEM_PROMPT: &str = "You are an expert in browser automation with Playwright.";

/// Stability guard prepended to every generated snippet; the model is not
/// trusted to add this itself.
const QUIESCENCE_GUARD: &str = "await page.waitForLoadState('networkidle');";

static CODE_FENCES: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[a-zA-Z]*").expect("valid regex"));

/// Generated code plus the token usage of the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Executable action code, guard included
    pub code: String,

    /// Token counts from the model response envelope
    pub usage: TokenUsage,
}

/// Builds prompts, invokes the model and normalizes its responses.
pub struct CodeGenerator {
    client: Arc<dyn ChatClient>,
    cache: CodeCache,
}

impl CodeGenerator {
    /// Creates a generator over the given chat client and code cache.
    pub fn new(client: Arc<dyn ChatClient>, cache: CodeCache) -> Self {
        Self { client, cache }
    }

    /// Generates action code for one step attempt.
    ///
    /// `prior_error` is supplied on regeneration attempts under the `high`
    /// strength, so the model can self-correct selector and timeout
    /// mistakes. The final code is persisted under `step_id` in the
    /// cache before returning.
    ///
    /// # Errors
    ///
    /// Model client failures propagate unchanged as generation failures. A
    /// response that is empty after fence-stripping is not an error here: the
    /// resulting code simply does nothing useful and fails at execution.
    pub async fn generate(
        &self,
        step_id: &str,
        task: &str,
        location: &str,
        reduced_context: &str,
        prior_error: Option<&str>,
    ) -> Result<Generated> {
        let user = build_user_message(task, location, reduced_context, prior_error);
        debug!("requesting generation for step {step_id} ({} chars of context)", reduced_context.len());

        let response = self
            .client
            .complete(ChatRequest {
                system: SYSTEM_PROMPT.to_string(),
                user,
            })
            .await?;

        let stripped = strip_code_fences(&response.text);
        let code = format!("{QUIESCENCE_GUARD}\n{stripped}");

        self.cache.put(step_id, &code)?;
        info!("generated code for step {step_id} cached at {}", self.cache.path_for(step_id).display());

        Ok(Generated {
            code,
            usage: TokenUsage {
                input: response.input_tokens,
                output: response.output_tokens,
                cached: response.cached_tokens,
            },
        })
    }
}

/// Builds the user message: instructions first, correction directive when a
/// prior failure exists, reduced context always last so instruction
/// following is not diluted by markup size.
fn build_user_message(
    task: &str,
    location: &str,
    reduced_context: &str,
    prior_error: Option<&str>,
) -> String {
    let mut prompt = format!(
        "You are an assistant that generates ONLY Playwright action code (no test(), describe() or imports).\n\
         Generate code that performs EXACTLY the following actions on the current page:\n\
         \"{task}\"\n\
         \n\
         The current page is: {location}\n"
    );

    if let Some(error) = prior_error {
        prompt.push_str(&format!(
            "\nWARNING: the previous attempt failed with this error:\n\
             \"{error}\"\n\
             Correct the code with this problem in mind. Analyze the error and adapt the strategy:\n\
             - If it is a timeout, use more specific selectors or wait for loads\n\
             - If a selector was not found, check it against the provided HTML\n\
             - If a click failed, try alternatives (force, scroll into view)\n"
        ));
    }

    prompt.push_str(
        "\nUse the already-open \"page\" object (do not open a new browser or a new page).\n\
         You may use \"expect\" to validate visible elements or texts.\n\
         Do not add extra text, only executable JavaScript code.\n",
    );

    prompt.push_str(&format!("\nHTML:\n{reduced_context}"));
    prompt
}

/// Strips Markdown code-fence wrapping from a raw model response.
fn strip_code_fences(text: &str) -> String {
    CODE_FENCES.replace_all(text, "").trim().to_string()
}
