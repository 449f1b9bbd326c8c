//! Step model definition and related functionality.

use serde::{Deserialize, Serialize};

use crate::fingerprint::fingerprint;
use crate::usage::TokenUsage;

use super::StepState;

/// Default post-success pause before the next step, in milliseconds.
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 10_000;

/// Represents one natural-language task in a run.
///
/// Steps are created once at run start from the loaded step list, mutated
/// only by the runner during its retry loop, and serialized back to the step
/// list file at run end. Only id, prompt and timeout are persisted there;
/// execution state is not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// 1-based position in the run; steps execute strictly in this order
    pub index: u32,

    /// Content fingerprint of the task description, used as the cache key
    pub id: String,

    /// The natural-language task description
    pub sub_prompt: String,

    /// Post-success pause before the next step, in milliseconds
    pub timeout_ms: u64,

    /// Remaining attempt budget; decremented on every attempt
    pub attempts_remaining: u32,

    /// Becomes true exactly once, on the attempt whose code executes cleanly
    pub success: bool,

    /// Most recently observed failure message, fed back into later
    /// generation attempts under the `high` strength
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// Token usage attributed to generation calls made for this step
    /// (zero if served entirely from cache)
    pub usage: TokenUsage,
}

impl Step {
    /// Creates a new pending step with the given attempt budget.
    ///
    /// The id is derived from the prompt text via [`fingerprint`]; the same
    /// description always yields the same id.
    pub fn new(index: u32, sub_prompt: impl Into<String>, timeout_ms: u64, attempts: u32) -> Self {
        let sub_prompt = sub_prompt.into();
        Self {
            index,
            id: fingerprint(&sub_prompt),
            sub_prompt,
            timeout_ms,
            attempts_remaining: attempts,
            success: false,
            last_error: None,
            usage: TokenUsage::default(),
        }
    }

    /// Derives the current lifecycle state of this step.
    pub fn state(&self) -> StepState {
        if self.success {
            StepState::Succeeded
        } else if self.attempts_remaining == 0 {
            StepState::Exhausted
        } else if self.last_error.is_some() {
            StepState::Attempting
        } else {
            StepState::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_step_is_pending_with_full_budget() {
        let step = Step::new(1, "click login", DEFAULT_STEP_TIMEOUT_MS, 2);
        assert_eq!(step.state(), StepState::Pending);
        assert_eq!(step.attempts_remaining, 2);
        assert!(!step.success);
        assert_eq!(step.usage, TokenUsage::default());
    }

    #[test]
    fn id_is_a_pure_function_of_the_prompt() {
        let a = Step::new(1, "fill username", 500, 2);
        let b = Step::new(7, "fill username", 9_000, 3);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn state_transitions_follow_the_retry_loop() {
        let mut step = Step::new(1, "click login", 0, 2);

        step.last_error = Some("selector not found".to_string());
        step.attempts_remaining = 1;
        assert_eq!(step.state(), StepState::Attempting);

        step.attempts_remaining = 0;
        assert_eq!(step.state(), StepState::Exhausted);

        step.success = true;
        assert_eq!(step.state(), StepState::Succeeded);
    }
}
