//! Execution surface boundary: the live page the generated code runs on.
//!
//! The runner never touches a browser directly. Everything it needs from the
//! page (its location, its markup, the ability to run a generated action and
//! to wait for quiescence) goes through the narrow [`PageSurface`]
//! capability interface, which bounds what incorrect generated code can
//! reach and lets tests substitute a scripted double for a real driver.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{DroverError, Result};

/// Capability set the runner consumes from the live page.
///
/// The surface is exclusively owned by the runner for the run's duration; no
/// other component mutates the page.
#[async_trait]
pub trait PageSurface: Send + Sync {
    /// Current page URL.
    async fn current_location(&self) -> String;

    /// Raw markup of the page body.
    async fn body_markup(&self) -> Result<String>;

    /// Executes a generated action against the open page, with the
    /// assertion helper available to the code.
    ///
    /// # Errors
    ///
    /// Returns [`DroverError::Execution`] carrying the failure message when
    /// the generated code raises; the message is retained as feedback for
    /// the next generation attempt.
    async fn run_generated_action(&self, code: &str) -> Result<()>;

    /// Waits for network/DOM quiescence.
    async fn wait_for_quiescence(&self) -> Result<()>;
}

/// Scripted test double for [`PageSurface`].
///
/// Serves a fixed location and markup, plays back a queue of per-call
/// execution outcomes (an exhausted queue succeeds), and records every code
/// string it was asked to run.
pub struct ScriptedSurface {
    location: String,
    markup: String,
    outcomes: Mutex<VecDeque<std::result::Result<(), String>>>,
    executed: Mutex<Vec<String>>,
}

impl ScriptedSurface {
    /// Creates a surface serving the given location and markup, succeeding
    /// on every execution.
    pub fn new(location: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            markup: markup.into(),
            outcomes: Mutex::new(VecDeque::new()),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Queues an execution failure with the given message for the next call.
    pub fn push_failure(self, message: impl Into<String>) -> Self {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(Err(message.into()));
        }
        self
    }

    /// Queues an execution success for the next call.
    pub fn push_success(self) -> Self {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(Ok(()));
        }
        self
    }

    /// Code strings executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|codes| codes.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageSurface for ScriptedSurface {
    async fn current_location(&self) -> String {
        self.location.clone()
    }

    async fn body_markup(&self) -> Result<String> {
        Ok(self.markup.clone())
    }

    async fn run_generated_action(&self, code: &str) -> Result<()> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(code.to_string());
        }

        let outcome = self
            .outcomes
            .lock()
            .ok()
            .and_then(|mut outcomes| outcomes.pop_front())
            .unwrap_or(Ok(()));

        outcome.map_err(DroverError::execution)
    }

    async fn wait_for_quiescence(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plays_back_queued_outcomes_then_succeeds() {
        let surface = ScriptedSurface::new("https://example.test/login", "<body></body>")
            .push_failure("selector not found")
            .push_success();

        let err = surface
            .run_generated_action("await page.click('#a');")
            .await
            .expect_err("first outcome is a failure");
        assert!(err.to_string().contains("selector not found"));

        surface
            .run_generated_action("await page.click('#b');")
            .await
            .expect("second outcome succeeds");
        surface
            .run_generated_action("await page.click('#c');")
            .await
            .expect("exhausted queue succeeds");

        assert_eq!(surface.executed().len(), 3);
    }

    #[tokio::test]
    async fn serves_fixed_location_and_markup() {
        let surface = ScriptedSurface::new("https://example.test", "<body><p>hi</p></body>");
        assert_eq!(surface.current_location().await, "https://example.test");
        assert_eq!(
            surface.body_markup().await.expect("markup"),
            "<body><p>hi</p></body>"
        );
    }
}
