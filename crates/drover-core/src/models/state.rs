//! Step lifecycle state enumeration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of a step's position in the retry state machine.
///
/// A step starts `Pending`, moves through `Attempting` while failures are
/// being retried, and ends either `Succeeded` or `Exhausted` once its
/// attempt budget is spent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    /// No attempt has run yet
    Pending,

    /// At least one attempt failed and budget remains
    Attempting,

    /// An attempt's generated code executed without raising
    Succeeded,

    /// The attempt budget ran out without a success
    Exhausted,
}

impl FromStr for StepState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(StepState::Pending),
            "attempting" => Ok(StepState::Attempting),
            "succeeded" => Ok(StepState::Succeeded),
            "exhausted" => Ok(StepState::Exhausted),
            _ => Err(format!("Invalid step state: {s}")),
        }
    }
}

impl StepState {
    /// Convert to the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepState::Pending => "pending",
            StepState::Attempting => "attempting",
            StepState::Succeeded => "succeeded",
            StepState::Exhausted => "exhausted",
        }
    }

    /// Get the state with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use drover_core::models::StepState;
    ///
    /// assert_eq!(StepState::Succeeded.with_icon(), "✓ Succeeded");
    /// assert_eq!(StepState::Exhausted.with_icon(), "✗ Exhausted");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            StepState::Pending => "○ Pending",
            StepState::Attempting => "➤ Attempting",
            StepState::Succeeded => "✓ Succeeded",
            StepState::Exhausted => "✗ Exhausted",
        }
    }
}
