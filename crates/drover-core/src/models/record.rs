//! Per-run outcome records persisted by the run recorder.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::policy::Strength;
use crate::usage::UsageSummary;

/// Outcome of a single attempt, success or error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// The attempt's generated code executed without raising
    Success,

    /// The attempt failed (cache miss, generation failure or execution failure)
    Error,
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" => Ok(RunStatus::Success),
            "error" => Ok(RunStatus::Error),
            _ => Err(format!("Invalid run status: {s}")),
        }
    }
}

impl RunStatus {
    /// Convert to the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Error => "error",
        }
    }
}

/// One entry in the ordered per-run result list.
///
/// A step contributes one entry per attempt: failed attempts append error
/// entries and the succeeding attempt appends a success entry, so a step
/// that recovers on retry shows an error followed by a success for the same
/// index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunResult {
    /// 1-based index of the step this attempt belongs to
    pub index: u32,

    /// The step's task description
    pub prompt: String,

    /// Outcome of the attempt
    pub status: RunStatus,

    /// Failure message, present on error entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// True only for the run-fatal entry produced by a cache miss under the
    /// `onlycache` strength
    #[serde(default, skip_serializing_if = "is_false")]
    pub critical: bool,
}

fn is_false(value: &bool) -> bool {
    !value
}

impl RunResult {
    /// Creates a success entry for a step.
    pub fn success(index: u32, prompt: impl Into<String>) -> Self {
        Self {
            index,
            prompt: prompt.into(),
            status: RunStatus::Success,
            error: None,
            critical: false,
        }
    }

    /// Creates an error entry for a failed attempt.
    pub fn error(index: u32, prompt: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            index,
            prompt: prompt.into(),
            status: RunStatus::Error,
            error: Some(message.into()),
            critical: false,
        }
    }

    /// Marks this entry as run-fatal.
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status, &self.error) {
            (RunStatus::Success, _) => {
                write!(f, "✓ Step {}: {}", self.index, self.prompt)
            }
            (RunStatus::Error, Some(error)) => {
                write!(f, "✗ Step {}: {} ({})", self.index, self.prompt, error)
            }
            (RunStatus::Error, None) => {
                write!(f, "✗ Step {}: {}", self.index, self.prompt)
            }
        }
    }
}

/// One full run: ordered results plus aggregate usage and run configuration.
///
/// Multiple records accumulate in the append-only run log across
/// invocations; the runner produces exactly one record per invocation and
/// hands it to the recorder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    /// Ordered per-attempt outcomes for the whole run
    pub results: Vec<RunResult>,

    /// Aggregated token and cost totals across all steps
    pub usage: UsageSummary,

    /// Wall-clock time the record was produced (UTC)
    pub timestamp: Timestamp,

    /// Strength policy the run executed under
    pub strength: Strength,

    /// Whether cache lookups were enabled for the run
    pub cache_enabled: bool,
}

impl RunRecord {
    /// Whether the run was aborted by a run-fatal condition.
    ///
    /// A fatal record carries a critical error entry and means remaining
    /// steps never executed; callers map this to a non-zero exit.
    pub fn is_fatal(&self) -> bool {
        self.results.iter().any(|result| result.critical)
    }
}
