//! Token usage accounting across a run.
//!
//! Generation calls report input/output/cached token counts; the accountant
//! aggregates them over all steps into a [`UsageSummary`] with a linear cost
//! against configured per-token rates. Pure aggregation, no side effects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Step;

/// Token counts attributed to a single step's generation calls.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    /// Prompt-side tokens billed for the request
    pub input: u64,

    /// Completion-side tokens billed for the response
    pub output: u64,

    /// Prompt tokens served from the provider's prompt cache
    pub cached: u64,
}

impl TokenUsage {
    /// Adds another usage sample into this one.
    pub fn absorb(&mut self, other: TokenUsage) {
        self.input += other.input;
        self.output += other.output;
        self.cached += other.cached;
    }
}

/// Per-token billing rates; absent rates default to zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CostRates {
    /// Cost per input token
    pub input: f64,

    /// Cost per output token
    pub output: f64,

    /// Cost per cached token
    pub cached: f64,
}

/// Aggregate token and cost totals for a whole run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct UsageSummary {
    /// Input plus output tokens over all steps
    pub total_token: u64,

    /// Input tokens over all steps
    pub input_token: u64,

    /// Output tokens over all steps
    pub output_token: u64,

    /// Cached tokens over all steps
    pub cached_token: u64,

    /// Linear cost of the three token totals against the configured rates
    pub calculated_cost: f64,
}

/// Aggregates per-step usage into a run-wide summary.
///
/// # Examples
///
/// ```rust
/// use drover_core::models::Step;
/// use drover_core::usage::{summarize, CostRates, TokenUsage};
///
/// let mut step = Step::new(1, "click login", 0, 2);
/// step.usage = TokenUsage { input: 100, output: 40, cached: 10 };
///
/// let summary = summarize(&[step], &CostRates { input: 0.5, output: 1.0, cached: 0.1 });
/// assert_eq!(summary.total_token, 140);
/// assert!((summary.calculated_cost - 91.0).abs() < f64::EPSILON);
/// ```
pub fn summarize(steps: &[Step], rates: &CostRates) -> UsageSummary {
    let mut summary = UsageSummary::default();
    for step in steps {
        summary.input_token += step.usage.input;
        summary.output_token += step.usage.output;
        summary.cached_token += step.usage.cached;
    }
    summary.total_token = summary.input_token + summary.output_token;
    summary.calculated_cost = summary.input_token as f64 * rates.input
        + summary.output_token as f64 * rates.output
        + summary.cached_token as f64 * rates.cached;
    summary
}

impl fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Usage")?;
        writeln!(f, "- Total tokens: {}", self.total_token)?;
        writeln!(f, "- Input tokens: {}", self.input_token)?;
        writeln!(f, "- Output tokens: {}", self.output_token)?;
        writeln!(f, "- Cached tokens: {}", self.cached_token)?;
        writeln!(f, "- Calculated cost: {:.6}", self.calculated_cost)
    }
}
