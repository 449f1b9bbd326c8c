//! Step runner: the retry/caching state machine at the heart of a run.
//!
//! The runner iterates steps strictly in order and, per step, drives the
//! retry loop: capture and reduce the page markup, pick the code source
//! (cache first, generator otherwise), execute against the page surface and
//! record the outcome. The loop is organized into:
//!
//! - [`builder`]: factory wiring the surface, client, cache, policy and
//!   reduction rules into a runner
//! - [`drive`]: the per-step state machine itself
//!
//! # Per-step state machine
//!
//! ```text
//! Pending ──▶ Attempting ──▶ Succeeded
//!                 │
//!                 └────────▶ Exhausted   (budget spent; run continues)
//! ```
//!
//! Every attempt decrements the budget regardless of outcome. Under the
//! `onlycache` strength the cache is scanned for every step up front; a miss
//! anywhere yields a single critical result entry and the run aborts before
//! any step executes.
//!
//! Steps and attempts are strictly sequential: the page surface is a single
//! shared mutable resource exclusively owned by the runner, so no two
//! executions are ever in flight concurrently.

pub mod builder;
mod drive;

use std::sync::Arc;

use crate::cache::CodeCache;
use crate::generator::CodeGenerator;
use crate::policy::RunPolicy;
use crate::reducer::RuleSet;
use crate::surface::PageSurface;
use crate::usage::CostRates;

pub use builder::StepRunnerBuilder;

/// Drives a run's steps against the page surface.
pub struct StepRunner {
    pub(crate) surface: Arc<dyn PageSurface>,
    pub(crate) generator: CodeGenerator,
    pub(crate) cache: CodeCache,
    pub(crate) policy: RunPolicy,
    pub(crate) rules: RuleSet,
    pub(crate) rates: CostRates,
}
