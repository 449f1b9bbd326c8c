//! Core library for the Drover browser-automation orchestrator.
//!
//! This crate provides the business logic for turning a list of
//! natural-language steps into executed browser actions: prompt-addressed
//! code caching, page context reduction, LLM-backed code generation, the
//! retry state machine, usage accounting and run-log persistence.
//!
//! # Architecture
//!
//! The crate is organized around two trait seams:
//!
//! - **Chat boundary** ([`llm::ChatClient`]): how generated code is obtained.
//!   [`llm::OpenAiClient`] talks to any OpenAI-compatible endpoint;
//!   [`llm::MockChatClient`] answers deterministically for offline runs.
//! - **Execution boundary** ([`surface::PageSurface`]): where generated code
//!   runs. The process hosting the run supplies the real surface;
//!   [`surface::ScriptedSurface`] is the in-memory double used in tests.
//!
//! Everything in between is policy: [`policy::Strength`] fixes the attempt
//! budget, [`cache::CodeCache`] keys generated code by a fingerprint of the
//! step prompt, and [`runner::StepRunner`] drives the per-step retry loop.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use drover_core::{
//!     CodeCache, MockChatClient, RunPolicy, ScriptedSurface, Step, StepRunnerBuilder, Strength,
//! };
//!
//! # async fn example() -> drover_core::Result<()> {
//! let policy = RunPolicy::new(Strength::Medium);
//! let mut steps = vec![Step::new(1, "click the login button", 0, policy.max_attempts())];
//!
//! let runner = StepRunnerBuilder::new()
//!     .with_surface(Arc::new(ScriptedSurface::new(
//!         "https://example.test",
//!         "<body><button id=\"btnLogin\">Login</button></body>",
//!     )))
//!     .with_client(Arc::new(MockChatClient::new()))
//!     .with_cache(CodeCache::new("generated")?)
//!     .with_policy(policy)
//!     .build()?;
//!
//! let record = runner.run(&mut steps).await?;
//! for result in &record.results {
//!     println!("{result}");
//! }
//! println!("{}", record.usage);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod generator;
pub mod llm;
pub mod models;
pub mod policy;
pub mod recorder;
pub mod reducer;
pub mod runner;
pub mod surface;
pub mod usage;

// Re-export commonly used types
pub use cache::CodeCache;
pub use config::{AiAgentSettings, ExecutionSettings, Settings, StepEntry, StepsFile};
pub use error::{DroverError, Result};
pub use fingerprint::fingerprint;
pub use llm::{ChatClient, ChatRequest, ChatResponse, MockChatClient, OpenAiClient};
pub use models::{RunRecord, RunResult, RunStatus, Step, StepState};
pub use policy::{RunPolicy, Strength};
pub use recorder::RunRecorder;
pub use reducer::{reduce, ReduceRule, RuleSet};
pub use runner::{StepRunner, StepRunnerBuilder};
pub use surface::{PageSurface, ScriptedSurface};
pub use usage::{summarize, CostRates, TokenUsage, UsageSummary};
