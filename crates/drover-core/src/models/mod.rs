//! Data models for steps and run records.
//!
//! This module contains the core domain models of a drover run: the [`Step`]
//! being driven, its derived [`StepState`], and the per-run outcome records
//! ([`RunResult`], [`RunRecord`]) that the recorder persists. Display
//! implementations live next to the types; the CLI renders them directly.

pub mod record;
pub mod state;
pub mod step;

pub use record::{RunRecord, RunResult, RunStatus};
pub use state::StepState;
pub use step::Step;
