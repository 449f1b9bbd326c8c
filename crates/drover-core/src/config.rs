//! Settings and step-list file IO.
//!
//! Two JSON files feed a run: the settings file (entry URL, model endpoint,
//! billing rates, output locations) and the steps file (the ordered task
//! descriptions to drive). The steps file is read once at run start and
//! rewritten at run end with the fingerprints filled in; execution state is
//! never persisted there.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FsResultExt, Result, ResultExt};
use crate::models::Step;
use crate::usage::CostRates;

/// Default directory for cache files and the run log.
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Top-level settings file contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Run execution settings
    pub execution: ExecutionSettings,

    /// Model endpoint and billing settings
    pub ai_agent: AiAgentSettings,

    /// Canned code snippet returned by the mock client in `--mock` mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hc_code: Option<String>,
}

/// Execution-side settings: where the run starts and where artifacts go.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionSettings {
    /// URL the page is opened at before the first step
    pub entrypoint_url: String,

    /// Path of the steps file to drive
    pub steps_file: PathBuf,

    /// Whether the browser driver should run headless
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Directory for cache files and the run log
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// External driver command implementing the page surface protocol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_cmd: Option<String>,
}

fn default_headless() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

/// Model endpoint and per-token billing rates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiAgentSettings {
    /// OpenAI-compatible endpoint base URL
    pub endpoint: String,

    /// Model name requested for generation
    #[serde(default = "default_model")]
    pub model: String,

    /// Cost per input token; absent rates default to zero
    #[serde(default)]
    pub cost_input_token: f64,

    /// Cost per output token
    #[serde(default)]
    pub cost_output_token: f64,

    /// Cost per cached token
    #[serde(default)]
    pub cost_cached_token: f64,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

impl AiAgentSettings {
    /// Billing rates for the usage accountant.
    pub fn cost_rates(&self) -> CostRates {
        CostRates {
            input: self.cost_input_token,
            output: self.cost_output_token,
            cached: self.cost_cached_token,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// A missing or unreadable file is a `FileSystem` error; malformed
    /// contents report as a `Configuration` error naming the problem.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).fs_context(path)?;
        serde_json::from_str(&raw).with_context("Invalid settings file")
    }
}

/// One record in the steps file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepEntry {
    /// Fingerprint of the prompt, filled in when the file is rewritten
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The natural-language task description
    pub sub_prompt: String,

    /// Post-success pause in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// The ordered step list as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepsFile {
    /// Steps in execution order
    pub steps: Vec<StepEntry>,
}

impl StepsFile {
    /// Loads the step list from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).fs_context(path)?;
        serde_json::from_str(&raw)
            .with_context_lazy(|| format!("Invalid steps file {}", path.display()))
    }

    /// Writes the step list back, pretty-printed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).fs_context(path)
    }

    /// Builds run-ready steps with 1-based indices and the given attempt
    /// budget. Fingerprints are recomputed from the prompt text; any ids
    /// already present in the file are informational only.
    pub fn into_steps(self, attempts: u32) -> Vec<Step> {
        self.steps
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                Step::new(
                    (i + 1) as u32,
                    entry.sub_prompt,
                    entry.timeout.unwrap_or(crate::models::step::DEFAULT_STEP_TIMEOUT_MS),
                    attempts,
                )
            })
            .collect()
    }

    /// Rebuilds the file contents from executed steps, carrying id, prompt
    /// and timeout only.
    pub fn from_steps(steps: &[Step]) -> Self {
        Self {
            steps: steps
                .iter()
                .map(|step| StepEntry {
                    id: Some(step.id.clone()),
                    sub_prompt: step.sub_prompt.clone(),
                    timeout: Some(step.timeout_ms),
                })
                .collect(),
        }
    }
}
