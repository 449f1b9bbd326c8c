use std::path::{Path, PathBuf};

use clap::Parser;
use drover_core::{ReduceRule, Strength};

/// Command-line interface for the Drover step runner
///
/// Drover drives a web page through an ordered list of natural-language
/// steps. For each step it captures the page markup, reduces it to the
/// interactive essentials, asks a chat-completion model for a Playwright
/// snippet (or replays one from the prompt-addressed cache) and executes it
/// against the page, retrying within the strength's attempt budget.
#[derive(Parser)]
#[command(version, about, name = "drover")]
pub struct Args {
    /// Path to the settings file. Defaults to drover-settings.json, or
    /// drover-settings.mock.json under --mock
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Run a bundled scenario pack: loads stepspacks/<NAME>/settings.json
    /// and resolves the pack's steps file and output directory relative to
    /// the pack directory
    #[arg(long, value_name = "NAME", conflicts_with = "settings")]
    pub stepspack: Option<String>,

    /// Attempt budget per step: onlycache, medium or high
    #[arg(long, default_value = "medium")]
    pub strength: Strength,

    /// Ignore existing cache entries and always generate fresh code.
    /// Conflicts with --strength onlycache
    #[arg(long)]
    pub nocache: bool,

    /// Run offline with the canned-code mock client and a scripted page
    #[arg(long)]
    pub mock: bool,

    /// Context-reduction rule to apply (repeatable); defaults to all rules
    #[arg(long, value_name = "RULE")]
    pub strip: Vec<ReduceRule>,

    /// Context-reduction rule to exempt from stripping (repeatable)
    #[arg(long, value_name = "RULE")]
    pub keep: Vec<ReduceRule>,
}

impl Args {
    /// Directory the settings file's relative paths resolve against: the
    /// pack directory under `--stepspack`, the working directory otherwise.
    pub fn base_dir(&self) -> PathBuf {
        match &self.stepspack {
            Some(name) => Path::new("stepspacks").join(name),
            None => PathBuf::new(),
        }
    }

    /// Settings path to load, honoring the pack and per-mode defaults.
    pub fn settings_path(&self) -> PathBuf {
        if let Some(path) = &self.settings {
            return path.clone();
        }
        if self.stepspack.is_some() {
            return self.base_dir().join("settings.json");
        }
        if self.mock {
            PathBuf::from("drover-settings.mock.json")
        } else {
            PathBuf::from("drover-settings.json")
        }
    }
}
