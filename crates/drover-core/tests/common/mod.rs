use std::sync::Arc;

use drover_core::{
    CodeCache, MockChatClient, RunPolicy, ScriptedSurface, Step, StepRunner, StepRunnerBuilder,
};
use tempfile::TempDir;

/// Markup served by the default scripted surface.
pub const PAGE: &str = "<body><button id=\"btnLogin\">Login</button></body>";

/// Shared per-test collaborators: a temp-backed cache and a recording mock
/// client.
pub struct Harness {
    _dir: TempDir,
    pub cache: CodeCache,
    pub client: MockChatClient,
}

impl Harness {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temporary directory");
        let cache = CodeCache::new(dir.path().join("generated")).expect("Failed to open cache");
        Self {
            _dir: dir,
            cache,
            client: MockChatClient::new(),
        }
    }

    /// Builds a runner over the given surface and policy, sharing the
    /// harness cache and client.
    pub fn runner(&self, surface: ScriptedSurface, policy: RunPolicy) -> StepRunner {
        StepRunnerBuilder::new()
            .with_surface(Arc::new(surface))
            .with_client(Arc::new(self.client.clone()))
            .with_cache(self.cache.clone())
            .with_policy(policy)
            .build()
            .expect("Failed to build runner")
    }

    /// Builds run-ready steps (zero pause) for the given prompts.
    pub fn steps(&self, prompts: &[&str], policy: &RunPolicy) -> Vec<Step> {
        prompts
            .iter()
            .enumerate()
            .map(|(i, prompt)| Step::new((i + 1) as u32, *prompt, 0, policy.max_attempts()))
            .collect()
    }
}
