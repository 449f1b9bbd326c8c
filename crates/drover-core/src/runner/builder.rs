//! Builder for creating and configuring StepRunner instances.

use std::sync::Arc;

use super::StepRunner;
use crate::{
    cache::CodeCache,
    error::{DroverError, Result},
    generator::CodeGenerator,
    llm::ChatClient,
    policy::RunPolicy,
    reducer::RuleSet,
    surface::PageSurface,
    usage::CostRates,
};

/// Builder for creating and configuring StepRunner instances.
///
/// The policy, rule set and billing rates are explicit per-runner values, so
/// several runners with different configurations can coexist in one process.
#[derive(Default)]
pub struct StepRunnerBuilder {
    surface: Option<Arc<dyn PageSurface>>,
    client: Option<Arc<dyn ChatClient>>,
    cache: Option<CodeCache>,
    policy: RunPolicy,
    rules: RuleSet,
    rates: CostRates,
}

impl StepRunnerBuilder {
    /// Creates a new builder with default policy (`medium`, cache enabled),
    /// the full reduction rule set and zero billing rates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page surface the run executes against.
    pub fn with_surface(mut self, surface: Arc<dyn PageSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Sets the chat client used for code generation.
    pub fn with_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the code cache for this run's output directory.
    pub fn with_cache(mut self, cache: CodeCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the strength policy and cache switch.
    pub fn with_policy(mut self, policy: RunPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the context-reduction rule selection.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the per-token billing rates for the usage summary.
    pub fn with_cost_rates(mut self, rates: CostRates) -> Self {
        self.rates = rates;
        self
    }

    /// Builds the configured runner.
    ///
    /// # Errors
    ///
    /// Returns `DroverError::ConflictingOptions` for an invalid policy
    /// combination and `DroverError::Configuration` when a required
    /// collaborator was not supplied. Both fail before any step runs.
    pub fn build(self) -> Result<StepRunner> {
        self.policy.validate()?;

        let surface = self.surface.ok_or_else(|| DroverError::Configuration {
            message: "StepRunner requires a page surface".to_string(),
        })?;
        let client = self.client.ok_or_else(|| DroverError::Configuration {
            message: "StepRunner requires a chat client".to_string(),
        })?;
        let cache = self.cache.ok_or_else(|| DroverError::Configuration {
            message: "StepRunner requires a code cache".to_string(),
        })?;

        let generator = CodeGenerator::new(client, cache.clone());

        Ok(StepRunner {
            surface,
            generator,
            cache,
            policy: self.policy,
            rules: self.rules,
            rates: self.rates,
        })
    }
}
