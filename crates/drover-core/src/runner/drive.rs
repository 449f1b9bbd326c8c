//! The per-step retry loop.

use std::time::Duration;

use jiff::Timestamp;
use log::{info, warn};
use tokio::time::sleep;

use super::StepRunner;
use crate::{
    error::{DroverError, Result},
    models::{RunRecord, RunResult, Step},
    policy::Strength,
    reducer::reduce,
    usage::summarize,
};

/// Fixed message recorded for the run-fatal cache miss, mirrored in the
/// critical result entry.
const ONLYCACHE_MISS: &str = "Cache not found (onlycache mode)";

impl StepRunner {
    /// Runs all steps in order and produces the run's record.
    ///
    /// The record always covers everything that happened: per-attempt
    /// results in order, aggregate usage and the run configuration. A
    /// run-fatal condition (cache miss under `onlycache`) aborts the run
    /// and is reflected as a critical error entry; callers check
    /// [`RunRecord::is_fatal`] and map it to a non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns `DroverError::ConflictingOptions` when the policy is invalid.
    /// Attempt-level failures never error the run; they are absorbed into
    /// the record.
    pub async fn run(&self, steps: &mut [Step]) -> Result<RunRecord> {
        self.policy.validate()?;

        let mut results = Vec::new();

        // onlycache promises zero generation calls, so every step must be
        // servable from the cache. The scan runs before any step executes: a
        // miss anywhere in the sequence aborts the whole run with nothing
        // run at all, regardless of how many earlier steps are cached.
        if self.policy.strength == Strength::OnlyCache {
            if let Some(missing) = steps.iter().find(|step| !self.cache.has(&step.id)) {
                warn!(
                    "step {} has no cache entry; aborting onlycache run",
                    missing.index
                );
                results.push(
                    RunResult::error(missing.index, &missing.sub_prompt, ONLYCACHE_MISS)
                        .critical(),
                );
                return Ok(self.record(steps, results));
            }
        }

        'steps: for step in steps.iter_mut() {
            // Cache availability is decided once per step: code generated by
            // a failed attempt within this run must not be replayed from the
            // cache by the next attempt.
            let mut cache_armed = self.policy.cache_enabled && self.cache.has(&step.id);
            let mut generation_calls = 0u32;

            while step.attempts_remaining > 0 && !step.success {
                info!(
                    "step {} ({} attempts left): {}",
                    step.index, step.attempts_remaining, step.sub_prompt
                );

                let outcome = self.attempt(step, &mut cache_armed, &mut generation_calls).await;

                // The budget shrinks on every attempt, on every path; the
                // loop condition is the only thing that may stop retries.
                step.attempts_remaining -= 1;

                match outcome {
                    Ok(()) => {
                        step.success = true;
                        info!("step {} succeeded", step.index);
                        results.push(RunResult::success(step.index, &step.sub_prompt));

                        // Settle the page before the next step; the step
                        // already succeeded, so a flaky wait is not an error.
                        if let Err(err) = self.surface.wait_for_quiescence().await {
                            warn!("quiescence wait after step {} failed: {err}", step.index);
                        }
                        if step.timeout_ms > 0 {
                            sleep(Duration::from_millis(step.timeout_ms)).await;
                        }
                    }
                    Err(err) => {
                        warn!("step {} attempt failed: {err}", step.index);
                        step.last_error = Some(err.to_string());

                        if self.policy.strength == Strength::OnlyCache && err.is_cache_miss() {
                            results.push(
                                RunResult::error(step.index, &step.sub_prompt, ONLYCACHE_MISS)
                                    .critical(),
                            );
                            break 'steps;
                        }

                        results.push(RunResult::error(
                            step.index,
                            &step.sub_prompt,
                            err.to_string(),
                        ));
                    }
                }
            }
        }

        Ok(self.record(steps, results))
    }

    /// Assembles the run's record from the accumulated results.
    fn record(&self, steps: &[Step], results: Vec<RunResult>) -> RunRecord {
        RunRecord {
            results,
            usage: summarize(steps, &self.rates),
            timestamp: Timestamp::now(),
            strength: self.policy.strength,
            cache_enabled: self.policy.cache_enabled,
        }
    }

    /// Runs one attempt: capture context, pick the code source, execute.
    ///
    /// `cache_armed` is consumed by the first cache use for the step; later
    /// attempts in the same run regenerate instead. `generation_calls`
    /// counts the generator invocations made for the step so far.
    async fn attempt(
        &self,
        step: &mut Step,
        cache_armed: &mut bool,
        generation_calls: &mut u32,
    ) -> Result<()> {
        let markup = self.surface.body_markup().await?;
        let reduced = reduce(&markup, &self.rules);

        let code = if *cache_armed {
            *cache_armed = false;
            self.cache.get(&step.id, &step.sub_prompt)?
        } else if self.policy.strength == Strength::OnlyCache {
            // onlycache promises zero generation calls, so there is no
            // fallback path here.
            return Err(DroverError::CacheMiss {
                fingerprint: step.id.clone(),
                prompt: step.sub_prompt.clone(),
            });
        } else {
            // Under the high strength the previous failure is fed back from
            // the second generation attempt on, so the model can
            // self-correct; the first generation attempt always runs clean.
            let prior_error = if self.policy.strength == Strength::High && *generation_calls > 0 {
                step.last_error.as_deref()
            } else {
                None
            };

            let location = self.surface.current_location().await;
            let generated = self
                .generator
                .generate(&step.id, &step.sub_prompt, &location, &reduced, prior_error)
                .await?;
            *generation_calls += 1;
            step.usage.absorb(generated.usage);
            generated.code
        };

        self.surface.run_generated_action(&code).await
    }
}
