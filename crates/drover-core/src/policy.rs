//! Run-wide strength policy configuration.
//!
//! The strength policy is an explicit value object passed into the runner at
//! construction rather than process-wide static state, so several policies
//! can coexist in one process (and in one test binary).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DroverError, Result};

/// Named preset controlling the attempt budget and cache behavior for a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// Never call the generator; a missing cache entry is fatal for the run
    OnlyCache,

    /// Try the cache once, else one generation attempt
    #[default]
    Medium,

    /// Try the cache once, then up to two generation attempts, feeding the
    /// previous failure's message into the second
    High,
}

impl Strength {
    /// Attempt budget every step starts the run with.
    pub fn max_attempts(&self) -> u32 {
        match self {
            Strength::OnlyCache => 1,
            Strength::Medium => 2,
            Strength::High => 3,
        }
    }

    /// Convert to the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::OnlyCache => "onlycache",
            Strength::Medium => "medium",
            Strength::High => "high",
        }
    }
}

impl FromStr for Strength {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "onlycache" => Ok(Strength::OnlyCache),
            "medium" => Ok(Strength::Medium),
            "high" => Ok(Strength::High),
            _ => Err(format!("Invalid strength level: {s}")),
        }
    }
}

/// Per-run policy: the strength preset plus the global cache switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPolicy {
    /// Strength preset selecting the attempt budget
    pub strength: Strength,

    /// Global cache switch, independent of the preset
    pub cache_enabled: bool,
}

impl RunPolicy {
    /// Creates a policy with the cache enabled.
    pub fn new(strength: Strength) -> Self {
        Self {
            strength,
            cache_enabled: true,
        }
    }

    /// Disables cache lookups for the run.
    pub fn without_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    /// Rejects incompatible combinations before any step runs.
    ///
    /// `onlycache` promises zero generation calls, so running it with the
    /// cache disabled leaves no code source at all.
    pub fn validate(&self) -> Result<()> {
        if self.strength == Strength::OnlyCache && !self.cache_enabled {
            return Err(DroverError::ConflictingOptions {
                message: "strength 'onlycache' cannot be combined with the cache disabled"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Attempt budget for every step under this policy.
    pub fn max_attempts(&self) -> u32 {
        self.strength.max_attempts()
    }
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self::new(Strength::Medium)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_carry_the_documented_attempt_budgets() {
        assert_eq!(Strength::OnlyCache.max_attempts(), 1);
        assert_eq!(Strength::Medium.max_attempts(), 2);
        assert_eq!(Strength::High.max_attempts(), 3);
    }

    #[test]
    fn strength_round_trips_through_strings() {
        for strength in [Strength::OnlyCache, Strength::Medium, Strength::High] {
            assert_eq!(strength.as_str().parse::<Strength>(), Ok(strength));
        }
        assert!("extreme".parse::<Strength>().is_err());
    }

    #[test]
    fn onlycache_with_cache_disabled_is_rejected() {
        let policy = RunPolicy::new(Strength::OnlyCache).without_cache();
        let err = policy.validate().expect_err("conflict must be rejected");
        assert!(matches!(
            err,
            DroverError::ConflictingOptions { .. }
        ));
    }

    #[test]
    fn other_presets_accept_the_cache_switch() {
        assert!(RunPolicy::new(Strength::Medium).without_cache().validate().is_ok());
        assert!(RunPolicy::new(Strength::High).without_cache().validate().is_ok());
        assert!(RunPolicy::new(Strength::OnlyCache).validate().is_ok());
    }
}
