//! Retry policy and backoff state machine for source fetches.
//!
//! The state machine is a pure value transition, so retry behavior is
//! testable without a clock: the orchestrator owns the actual sleeping and
//! simply follows the delays the transitions hand back.

use std::time::Duration;

use comp_scout_source::SourceError;

/// Retry budget for one source fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total fetch attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
    /// Ceiling on any single backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Returns the backoff delay after `failed_attempts` failures:
    /// `base_delay * 2^(failed_attempts - 1)`, capped at `max_delay`.
    #[must_use]
    pub fn backoff_delay(&self, failed_attempts: u32) -> Duration {
        // Cap the exponent; delays saturate at max_delay long before 2^16.
        let exponent = failed_attempts.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(1 << exponent);
        delay.min(self.max_delay)
    }

    /// Upper bound on wall-clock time one source can consume: every backoff
    /// delay plus a fetch allowance per attempt. The orchestrator enforces
    /// this as a hard deadline so one stuck source cannot stall a run.
    #[must_use]
    pub fn deadline(&self, fetch_allowance: Duration) -> Duration {
        let mut total = fetch_allowance.saturating_mul(self.max_attempts);
        for failed in 1..self.max_attempts {
            total = total.saturating_add(self.backoff_delay(failed));
        }
        total
    }
}

/// Where a source fetch stands in its retry lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState {
    /// First attempt not yet resolved.
    Pending,
    /// A transient failure occurred; attempt `attempt` runs after `delay`.
    Retrying {
        /// Attempt number of the upcoming fetch (2-based: the first retry
        /// is attempt 2).
        attempt: u32,
        /// Backoff delay to wait before that attempt.
        delay: Duration,
    },
    /// A fetch attempt returned data.
    Succeeded,
    /// The source gave up: non-transient error or retry budget exhausted.
    Failed {
        /// Description of the final error.
        reason: String,
    },
}

impl RetryState {
    /// Attempt number of the fetch currently in flight.
    #[must_use]
    pub const fn current_attempt(&self) -> u32 {
        match self {
            Self::Pending => 1,
            Self::Retrying { attempt, .. } => *attempt,
            Self::Succeeded | Self::Failed { .. } => 0,
        }
    }

    /// Transition after the in-flight attempt failed with `error`.
    ///
    /// Non-transient errors fail immediately. Transient errors retry with
    /// exponential backoff until the policy's attempt budget is spent; a
    /// rate-limit `retry_after` hint overrides the computed delay when it
    /// is larger. Terminal states transition to themselves.
    #[must_use]
    pub fn after_failure(&self, policy: &RetryPolicy, error: &SourceError) -> Self {
        let failed_attempts = match self {
            Self::Pending | Self::Retrying { .. } => self.current_attempt(),
            Self::Succeeded | Self::Failed { .. } => return self.clone(),
        };

        if !error.is_transient() || failed_attempts >= policy.max_attempts {
            return Self::Failed {
                reason: error.to_string(),
            };
        }

        let mut delay = policy.backoff_delay(failed_attempts);
        if let SourceError::RateLimited {
            retry_after: Some(hint),
        } = error
        {
            delay = delay.max(*hint);
        }

        Self::Retrying {
            attempt: failed_attempts + 1,
            delay,
        }
    }
}
