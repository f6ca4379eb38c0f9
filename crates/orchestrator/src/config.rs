//! Resilience configuration: circuit breaker, retry and per-call timeout.

use std::env;
use std::time::Duration;

/// Circuit breaker thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// How long an open circuit blocks calls after the last failure.
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(30),
        }
    }
}

impl CircuitBreakerConfig {
    /// Load from `FANOUT_FAILURE_THRESHOLD` and `FANOUT_COOLDOWN_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(value) = env_u64("FANOUT_FAILURE_THRESHOLD") {
            config.failure_threshold = value.clamp(1, u64::from(u32::MAX)) as u32;
        }
        if let Some(value) = env_u64("FANOUT_COOLDOWN_SECS") {
            config.cooldown = Duration::from_secs(value);
        }
        config
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    /// Load from `FANOUT_MAX_RETRIES`, `FANOUT_BASE_DELAY_MS` and
    /// `FANOUT_MAX_DELAY_MS`.
    pub fn from_env() -> Self {
        let mut policy = Self::default();
        if let Some(value) = env_u64("FANOUT_MAX_RETRIES") {
            policy.max_retries = value.min(u64::from(u32::MAX)) as u32;
        }
        if let Some(value) = env_u64("FANOUT_BASE_DELAY_MS") {
            policy.base_delay = Duration::from_millis(value);
        }
        if let Some(value) = env_u64("FANOUT_MAX_DELAY_MS") {
            policy.max_delay = Duration::from_millis(value);
        }
        policy
    }

    /// No retries and no delay.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Total attempts, including the first.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff after the zero-based `attempt` failed:
    /// `min(base_delay * 2^attempt, max_delay)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Everything the orchestrator needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub circuit_breaker: CircuitBreakerConfig,
    pub retry: RetryPolicy,
    /// Deadline for a single provider call.
    pub call_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            circuit_breaker: CircuitBreakerConfig::default(),
            retry: RetryPolicy::default(),
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl OrchestratorConfig {
    /// Load every `FANOUT_*` setting from the environment.
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self {
            circuit_breaker: CircuitBreakerConfig::from_env(),
            retry: RetryPolicy::from_env(),
            ..Self::default()
        };
        if let Some(value) = env_u64("FANOUT_CALL_TIMEOUT_SECS") {
            config.call_timeout = Duration::from_secs(value);
        }
        config
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok()?.trim().parse().ok()
}
