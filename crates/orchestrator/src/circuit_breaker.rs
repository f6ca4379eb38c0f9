//! Per-provider circuit breakers.
//!
//! ```text
//!   CLOSED ──(threshold consecutive failures)──► OPEN
//!     ▲                                           │
//!     │                              (cooldown elapsed, checked
//!     │                               by may_attempt)
//!  success                                        ▼
//!     └──────────────────────────────────────  HALF_OPEN
//!                                                 │
//!                         failure ────────────────┘ back to OPEN
//! ```

use std::collections::HashMap;
use std::fmt;

use provider_core::Provider;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::CircuitBreakerConfig;

/// Circuit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
            Self::HalfOpen => "HALF_OPEN",
        })
    }
}

/// Failure tracking for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerState {
    pub provider: Provider,
    pub consecutive_failures: u32,
    pub last_failure: Option<Instant>,
    pub state: CircuitState,
}

impl CircuitBreakerState {
    fn closed(provider: Provider) -> Self {
        Self {
            provider,
            consecutive_failures: 0,
            last_failure: None,
            state: CircuitState::Closed,
        }
    }
}

/// Circuit breakers for every provider, created lazily on first use.
///
/// Construct one per process (or per test) and share it with an `Arc`.
/// Half-open probes are not serialized: concurrent callers may all probe.
#[derive(Debug)]
pub struct CircuitBreakerRegistry {
    config: CircuitBreakerConfig,
    states: Mutex<HashMap<Provider, CircuitBreakerState>>,
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreakerRegistry {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            states: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Whether a call to `provider` may be attempted now.
    ///
    /// An open circuit whose cooldown has passed since the last failure moves
    /// to half-open here and allows the call.
    pub async fn may_attempt(&self, provider: Provider) -> bool {
        let mut states = self.states.lock().await;
        let breaker = states
            .entry(provider)
            .or_insert_with(|| CircuitBreakerState::closed(provider));

        match breaker.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooled = breaker
                    .last_failure
                    .map_or(true, |at| at.elapsed() > self.config.cooldown);
                if cooled {
                    breaker.state = CircuitState::HalfOpen;
                    info!(provider = %provider, "Circuit half-open, allowing probe");
                }
                cooled
            }
        }
    }

    /// Reset `provider` to closed with no failures.
    pub async fn record_success(&self, provider: Provider) {
        let mut states = self.states.lock().await;
        let breaker = states
            .entry(provider)
            .or_insert_with(|| CircuitBreakerState::closed(provider));

        if breaker.state != CircuitState::Closed {
            info!(provider = %provider, from = %breaker.state, "Circuit closed");
        }
        breaker.consecutive_failures = 0;
        breaker.state = CircuitState::Closed;
    }

    /// Count a failure for `provider`, opening the circuit at the threshold.
    ///
    /// A failed half-open probe always reopens the circuit. Returns the state
    /// after the failure is counted.
    pub async fn record_failure(&self, provider: Provider) -> CircuitState {
        let mut states = self.states.lock().await;
        let breaker = states
            .entry(provider)
            .or_insert_with(|| CircuitBreakerState::closed(provider));

        breaker.consecutive_failures = breaker.consecutive_failures.saturating_add(1);
        breaker.last_failure = Some(Instant::now());

        let should_open = breaker.state == CircuitState::HalfOpen
            || breaker.consecutive_failures >= self.config.failure_threshold;
        if should_open && breaker.state != CircuitState::Open {
            warn!(
                provider = %provider,
                failures = breaker.consecutive_failures,
                cooldown_secs = self.config.cooldown.as_secs(),
                "Circuit opened"
            );
        }
        if should_open {
            breaker.state = CircuitState::Open;
        }
        breaker.state
    }

    /// Current state of `provider`'s breaker (closed if never used).
    pub async fn snapshot(&self, provider: Provider) -> CircuitBreakerState {
        self.states
            .lock()
            .await
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| CircuitBreakerState::closed(provider))
    }

    /// Forget everything about `provider`.
    pub async fn reset(&self, provider: Provider) {
        self.states.lock().await.remove(&provider);
    }

    /// Forget everything about every provider.
    pub async fn reset_all(&self) {
        self.states.lock().await.clear();
    }
}
