//! Bounded retry with exponential backoff, gated by the circuit breaker.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use provider_core::{Provider, ProviderError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::circuit_breaker::{CircuitBreakerRegistry, CircuitState};
use crate::config::RetryPolicy;
use crate::error::OrchestratorError;

/// A failed attempt, as logged.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryAttempt {
    /// Zero-based attempt index.
    pub attempt: u32,
    /// Backoff before the next attempt, if there is one.
    pub delay: Option<Duration>,
    pub error: ProviderError,
}

/// Runs one provider call with retries.
///
/// This is the only place retries happen. Before every attempt the circuit
/// breaker is consulted; every outcome is reported back to it.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    breakers: Arc<CircuitBreakerRegistry>,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl RetryExecutor {
    pub fn new(
        breakers: Arc<CircuitBreakerRegistry>,
        policy: RetryPolicy,
        call_timeout: Duration,
    ) -> Self {
        Self {
            breakers,
            policy,
            call_timeout,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` against `provider` with no cancellation.
    pub async fn execute<T, F, Fut>(
        &self,
        provider: Provider,
        operation: F,
    ) -> Result<T, OrchestratorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        self.execute_with_cancel(provider, &CancellationToken::new(), operation)
            .await
    }

    /// Run `operation` against `provider`, up to `max_retries + 1` times.
    ///
    /// Fails immediately with [`ProviderError::CircuitOpen`] when the breaker
    /// refuses the first attempt, and with [`OrchestratorError::Cancelled`]
    /// when `cancel` fires between attempts or during a backoff. Once a call
    /// has been made, the provider's last error is what comes back: when
    /// attempts run out, on a non-retryable error, or when the circuit opens.
    pub async fn execute_with_cancel<T, F, Fut>(
        &self,
        provider: Provider,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Result<T, OrchestratorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let attempts = self.policy.attempts();
        let mut last_error = None;

        for attempt in 0..attempts {
            if cancel.is_cancelled() {
                return Err(OrchestratorError::Cancelled);
            }
            if !self.breakers.may_attempt(provider).await {
                debug!(provider = %provider, attempt, "Circuit open, not attempting");
                let error = last_error.unwrap_or(ProviderError::CircuitOpen(provider));
                return Err(error.into());
            }

            let result = tokio::time::timeout(self.call_timeout, operation())
                .await
                .unwrap_or(Err(ProviderError::Timeout));

            let error = match result {
                Ok(value) => {
                    self.breakers.record_success(provider).await;
                    if attempt > 0 {
                        debug!(provider = %provider, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            let state = self.breakers.record_failure(provider).await;

            let retryable = error.is_retryable();
            let has_next = attempt + 1 < attempts && state != CircuitState::Open;
            let record = RetryAttempt {
                attempt,
                delay: (retryable && has_next).then(|| self.policy.delay_for(attempt)),
                error,
            };
            warn!(
                provider = %provider,
                attempt = record.attempt,
                kind = record.error.kind(),
                delay_ms = record.delay.map(|d| d.as_millis() as u64),
                "Provider call failed: {}",
                record.error
            );

            if !retryable || !has_next {
                return Err(record.error.into());
            }

            if let Some(delay) = record.delay {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => return Err(OrchestratorError::Cancelled),
                }
            }
            last_error = Some(record.error);
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::Unknown("no attempts were made".to_string()))
            .into())
    }
}
