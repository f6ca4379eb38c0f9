//! Fan-out dispatch to every enabled provider.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use provider_clients::HttpClientFactory;
use provider_core::{
    ClientFactory, Credentials, HistoryMessage, Provider, ProviderError, ProviderOutcome,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::circuit_breaker::CircuitBreakerRegistry;
use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::fallback::FallbackRouter;
use crate::retry::RetryExecutor;

/// Outcome text for a chain stopped by cancellation.
pub const CANCELLED_TEXT: &str = "cancelled";

/// Sends one message to several providers at once.
///
/// Each enabled provider runs in its own task: retry, then fallback through
/// healthy substitutes, then a degraded outcome if everything failed. One
/// provider's failure or panic never affects another's outcome. This is the
/// only place retry, fallback and circuit-breaker logic is driven from.
pub struct Orchestrator {
    factory: Arc<dyn ClientFactory>,
    breakers: Arc<CircuitBreakerRegistry>,
    retry: RetryExecutor,
    router: FallbackRouter,
}

impl Orchestrator {
    /// Create an orchestrator around an explicit breaker registry.
    ///
    /// The registry's own thresholds are used; `config` supplies retry and
    /// timeout settings.
    pub fn new(
        factory: Arc<dyn ClientFactory>,
        breakers: Arc<CircuitBreakerRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        let retry = RetryExecutor::new(breakers.clone(), config.retry, config.call_timeout);
        let router = FallbackRouter::new(breakers.clone());
        Self {
            factory,
            breakers,
            retry,
            router,
        }
    }

    /// Create an orchestrator with HTTP clients and a fresh breaker registry.
    pub fn with_config(config: OrchestratorConfig) -> Result<Self, OrchestratorError> {
        let factory = HttpClientFactory::new()?;
        let breakers = Arc::new(CircuitBreakerRegistry::new(config.circuit_breaker.clone()));
        Ok(Self::new(Arc::new(factory), breakers, config))
    }

    /// Create an orchestrator configured from `FANOUT_*` environment variables.
    pub fn from_env() -> Result<Self, OrchestratorError> {
        Self::with_config(OrchestratorConfig::from_env())
    }

    /// The shared circuit breaker registry.
    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.breakers
    }

    /// Dispatch `message` to every enabled provider that has credentials.
    ///
    /// Returns one outcome per such provider, in no particular order. Enabled
    /// providers without credentials are skipped and get no outcome.
    pub async fn dispatch(
        &self,
        message: &str,
        history: &[HistoryMessage],
        enabled: &[Provider],
        credentials: &Credentials,
    ) -> Vec<ProviderOutcome> {
        self.dispatch_with_cancel(message, history, enabled, credentials, CancellationToken::new())
            .await
    }

    /// Like [`dispatch`](Self::dispatch), but stops retrying and falling back
    /// once `cancel` fires. Chains stopped that way yield a degraded outcome
    /// with the text `"cancelled"`.
    pub async fn dispatch_with_cancel(
        &self,
        message: &str,
        history: &[HistoryMessage],
        enabled: &[Provider],
        credentials: &Credentials,
        cancel: CancellationToken,
    ) -> Vec<ProviderOutcome> {
        let mut providers = Vec::new();
        for provider in enabled {
            if providers.contains(provider) {
                continue;
            }
            if !credentials.has(*provider) {
                warn!(provider = %provider, "Provider enabled but has no credentials, skipping");
                continue;
            }
            providers.push(*provider);
        }

        info!(providers = ?providers, "Dispatching message");
        let started = Instant::now();

        let chain = Chain {
            factory: self.factory.clone(),
            retry: self.retry.clone(),
            router: self.router.clone(),
            credentials: Arc::new(credentials.clone()),
            message: Arc::from(message),
            history: Arc::from(history),
            cancel,
        };

        let handles: Vec<_> = providers
            .iter()
            .map(|provider| tokio::spawn(chain.clone().run(*provider)))
            .collect();

        let outcomes: Vec<ProviderOutcome> = join_all(handles)
            .await
            .into_iter()
            .zip(&providers)
            .map(|(joined, provider)| match joined {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    error!(provider = %provider, "Provider task failed: {}", join_error);
                    ProviderOutcome::failed(
                        *provider,
                        format!("{} task failed: {}", provider, join_error),
                    )
                }
            })
            .collect();

        info!(
            outcomes = outcomes.len(),
            degraded = outcomes.iter().filter(|o| o.degraded).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dispatch finished"
        );
        outcomes
    }
}

/// Everything one provider's task needs, cheaply cloneable.
#[derive(Clone)]
struct Chain {
    factory: Arc<dyn ClientFactory>,
    retry: RetryExecutor,
    router: FallbackRouter,
    credentials: Arc<Credentials>,
    message: Arc<str>,
    history: Arc<[HistoryMessage]>,
    cancel: CancellationToken,
}

impl Chain {
    /// Try `requested`, then substitutes, until something answers or nothing
    /// eligible is left. Each provider is tried at most once per chain.
    async fn run(self, requested: Provider) -> ProviderOutcome {
        let started = Instant::now();
        let mut tried = HashSet::new();
        let mut current = requested;

        loop {
            tried.insert(current);

            let error = match self.call(current).await {
                Ok(content) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    if current == requested {
                        debug!(provider = %requested, elapsed_ms, "Provider answered");
                        return ProviderOutcome::success(requested, content);
                    }
                    info!(
                        provider = %requested,
                        substitute = %current,
                        elapsed_ms,
                        "Fallback provider answered"
                    );
                    return ProviderOutcome::fallback(requested, current, content);
                }
                Err(OrchestratorError::Cancelled) => {
                    info!(provider = %requested, "Dispatch cancelled");
                    return ProviderOutcome::failed(requested, CANCELLED_TEXT);
                }
                Err(error) => error,
            };

            if self.cancel.is_cancelled() {
                info!(provider = %requested, "Dispatch cancelled before fallback");
                return ProviderOutcome::failed(requested, CANCELLED_TEXT);
            }

            let candidates: Vec<Provider> = self
                .credentials
                .available()
                .into_iter()
                .filter(|p| !tried.contains(p))
                .collect();

            match self.router.next_fallback(current, &candidates).await {
                Some(next) => {
                    warn!(
                        provider = %requested,
                        failed = %current,
                        fallback = %next,
                        "Provider failed, falling back: {}",
                        error
                    );
                    current = next;
                }
                None => {
                    warn!(
                        provider = %requested,
                        failed = %current,
                        "No fallback available: {}",
                        error
                    );
                    return ProviderOutcome::failed(requested, error.to_string());
                }
            }
        }
    }

    async fn call(&self, provider: Provider) -> Result<String, OrchestratorError> {
        let credential = self.credentials.get(provider).ok_or_else(|| {
            ProviderError::Configuration(format!("no credentials for {}", provider))
        })?;
        let client = self.factory.client(provider, credential)?;

        self.retry
            .execute_with_cancel(provider, &self.cancel, || {
                client.complete(&self.message, &self.history)
            })
            .await
    }
}
