//! Static fallback hierarchy.

use std::sync::Arc;

use provider_core::Provider;

use crate::circuit_breaker::CircuitBreakerRegistry;

/// Preferred substitutes for `provider`, best first.
pub fn fallback_order(provider: Provider) -> [Provider; 3] {
    match provider {
        Provider::OpenAi => [Provider::Anthropic, Provider::Grok, Provider::Gemini],
        Provider::Anthropic => [Provider::OpenAi, Provider::Gemini, Provider::Grok],
        Provider::Gemini => [Provider::OpenAi, Provider::Anthropic, Provider::Grok],
        Provider::Grok => [Provider::OpenAi, Provider::Anthropic, Provider::Gemini],
    }
}

/// Picks a substitute for a provider that failed.
#[derive(Debug, Clone)]
pub struct FallbackRouter {
    breakers: Arc<CircuitBreakerRegistry>,
}

impl FallbackRouter {
    pub fn new(breakers: Arc<CircuitBreakerRegistry>) -> Self {
        Self { breakers }
    }

    /// First provider in `failed`'s preference list that is in `available`
    /// and whose circuit currently allows an attempt.
    ///
    /// Callers remove providers already tried in this chain from `available`.
    pub async fn next_fallback(&self, failed: Provider, available: &[Provider]) -> Option<Provider> {
        for candidate in fallback_order(failed) {
            if !available.contains(&candidate) {
                continue;
            }
            if self.breakers.may_attempt(candidate).await {
                return Some(candidate);
            }
        }
        None
    }
}
