//! Per-provider results of a fan-out dispatch.

use serde::{Deserialize, Serialize};

use crate::provider::Provider;

/// The result for one requested provider slot.
///
/// Exactly one outcome is produced per dispatched provider. Outcomes carry
/// no ordering guarantee: match them to slots by [`provider`](Self::provider).
///
/// | Case | `degraded` | `substitute` | `error` |
/// |---|---|---|---|
/// | Requested provider answered | `false` | `None` | `None` |
/// | A fallback provider answered | `true` | `Some(..)` | `None` |
/// | Everything failed | `true` | `None` | `Some(..)` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOutcome {
    /// The provider that was requested (the slot key).
    pub provider: Provider,
    /// Response text, or the terminal error text on failure.
    pub content: String,
    /// Whether the response did not come from the requested provider.
    pub degraded: bool,
    /// The fallback provider that actually produced `content`.
    pub substitute: Option<Provider>,
    /// Terminal error text when no provider produced a response.
    pub error: Option<String>,
}

impl ProviderOutcome {
    /// The requested provider answered.
    pub fn success(provider: Provider, content: impl Into<String>) -> Self {
        Self {
            provider,
            content: content.into(),
            degraded: false,
            substitute: None,
            error: None,
        }
    }

    /// A fallback provider answered on behalf of `requested`.
    pub fn fallback(requested: Provider, substitute: Provider, content: impl Into<String>) -> Self {
        Self {
            provider: requested,
            content: content.into(),
            degraded: true,
            substitute: Some(substitute),
            error: None,
        }
    }

    /// Neither the requested provider nor any substitute answered.
    pub fn failed(requested: Provider, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            provider: requested,
            content: error.clone(),
            degraded: true,
            substitute: None,
            error: Some(error),
        }
    }

    /// The provider whose text is in `content`, if any.
    pub fn served_by(&self) -> Option<Provider> {
        if self.error.is_some() {
            None
        } else {
            Some(self.substitute.unwrap_or(self.provider))
        }
    }

    /// The originally requested provider, when the outcome is degraded.
    pub fn originating_provider(&self) -> Option<Provider> {
        self.degraded.then_some(self.provider)
    }

    /// Whether this outcome carries a usable response.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_outcome() {
        let outcome = ProviderOutcome::success(Provider::OpenAi, "hi");
        assert!(!outcome.degraded);
        assert!(outcome.is_success());
        assert_eq!(outcome.served_by(), Some(Provider::OpenAi));
        assert_eq!(outcome.originating_provider(), None);
    }

    #[test]
    fn test_fallback_outcome() {
        let outcome = ProviderOutcome::fallback(Provider::Gemini, Provider::OpenAi, "hi");
        assert!(outcome.degraded);
        assert!(outcome.is_success());
        assert_eq!(outcome.provider, Provider::Gemini);
        assert_eq!(outcome.served_by(), Some(Provider::OpenAi));
        assert_eq!(outcome.originating_provider(), Some(Provider::Gemini));
    }

    #[test]
    fn test_failed_outcome() {
        let outcome = ProviderOutcome::failed(Provider::Grok, "request timed out");
        assert!(outcome.degraded);
        assert!(!outcome.is_success());
        assert_eq!(outcome.served_by(), None);
        assert_eq!(outcome.content, "request timed out");
    }
}
