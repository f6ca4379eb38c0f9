//! Providers that never succeed.

use async_trait::async_trait;
use provider_core::{HistoryMessage, Provider, ProviderClient, ProviderError};

use crate::counter::CallCounter;

/// A client that always returns the same error.
#[derive(Debug, Clone)]
pub struct FailingProvider {
    provider: Provider,
    error: ProviderError,
    calls: CallCounter,
}

impl FailingProvider {
    /// Create a client that always fails with `error`.
    pub fn new(provider: Provider, error: ProviderError) -> Self {
        Self {
            provider,
            error,
            calls: CallCounter::new(),
        }
    }

    /// A client that always fails with a 500 API error.
    pub fn server_error(provider: Provider) -> Self {
        Self::new(
            provider,
            ProviderError::ProviderApi {
                status: 500,
                message: format!("{} is down", provider),
            },
        )
    }

    /// Calls made so far.
    pub fn calls(&self) -> &CallCounter {
        &self.calls
    }
}

#[async_trait]
impl ProviderClient for FailingProvider {
    async fn complete(
        &self,
        _prompt: &str,
        _history: &[HistoryMessage],
    ) -> Result<String, ProviderError> {
        self.calls.hit();
        Err(self.error.clone())
    }

    fn provider(&self) -> Provider {
        self.provider
    }
}

/// A client whose every call panics.
///
/// Used to check that a crashing adapter cannot take down other providers.
#[derive(Debug, Clone)]
pub struct PanickingProvider {
    provider: Provider,
}

impl PanickingProvider {
    /// Create a panicking client.
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ProviderClient for PanickingProvider {
    async fn complete(
        &self,
        _prompt: &str,
        _history: &[HistoryMessage],
    ) -> Result<String, ProviderError> {
        panic!("{} adapter panicked", self.provider);
    }

    fn provider(&self) -> Provider {
        self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_fails() {
        let client = FailingProvider::new(Provider::Gemini, ProviderError::Timeout);
        for _ in 0..3 {
            assert_eq!(client.complete("x", &[]).await, Err(ProviderError::Timeout));
        }
        assert_eq!(client.calls().get(), 3);
    }

    #[tokio::test]
    async fn test_server_error() {
        let client = FailingProvider::server_error(Provider::Grok);
        let err = client.complete("x", &[]).await.unwrap_err();
        assert!(matches!(err, ProviderError::ProviderApi { status: 500, .. }));
    }
}
