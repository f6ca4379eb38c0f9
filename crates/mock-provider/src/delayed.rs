//! Delayed provider implementation - wraps another client with artificial delay.

use std::time::Duration;

use async_trait::async_trait;
use provider_core::{HistoryMessage, Provider, ProviderClient, ProviderError};
use tokio::time::sleep;

/// A client that wraps another client and adds artificial delay.
///
/// Useful for testing timeout handling and concurrent dispatch.
pub struct DelayedProvider<C: ProviderClient> {
    inner: C,
    delay: Duration,
}

impl<C: ProviderClient> DelayedProvider<C> {
    /// Create a new DelayedProvider wrapping the given client with the specified delay.
    pub fn new(inner: C, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a client with a delay in milliseconds.
    pub fn with_millis(inner: C, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Create a client with a delay in seconds.
    pub fn with_secs(inner: C, secs: u64) -> Self {
        Self::new(inner, Duration::from_secs(secs))
    }
}

#[async_trait]
impl<C: ProviderClient> ProviderClient for DelayedProvider<C> {
    async fn complete(
        &self,
        prompt: &str,
        history: &[HistoryMessage],
    ) -> Result<String, ProviderError> {
        sleep(self.delay).await;
        self.inner.complete(prompt, history).await
    }

    fn provider(&self) -> Provider {
        self.inner.provider()
    }
}
