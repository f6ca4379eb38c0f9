//! Flaky provider implementation - fails a few times, then recovers.

use async_trait::async_trait;
use provider_core::{HistoryMessage, Provider, ProviderClient, ProviderError};

use crate::counter::CallCounter;

/// A client that fails its first `failures` calls and echoes afterwards.
#[derive(Debug, Clone)]
pub struct FlakyProvider {
    provider: Provider,
    failures: usize,
    error: ProviderError,
    calls: CallCounter,
}

impl FlakyProvider {
    /// Fail the first `failures` calls with a rate-limit error.
    pub fn new(provider: Provider, failures: usize) -> Self {
        Self::with_error(
            provider,
            failures,
            ProviderError::RateLimited("slow down".to_string()),
        )
    }

    /// Fail the first `failures` calls with `error`.
    pub fn with_error(provider: Provider, failures: usize, error: ProviderError) -> Self {
        Self {
            provider,
            failures,
            error,
            calls: CallCounter::new(),
        }
    }

    /// Calls made so far.
    pub fn calls(&self) -> &CallCounter {
        &self.calls
    }
}

#[async_trait]
impl ProviderClient for FlakyProvider {
    async fn complete(
        &self,
        prompt: &str,
        _history: &[HistoryMessage],
    ) -> Result<String, ProviderError> {
        let previous = self.calls.hit();
        if previous < self.failures {
            Err(self.error.clone())
        } else {
            Ok(prompt.to_string())
        }
    }

    fn provider(&self) -> Provider {
        self.provider
    }
}
