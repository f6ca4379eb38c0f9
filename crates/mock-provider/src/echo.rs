//! Echo provider implementation - echoes prompts back.

use async_trait::async_trait;
use provider_core::{HistoryMessage, Provider, ProviderClient, ProviderError};

use crate::counter::CallCounter;

/// A client that echoes the prompt back, optionally with a prefix.
///
/// Useful for testing the dispatch flow without any network access.
#[derive(Debug, Clone)]
pub struct EchoProvider {
    provider: Provider,
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
    calls: CallCounter,
}

impl EchoProvider {
    /// Create a new EchoProvider with no prefix.
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            prefix: None,
            calls: CallCounter::new(),
        }
    }

    /// Create a new EchoProvider with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_provider::{EchoProvider, Provider};
    ///
    /// let client = EchoProvider::with_prefix(Provider::Grok, "grok: ");
    /// // Will respond with "grok: <prompt>"
    /// ```
    pub fn with_prefix(provider: Provider, prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::new(provider)
        }
    }

    /// Calls made so far.
    pub fn calls(&self) -> &CallCounter {
        &self.calls
    }
}

#[async_trait]
impl ProviderClient for EchoProvider {
    async fn complete(
        &self,
        prompt: &str,
        _history: &[HistoryMessage],
    ) -> Result<String, ProviderError> {
        self.calls.hit();
        Ok(match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, prompt),
            None => prompt.to_string(),
        })
    }

    fn provider(&self) -> Provider {
        self.provider
    }
}
