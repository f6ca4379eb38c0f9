//! The ProviderClient and ClientFactory trait definitions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::credentials::ProviderCredential;
use crate::error::ProviderError;
use crate::history::HistoryMessage;
use crate::provider::Provider;

/// A stateless adapter for one text-generation backend.
///
/// Each call issues exactly one request; retries, timeouts and fallback are
/// the orchestrator's job. This trait is object-safe and can be used with
/// `Arc<dyn ProviderClient>`.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Generate a completion for `prompt`, given prior conversation turns.
    ///
    /// # Arguments
    ///
    /// * `prompt` - The new user message.
    /// * `history` - Earlier turns, oldest first.
    async fn complete(
        &self,
        prompt: &str,
        history: &[HistoryMessage],
    ) -> Result<String, ProviderError>;

    /// The backend this client talks to.
    fn provider(&self) -> Provider;
}

/// Builds provider clients from credentials.
///
/// The orchestrator holds one factory and asks it for a client each time a
/// provider (or fallback substitute) is about to be called.
pub trait ClientFactory: Send + Sync {
    /// Build a client for `provider` using `credential`.
    fn client(
        &self,
        provider: Provider,
        credential: &ProviderCredential,
    ) -> Result<Arc<dyn ProviderClient>, ProviderError>;
}
