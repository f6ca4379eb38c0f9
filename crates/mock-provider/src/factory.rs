//! Factory handing out pre-registered mock clients.

use std::collections::HashMap;
use std::sync::Arc;

use provider_core::{ClientFactory, Provider, ProviderClient, ProviderCredential, ProviderError};

use crate::counter::CallCounter;

/// A [`ClientFactory`] that returns whichever client was registered for a
/// provider, ignoring the credential.
///
/// Asking for an unregistered provider yields a configuration error.
#[derive(Default, Clone)]
pub struct MockClientFactory {
    clients: HashMap<Provider, Arc<dyn ProviderClient>>,
    builds: CallCounter,
}

impl MockClientFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` for its own provider.
    pub fn with(self, client: impl ProviderClient + 'static) -> Self {
        let provider = client.provider();
        self.with_for(provider, Arc::new(client))
    }

    /// Register `client` under `provider`, whatever the client reports.
    pub fn with_for(mut self, provider: Provider, client: Arc<dyn ProviderClient>) -> Self {
        self.clients.insert(provider, client);
        self
    }

    /// Number of clients handed out so far.
    pub fn builds(&self) -> &CallCounter {
        &self.builds
    }
}

impl ClientFactory for MockClientFactory {
    fn client(
        &self,
        provider: Provider,
        _credential: &ProviderCredential,
    ) -> Result<Arc<dyn ProviderClient>, ProviderError> {
        self.builds.hit();
        self.clients.get(&provider).cloned().ok_or_else(|| {
            ProviderError::Configuration(format!("no mock client registered for {}", provider))
        })
    }
}
