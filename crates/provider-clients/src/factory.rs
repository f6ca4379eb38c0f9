//! Builds HTTP provider clients from credentials.

use std::sync::Arc;

use provider_core::{ClientFactory, Provider, ProviderClient, ProviderCredential, ProviderError};
use reqwest::Client;

use crate::anthropic::AnthropicClient;
use crate::chat_completions::ChatCompletionsClient;
use crate::config::ClientConfig;
use crate::gemini::GeminiClient;

/// Creates real HTTP clients that share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    client: Client,
    system_prompt: Option<String>,
}

impl HttpClientFactory {
    /// Create a factory with a fresh connection pool.
    pub fn new() -> Result<Self, ProviderError> {
        let defaults = ClientConfig::defaults(Provider::OpenAi);
        let client = Client::builder()
            .connect_timeout(defaults.connect_timeout)
            .build()
            .map_err(|e| ProviderError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            system_prompt: None,
        })
    }

    /// Apply the same system prompt to every client built.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

impl ClientFactory for HttpClientFactory {
    fn client(
        &self,
        provider: Provider,
        credential: &ProviderCredential,
    ) -> Result<Arc<dyn ProviderClient>, ProviderError> {
        let mut config = ClientConfig::from_credential(provider, credential);
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Configuration(format!(
                "no API key configured for {}",
                provider
            )));
        }
        config.system_prompt = self.system_prompt.clone();

        let client = self.client.clone();
        let built: Arc<dyn ProviderClient> = match provider {
            Provider::OpenAi | Provider::Grok => {
                Arc::new(ChatCompletionsClient::with_client(client, config))
            }
            Provider::Anthropic => Arc::new(AnthropicClient::with_client(client, config)),
            Provider::Gemini => Arc::new(GeminiClient::with_client(client, config)),
        };

        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_matching_provider() {
        let factory = HttpClientFactory::new().unwrap();
        let credential = ProviderCredential::new("key");

        for provider in Provider::ALL {
            let client = factory.client(provider, &credential).unwrap();
            assert_eq!(client.provider(), provider);
        }
    }

    #[test]
    fn test_blank_key_rejected() {
        let factory = HttpClientFactory::new().unwrap();
        let result = factory.client(Provider::Gemini, &ProviderCredential::new(""));
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }
}
