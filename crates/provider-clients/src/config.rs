//! Configuration for provider HTTP clients.

use std::time::Duration;

use provider_core::{Provider, ProviderCredential};

/// Default connect timeout for every provider.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a single provider client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Which backend this configuration targets.
    pub provider: Provider,

    /// Base API URL (no trailing slash).
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Optional system prompt.
    pub system_prompt: Option<String>,

    /// Maximum tokens for response.
    pub max_tokens: Option<u32>,

    /// Temperature for generation.
    pub temperature: Option<f32>,

    /// TCP connect timeout. The whole-call deadline is enforced by the orchestrator.
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Defaults for a provider, with an empty API key.
    pub fn defaults(provider: Provider) -> Self {
        let (api_url, model) = match provider {
            Provider::OpenAi => ("https://api.openai.com", "gpt-4o-mini"),
            Provider::Anthropic => ("https://api.anthropic.com", "claude-3-5-haiku-latest"),
            Provider::Gemini => (
                "https://generativelanguage.googleapis.com",
                "gemini-1.5-flash",
            ),
            Provider::Grok => ("https://api.x.ai", "grok-4-1-fast"),
        };

        Self {
            provider,
            api_url: api_url.to_string(),
            api_key: String::new(),
            model: model.to_string(),
            system_prompt: None,
            max_tokens: Some(1024),
            temperature: Some(0.7),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Build a configuration from a credential, applying its overrides.
    pub fn from_credential(provider: Provider, credential: &ProviderCredential) -> Self {
        let mut config = Self::defaults(provider);
        config.api_key = credential.api_key.clone();
        if let Some(url) = &credential.api_url {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = &credential.model {
            config.model = model.clone();
        }
        config
    }

    /// Create a new config builder for a provider.
    pub fn builder(provider: Provider) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::defaults(provider),
        }
    }
}

/// Builder for ClientConfig.
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
