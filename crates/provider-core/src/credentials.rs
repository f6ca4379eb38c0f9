//! Per-provider credentials.
//!
//! A provider without a configured API key is treated as unavailable: it is
//! skipped by dispatch and never chosen as a fallback substitute.

use std::collections::BTreeMap;
use std::env;
use std::fmt;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::provider::Provider;

/// API key and optional endpoint overrides for one provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    /// API key for authentication.
    pub api_key: String,
    /// Override for the provider's base URL.
    pub api_url: Option<String>,
    /// Override for the provider's default model.
    pub model: Option<String>,
}

impl ProviderCredential {
    /// Create a credential with just an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: None,
            model: None,
        }
    }

    /// Set the base URL override.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set the model override.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

// Keys must never end up in logs.
impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

/// The set of configured provider credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    entries: BTreeMap<Provider, ProviderCredential>,
}

impl Credentials {
    /// Create an empty credential set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a credential, builder style. Blank keys are ignored.
    pub fn with(mut self, provider: Provider, credential: ProviderCredential) -> Self {
        self.insert(provider, credential);
        self
    }

    /// Add or replace a credential. Blank keys are ignored.
    pub fn insert(&mut self, provider: Provider, credential: ProviderCredential) {
        if credential.api_key.trim().is_empty() {
            return;
        }
        self.entries.insert(provider, credential);
    }

    /// Remove a provider's credential.
    pub fn remove(&mut self, provider: Provider) {
        self.entries.remove(&provider);
    }

    /// Get the credential for a provider.
    pub fn get(&self, provider: Provider) -> Option<&ProviderCredential> {
        self.entries.get(&provider)
    }

    /// Whether the provider has a usable credential.
    pub fn has(&self, provider: Provider) -> bool {
        self.entries.contains_key(&provider)
    }

    /// Providers with credentials, in declaration order.
    pub fn available(&self) -> Vec<Provider> {
        self.entries.keys().copied().collect()
    }

    /// Number of configured providers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no provider is configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load credentials from environment variables.
    ///
    /// For each provider, reads:
    /// - `<PREFIX>_API_KEY` - API key (provider skipped when unset or blank)
    /// - `<PREFIX>_API_URL` - Optional base URL override
    /// - `<PREFIX>_MODEL` - Optional model override
    ///
    /// where `<PREFIX>` is `OPENAI`, `ANTHROPIC`, `GEMINI` or `GROK`.
    pub fn from_env() -> Self {
        let mut credentials = Self::new();

        for provider in Provider::ALL {
            let prefix = provider.env_prefix();
            let Ok(api_key) = env::var(format!("{}_API_KEY", prefix)) else {
                continue;
            };

            let mut credential = ProviderCredential::new(api_key);
            credential.api_url = non_blank(env::var(format!("{}_API_URL", prefix)).ok());
            credential.model = non_blank(env::var(format!("{}_MODEL", prefix)).ok());
            credentials.insert(provider, credential);
        }

        credentials
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Source of provider credentials.
///
/// Implemented by whatever owns the user's settings; the core only reads.
#[async_trait]
pub trait CredentialsSource: Send + Sync {
    /// Load the current credential set.
    async fn credentials(&self) -> Result<Credentials, ProviderError>;
}

/// Credentials read from the process environment on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

#[async_trait]
impl CredentialsSource for EnvCredentials {
    async fn credentials(&self) -> Result<Credentials, ProviderError> {
        Ok(Credentials::from_env())
    }
}

#[async_trait]
impl CredentialsSource for Credentials {
    async fn credentials(&self) -> Result<Credentials, ProviderError> {
        Ok(self.clone())
    }
}
