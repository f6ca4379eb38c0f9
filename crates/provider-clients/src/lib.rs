//! HTTP adapters for the supported text-generation providers.
//!
//! Every adapter implements [`ProviderClient`] and issues exactly one
//! request per call; retries, timeouts and fallback live in the
//! `orchestrator` crate.
//!
//! | Provider | Adapter | Endpoint |
//! |---|---|---|
//! | OpenAI | [`ChatCompletionsClient`] | `/v1/chat/completions` |
//! | Grok | [`ChatCompletionsClient`] | `/v1/chat/completions` (xAI) |
//! | Anthropic | [`AnthropicClient`] | `/v1/messages` |
//! | Gemini | [`GeminiClient`] | `/v1beta/models/{model}:generateContent` |
//!
//! [`OpenAiEmbedder`] wraps `/v1/embeddings` for the pattern engine.
//!
//! # Example
//!
//! ```rust,no_run
//! use provider_clients::{HttpClientFactory, ProviderClient};
//! use provider_core::{ClientFactory, Credentials, Provider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::from_env();
//!     let factory = HttpClientFactory::new()?;
//!
//!     if let Some(credential) = credentials.get(Provider::Grok) {
//!         let client = factory.client(Provider::Grok, credential)?;
//!         println!("{}", client.complete("Hello!", &[]).await?);
//!     }
//!     Ok(())
//! }
//! ```

mod anthropic;
mod chat_completions;
mod config;
mod embeddings;
mod factory;
mod gemini;
mod http;

pub use anthropic::AnthropicClient;
pub use chat_completions::ChatCompletionsClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use embeddings::{OpenAiEmbedder, DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL};
pub use factory::HttpClientFactory;
pub use gemini::GeminiClient;

// Re-export provider-core types for convenience
pub use provider_core::{
    async_trait, Credentials, Embedder, HistoryMessage, Provider, ProviderClient, ProviderError,
};
