//! Mock provider implementations for testing.
//!
//! This crate provides mock implementations of the `ProviderClient` and
//! `Embedder` traits:
//! - `EchoProvider` - Echoes the prompt back
//! - `FailingProvider` - Always fails with a fixed error
//! - `FlakyProvider` - Fails a set number of times, then succeeds
//! - `DelayedProvider` - Wraps another client with artificial delay
//! - `PanickingProvider` - Panics on every call
//! - `MockClientFactory` - Hands out pre-registered clients per provider
//! - `HashEmbedder` / `StaticEmbedder` - Deterministic embedders
//!
//! Every client counts its calls through a shared [`CallCounter`].
//!
//! For real HTTP adapters, use the `provider-clients` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_provider::{EchoProvider, Provider, ProviderClient};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), mock_provider::ProviderError> {
//!     let client = EchoProvider::new(Provider::OpenAi);
//!
//!     let response = client.complete("Hello!", &[]).await?;
//!     assert_eq!(response, "Hello!");
//!     assert_eq!(client.calls().get(), 1);
//!     Ok(())
//! }
//! ```

mod counter;
mod delayed;
mod echo;
mod embedders;
mod factory;
mod failing;
mod flaky;

// Re-export provider-core types for convenience
pub use provider_core::{
    async_trait, ClientFactory, Embedder, HistoryMessage, Provider, ProviderClient,
    ProviderCredential, ProviderError,
};

pub use counter::CallCounter;
pub use delayed::DelayedProvider;
pub use echo::EchoProvider;
pub use embedders::{HashEmbedder, StaticEmbedder};
pub use factory::MockClientFactory;
pub use failing::{FailingProvider, PanickingProvider};
pub use flaky::FlakyProvider;
