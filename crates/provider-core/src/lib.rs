//! Core traits and types for text-generation providers.
//!
//! This crate provides the shared interface for every backend the fan-out
//! orchestrator talks to. It defines:
//!
//! - [`Provider`] - The closed set of supported backends
//! - [`ProviderClient`] - The trait every backend adapter implements
//! - [`ClientFactory`] - Builds a client for a provider from its credential
//! - [`Embedder`] - Turns text into a fixed-dimension vector
//! - [`ProviderError`] - Error taxonomy shared by all adapters
//! - [`Credentials`] / [`CredentialsSource`] - Per-provider API keys
//! - [`ProviderOutcome`] - The per-slot result of a fan-out dispatch
//!
//! # Example
//!
//! ```rust
//! use provider_core::{async_trait, HistoryMessage, Provider, ProviderClient, ProviderError};
//!
//! struct Parrot;
//!
//! #[async_trait]
//! impl ProviderClient for Parrot {
//!     async fn complete(
//!         &self,
//!         prompt: &str,
//!         _history: &[HistoryMessage],
//!     ) -> Result<String, ProviderError> {
//!         Ok(prompt.to_string())
//!     }
//!
//!     fn provider(&self) -> Provider {
//!         Provider::OpenAi
//!     }
//! }
//! ```

mod client;
mod credentials;
mod embedding;
mod error;
mod history;
mod outcome;
mod provider;

pub use client::{ClientFactory, ProviderClient};
pub use credentials::{Credentials, CredentialsSource, EnvCredentials, ProviderCredential};
pub use embedding::Embedder;
pub use error::ProviderError;
pub use history::HistoryMessage;
pub use outcome::ProviderOutcome;
pub use provider::{ParseProviderError, Provider};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
