//! Embedding function contract.

use async_trait::async_trait;

use crate::error::ProviderError;

/// Turns text into a fixed-dimension vector.
///
/// Every vector returned by one embedder must have exactly
/// [`dimensions`](Embedder::dimensions) components; stores built on top of it
/// reject anything else.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Output dimensionality of this embedder.
    fn dimensions(&self) -> usize;
}
