//! Error types for memory, similarity and persistence operations.

use provider_core::ProviderError;
use thiserror::Error;

/// Errors raised by the embedding store and the pattern engine.
#[derive(Debug, Error)]
pub enum PatternError {
    /// Two vectors (or a vector and the store) disagree on dimensionality.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A vector with zero magnitude has no direction to compare.
    #[error("cannot compare a zero-norm vector")]
    ZeroNorm,

    /// The embedding function failed.
    #[error("embedding failed: {0}")]
    Embedding(#[from] ProviderError),

    /// The discussion store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from a [`DiscussionStore`](crate::DiscussionStore) backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The backend failed to read or write.
    #[error("storage backend error: {0}")]
    Backend(String),
}
