//! Error types for orchestration.

use pattern_engine::{PatternError, StoreError};
use provider_core::ProviderError;
use thiserror::Error;

/// Errors that can occur during orchestration.
///
/// A single provider failing is never one of these at the `dispatch` level;
/// it becomes a degraded outcome instead.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A provider call failed terminally.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The caller cancelled the dispatch.
    #[error("cancelled")]
    Cancelled,

    /// Reading or writing discussion state failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Pattern detection or memory indexing failed.
    #[error("pattern engine error: {0}")]
    Pattern(#[from] PatternError),
}

impl OrchestratorError {
    /// Whether this is a circuit-open rejection.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_circuit_open())
    }
}
