//! Error types for provider operations.

use thiserror::Error;

use crate::provider::Provider;

/// Errors that can occur when calling a provider.
///
/// Classification of raw transport/API failures into these variants is
/// heuristic (see [`ProviderError::classify`]). `CircuitOpen` is never
/// produced by classification; only the retry executor raises it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The call did not complete within the per-call deadline.
    #[error("request timed out")]
    Timeout,

    /// The provider rejected the API key.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The provider is throttling requests.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The provider could not be reached at all.
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    /// The provider answered with an error.
    #[error("provider API error ({status}): {message}")]
    ProviderApi {
        /// HTTP status code (0 when unknown).
        status: u16,
        /// Error text returned by the provider.
        message: String,
    },

    /// The circuit breaker for this provider is open; no call was attempted.
    #[error("circuit open for {0}")]
    CircuitOpen(Provider),

    /// An embedding vector did not have the expected dimensionality.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    EmbeddingDimensionMismatch {
        /// Dimensionality the store was built for.
        expected: usize,
        /// Dimensionality actually returned.
        actual: usize,
    },

    /// The client could not be built (bad URL, missing key, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Anything that fits no other bucket.
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl ProviderError {
    /// Classify a raw failure by HTTP status and/or error text.
    ///
    /// Status codes take precedence; the message is pattern-matched when no
    /// status is available or the status is not conclusive.
    pub fn classify(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();

        match status {
            Some(401) | Some(403) => return Self::InvalidCredentials(message),
            Some(429) => return Self::RateLimited(message),
            Some(408) | Some(504) => return Self::Timeout,
            _ => {}
        }

        let lower = message.to_lowercase();
        if lower.contains("timed out") || lower.contains("timeout") || lower.contains("deadline") {
            Self::Timeout
        } else if lower.contains("unauthorized")
            || lower.contains("invalid api key")
            || lower.contains("invalid_api_key")
            || lower.contains("authentication")
            || lower.contains("permission denied")
        {
            Self::InvalidCredentials(message)
        } else if lower.contains("rate limit")
            || lower.contains("rate_limit")
            || lower.contains("too many requests")
            || lower.contains("quota")
        {
            Self::RateLimited(message)
        } else if lower.contains("connection refused")
            || lower.contains("connection reset")
            || lower.contains("dns")
            || lower.contains("unreachable")
            || lower.contains("error trying to connect")
        {
            Self::NetworkUnreachable(message)
        } else if let Some(status) = status {
            Self::ProviderApi { status, message }
        } else {
            Self::Unknown(message)
        }
    }

    /// Whether retrying the same call could plausibly succeed.
    ///
    /// Credential, configuration and dimension errors are permanent; the
    /// retry executor records them as failures but stops immediately.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidCredentials(_)
                | Self::Configuration(_)
                | Self::EmbeddingDimensionMismatch { .. }
                | Self::CircuitOpen(_)
        )
    }

    /// Whether this is the circuit-breaker short circuit.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen(_))
    }

    /// Short machine-readable kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::InvalidCredentials(_) => "invalid_credentials",
            Self::RateLimited(_) => "rate_limited",
            Self::NetworkUnreachable(_) => "network_unreachable",
            Self::ProviderApi { .. } => "provider_api_error",
            Self::CircuitOpen(_) => "circuit_open",
            Self::EmbeddingDimensionMismatch { .. } => "embedding_dimension_mismatch",
            Self::Configuration(_) => "configuration",
            Self::Unknown(_) => "unknown",
        }
    }
}
