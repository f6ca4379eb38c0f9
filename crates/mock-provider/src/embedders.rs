//! Deterministic embedders for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use provider_core::{Embedder, ProviderError};
use sha2::{Digest, Sha256};

use crate::counter::CallCounter;

/// Bag-of-words embedder using the hashing trick.
///
/// Each lowercase alphanumeric token is hashed with SHA-256 into one of
/// `dimensions` buckets. Texts sharing vocabulary land close together, and
/// identical texts produce identical vectors. Text with no tokens maps to
/// a single fixed bucket so the vector is never all zeros.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
    calls: CallCounter,
}

impl HashEmbedder {
    /// Create an embedder with the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            calls: CallCounter::new(),
        }
    }

    /// Calls made so far.
    pub fn calls(&self) -> &CallCounter {
        &self.calls
    }

    fn bucket(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(bytes) % self.dimensions as u64) as usize
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let mut any = false;
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            vector[self.bucket(&token)] += 1.0;
            any = true;
        }
        if !any {
            vector[0] = 1.0;
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.calls.hit();
        Ok(self.vectorize(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Embedder backed by a fixed text-to-vector table.
///
/// Unknown text is an error, which makes it handy for exercising embedding
/// failure paths. The reported dimensionality is set explicitly so tests can
/// hand back vectors of the wrong length on purpose.
#[derive(Debug, Clone, Default)]
pub struct StaticEmbedder {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl StaticEmbedder {
    /// Create an empty table for `dimensions`-sized vectors.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: HashMap::new(),
        }
    }

    /// Map `text` to `vector`.
    pub fn with(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }
}

#[async_trait]
impl Embedder for StaticEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| ProviderError::Unknown(format!("no embedding for {:?}", text)))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
