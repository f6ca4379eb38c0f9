//! Embedding memory: append-only records with cosine-similarity lookup.
//!
//! The store is a plain vector scanned in full on every query. That is fine
//! for conversation-scoped corpora; larger corpora want an approximate
//! nearest-neighbour index behind the same `append`/`query` contract.

use chrono::{DateTime, Utc};
use provider_core::{Embedder, Provider, ProviderError};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::breath::{ConversationBreathState, Phase};
use crate::error::PatternError;
use crate::similarity::{cosine_similarity, is_zero_norm};

/// Default similarity threshold for queries.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Default maximum number of matches per query.
pub const DEFAULT_LIMIT: usize = 5;

/// Context captured alongside a stored embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    /// Discussion the content belongs to. Unscoped records only show up in
    /// unscoped queries.
    #[serde(default)]
    pub discussion_id: Option<String>,
    /// Provider that produced the content, if any (user messages have none).
    pub origin_provider: Option<Provider>,
    pub phase: Phase,
    pub breath_count: u64,
    pub pattern_tags: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl MemoryMetadata {
    /// Metadata stamped now, with no provider and no tags.
    pub fn new(phase: Phase, breath_count: u64) -> Self {
        Self {
            discussion_id: None,
            origin_provider: None,
            phase,
            breath_count,
            pattern_tags: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Snapshot a discussion's breath state.
    pub fn from_state(state: &ConversationBreathState) -> Self {
        Self {
            pattern_tags: state.pattern_tags(),
            ..Self::new(state.phase, state.breath_count())
        }
    }

    /// Scope the record to a discussion.
    pub fn with_discussion(mut self, discussion_id: impl Into<String>) -> Self {
        self.discussion_id = Some(discussion_id.into());
        self
    }

    /// Set the originating provider.
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.origin_provider = Some(provider);
        self
    }

    /// Replace the pattern tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pattern_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for MemoryMetadata {
    fn default() -> Self {
        Self::new(Phase::default(), 0)
    }
}

/// One stored piece of content. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: Uuid,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: MemoryMetadata,
}

/// A query hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryMatch {
    pub id: Uuid,
    pub content: String,
    pub similarity: f64,
    pub metadata: MemoryMetadata,
}

/// Append-only, fixed-dimension vector memory.
///
/// The embedding function is passed per call so one store can be fed by any
/// embedder that produces vectors of the right length. Appends and queries
/// may run concurrently.
#[derive(Debug)]
pub struct EmbeddingStore {
    dimensions: usize,
    records: RwLock<Vec<MemoryRecord>>,
}

impl EmbeddingStore {
    /// Create an empty store for vectors of length `dimensions`.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Vector length every record must have.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed `content` once and store it.
    ///
    /// Fails with [`PatternError::DimensionMismatch`] if the embedder returns
    /// a vector of the wrong length, or [`PatternError::ZeroNorm`] if it
    /// returns all zeros. Nothing is stored on failure.
    pub async fn append(
        &self,
        content: &str,
        embedder: &dyn Embedder,
        metadata: MemoryMetadata,
    ) -> Result<Uuid, PatternError> {
        let embedding = self.embed(content, embedder).await?;

        let record = MemoryRecord {
            id: Uuid::new_v4(),
            content: content.to_string(),
            embedding,
            metadata,
        };
        let id = record.id;

        let mut records = self.records.write().await;
        records.push(record);
        debug!(id = %id, total = records.len(), "Appended memory record");
        Ok(id)
    }

    /// Find stored content similar to `text` across every discussion.
    ///
    /// Embeds `text` once, keeps records with similarity `>= threshold`,
    /// sorts them by descending similarity and returns at most `limit`.
    pub async fn query(
        &self,
        text: &str,
        embedder: &dyn Embedder,
        threshold: f64,
        limit: usize,
    ) -> Result<Vec<MemoryMatch>, PatternError> {
        self.search(None, text, embedder, threshold, limit).await
    }

    /// Like [`query`](Self::query), restricted to records appended for
    /// `discussion_id`.
    pub async fn query_discussion(
        &self,
        discussion_id: &str,
        text: &str,
        embedder: &dyn Embedder,
        threshold: f64,
        limit: usize,
    ) -> Result<Vec<MemoryMatch>, PatternError> {
        self.search(Some(discussion_id), text, embedder, threshold, limit)
            .await
    }

    async fn search(
        &self,
        discussion_id: Option<&str>,
        text: &str,
        embedder: &dyn Embedder,
        threshold: f64,
        limit: usize,
    ) -> Result<Vec<MemoryMatch>, PatternError> {
        let query = self.embed(text, embedder).await?;

        let records = self.records.read().await;
        let mut matches = Vec::new();
        for record in records.iter() {
            if discussion_id.is_some() && record.metadata.discussion_id.as_deref() != discussion_id {
                continue;
            }
            let similarity = cosine_similarity(&query, &record.embedding)?;
            if similarity >= threshold {
                matches.push(MemoryMatch {
                    id: record.id,
                    content: record.content.clone(),
                    similarity,
                    metadata: record.metadata.clone(),
                });
            }
        }
        drop(records);

        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(limit);

        debug!(
            discussion_id,
            threshold,
            limit,
            matches = matches.len(),
            "Memory query finished"
        );
        Ok(matches)
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Drop every record.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Drop the records of one discussion when it ends. Returns how many
    /// were removed.
    pub async fn forget(&self, discussion_id: &str) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.metadata.discussion_id.as_deref() != Some(discussion_id));
        before - records.len()
    }

    /// Snapshot of all records in insertion order.
    pub async fn records(&self) -> Vec<MemoryRecord> {
        self.records.read().await.clone()
    }

    async fn embed(&self, text: &str, embedder: &dyn Embedder) -> Result<Vec<f32>, PatternError> {
        let vector = match embedder.embed(text).await {
            Ok(vector) => vector,
            Err(ProviderError::EmbeddingDimensionMismatch { expected, actual }) => {
                return Err(PatternError::DimensionMismatch { expected, actual })
            }
            Err(err) => return Err(err.into()),
        };
        if vector.len() != self.dimensions {
            return Err(PatternError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        if is_zero_norm(&vector) {
            return Err(PatternError::ZeroNorm);
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_provider::{HashEmbedder, StaticEmbedder};
    use provider_core::async_trait;

    /// Remote embedder that reports a wrong-sized vector itself.
    struct MisconfiguredEmbedder;

    #[async_trait]
    impl Embedder for MisconfiguredEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
            Err(ProviderError::EmbeddingDimensionMismatch {
                expected: 3,
                actual: 1536,
            })
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn axes() -> StaticEmbedder {
        StaticEmbedder::new(3)
            .with("x", vec![1.0, 0.0, 0.0])
            .with("y", vec![0.0, 1.0, 0.0])
            .with("z", vec![0.0, 0.0, 1.0])
            .with("xy", vec![1.0, 1.0, 0.0])
            .with("mostly x", vec![1.0, 0.1, 0.0])
            .with("zero", vec![0.0, 0.0, 0.0])
            .with("short", vec![1.0, 0.0])
    }

    #[tokio::test]
    async fn test_append_and_len() {
        let store = EmbeddingStore::new(3);
        let embedder = axes();
        assert!(store.is_empty().await);

        store
            .append("x", &embedder, MemoryMetadata::default())
            .await
            .unwrap();
        store
            .append("y", &embedder, MemoryMetadata::default())
            .await
            .unwrap();

        assert_eq!(store.len().await, 2);
        let records = store.records().await;
        assert_eq!(records[0].content, "x");
        assert_eq!(records[1].embedding, vec![0.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_append_rejects_wrong_dimension() {
        let store = EmbeddingStore::new(3);
        let err = store
            .append("short", &axes(), MemoryMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PatternError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_append_rejects_zero_vector() {
        let store = EmbeddingStore::new(3);
        let err = store
            .append("zero", &axes(), MemoryMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PatternError::ZeroNorm));
    }

    #[tokio::test]
    async fn test_embedder_failure_surfaces() {
        let store = EmbeddingStore::new(3);
        let err = store
            .append("unknown", &axes(), MemoryMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PatternError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_query_sorted_and_limited() {
        let store = EmbeddingStore::new(3);
        let embedder = axes();
        for text in ["y", "xy", "x", "mostly x", "z"] {
            store
                .append(text, &embedder, MemoryMetadata::default())
                .await
                .unwrap();
        }

        let matches = store.query("x", &embedder, 0.5, 5).await.unwrap();
        let contents: Vec<_> = matches.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["x", "mostly x", "xy"]);
        assert!(matches.windows(2).all(|w| w[0].similarity >= w[1].similarity));

        let limited = store.query("x", &embedder, 0.5, 2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_high_threshold_on_dissimilar_store_is_empty() {
        let store = EmbeddingStore::new(3);
        let embedder = axes();
        for text in ["y", "z", "xy"] {
            store
                .append(text, &embedder, MemoryMetadata::default())
                .await
                .unwrap();
        }

        let matches = store.query("x", &embedder, 0.99, 5).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_query_with_mismatched_embedder_fails() {
        let store = EmbeddingStore::new(3);
        store
            .append("x", &axes(), MemoryMetadata::default())
            .await
            .unwrap();

        let err = store
            .query("x", &HashEmbedder::new(16), 0.0, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, PatternError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_metadata_travels_with_match() {
        let store = EmbeddingStore::new(3);
        let embedder = axes();
        let metadata = MemoryMetadata::new(Phase::Liquid, 4)
            .with_provider(Provider::Gemini)
            .with_tags(["deploy"]);
        store.append("x", &embedder, metadata).await.unwrap();

        let matches = store.query("x", &embedder, 0.8, 5).await.unwrap();
        assert_eq!(matches[0].metadata.origin_provider, Some(Provider::Gemini));
        assert_eq!(matches[0].metadata.phase, Phase::Liquid);
        assert_eq!(matches[0].metadata.pattern_tags, vec!["deploy".to_string()]);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = EmbeddingStore::new(3);
        store
            .append("x", &axes(), MemoryMetadata::default())
            .await
            .unwrap();
        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_embedder_reported_mismatch_uses_store_error() {
        let store = EmbeddingStore::new(3);
        let err = store
            .append("x", &MisconfiguredEmbedder, MemoryMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PatternError::DimensionMismatch {
                expected: 3,
                actual: 1536
            }
        ));
    }

    #[tokio::test]
    async fn test_query_discussion_only_sees_its_own_records() {
        let store = EmbeddingStore::new(3);
        let embedder = axes();
        store
            .append("x", &embedder, MemoryMetadata::default().with_discussion("a"))
            .await
            .unwrap();
        store
            .append("mostly x", &embedder, MemoryMetadata::default().with_discussion("b"))
            .await
            .unwrap();

        let in_a = store.query_discussion("a", "x", &embedder, 0.5, 5).await.unwrap();
        assert_eq!(in_a.len(), 1);
        assert_eq!(in_a[0].content, "x");

        let in_c = store.query_discussion("c", "x", &embedder, 0.5, 5).await.unwrap();
        assert!(in_c.is_empty());

        assert_eq!(store.query("x", &embedder, 0.5, 5).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_forget_drops_one_discussion() {
        let store = EmbeddingStore::new(3);
        let embedder = axes();
        for (text, discussion) in [("x", "a"), ("y", "a"), ("z", "b")] {
            store
                .append(text, &embedder, MemoryMetadata::default().with_discussion(discussion))
                .await
                .unwrap();
        }

        assert_eq!(store.forget("a").await, 2);
        let records = store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].metadata.discussion_id.as_deref(), Some("b"));
    }
}
