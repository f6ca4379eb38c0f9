//! Pattern detection over a discussion's accumulated memory.

use std::iter;
use std::sync::Arc;

use provider_core::{Embedder, Provider};
use tracing::{debug, info};
use uuid::Uuid;

use crate::breath::ConversationBreathState;
use crate::config::PatternConfig;
use crate::error::PatternError;
use crate::memory::{EmbeddingStore, MemoryMetadata};
use crate::store::DiscussionMessage;
use crate::suggestion::Suggestion;
use crate::topic::derive_topic;

/// Number of matches that maps to full confidence.
const FULL_CONFIDENCE_MATCHES: f64 = 3.0;

/// Watches discussions for recurring topics.
///
/// Memory is shared but every lookup is scoped to the discussion being
/// observed, so one discussion never drives another's state.
///
/// Results depend on the embedding model, so detection is a heuristic and
/// not reproducible across embedders.
pub struct PatternEngine {
    store: Arc<EmbeddingStore>,
    embedder: Arc<dyn Embedder>,
    config: PatternConfig,
}

impl PatternEngine {
    /// Create an engine with default configuration.
    pub fn new(store: Arc<EmbeddingStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            config: PatternConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: PatternConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<EmbeddingStore> {
        &self.store
    }

    /// Look for a recurring topic after `new_message` arrives.
    ///
    /// `recent_messages` are the discussion's messages before `new_message`,
    /// oldest first. Nothing happens until at least `window` of them exist.
    /// The last `window` user messages (including the new one) are joined and
    /// queried against memory; at least `min_matches` hits advance `state`
    /// and yield a pattern suggestion. Otherwise every `monitor_every`-th
    /// message yields a monitoring advisory without touching `state`.
    pub async fn observe(
        &self,
        discussion_id: &str,
        new_message: &DiscussionMessage,
        recent_messages: &[DiscussionMessage],
        state: &mut ConversationBreathState,
    ) -> Result<Option<Suggestion>, PatternError> {
        let prior = recent_messages.len();
        if prior < self.config.window {
            debug!(discussion_id, prior, "Too few messages to look for patterns");
            return Ok(None);
        }

        let query = self.query_text(new_message, recent_messages);
        if !query.is_empty() {
            let matches = self
                .store
                .query_discussion(
                    discussion_id,
                    &query,
                    self.embedder.as_ref(),
                    self.config.similarity_threshold,
                    self.config.query_limit,
                )
                .await?;

            if !matches.is_empty() && matches.len() >= self.config.min_matches {
                let topic = derive_topic(&matches);
                let breath = state.breathe();
                state.record_pattern(topic.clone());
                let confidence = (matches.len() as f64 / FULL_CONFIDENCE_MATCHES).min(1.0);

                info!(
                    discussion_id,
                    topic = %topic,
                    matches = matches.len(),
                    breath,
                    confidence,
                    "Pattern detected"
                );
                return Ok(Some(Suggestion::pattern(discussion_id, topic, confidence)));
            }

            debug!(discussion_id, matches = matches.len(), "No pattern");
        }

        let total = prior + 1;
        if self.config.monitor_every > 0 && total % self.config.monitor_every == 0 {
            debug!(discussion_id, total, "Emitting monitoring advisory");
            return Ok(Some(Suggestion::monitoring(
                discussion_id,
                self.config.monitoring_confidence,
            )));
        }

        Ok(None)
    }

    /// Index `content` into `discussion_id`'s memory, tagged with the
    /// discussion's current state.
    pub async fn remember(
        &self,
        discussion_id: &str,
        content: &str,
        origin: Option<Provider>,
        state: &ConversationBreathState,
    ) -> Result<Uuid, PatternError> {
        let mut metadata = MemoryMetadata::from_state(state).with_discussion(discussion_id);
        metadata.origin_provider = origin;
        self.store
            .append(content, self.embedder.as_ref(), metadata)
            .await
    }

    fn query_text(&self, new_message: &DiscussionMessage, recent: &[DiscussionMessage]) -> String {
        let user_messages: Vec<&str> = recent
            .iter()
            .chain(iter::once(new_message))
            .filter(|m| m.is_user())
            .map(|m| m.content.trim())
            .filter(|c| !c.is_empty())
            .collect();
        let start = user_messages.len().saturating_sub(self.config.window);
        user_messages[start..].join("\n")
    }
}
