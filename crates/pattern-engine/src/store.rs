//! Persistence interface for discussions.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use provider_core::{HistoryMessage, Provider, ProviderOutcome};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::breath::ConversationBreathState;
use crate::error::StoreError;
use crate::suggestion::Suggestion;

/// Who wrote a discussion message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A persisted discussion message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionMessage {
    pub id: Uuid,
    pub discussion_id: String,
    pub role: MessageRole,
    pub content: String,
    /// Slot the message was produced for (assistant messages only).
    pub provider: Option<Provider>,
    /// Provider that actually produced it, when a fallback answered.
    pub substitute: Option<Provider>,
    pub degraded: bool,
    pub created_at: DateTime<Utc>,
}

impl DiscussionMessage {
    /// A message typed by the user.
    pub fn user(discussion_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            discussion_id: discussion_id.into(),
            role: MessageRole::User,
            content: content.into(),
            provider: None,
            substitute: None,
            degraded: false,
            created_at: Utc::now(),
        }
    }

    /// An assistant message recorded from a dispatch outcome.
    pub fn from_outcome(discussion_id: impl Into<String>, outcome: &ProviderOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            discussion_id: discussion_id.into(),
            role: MessageRole::Assistant,
            content: outcome.content.clone(),
            provider: Some(outcome.provider),
            substitute: outcome.substitute,
            degraded: outcome.degraded,
            created_at: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// Convert to a provider history turn.
    pub fn to_history(&self) -> HistoryMessage {
        match self.role {
            MessageRole::User => HistoryMessage::user(&self.content),
            MessageRole::Assistant => HistoryMessage::assistant(&self.content),
        }
    }
}

/// Storage for discussion state, messages and suggestions.
///
/// Writes are last-write-wins; no transactions are required.
#[async_trait]
pub trait DiscussionStore: Send + Sync {
    /// Breath state for a discussion, or a fresh state if none was saved.
    async fn breath_state(&self, discussion_id: &str) -> Result<ConversationBreathState, StoreError>;

    /// Overwrite a discussion's breath state.
    async fn save_breath_state(
        &self,
        discussion_id: &str,
        state: &ConversationBreathState,
    ) -> Result<(), StoreError>;

    /// Append a message.
    async fn append_message(&self, message: DiscussionMessage) -> Result<(), StoreError>;

    /// The newest `limit` messages, oldest first.
    async fn recent_messages(
        &self,
        discussion_id: &str,
        limit: usize,
    ) -> Result<Vec<DiscussionMessage>, StoreError>;

    /// Total messages stored for a discussion.
    async fn message_count(&self, discussion_id: &str) -> Result<usize, StoreError>;

    /// Persist a suggestion.
    async fn save_suggestion(&self, suggestion: &Suggestion) -> Result<(), StoreError>;

    /// Suggestions for a discussion, oldest first.
    async fn suggestions(&self, discussion_id: &str) -> Result<Vec<Suggestion>, StoreError>;
}

/// In-process [`DiscussionStore`] for tests and single-node use.
#[derive(Debug, Default)]
pub struct InMemoryDiscussionStore {
    states: RwLock<HashMap<String, ConversationBreathState>>,
    messages: RwLock<HashMap<String, Vec<DiscussionMessage>>>,
    suggestions: RwLock<HashMap<String, Vec<Suggestion>>>,
}

impl InMemoryDiscussionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DiscussionStore for InMemoryDiscussionStore {
    async fn breath_state(&self, discussion_id: &str) -> Result<ConversationBreathState, StoreError> {
        Ok(self
            .states
            .read()
            .await
            .get(discussion_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_breath_state(
        &self,
        discussion_id: &str,
        state: &ConversationBreathState,
    ) -> Result<(), StoreError> {
        self.states
            .write()
            .await
            .insert(discussion_id.to_string(), state.clone());
        Ok(())
    }

    async fn append_message(&self, message: DiscussionMessage) -> Result<(), StoreError> {
        self.messages
            .write()
            .await
            .entry(message.discussion_id.clone())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn recent_messages(
        &self,
        discussion_id: &str,
        limit: usize,
    ) -> Result<Vec<DiscussionMessage>, StoreError> {
        let messages = self.messages.read().await;
        let Some(all) = messages.get(discussion_id) else {
            return Ok(Vec::new());
        };
        let start = all.len().saturating_sub(limit);
        Ok(all[start..].to_vec())
    }

    async fn message_count(&self, discussion_id: &str) -> Result<usize, StoreError> {
        Ok(self
            .messages
            .read()
            .await
            .get(discussion_id)
            .map_or(0, Vec::len))
    }

    async fn save_suggestion(&self, suggestion: &Suggestion) -> Result<(), StoreError> {
        self.suggestions
            .write()
            .await
            .entry(suggestion.discussion_id.clone())
            .or_default()
            .push(suggestion.clone());
        Ok(())
    }

    async fn suggestions(&self, discussion_id: &str) -> Result<Vec<Suggestion>, StoreError> {
        Ok(self
            .suggestions
            .read()
            .await
            .get(discussion_id)
            .cloned()
            .unwrap_or_default())
    }
}
