//! Semantic memory and conversation-state tracking.
//!
//! This crate turns the stream of messages in a discussion into a small
//! amount of state:
//!
//! - [`EmbeddingStore`] - Append-only vector memory with cosine-similarity
//!   queries
//! - [`PatternEngine`] - Looks for recurring topics and advances the
//!   discussion's [`ConversationBreathState`]
//! - [`Suggestion`] - Advisory record proposing a specialised agent
//! - [`DiscussionStore`] - Persistence interface for breath state, messages
//!   and suggestions, with an in-memory implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pattern_engine::{ConversationBreathState, DiscussionMessage, EmbeddingStore, PatternEngine};
//!
//! let store = Arc::new(EmbeddingStore::new(embedder.dimensions()));
//! let engine = PatternEngine::new(store, Arc::new(embedder));
//!
//! let mut state = ConversationBreathState::new();
//! let message = DiscussionMessage::user("discussion-1", "How do I shard Postgres?");
//! if let Some(suggestion) = engine.observe("discussion-1", &message, &recent, &mut state).await? {
//!     println!("{}: {:.2}", suggestion.topic, suggestion.confidence);
//! }
//! ```

mod breath;
mod config;
mod engine;
mod error;
mod memory;
mod similarity;
mod store;
mod suggestion;
mod topic;

pub use breath::{ConversationBreathState, ParsePhaseError, Phase};
pub use config::PatternConfig;
pub use engine::PatternEngine;
pub use error::{PatternError, StoreError};
pub use memory::{
    EmbeddingStore, MemoryMatch, MemoryMetadata, MemoryRecord, DEFAULT_LIMIT, DEFAULT_THRESHOLD,
};
pub use similarity::cosine_similarity;
pub use store::{DiscussionMessage, DiscussionStore, InMemoryDiscussionStore, MessageRole};
pub use suggestion::{Suggestion, SuggestionKind};
pub use topic::{derive_topic, GENERAL_TOPIC};
