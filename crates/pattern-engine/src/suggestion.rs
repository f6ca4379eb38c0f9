//! Advisory records emitted by the pattern engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a suggestion was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// Enough similar prior content was found.
    Pattern,
    /// Periodic low-confidence check-in; no pattern cleared the bar.
    Monitoring,
}

/// A proposal to spin up a specialised agent for a recurring topic.
///
/// Approval and lifecycle belong to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub discussion_id: String,
    pub kind: SuggestionKind,
    pub topic: String,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub proposed_agent_template: String,
    pub created_at: DateTime<Utc>,
}

impl Suggestion {
    /// A detected-pattern suggestion for `topic`.
    pub fn pattern(discussion_id: impl Into<String>, topic: impl Into<String>, confidence: f64) -> Self {
        let topic = topic.into();
        let proposed_agent_template = agent_template(&topic);
        Self {
            id: Uuid::new_v4(),
            discussion_id: discussion_id.into(),
            kind: SuggestionKind::Pattern,
            topic,
            confidence: confidence.clamp(0.0, 1.0),
            proposed_agent_template,
            created_at: Utc::now(),
        }
    }

    /// A periodic "still monitoring" advisory.
    pub fn monitoring(discussion_id: impl Into<String>, confidence: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            discussion_id: discussion_id.into(),
            kind: SuggestionKind::Monitoring,
            topic: "monitoring".to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            proposed_agent_template: "Still listening for recurring themes in this discussion."
                .to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_pattern(&self) -> bool {
        self.kind == SuggestionKind::Pattern
    }
}

fn agent_template(topic: &str) -> String {
    format!(
        "Specialist agent: {topic}\n\
         Focus: follow the recurring \"{topic}\" thread in this discussion.\n\
         Instructions: collect prior answers about {topic}, reconcile \
         disagreements between providers, and keep a running summary."
    )
}
