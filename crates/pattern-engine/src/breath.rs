//! Conversation phase and breath-count state.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Qualitative stage of a conversation.
///
/// Phases are ordered but nothing enforces a transition order; any phase may
/// be set at any time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Plasma,
    Gas,
    Liquid,
    Solid,
}

impl Phase {
    /// All phases in order.
    pub const ALL: [Phase; 4] = [Phase::Plasma, Phase::Gas, Phase::Liquid, Phase::Solid];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plasma => "plasma",
            Self::Gas => "gas",
            Self::Liquid => "liquid",
            Self::Solid => "solid",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known phase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown phase: {0}")]
pub struct ParsePhaseError(pub String);

impl FromStr for Phase {
    type Err = ParsePhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plasma" => Ok(Self::Plasma),
            "gas" => Ok(Self::Gas),
            "liquid" => Ok(Self::Liquid),
            "solid" => Ok(Self::Solid),
            _ => Err(ParsePhaseError(s.to_string())),
        }
    }
}

/// Per-discussion state advanced by the pattern engine.
///
/// The engine reads the current value and increments it; callers may also
/// overwrite the phase directly. `breath_count` never decreases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationBreathState {
    pub phase: Phase,
    breath_count: u64,
    pub detected_patterns: BTreeSet<String>,
}

impl ConversationBreathState {
    /// Fresh state in the plasma phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current breath count.
    pub fn breath_count(&self) -> u64 {
        self.breath_count
    }

    /// Manually change the phase.
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Advance the breath count by one and return the new value.
    pub fn breathe(&mut self) -> u64 {
        self.breath_count = self.breath_count.saturating_add(1);
        self.breath_count
    }

    /// Record a detected pattern tag. Returns false if it was already known.
    pub fn record_pattern(&mut self, tag: impl Into<String>) -> bool {
        self.detected_patterns.insert(tag.into())
    }

    /// Detected pattern tags as an owned list.
    pub fn pattern_tags(&self) -> Vec<String> {
        self.detected_patterns.iter().cloned().collect()
    }
}
