//! Pattern engine configuration.

use std::env;

use crate::memory::{DEFAULT_LIMIT, DEFAULT_THRESHOLD};

/// Tuning knobs for [`PatternEngine`](crate::PatternEngine).
#[derive(Debug, Clone, PartialEq)]
pub struct PatternConfig {
    /// Minimum cosine similarity for a memory hit.
    pub similarity_threshold: f64,
    /// Maximum hits per query.
    pub query_limit: usize,
    /// Hits needed to call it a pattern.
    pub min_matches: usize,
    /// Prior messages needed before observing, and user messages per query.
    pub window: usize,
    /// Emit a monitoring advisory every this many messages (0 disables).
    pub monitor_every: usize,
    /// Confidence attached to monitoring advisories.
    pub monitoring_confidence: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_THRESHOLD,
            query_limit: DEFAULT_LIMIT,
            min_matches: 2,
            window: 3,
            monitor_every: 8,
            monitoring_confidence: 0.2,
        }
    }
}

impl PatternConfig {
    /// Load configuration from `PATTERN_*` environment variables.
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(value) = env_parse::<f64>("PATTERN_SIMILARITY_THRESHOLD") {
            config.similarity_threshold = value;
        }
        if let Some(value) = env_parse("PATTERN_QUERY_LIMIT") {
            config.query_limit = value;
        }
        if let Some(value) = env_parse("PATTERN_MIN_MATCHES") {
            config.min_matches = value;
        }
        if let Some(value) = env_parse("PATTERN_WINDOW") {
            config.window = value;
        }
        if let Some(value) = env_parse("PATTERN_MONITOR_EVERY") {
            config.monitor_every = value;
        }

        config
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_query_limit(mut self, limit: usize) -> Self {
        self.query_limit = limit;
        self
    }

    pub fn with_min_matches(mut self, min_matches: usize) -> Self {
        self.min_matches = min_matches;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_monitor_every(mut self, every: usize) -> Self {
        self.monitor_every = every;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.trim().parse().ok()
}
