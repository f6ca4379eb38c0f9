//! Topic labels for matched memory.
//!
//! Heuristic only: the most common tag wins, otherwise the first long word.

use indexmap::IndexMap;

use crate::memory::MemoryMatch;

/// Minimum letters for a word to count as a topic.
const MIN_WORD_LEN: usize = 6;

/// Label used when nothing better is found.
pub const GENERAL_TOPIC: &str = "general";

/// Derive a topic label from query matches.
///
/// Picks the most common pattern tag across the matches' metadata; ties go
/// to the tag seen first. Without any tags, falls back to the first word of
/// at least six letters in the matched content, lowercased.
pub fn derive_topic(matches: &[MemoryMatch]) -> String {
    most_common_tag(matches)
        .or_else(|| first_long_word(matches.iter().map(|m| m.content.as_str())))
        .unwrap_or_else(|| GENERAL_TOPIC.to_string())
}

fn most_common_tag(matches: &[MemoryMatch]) -> Option<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for tag in matches.iter().flat_map(|m| m.metadata.pattern_tags.iter()) {
        let tag = tag.trim();
        if !tag.is_empty() {
            *counts.entry(tag).or_default() += 1;
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (tag, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((tag, count));
        }
    }
    best.map(|(tag, _)| tag.to_string())
}

fn first_long_word<'a>(contents: impl Iterator<Item = &'a str>) -> Option<String> {
    contents
        .flat_map(|content| content.split(|c: char| !c.is_alphabetic()))
        .find(|word| word.chars().count() >= MIN_WORD_LEN)
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryMetadata;
    use uuid::Uuid;

    fn hit(content: &str, tags: &[&str]) -> MemoryMatch {
        MemoryMatch {
            id: Uuid::new_v4(),
            content: content.to_string(),
            similarity: 0.9,
            metadata: MemoryMetadata::default().with_tags(tags.iter().copied()),
        }
    }

    #[test]
    fn test_most_common_tag_wins() {
        let matches = vec![
            hit("a", &["rust", "async"]),
            hit("b", &["async"]),
            hit("c", &["tokio"]),
        ];
        assert_eq!(derive_topic(&matches), "async");
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let matches = vec![hit("a", &["deploy"]), hit("b", &["helm"])];
        assert_eq!(derive_topic(&matches), "deploy");
    }

    #[test]
    fn test_falls_back_to_first_long_word() {
        let matches = vec![hit("How do I tune Postgres indexes?", &[])];
        assert_eq!(derive_topic(&matches), "postgres");
    }

    #[test]
    fn test_falls_back_to_general() {
        let matches = vec![hit("ok so why not", &[])];
        assert_eq!(derive_topic(&matches), GENERAL_TOPIC);
        assert_eq!(derive_topic(&[]), GENERAL_TOPIC);
    }
}
