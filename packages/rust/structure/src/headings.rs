//! Heading detection over flattened page text.
//!
//! Crawled content has lost its markup, so headings are recovered from the
//! shape of sentences: short, capitalized, and not narrative prose.

use std::sync::LazyLock;

use regex::Regex;

use crate::rules::{FINE_GRAINED_KEYWORDS, NARRATIVE_LEAD_INS};

/// Sentences must be longer than this to count as headings.
const MIN_HEADING_CHARS: usize = 5;
/// Sentences must be shorter than this to count as headings.
const MAX_HEADING_CHARS: usize = 100;
/// Headings longer than this are level 2.
const LEVEL_ONE_MAX_CHARS: usize = 50;

/// A heading-like sentence and its estimated level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub text: String,
    /// 1 = module-level, 2 = finer-grained.
    pub level: u8,
}

/// Split `content` into sentences and keep the heading-like ones.
pub fn extract_headings(content: &str) -> Vec<Heading> {
    static SENTENCE_SPLIT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));

    SENTENCE_SPLIT_RE
        .split(content)
        .map(str::trim)
        .filter(|s| is_heading_like(s))
        .map(|s| Heading {
            text: s.to_string(),
            level: estimate_level(s),
        })
        .collect()
}

fn is_heading_like(sentence: &str) -> bool {
    let len = sentence.chars().count();
    len > MIN_HEADING_CHARS
        && len < MAX_HEADING_CHARS
        && sentence.chars().next().is_some_and(char::is_uppercase)
        && !sentence.ends_with(',')
        && !NARRATIVE_LEAD_INS.iter().any(|lead| sentence.starts_with(lead))
}

fn estimate_level(sentence: &str) -> u8 {
    let lower = sentence.to_lowercase();
    if sentence.chars().count() > LEVEL_ONE_MAX_CHARS
        || FINE_GRAINED_KEYWORDS.iter().any(|k| lower.contains(k))
    {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_short_capitalized_sentences() {
        let headings = extract_headings("Account Settings. Two Factor Setup! more prose follows here");
        assert_eq!(
            headings,
            vec![
                Heading { text: "Account Settings".into(), level: 1 },
                Heading { text: "Two Factor Setup".into(), level: 1 },
            ]
        );
    }

    #[test]
    fn skips_narrative_sentences() {
        let text = "The dashboard shows usage. This page explains roles. You can invite users. Ok";
        assert!(extract_headings(text).is_empty());
    }

    #[test]
    fn how_to_and_long_sentences_are_level_two() {
        let text = "Step by step install. \
                    Configuring the advanced replication options for your cluster nodes. \
                    Security Overview";
        let levels: Vec<u8> = extract_headings(text).iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![2, 2, 1]);
    }

    #[test]
    fn trailing_comma_disqualifies() {
        assert!(extract_headings("First of all,").is_empty());
    }
}
