//! Chunk-versus-candidate decision rules.

use crate::config::MatchConfig;
use crate::domain::{Candidate, Category};

/// Words this short are ignored by the per-word name rule.
const MIN_NAME_WORD: usize = 3;

/// Collapses whitespace runs and lowercases; keeps punctuation.
pub fn normalize_name(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Keeps only letters and digits, lowercased.
pub fn normalize_strict(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn len_diff(a: &str, b: &str) -> usize {
    a.chars().count().abs_diff(b.chars().count())
}

fn either_contains(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Decides whether a chunk's text refers to a candidate.
#[derive(Debug, Clone)]
pub struct MatchRules<'c> {
    config: &'c MatchConfig,
}

impl<'c> MatchRules<'c> {
    pub fn new(config: &'c MatchConfig) -> Self {
        Self { config }
    }

    pub fn is_match(&self, chunk_text: &str, candidate: &Candidate) -> bool {
        let len = candidate.char_len();
        let is_name = candidate.category == Category::Name;

        let (chunk, mapping) = if is_name {
            (normalize_name(chunk_text), normalize_name(&candidate.original))
        } else {
            (normalize_strict(chunk_text), normalize_strict(&candidate.original))
        };
        // An empty needle is contained in everything.
        if chunk.is_empty() || mapping.is_empty() {
            return false;
        }

        let exact = chunk == mapping;
        let contains = either_contains(&chunk, &mapping);
        let diff = len_diff(&chunk, &mapping);

        if is_name && len <= self.config.name_max_len {
            exact
                || (contains && diff <= self.config.name_len_slack)
                || Self::word_match(chunk_text, &candidate.original)
        } else if len <= self.config.short_max_len {
            exact || (contains && diff <= self.config.short_len_slack)
        } else {
            contains
        }
    }

    /// Any mapping word of three or more chars equal to, containing, or
    /// contained in a chunk word of three or more chars.
    fn word_match(chunk_text: &str, original: &str) -> bool {
        let long_words = |text: &str| -> Vec<String> {
            text.split_whitespace()
                .filter(|w| w.chars().count() >= MIN_NAME_WORD)
                .map(normalize_name)
                .collect()
        };
        let chunk_words = long_words(chunk_text);
        long_words(original).iter().any(|m| {
            chunk_words
                .iter()
                .any(|c| m == c || either_contains(c, m))
        })
    }
}
