//! Candidate expansion: detector mappings to atomic search strings.

use serde::Serialize;
use tracing::{debug, warn};

use super::phone::{PhoneNumberMatcher, PHONE_SEPARATOR};
use super::{Candidate, Category, Mapping};

/// Counters describing what the expander kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionStats {
    pub received: usize,
    pub emitted: usize,
    /// Category outside the sensitive allow-list.
    pub dropped_category: usize,
    /// Original empty or a single character after trimming.
    pub dropped_short: usize,
    /// Phone mappings that carried no digit at all.
    pub dropped_phone_without_digits: usize,
    /// Slash-separated phone segments too short to be a number.
    pub dropped_phone_segments: usize,
}

/// Expander output.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub candidates: Vec<Candidate>,
    pub stats: ExpansionStats,
}

/// Normalizes and splits detector output into [`Candidate`]s.
#[derive(Debug, Clone, Default)]
pub struct CandidateExpander;

impl CandidateExpander {
    pub fn new() -> Self {
        Self
    }

    pub fn expand(&self, mappings: &[Mapping]) -> Expansion {
        let mut expansion = Expansion::default();
        expansion.stats.received = mappings.len();

        for mapping in mappings {
            let Some(category) = mapping.sensitive_category() else {
                expansion.stats.dropped_category += 1;
                continue;
            };

            let original = mapping.original.trim();
            if original.chars().count() <= 1 {
                expansion.stats.dropped_short += 1;
                continue;
            }

            if category == Category::Phone {
                self.expand_phone(original, &mut expansion);
            } else {
                expansion.candidates.push(Candidate::new(original, category));
            }
        }

        expansion.stats.emitted = expansion.candidates.len();
        debug!(
            received = expansion.stats.received,
            emitted = expansion.stats.emitted,
            dropped_category = expansion.stats.dropped_category,
            dropped_short = expansion.stats.dropped_short,
            "expanded detector mappings"
        );
        expansion
    }

    fn expand_phone(&self, original: &str, expansion: &mut Expansion) {
        let text = original
            .strip_prefix(PHONE_SEPARATOR)
            .map(str::trim)
            .unwrap_or(original);

        if !PhoneNumberMatcher::has_digits(text) {
            warn!(original, "phone mapping carries no digits, nothing to redact");
            expansion.stats.dropped_phone_without_digits += 1;
            return;
        }

        if !text.contains(PHONE_SEPARATOR) {
            expansion
                .candidates
                .push(Candidate::new(text, Category::Phone));
            return;
        }

        let numbers = PhoneNumberMatcher::split_joined(text);
        let segments = text
            .split(PHONE_SEPARATOR)
            .filter(|s| !s.trim().is_empty())
            .count();
        if numbers.len() < segments {
            expansion.stats.dropped_phone_segments += segments - numbers.len();
        }
        expansion.candidates.extend(
            numbers
                .into_iter()
                .map(|number| Candidate::new(number, Category::Phone)),
        );
    }
}
