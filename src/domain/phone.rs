//! Phone number domain logic.
//!
//! CVs in scope carry nine-digit national numbers written as
//! `123456789`, `123 456 789`, `123-456-789` or `123.456.789`, sometimes
//! several of them joined with a slash (`123456789 / 987654321`).

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Category, PatternMatcher};

/// Character that joins several numbers in one field.
pub const PHONE_SEPARATOR: char = '/';

/// Minimum digit count for a string to be treated as a phone number.
pub const PHONE_DIGITS: usize = 9;

/// Nine-digit phone number matcher.
#[derive(Debug, Clone)]
pub struct PhoneNumberMatcher;

impl PhoneNumberMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Word-bounded shape used by the safety net.
    fn regex() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\b[0-9]{3}[-.\s]?[0-9]{3}[-.\s]?[0-9]{3}\b")
                .expect("Valid phone number regex")
        });
        &PATTERN
    }

    /// Unbounded digit run, used inside already isolated segments.
    fn digit_run() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"[0-9]{3}[-.\s]?[0-9]{3}[-.\s]?[0-9]{3}").expect("Valid digit run regex")
        });
        &PATTERN
    }

    /// Digit run that may straddle a slash, for re-scanning joined numbers.
    fn joined_run() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"[0-9]{3}[-.\s/]?[0-9]{3}[-.\s/]?[0-9]{3}").expect("Valid joined regex")
        });
        &PATTERN
    }

    pub fn digits(text: &str) -> String {
        text.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    pub fn has_digits(text: &str) -> bool {
        text.chars().any(|c| c.is_ascii_digit())
    }

    /// Splits a slash-joined phone field into individual numbers.
    ///
    /// Each non-empty segment contributes every nine-digit run it contains;
    /// a segment without such a run is kept verbatim when it still carries
    /// at least nine digits, and dropped otherwise.
    pub fn split_joined(text: &str) -> Vec<String> {
        let mut numbers = Vec::new();
        for segment in text
            .split(PHONE_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let runs: Vec<&str> = Self::digit_run()
                .find_iter(segment)
                .map(|m| m.as_str().trim())
                .collect();
            if !runs.is_empty() {
                numbers.extend(runs.into_iter().map(str::to_string));
            } else if Self::digits(segment).len() >= PHONE_DIGITS {
                numbers.push(segment.to_string());
            }
        }
        numbers
    }

    /// Finds phone numbers in `text` for the safety net, returning byte
    /// ranges of each individual number.
    ///
    /// Only runs when the strict word-bounded shape is present at all; the
    /// wider re-scan then also recovers numbers glued together by a slash.
    pub fn locate_numbers(&self, text: &str) -> Vec<Range<usize>> {
        if !self.pattern().is_match(text) {
            return Vec::new();
        }

        let mut spans = Vec::new();
        for hit in Self::joined_run().find_iter(text) {
            if hit.as_str().contains(PHONE_SEPARATOR) {
                spans.extend(
                    Self::separated_spans(hit.as_str())
                        .into_iter()
                        .map(|r| (hit.start() + r.start)..(hit.start() + r.end)),
                );
            } else {
                spans.push(hit.range());
            }
        }
        spans
    }

    /// Byte ranges of the slash-separated parts of `text` that carry a full
    /// number.
    fn separated_spans(text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let mut offset = 0;
        for part in text.split(PHONE_SEPARATOR) {
            let lead = part.len() - part.trim_start().len();
            let trimmed = part.trim();
            if Self::digits(trimmed).len() >= PHONE_DIGITS {
                let start = offset + lead;
                spans.push(start..start + trimmed.len());
            }
            offset += part.len() + PHONE_SEPARATOR.len_utf8();
        }
        spans
    }
}

impl Default for PhoneNumberMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternMatcher for PhoneNumberMatcher {
    fn pattern(&self) -> &Regex {
        Self::regex()
    }

    fn category(&self) -> Category {
        Category::Phone
    }

    fn normalize(&self, text: &str) -> Option<String> {
        let digits = Self::digits(text);
        (digits.len() >= PHONE_DIGITS).then_some(digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_extraction() {
        let matcher = PhoneNumberMatcher::new();
        let text = "Tel: 123 456 789, 987-654-321 or 111.222.333";
        assert_eq!(matcher.find_spans(text).len(), 3);
    }

    #[test]
    fn test_split_joined_pair() {
        assert_eq!(
            PhoneNumberMatcher::split_joined("123456789 / 987654321"),
            vec!["123456789".to_string(), "987654321".to_string()]
        );
    }

    #[test]
    fn test_split_joined_fallback_keeps_long_segment() {
        // Ten digits in irregular groups: no 3-3-3 run, but enough digits.
        assert_eq!(
            PhoneNumberMatcher::split_joined("12 34 56 78 90 / 500 600 700"),
            vec!["12 34 56 78 90".to_string(), "500 600 700".to_string()]
        );
    }

    #[test]
    fn test_split_joined_drops_short_segment() {
        assert_eq!(
            PhoneNumberMatcher::split_joined("wew. 12 / 500600700"),
            vec!["500600700".to_string()]
        );
    }

    #[test]
    fn test_locate_numbers_splits_slash() {
        let matcher = PhoneNumberMatcher::new();
        let text = "tel. 123456789/987654321";
        let spans = matcher.locate_numbers(text);
        let found: Vec<&str> = spans.iter().map(|r| &text[r.clone()]).collect();
        assert_eq!(found, vec!["123456789", "987654321"]);
    }

    #[test]
    fn test_locate_numbers_requires_strict_shape() {
        let matcher = PhoneNumberMatcher::new();
        assert!(matcher.locate_numbers("order 1234567890123").is_empty());
    }

    #[test]
    fn test_normalize() {
        let matcher = PhoneNumberMatcher::new();
        assert_eq!(matcher.normalize("123-456-789"), Some("123456789".to_string()));
        assert_eq!(matcher.normalize("12-345"), None);
    }
}
