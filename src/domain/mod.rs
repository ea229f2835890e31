//! Domain models and text-level logic.
//!
//! Everything in here works on plain strings: detector mappings, the
//! safety-net pattern matchers, candidate expansion and the non-positional
//! text substitution path. Nothing here knows about page geometry.

pub mod contact;
pub mod detector;
pub mod expand;
pub mod mapping;
pub mod phone;
pub mod substitute;

pub use contact::{EmailMatcher, PostalCodeMatcher};
pub use detector::{Detector, DetectorResponse, RegexDetector};
pub use expand::{CandidateExpander, Expansion, ExpansionStats};
pub use mapping::{Candidate, Category, Mapping};
pub use phone::PhoneNumberMatcher;
pub use substitute::redact_text;

use std::ops::Range;

use regex::Regex;

/// Trait for the fixed, detector-independent pattern matchers.
pub trait PatternMatcher: Send + Sync {
    fn pattern(&self) -> &Regex;

    /// Category a hit of this matcher is reported under.
    fn category(&self) -> Category;

    /// Byte ranges of every hit in `text`.
    fn find_spans(&self, text: &str) -> Vec<Range<usize>> {
        self.pattern().find_iter(text).map(|m| m.range()).collect()
    }

    fn normalize(&self, text: &str) -> Option<String>;
}
