//! E-mail and postal code matchers used by the safety net.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Category, PatternMatcher};

/// Loose e-mail matcher; prefers recall over RFC accuracy.
#[derive(Debug, Clone, Default)]
pub struct EmailMatcher;

impl EmailMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl PatternMatcher for EmailMatcher {
    fn pattern(&self) -> &Regex {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?i)[\w.-]+@[\w.-]+\.\w+").expect("Valid email regex"));
        &PATTERN
    }

    fn category(&self) -> Category {
        Category::Email
    }

    fn normalize(&self, text: &str) -> Option<String> {
        self.pattern()
            .find(text)
            .map(|m| m.as_str().to_lowercase())
    }
}

/// Postal code matcher for the `NN-NNN` shape.
#[derive(Debug, Clone, Default)]
pub struct PostalCodeMatcher;

impl PostalCodeMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl PatternMatcher for PostalCodeMatcher {
    fn pattern(&self) -> &Regex {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\b[0-9]{2}-[0-9]{3}\b").expect("Valid postal code regex"));
        &PATTERN
    }

    fn category(&self) -> Category {
        Category::Address
    }

    fn normalize(&self, text: &str) -> Option<String> {
        self.pattern().find(text).map(|m| m.as_str().to_string())
    }
}
