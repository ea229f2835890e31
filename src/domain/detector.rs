//! Boundary with the external PII detector.
//!
//! The real detector is a remote text classifier called before this crate is
//! involved; here we only model its response and provide an offline,
//! regex-based stand-in that produces the same shape.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{redact_text, Mapping};
use crate::error::{RedactorError, RedactorResult};

/// Detector response: anonymized text plus the mappings it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorResponse {
    #[serde(rename = "cleanCV", default)]
    pub clean_cv: String,
    pub mappings: Vec<Mapping>,
}

impl DetectorResponse {
    /// Parses a detector JSON payload and drops unusable mappings.
    pub fn from_json(raw: &str) -> RedactorResult<Self> {
        let response: Self = serde_json::from_str(raw)?;
        Ok(response.into_valid())
    }

    /// Keeps only mappings with a non-blank original and a category.
    pub fn into_valid(mut self) -> Self {
        let before = self.mappings.len();
        self.mappings
            .retain(|m| !m.original.trim().is_empty() && !m.category.trim().is_empty());
        let dropped = before - self.mappings.len();
        if dropped > 0 {
            warn!(dropped, "detector returned unusable mappings");
        }
        if self.mappings.is_empty() {
            warn!("detector returned no mappings");
        }
        self
    }
}

/// Anything that can turn extracted CV text into mappings.
pub trait Detector: Send + Sync {
    fn detect(&self, text: &str) -> RedactorResult<DetectorResponse>;

    fn name(&self) -> &str;
}

/// Offline detector for contact data only (e-mail, phone, postal code).
///
/// Used when no external detector output is available. It finds no names,
/// so its recall is strictly lower than the real detector's.
#[derive(Debug, Clone, Default)]
pub struct RegexDetector;

impl RegexDetector {
    pub fn new() -> Self {
        Self
    }

    fn rules() -> &'static [(Regex, &'static str, &'static str)] {
        static RULES: Lazy<Vec<(Regex, &'static str, &'static str)>> = Lazy::new(|| {
            vec![
                (
                    Regex::new(r"[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,6}")
                        .expect("Valid email regex"),
                    "[EMAIL]",
                    "email",
                ),
                (
                    Regex::new(r"(?:\+?48)?\s?[0-9]{3}[-\s]?[0-9]{3}[-\s]?[0-9]{3}")
                        .expect("Valid phone regex"),
                    "[PHONE]",
                    "phone",
                ),
                (
                    Regex::new(r"[0-9]{2}-[0-9]{3}").expect("Valid postal code regex"),
                    "[POSTAL CODE]",
                    "address",
                ),
            ]
        });
        &RULES
    }
}

impl Detector for RegexDetector {
    fn detect(&self, text: &str) -> RedactorResult<DetectorResponse> {
        if text.trim().is_empty() {
            return Err(RedactorError::InvalidInput {
                parameter: "text".to_string(),
                reason: "no CV text to process".to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut mappings = Vec::new();
        for (pattern, replacement, category) in Self::rules() {
            for hit in pattern.find_iter(text) {
                let original = hit.as_str().trim();
                if seen.insert((original.to_string(), *category)) {
                    mappings.push(Mapping::new(original, *replacement, *category));
                }
            }
        }

        info!(mappings = mappings.len(), detector = self.name(), "detection finished");
        Ok(DetectorResponse {
            clean_cv: redact_text(text, &mappings),
            mappings,
        })
    }

    fn name(&self) -> &str {
        "regex"
    }
}
