//! Detector-independent pattern pass over chunk text.

use crate::domain::{
    Category, EmailMatcher, PatternMatcher, PhoneNumberMatcher, PostalCodeMatcher,
};
use crate::layout::TextRun;

use super::chunk::TextChunk;

/// One pattern hit and the runs that carry it.
#[derive(Debug, Clone)]
pub struct PatternHit<'a> {
    pub text: String,
    /// The matcher's canonical form of `text`.
    pub normalized: String,
    pub category: Category,
    pub runs: Vec<&'a TextRun>,
}

/// Fixed e-mail, phone and postal code patterns.
#[derive(Debug, Clone, Default)]
pub struct SafetyNet {
    email: EmailMatcher,
    phone: PhoneNumberMatcher,
    postal: PostalCodeMatcher,
}

impl SafetyNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan<'a>(&self, chunk: &TextChunk<'a>) -> Vec<PatternHit<'a>> {
        let text = chunk.text.as_str();
        let email: &dyn PatternMatcher = &self.email;
        let phone: &dyn PatternMatcher = &self.phone;
        let postal: &dyn PatternMatcher = &self.postal;
        let spans = email
            .find_spans(text)
            .into_iter()
            .map(|span| (span, email))
            .chain(
                self.phone
                    .locate_numbers(text)
                    .into_iter()
                    .map(|span| (span, phone)),
            )
            .chain(postal.find_spans(text).into_iter().map(|span| (span, postal)));

        // A hit the matcher cannot normalize is not a real instance.
        spans
            .filter_map(|(span, matcher)| {
                let normalized = matcher.normalize(&text[span.clone()])?;
                let runs = chunk.runs_overlapping(&span);
                (!runs.is_empty()).then(|| PatternHit {
                    text: text[span].to_string(),
                    normalized,
                    category: matcher.category(),
                    runs,
                })
            })
            .collect()
    }
}
