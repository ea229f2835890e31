//! Detector mappings and the atomic candidates derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One span flagged by the external PII detector.
///
/// `original` is supposed to be a verbatim substring of the document text,
/// but nothing downstream relies on that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub original: String,
    #[serde(default)]
    pub replacement: String,
    #[serde(default)]
    pub category: String,
}

impl Mapping {
    pub fn new(
        original: impl Into<String>,
        replacement: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            original: original.into(),
            replacement: replacement.into(),
            category: category.into(),
        }
    }

    /// The sensitive category this mapping falls under, if any.
    pub fn sensitive_category(&self) -> Option<Category> {
        Category::classify(&self.category)
    }
}

/// Categories the redactor acts on. Anything else (skills, job titles, ...)
/// is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Name,
    Email,
    Phone,
    Address,
    Date,
    Photo,
    Id,
    Link,
}

impl Category {
    /// Allow-list in match priority order.
    pub const SENSITIVE: [Category; 8] = [
        Category::Name,
        Category::Email,
        Category::Phone,
        Category::Address,
        Category::Date,
        Category::Photo,
        Category::Id,
        Category::Link,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Category::Name => "name",
            Category::Email => "email",
            Category::Phone => "phone",
            Category::Address => "address",
            Category::Date => "date",
            Category::Photo => "photo",
            Category::Id => "id",
            Category::Link => "link",
        }
    }

    /// Case-insensitive substring match of a free-form detector category
    /// against the allow-list, so "first_name" and "Phone Number" resolve.
    pub fn classify(raw: &str) -> Option<Category> {
        let lowered = raw.to_lowercase();
        Self::SENSITIVE
            .into_iter()
            .find(|category| lowered.contains(category.keyword()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// An atomic, independently searchable string produced by the
/// [`CandidateExpander`](super::CandidateExpander). Lives for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub original: String,
    pub category: Category,
}

impl Candidate {
    pub fn new(original: impl Into<String>, category: Category) -> Self {
        Self {
            original: original.into(),
            category,
        }
    }

    /// Length in characters, the unit all matching thresholds use.
    pub fn char_len(&self) -> usize {
        self.original.chars().count()
    }
}
