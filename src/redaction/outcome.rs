//! Result types returned by the redaction service.

use std::fmt;

use serde::Serialize;

use crate::domain::ExpansionStats;
use crate::region::{ImageRegion, TextRegion};

/// Whether anything was painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionStatus {
    /// At least one cover rectangle was drawn.
    Redacted,
    /// Nothing was drawn; the returned document is the input unchanged.
    NoRegionsFound,
}

/// A pass that failed without aborting the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum Degradation {
    /// Glyph positions could not be extracted; no text regions were located.
    TextLayoutUnavailable(String),
    /// Drawing instructions of page one could not be walked; no image
    /// regions were located.
    ImageScanFailed(String),
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::TextLayoutUnavailable(reason) => {
                write!(f, "text positions unavailable: {reason}")
            }
            Degradation::ImageScanFailed(reason) => write!(f, "image scan failed: {reason}"),
        }
    }
}

/// Regions located for a document, before anything is drawn.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocatedRegions {
    pub text_regions: Vec<TextRegion>,
    pub image_regions: Vec<ImageRegion>,
    pub page_count: usize,
    pub expansion: ExpansionStats,
    pub warnings: Vec<Degradation>,
}

impl LocatedRegions {
    pub fn is_empty(&self) -> bool {
        self.text_regions.is_empty() && self.image_regions.is_empty()
    }
}

/// Statistics and output of one redaction request.
#[derive(Debug, Clone, Serialize)]
pub struct RedactionOutcome {
    /// Serialized output document.
    #[serde(skip)]
    pub document: Vec<u8>,
    pub status: RedactionStatus,
    pub text_regions: Vec<TextRegion>,
    pub image_regions: Vec<ImageRegion>,
    pub pages_processed: usize,
    pub pages_modified: usize,
    pub regions_drawn: usize,
    /// Regions dropped because their page does not exist.
    pub skipped_out_of_range: usize,
    pub expansion: ExpansionStats,
    pub warnings: Vec<Degradation>,
}

impl RedactionOutcome {
    /// Returns true if any cover rectangle was drawn.
    pub fn has_redactions(&self) -> bool {
        self.regions_drawn > 0
    }

    /// True when a person should look at the output: nothing was covered,
    /// or a locating pass failed.
    pub fn needs_review(&self) -> bool {
        self.status == RedactionStatus::NoRegionsFound || !self.warnings.is_empty()
    }
}
