//! Coordinate-based PII redaction for CV documents.
//!
//! Detector output (loose strings with categories) is reconciled against the
//! positioned text of each PDF page, and opaque white rectangles are painted
//! over every match. Photos are found independently from the first page's
//! drawing instructions. Word documents are redacted as plain text.
//!
//! # Features
//!
//! - **Spatial matching**: runs on one baseline are merged into chunks so
//!   names split per word still match
//! - **Safety net**: e-mail, phone and postal code patterns are covered even
//!   when the detector missed them
//! - **Photo location**: photo-sized images near the top of page one
//! - **Fail-open extraction**: a broken locating pass degrades the result
//!   instead of failing the request
//!
//! # Architecture
//!
//! - [`domain`]: mappings, pattern matchers, candidate expansion, detector boundary
//! - [`layout`]: glyph and drawing extraction from PDF pages
//! - [`matching`]: chunking and chunk-versus-candidate rules
//! - [`images`]: photo placement heuristics
//! - [`redaction`]: service, overlay writer and result types
//! - [`ingest`]: MIME dispatch and plain text extraction
//! - [`error`]: error handling
//!
//! # Quick Start
//!
//! ```no_run
//! use cvredact::{Mapping, RedactionService};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = std::fs::read("cv.pdf")?;
//! let mappings = vec![
//!     Mapping::new("Maciej Kowalczyk", "[NAME]", "name"),
//!     Mapping::new("500 600 700", "[PHONE]", "phone"),
//! ];
//!
//! let outcome = RedactionService::with_pdf_extractor().redact(&document, &mappings)?;
//! if outcome.needs_review() {
//!     eprintln!("nothing or not everything was covered, check the output");
//! }
//! std::fs::write("cv.redacted.pdf", &outcome.document)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Candidate expansion
//!
//! ```
//! use cvredact::domain::{CandidateExpander, Mapping};
//!
//! let expansion = CandidateExpander::new()
//!     .expand(&[Mapping::new("123456789 / 987654321", "", "phone")]);
//! assert_eq!(expansion.candidates.len(), 2);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod images;
pub mod ingest;
pub mod layout;
pub mod matching;
pub mod redaction;
pub mod region;

pub use config::{CoverConfig, ImageConfig, MatchConfig, RedactionConfig};
pub use domain::{
    Candidate, CandidateExpander, Category, Detector, DetectorResponse, Mapping, PatternMatcher,
    PhoneNumberMatcher, RegexDetector,
};
pub use error::{RedactorError, RedactorResult};
pub use ingest::{parse_document, DocumentFormat, ParsedDocument};
pub use layout::{LayoutExtractor, PdfLayoutExtractor};
pub use redaction::{
    Degradation, ProcessedDocument, RedactionOutcome, RedactionService, RedactionStatus,
};
pub use region::{ImageRegion, TextRegion};

/// Redacts a PDF with the default configuration and returns the new bytes.
///
/// Use [`RedactionService`] directly to inspect the outcome, for instance
/// to tell a clean result from one where nothing was found.
pub fn redact(document: &[u8], mappings: &[Mapping]) -> RedactorResult<Vec<u8>> {
    Ok(RedactionService::with_pdf_extractor()
        .redact(document, mappings)?
        .document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_creation() {
        let service = RedactionService::default();
        assert_eq!(service.config(), &RedactionConfig::default());
    }

    #[test]
    fn test_redact_rejects_garbage() {
        assert!(redact(b"garbage", &[]).unwrap_err().is_input_error());
    }
}
