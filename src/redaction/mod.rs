//! Redaction service: the PDF pipeline and the request entry point.
//!
//! A request loads the document, locates text and image regions in two
//! independent passes (each on its own copy of the bytes), and paints
//! opaque covers over them. Failures of a locating pass degrade the result
//! instead of aborting it; only load failures are fatal.

pub mod outcome;
pub mod overlay;

pub use outcome::{Degradation, LocatedRegions, RedactionOutcome, RedactionStatus};
pub use overlay::{OverlayStats, OverlayWriter};

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::RedactionConfig;
use crate::domain::{redact_text, CandidateExpander, Mapping};
use crate::error::{RedactorError, RedactorResult};
use crate::images::ImageLocator;
use crate::ingest::{self, DocumentFormat};
use crate::layout::{self, LayoutExtractor, PdfLayoutExtractor};
use crate::matching::SpatialMatcher;

/// Output of [`RedactionService::process_document`].
#[derive(Debug, Clone)]
pub enum ProcessedDocument {
    /// Positional redaction of a PDF.
    Pdf(RedactionOutcome),
    /// Word documents are redacted as extracted plain text.
    Text { text: String, word_count: usize },
}

/// Everything one request needs; cloned onto the worker thread when a
/// timeout is set.
#[derive(Clone)]
struct Pipeline {
    extractor: Arc<dyn LayoutExtractor>,
    config: RedactionConfig,
}

impl Pipeline {
    fn run(
        &self,
        document: &[u8],
        mappings: &[Mapping],
        cancel: &Arc<AtomicBool>,
    ) -> RedactorResult<RedactionOutcome> {
        ensure_active(cancel)?;
        let mut doc = layout::load(document)?;
        let page_count = doc.get_pages().len();
        let located = self.locate(document, page_count, mappings, cancel);
        ensure_active(cancel)?;

        let unchanged = |located: LocatedRegions, skipped: usize| {
            warn!(
                pages = page_count,
                "no regions drawn, document returned unchanged; review needed"
            );
            RedactionOutcome {
                document: document.to_vec(),
                status: RedactionStatus::NoRegionsFound,
                text_regions: located.text_regions,
                image_regions: located.image_regions,
                pages_processed: page_count,
                pages_modified: 0,
                regions_drawn: 0,
                skipped_out_of_range: skipped,
                expansion: located.expansion,
                warnings: located.warnings,
            }
        };

        if located.is_empty() {
            return Ok(unchanged(located, 0));
        }

        let stats = OverlayWriter::new(&self.config.cover).apply(
            &mut doc,
            &located.text_regions,
            &located.image_regions,
        )?;
        if stats.regions_drawn == 0 {
            return Ok(unchanged(located, stats.skipped_out_of_range));
        }

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| RedactorError::Backend {
                backend: "lopdf".to_string(),
                message: format!("failed to serialize redacted document: {e}"),
            })?;

        info!(
            text_regions = located.text_regions.len(),
            image_regions = located.image_regions.len(),
            drawn = stats.regions_drawn,
            pages_modified = stats.pages_modified,
            "document redacted"
        );
        Ok(RedactionOutcome {
            document: output,
            status: RedactionStatus::Redacted,
            text_regions: located.text_regions,
            image_regions: located.image_regions,
            pages_processed: page_count,
            pages_modified: stats.pages_modified,
            regions_drawn: stats.regions_drawn,
            skipped_out_of_range: stats.skipped_out_of_range,
            expansion: located.expansion,
            warnings: located.warnings,
        })
    }

    /// Runs the text and image passes concurrently, each on its own copy.
    fn locate(
        &self,
        document: &[u8],
        page_count: usize,
        mappings: &[Mapping],
        cancel: &Arc<AtomicBool>,
    ) -> LocatedRegions {
        let expansion = CandidateExpander::new().expand(mappings);
        let text_copy = document.to_vec();
        let image_copy = document.to_vec();

        let (text_pass, image_pass) = rayon::join(
            || {
                self.extractor.text_layout(text_copy).map(|pages| {
                    SpatialMatcher::new(self.config.matching.clone())
                        .with_cancel(Arc::clone(cancel))
                        .locate(&pages, &expansion.candidates)
                })
            },
            || {
                self.extractor.first_page_drawing(image_copy).map(|drawing| {
                    drawing
                        .map(|d| ImageLocator::new(self.config.images.clone()).locate(&d))
                        .unwrap_or_default()
                })
            },
        );

        let mut warnings = Vec::new();
        let text_regions = text_pass.unwrap_or_else(|e| {
            warn!(error = %e, extractor = self.extractor.name(), "text layout unavailable");
            warnings.push(Degradation::TextLayoutUnavailable(e.to_string()));
            Vec::new()
        });
        let image_regions = image_pass.unwrap_or_else(|e| {
            warn!(error = %e, extractor = self.extractor.name(), "image scan failed");
            warnings.push(Degradation::ImageScanFailed(e.to_string()));
            Vec::new()
        });

        debug!(
            pages = page_count,
            candidates = expansion.candidates.len(),
            text_regions = text_regions.len(),
            image_regions = image_regions.len(),
            "located regions"
        );
        LocatedRegions {
            text_regions,
            image_regions,
            page_count,
            expansion: expansion.stats,
            warnings,
        }
    }
}

/// Redaction service coordinating extraction, matching and overlay.
pub struct RedactionService {
    pipeline: Pipeline,
    timeout: Option<Duration>,
}

impl RedactionService {
    /// Creates a service over the given layout extractor.
    pub fn new(extractor: Box<dyn LayoutExtractor>) -> Self {
        Self {
            pipeline: Pipeline {
                extractor: Arc::from(extractor),
                config: RedactionConfig::default(),
            },
            timeout: None,
        }
    }

    /// Creates a service that reads layout from real PDF content.
    pub fn with_pdf_extractor() -> Self {
        Self::new(Box::new(PdfLayoutExtractor::new()))
    }

    pub fn with_config(mut self, config: RedactionConfig) -> Self {
        self.pipeline.config = config;
        self
    }

    /// Bounds the total time of each request. On expiry the request fails
    /// with [`RedactorError::Timeout`] and no document is returned.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn config(&self) -> &RedactionConfig {
        &self.pipeline.config
    }

    /// Redacts a PDF held in memory.
    pub fn redact(
        &self,
        document: &[u8],
        mappings: &[Mapping],
    ) -> RedactorResult<RedactionOutcome> {
        let cancel = Arc::new(AtomicBool::new(false));
        match self.timeout {
            None => self.pipeline.run(document, mappings, &cancel),
            Some(after) => self.run_with_timeout(document, mappings, after, cancel),
        }
    }

    /// Locates regions without drawing anything.
    pub fn locate(&self, document: &[u8], mappings: &[Mapping]) -> RedactorResult<LocatedRegions> {
        let page_count = layout::load(document)?.get_pages().len();
        let cancel = Arc::new(AtomicBool::new(false));
        Ok(self.pipeline.locate(document, page_count, mappings, &cancel))
    }

    /// Redacts `input` and writes the result to `output`.
    ///
    /// # Arguments
    /// * `input` - Path to input PDF
    /// * `output` - Path for output PDF
    /// * `mappings` - Detector mappings to locate
    pub fn redact_file(
        &self,
        input: &Path,
        output: &Path,
        mappings: &[Mapping],
    ) -> RedactorResult<RedactionOutcome> {
        let document = read(input)?;
        let outcome = self.redact(&document, mappings)?;
        write(output, &outcome.document)?;
        Ok(outcome)
    }

    /// Extracts plain text from a PDF or Word file for detection.
    pub fn extract_text(&self, input: &Path) -> RedactorResult<String> {
        let format = DocumentFormat::from_path(input)?;
        Ok(ingest::parse_as(&read(input)?, format)?.text)
    }

    /// Request entry point: dispatches on the MIME type.
    ///
    /// PDFs go through positional redaction; Word documents are reduced to
    /// text and redacted by substitution. Unsupported types fail before any
    /// parsing.
    pub fn process_document(
        &self,
        bytes: &[u8],
        mime: &str,
        mappings: &[Mapping],
    ) -> RedactorResult<ProcessedDocument> {
        match DocumentFormat::from_mime(mime)? {
            DocumentFormat::Pdf => Ok(ProcessedDocument::Pdf(self.redact(bytes, mappings)?)),
            format => {
                let parsed = ingest::parse_as(bytes, format)?;
                let text = redact_text(&parsed.text, mappings);
                Ok(ProcessedDocument::Text {
                    word_count: text.split_whitespace().count(),
                    text,
                })
            }
        }
    }

    /// Runs the request on a worker thread. On expiry `cancel` is set so the
    /// worker stops at its next checkpoint instead of finishing unseen.
    fn run_with_timeout(
        &self,
        document: &[u8],
        mappings: &[Mapping],
        after: Duration,
        cancel: Arc<AtomicBool>,
    ) -> RedactorResult<RedactionOutcome> {
        let pipeline = self.pipeline.clone();
        let document = document.to_vec();
        let mappings = mappings.to_vec();
        let worker_cancel = Arc::clone(&cancel);
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("cvredact-request".to_string())
            .spawn(move || {
                let result = pipeline.run(&document, &mappings, &worker_cancel);
                if matches!(result, Err(RedactorError::Cancelled)) {
                    debug!("abandoned request stopped");
                }
                // The receiver is gone once the caller has timed out.
                let _ = tx.send(result);
            })
            .map_err(|e| RedactorError::Backend {
                backend: "thread".to_string(),
                message: e.to_string(),
            })?;

        match rx.recv_timeout(after) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                cancel.store(true, Ordering::Relaxed);
                warn!(timeout_ms = after.as_millis() as u64, "redaction timed out");
                Err(RedactorError::Timeout { after })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(RedactorError::Backend {
                backend: "thread".to_string(),
                message: "redaction worker stopped without a result".to_string(),
            }),
        }
    }
}

impl Default for RedactionService {
    fn default() -> Self {
        Self::with_pdf_extractor()
    }
}

fn ensure_active(cancel: &AtomicBool) -> RedactorResult<()> {
    if cancel.load(Ordering::Relaxed) {
        return Err(RedactorError::Cancelled);
    }
    Ok(())
}

fn read(path: &Path) -> RedactorResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| RedactorError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write(path: &Path, bytes: &[u8]) -> RedactorResult<()> {
    std::fs::write(path, bytes).map_err(|e| RedactorError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
