//! Positioned text and drawing instructions extracted from PDF pages.
//!
//! This is the only place that talks to the PDF interpreters. Everything
//! downstream works on [`TextRun`]s and symbolic [`DrawOp`]s, so the matcher
//! and the image locator can be tested with a fake [`LayoutExtractor`].

mod drawing;
mod glyphs;

use std::panic::{self, AssertUnwindSafe};

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::{RedactorError, RedactorResult};
use crate::geometry::Rect;

/// How deeply nested form XObjects are followed.
const MAX_FORM_DEPTH: usize = 8;

/// Default page box when neither the page nor its ancestors declare one.
const LETTER: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 612.0,
    height: 792.0,
};

/// One positioned word-level fragment of page text.
///
/// `y` is the baseline in page space; `height` is the rendered glyph size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub page_index: usize,
}

impl TextRun {
    pub fn new(
        page_index: usize,
        text: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
            page_index,
        }
    }
}

/// Every run found on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    pub page_index: usize,
    pub runs: Vec<TextRun>,
}

/// Drawing instructions relevant to image placement.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `q`
    Save,
    /// `Q`
    Restore,
    /// `cm a b c d e f`
    Transform([f64; 6]),
    /// `Do` on an image XObject, or an inline image.
    PaintImage { name: String },
}

/// The drawing instruction list of one page plus its box.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDrawing {
    pub page_index: usize,
    pub page_box: Rect,
    pub ops: Vec<DrawOp>,
}

/// Source of page layout. Each call receives its own copy of the document
/// bytes and may consume it.
pub trait LayoutExtractor: Send + Sync {
    /// Positioned text for every page, in page order.
    fn text_layout(&self, document: Vec<u8>) -> RedactorResult<Vec<PageText>>;

    /// Drawing instructions of the first page, `None` for a document
    /// without pages.
    fn first_page_drawing(&self, document: Vec<u8>) -> RedactorResult<Option<PageDrawing>>;

    fn name(&self) -> &str;
}

/// Extractor backed by `pdf-extract` for glyphs and `lopdf` for drawing
/// instructions.
#[derive(Debug, Clone)]
pub struct PdfLayoutExtractor {
    max_form_depth: usize,
}

impl PdfLayoutExtractor {
    pub fn new() -> Self {
        Self {
            max_form_depth: MAX_FORM_DEPTH,
        }
    }
}

impl Default for PdfLayoutExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutExtractor for PdfLayoutExtractor {
    fn text_layout(&self, document: Vec<u8>) -> RedactorResult<Vec<PageText>> {
        let doc = pdf_extract::Document::load_mem(&document)
            .map_err(|e| RedactorError::pdf_parse(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(RedactorError::pdf_parse("document is encrypted"));
        }

        let mut collector = glyphs::RunCollector::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::output_doc(&doc, &mut collector)
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(RedactorError::pdf_parse(format!("{e:?}"))),
            Err(_) => {
                return Err(RedactorError::pdf_parse(
                    "text interpreter aborted on malformed content",
                ))
            }
        }

        let pages = collector.finish();
        debug!(
            pages = pages.len(),
            runs = pages.iter().map(|p| p.runs.len()).sum::<usize>(),
            "extracted text layout"
        );
        Ok(pages)
    }

    fn first_page_drawing(&self, document: Vec<u8>) -> RedactorResult<Option<PageDrawing>> {
        let doc = load(&document)?;
        let Some(page_id) = doc.get_pages().values().next().copied() else {
            return Ok(None);
        };

        let ops = drawing::page_ops(&doc, page_id, self.max_form_depth)?;
        debug!(ops = ops.len(), "decoded first page drawing instructions");
        Ok(Some(PageDrawing {
            page_index: 0,
            page_box: page_box(&doc, page_id),
            ops,
        }))
    }

    fn name(&self) -> &str {
        "pdf"
    }
}

/// Loads a PDF with `lopdf`, refusing encrypted documents.
pub(crate) fn load(document: &[u8]) -> RedactorResult<Document> {
    let doc = Document::load_mem(document).map_err(|e| RedactorError::pdf_parse(e.to_string()))?;
    if doc.is_encrypted() {
        return Err(RedactorError::pdf_parse("document is encrypted"));
    }
    Ok(doc)
}

/// The page's `/MediaBox`, following `/Parent` inheritance.
pub(crate) fn page_box(doc: &Document, page_id: ObjectId) -> Rect {
    let mut current = doc.get_dictionary(page_id).ok();
    let mut hops = 0;
    while let Some(dict) = current {
        if let Ok(Object::Array(values)) = dict.get(b"MediaBox").map(|o| resolve(doc, o)) {
            let numbers: Vec<f64> = values
                .iter()
                .filter_map(|v| as_number(resolve(doc, v)))
                .collect();
            if let [llx, lly, urx, ury] = numbers[..] {
                return Rect::new(llx.min(urx), lly.min(ury), (urx - llx).abs(), (ury - lly).abs());
            }
        }
        hops += 1;
        if hops > 32 {
            break;
        }
        current = dict
            .get(b"Parent")
            .ok()
            .and_then(|parent| parent.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());
    }
    LETTER
}

/// Follows a reference to its target; other objects are returned as is.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

pub(crate) fn as_number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}
