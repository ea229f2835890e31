//! Custom assertions for overlay redaction testing.
//!
//! The overlay is visual: covered text stays in the content stream, so the
//! useful checks are about the painted rectangles and document validity.

use lopdf::content::Content;
use lopdf::Document;
use std::path::Path;

/// Loads `bytes` as a PDF or panics with a readable message.
pub fn load_or_panic(bytes: &[u8]) -> Document {
    Document::load_mem(bytes)
        .unwrap_or_else(|e| panic!("Output should be a loadable PDF: {e}"))
}

/// Asserts that `bytes` is a loadable PDF with `pages` pages.
///
/// # Panics
/// Panics if the document does not load or the page count differs.
pub fn assert_valid_pdf(bytes: &[u8], pages: usize) {
    assert!(bytes.starts_with(b"%PDF-"), "Output should start with a PDF header");
    let doc = load_or_panic(bytes);
    assert_eq!(
        doc.get_pages().len(),
        pages,
        "Output should keep all {pages} page(s)"
    );
}

/// Same as [`assert_valid_pdf`] for a file on disk.
pub fn assert_valid_pdf_file(path: &Path, pages: usize) {
    let bytes = std::fs::read(path)
        .unwrap_or_else(|e| panic!("PDF should exist at '{}': {e}", path.display()));
    assert_valid_pdf(&bytes, pages);
}

/// Operators of the decoded, concatenated content of page `page_index`.
pub fn page_operators(bytes: &[u8], page_index: usize) -> Vec<String> {
    let doc = load_or_panic(bytes);
    let page_id = *doc
        .get_pages()
        .values()
        .nth(page_index)
        .unwrap_or_else(|| panic!("Page {page_index} should exist"));
    let raw = doc
        .get_page_content(page_id)
        .unwrap_or_else(|e| panic!("Page {page_index} content should decode: {e}"));
    Content::decode(&raw)
        .unwrap_or_else(|e| panic!("Page {page_index} content should parse: {e}"))
        .operations
        .into_iter()
        .map(|op| op.operator)
        .collect()
}

/// Number of white rectangles painted over page `page_index`.
pub fn cover_count(bytes: &[u8], page_index: usize) -> usize {
    let operators = page_operators(bytes, page_index);
    match operators.iter().rposition(|op| op == "rg") {
        Some(start) => operators[start..].iter().filter(|op| *op == "re").count(),
        None => 0,
    }
}

/// Asserts that page `page_index` carries at least `min` cover rectangles.
pub fn assert_covered(bytes: &[u8], page_index: usize, min: usize) {
    let count = cover_count(bytes, page_index);
    assert!(
        count >= min,
        "Page {page_index} should carry at least {min} cover rectangle(s), found {count}"
    );
}

/// Asserts that page `page_index` was left unpainted.
pub fn assert_uncovered(bytes: &[u8], page_index: usize) {
    assert_eq!(
        cover_count(bytes, page_index),
        0,
        "Page {page_index} should not carry cover rectangles"
    );
}

/// Asserts the overlay balances the graphics state it opens.
pub fn assert_balanced_state(bytes: &[u8], page_index: usize) {
    let operators = page_operators(bytes, page_index);
    let saves = operators.iter().filter(|op| *op == "q").count();
    let restores = operators.iter().filter(|op| *op == "Q").count();
    assert_eq!(saves, restores, "Every q should have a matching Q");
}

/// Asserts that the extracted text of `bytes` contains `pattern`.
pub fn assert_text_contains(bytes: &[u8], pattern: &str) {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .unwrap_or_else(|e| panic!("Text extraction should succeed: {e:?}"));
    assert!(
        text.contains(pattern),
        "Pattern '{pattern}' should appear in extracted text ({} chars)",
        text.len()
    );
}
