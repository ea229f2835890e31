//! Plain-text redaction for documents without usable layout (DOCX).

use super::Mapping;

/// Replaces every verbatim occurrence of each mapping's original text.
///
/// Longer originals are applied first so "Jan Kowalski" wins over "Jan".
/// An empty replacement falls back to an upper-cased category label.
pub fn redact_text(text: &str, mappings: &[Mapping]) -> String {
    let mut ordered: Vec<&Mapping> = mappings
        .iter()
        .filter(|m| !m.original.trim().is_empty())
        .collect();
    ordered.sort_by(|a, b| {
        b.original
            .chars()
            .count()
            .cmp(&a.original.chars().count())
    });

    let mut redacted = text.to_string();
    for mapping in ordered {
        let replacement = if mapping.replacement.is_empty() {
            placeholder(&mapping.category)
        } else {
            mapping.replacement.clone()
        };
        redacted = redacted.replace(mapping.original.trim(), &replacement);
    }
    redacted
}

fn placeholder(category: &str) -> String {
    if category.trim().is_empty() {
        "[REDACTED]".to_string()
    } else {
        format!("[{}]", category.trim().to_uppercase())
    }
}
