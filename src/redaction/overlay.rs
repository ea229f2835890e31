//! Paints opaque white rectangles on top of existing page content.
//!
//! The existing content streams are left untouched: each modified page gets
//! its old streams wrapped in `q`/`Q` followed by one new stream holding the
//! covers, so no state set by the page can leak into the overlay.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

use crate::config::CoverConfig;
use crate::error::RedactorResult;
use crate::geometry::Rect;
use crate::layout::page_box;
use crate::region::{ImageRegion, TextRegion};

/// What the overlay writer did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayStats {
    pub regions_drawn: usize,
    pub pages_modified: usize,
    pub skipped_out_of_range: usize,
}

#[derive(Debug, Clone)]
pub struct OverlayWriter<'c> {
    cover: &'c CoverConfig,
}

impl<'c> OverlayWriter<'c> {
    pub fn new(cover: &'c CoverConfig) -> Self {
        Self { cover }
    }

    /// Draws every in-range region onto `doc`.
    pub fn apply(
        &self,
        doc: &mut Document,
        text_regions: &[TextRegion],
        image_regions: &[ImageRegion],
    ) -> RedactorResult<OverlayStats> {
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let mut stats = OverlayStats::default();
        let mut covers: BTreeMap<usize, Vec<Rect>> = BTreeMap::new();

        let placed = image_regions
            .iter()
            .map(|r| (r.page_index, r.rect))
            .chain(
                text_regions
                    .iter()
                    .map(|r| (r.page_index, r.cover(self.cover))),
            );
        for (page_index, rect) in placed {
            let Some(&page_id) = page_ids.get(page_index) else {
                warn!(
                    page_index,
                    pages = page_ids.len(),
                    "region on a page that does not exist, skipped"
                );
                stats.skipped_out_of_range += 1;
                continue;
            };
            let clamped = rect.clamp_to(&page_box(doc, page_id));
            if !clamped.is_empty() {
                covers.entry(page_index).or_default().push(clamped);
            }
        }

        for (page_index, rects) in covers {
            let page_id = page_ids[page_index];
            self.paint_page(doc, page_id, &rects)?;
            debug!(page = page_index, covers = rects.len(), "painted covers");
            stats.regions_drawn += rects.len();
            stats.pages_modified += 1;
        }
        Ok(stats)
    }

    fn paint_page(&self, doc: &mut Document, page_id: ObjectId, rects: &[Rect]) -> RedactorResult<()> {
        let existing = existing_contents(doc, doc.get_dictionary(page_id)?);

        let prefix = Content {
            operations: vec![Operation::new("q", vec![])],
        };
        let mut overlay = vec![
            Operation::new("Q", vec![]),
            Operation::new("q", vec![]),
            Operation::new("rg", vec![1.into(), 1.into(), 1.into()]),
        ];
        for rect in rects {
            overlay.push(Operation::new(
                "re",
                vec![
                    real(rect.x),
                    real(rect.y),
                    real(rect.width),
                    real(rect.height),
                ],
            ));
            overlay.push(Operation::new("f", vec![]));
        }
        overlay.push(Operation::new("Q", vec![]));
        let suffix = Content {
            operations: overlay,
        };

        // Streams are concatenated when read; the separating newlines keep
        // our `q` and `Q` apart from the page's first and last tokens.
        let mut prefix_bytes = prefix.encode()?;
        prefix_bytes.push(b'\n');
        let mut suffix_bytes = b"\n".to_vec();
        suffix_bytes.extend(suffix.encode()?);

        let prefix_id = doc.add_object(Stream::new(Dictionary::new(), prefix_bytes));
        let suffix_id = doc.add_object(Stream::new(Dictionary::new(), suffix_bytes));

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(prefix_id));
        contents.extend(existing);
        contents.push(Object::Reference(suffix_id));

        doc.get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Contents", Object::Array(contents));
        Ok(())
    }
}

/// The page's content streams as a flat list of references.
fn existing_contents(doc: &Document, page: &Dictionary) -> Vec<Object> {
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as _)
}
