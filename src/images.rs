//! Image Locator: finds photo-sized image placements near the top of page one.
//!
//! Works only from the page's own drawing instructions, never from detector
//! output, and is the sole source of photo regions.

use tracing::debug;

use crate::config::ImageConfig;
use crate::geometry::{Matrix, Rect};
use crate::layout::{DrawOp, PageDrawing};
use crate::region::ImageRegion;

#[derive(Debug, Clone, Default)]
pub struct ImageLocator {
    config: ImageConfig,
}

impl ImageLocator {
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    /// Replays the transform stack over `drawing` and returns one padded
    /// region per accepted, non-duplicate image placement.
    pub fn locate(&self, drawing: &PageDrawing) -> Vec<ImageRegion> {
        let mut stack = vec![Matrix::IDENTITY];
        let mut regions: Vec<ImageRegion> = Vec::new();

        for op in &drawing.ops {
            match op {
                DrawOp::Save => {
                    let top = stack.last().copied().unwrap_or_default();
                    stack.push(top);
                }
                DrawOp::Restore => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                DrawOp::Transform(values) => {
                    if let Some(top) = stack.last_mut() {
                        *top = top.concat(&Matrix::new(*values));
                    }
                }
                DrawOp::PaintImage { name } => {
                    let ctm = stack.last().copied().unwrap_or_default();
                    let Some(rect) = self.placement(&ctm, &drawing.page_box) else {
                        debug!(image = %name, "image outside photo heuristics");
                        continue;
                    };
                    let duplicate = regions
                        .iter()
                        .any(|r| r.rect.roughly_equals(&rect, self.config.dedupe_tolerance));
                    if !duplicate {
                        debug!(image = %name, x = rect.x, y = rect.y, "photo candidate");
                        regions.push(ImageRegion {
                            page_index: drawing.page_index,
                            rect,
                        });
                    }
                }
            }
        }
        regions
    }

    /// Padded page rectangle for an image drawn under `ctm`, if it passes
    /// the size and position filters.
    fn placement(&self, ctm: &Matrix, page: &Rect) -> Option<Rect> {
        let width = ctm.scale_x() * self.config.base_unit;
        let height = ctm.scale_y() * self.config.base_unit;
        let in_range = |v: f64| v > self.config.min_size && v < self.config.max_size;
        if !in_range(width) || !in_range(height) {
            return None;
        }

        let (x, y) = ctm.origin();
        // Distance of the image's top edge, not its origin, from the page top.
        let from_top = page.top() - (y + height);
        if from_top <= -self.config.top_tolerance || from_top >= self.config.top_band {
            return None;
        }

        let rect = Rect::new(x, y, width, height)
            .padded(self.config.padding)
            .clamp_to(page);
        (!rect.is_empty()).then_some(rect)
    }
}
