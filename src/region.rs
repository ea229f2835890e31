//! Redaction regions handed from the locators to the overlay writer.

use serde::Serialize;

use crate::config::CoverConfig;
use crate::domain::Category;
use crate::geometry::Rect;

/// A matched text run. `y` is the run's baseline, not its bottom edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRegion {
    pub page_index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Text that caused the match (chunk text or pattern hit).
    pub text: String,
    pub category: Category,
}

impl TextRegion {
    /// Opaque cover for this run: extends below the baseline for
    /// descenders and above the nominal height for ascenders.
    pub fn cover(&self, config: &CoverConfig) -> Rect {
        let bottom = self.y - self.height * config.descender_ratio;
        Rect::new(self.x, bottom, self.width, self.height * config.height_factor)
            .padded(config.padding)
    }

    fn near(&self, other: &TextRegion, dx: f64, dy: f64) -> bool {
        self.page_index == other.page_index
            && (self.x - other.x).abs() < dx
            && (self.y - other.y).abs() < dy
            && self.text == other.text
    }
}

/// A located image placement, already padded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRegion {
    pub page_index: usize,
    pub rect: Rect,
}

/// Text regions accepted so far on one request.
///
/// Several detection passes may find the same span; a region close to an
/// accepted one with the same matched text is dropped, and so is matched
/// text that is only bullets or punctuation.
#[derive(Debug, Clone)]
pub struct TextRegionSet {
    regions: Vec<TextRegion>,
    dx: f64,
    dy: f64,
}

impl TextRegionSet {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self {
            regions: Vec::new(),
            dx,
            dy,
        }
    }

    /// Returns whether the region was accepted.
    pub fn insert(&mut self, region: TextRegion) -> bool {
        if is_noise(&region.text) {
            return false;
        }
        if self
            .regions
            .iter()
            .any(|existing| existing.near(&region, self.dx, self.dy))
        {
            return false;
        }
        self.regions.push(region);
        true
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn into_vec(self) -> Vec<TextRegion> {
        self.regions
    }
}

/// Bullets, dashes and other glyphs with no letter or digit.
pub fn is_noise(text: &str) -> bool {
    !text.chars().any(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: f64, y: f64, text: &str) -> TextRegion {
        TextRegion {
            page_index: 0,
            x,
            y,
            width: 40.0,
            height: 10.0,
            text: text.to_string(),
            category: Category::Email,
        }
    }

    #[test]
    fn test_near_duplicates_collapse() {
        let mut set = TextRegionSet::new(10.0, 5.0);
        assert!(set.insert(region(100.0, 700.0, "a@b.pl")));
        assert!(!set.insert(region(108.0, 703.0, "a@b.pl")));
        assert!(set.insert(region(100.0, 700.0, "other text")));
        assert!(set.insert(region(120.0, 700.0, "a@b.pl")));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_other_page_is_not_duplicate() {
        let mut set = TextRegionSet::new(10.0, 5.0);
        set.insert(region(100.0, 700.0, "a@b.pl"));
        let mut second = region(100.0, 700.0, "a@b.pl");
        second.page_index = 1;
        assert!(set.insert(second));
    }

    #[test]
    fn test_noise_rejected() {
        let mut set = TextRegionSet::new(10.0, 5.0);
        assert!(!set.insert(region(0.0, 0.0, "•")));
        assert!(!set.insert(region(0.0, 0.0, " * ")));
        assert!(!set.insert(region(0.0, 0.0, "")));
        assert!(!set.insert(region(0.0, 0.0, "|")));
        assert!(set.is_empty());
    }

    #[test]
    fn test_cover_geometry() {
        let cover = region(100.0, 700.0, "x").cover(&CoverConfig::default());
        assert_eq!(cover.x, 98.0);
        assert_eq!(cover.y, 700.0 - 2.5 - 2.0);
        assert_eq!(cover.width, 44.0);
        assert_eq!(cover.height, 14.0 + 4.0);
    }
}
