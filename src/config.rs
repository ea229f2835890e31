//! Tunable thresholds for matching, image location and cover drawing.
//!
//! Every field defaults to the value the pipeline was calibrated with, so
//! `RedactionConfig::default()` is the production configuration. A partial
//! JSON file only needs the fields it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RedactorError, RedactorResult};

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    pub matching: MatchConfig,
    pub images: ImageConfig,
    pub cover: CoverConfig,
}

/// Spatial Matcher thresholds, in page units unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Maximum baseline delta for two runs to share a line.
    pub baseline_tolerance: f64,
    /// How far right of a run a neighbour may start and still be chunked.
    pub chunk_reach: f64,
    /// Names longer than this (in chars) fall through to the generic rules.
    pub name_max_len: usize,
    /// Allowed length difference for a name containment match.
    pub name_len_slack: usize,
    /// Mappings up to this length (in chars) count as short tokens.
    pub short_max_len: usize,
    /// Allowed length difference for a short-token containment match.
    pub short_len_slack: usize,
    pub dedupe_dx: f64,
    pub dedupe_dy: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            baseline_tolerance: 5.0,
            chunk_reach: 300.0,
            name_max_len: 30,
            name_len_slack: 3,
            short_max_len: 15,
            short_len_slack: 2,
            dedupe_dx: 10.0,
            dedupe_dy: 5.0,
        }
    }
}

/// Image Locator heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Exclusive lower bound for both approximate width and height.
    pub min_size: f64,
    /// Exclusive upper bound for both approximate width and height.
    pub max_size: f64,
    /// Images must start within this distance from the top of page one.
    pub top_band: f64,
    /// How far above the page top an image may start.
    pub top_tolerance: f64,
    /// Multiplier applied to the transform's scale vectors.
    pub base_unit: f64,
    pub padding: f64,
    pub dedupe_tolerance: f64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            min_size: 50.0,
            max_size: 300.0,
            top_band: 300.0,
            top_tolerance: 100.0,
            base_unit: 100.0,
            padding: 5.0,
            dedupe_tolerance: 30.0,
        }
    }
}

/// Geometry of the opaque rectangle drawn over a matched text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    /// Fraction of the glyph height the cover extends below the baseline.
    pub descender_ratio: f64,
    /// Total cover height as a multiple of the glyph height.
    pub height_factor: f64,
    pub padding: f64,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            descender_ratio: 0.25,
            height_factor: 1.4,
            padding: 2.0,
        }
    }
}

impl RedactionConfig {
    /// Loads a configuration from a JSON file, filling unspecified fields
    /// with their defaults.
    pub fn from_json_file(path: &Path) -> RedactorResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| RedactorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that would make the heuristics meaningless.
    pub fn validate(&self) -> RedactorResult<()> {
        let invalid = |parameter: &str, reason: &str| RedactorError::InvalidInput {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        };

        if self.matching.baseline_tolerance < 0.0 || self.matching.chunk_reach < 0.0 {
            return Err(invalid("matching", "tolerances must be non-negative"));
        }
        if self.images.min_size >= self.images.max_size {
            return Err(invalid("images.min_size", "must be below images.max_size"));
        }
        if self.images.base_unit <= 0.0 {
            return Err(invalid("images.base_unit", "must be positive"));
        }
        if self.cover.height_factor <= 0.0 {
            return Err(invalid("cover.height_factor", "must be positive"));
        }
        Ok(())
    }

    pub fn with_matching(mut self, matching: MatchConfig) -> Self {
        self.matching = matching;
        self
    }

    pub fn with_images(mut self, images: ImageConfig) -> Self {
        self.images = images;
        self
    }

    pub fn with_cover(mut self, cover: CoverConfig) -> Self {
        self.cover = cover;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RedactionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: RedactionConfig =
            serde_json::from_str(r#"{ "images": { "base_unit": 1.0 } }"#).unwrap();
        assert_eq!(config.images.base_unit, 1.0);
        assert_eq!(config.images.max_size, 300.0);
        assert_eq!(config.matching, MatchConfig::default());
    }

    #[test]
    fn test_inverted_image_bounds_rejected() {
        let config = RedactionConfig::default().with_images(ImageConfig {
            min_size: 400.0,
            ..ImageConfig::default()
        });
        assert!(config.validate().is_err());
    }
}
