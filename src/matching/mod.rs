//! Spatial Matcher: turns page text runs plus candidates into text regions.
//!
//! Each page is chunked, then every chunk is checked against every
//! candidate (semantic match) and against the safety net patterns
//! (syntactic match). Both passes feed one [`TextRegionSet`], which drops
//! near-duplicates and noise glyphs.

pub mod chunk;
pub mod rules;
pub mod safety_net;

pub use chunk::{build_chunks, TextChunk};
pub use rules::{normalize_name, normalize_strict, MatchRules};
pub use safety_net::{PatternHit, SafetyNet};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::config::MatchConfig;
use crate::domain::{Candidate, Category};
use crate::layout::{PageText, TextRun};
use crate::region::{is_noise, TextRegion, TextRegionSet};

#[derive(Debug, Clone, Default)]
pub struct SpatialMatcher {
    config: MatchConfig,
    safety_net: SafetyNet,
    cancel: Option<Arc<AtomicBool>>,
}

impl SpatialMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            safety_net: SafetyNet::new(),
            cancel: None,
        }
    }

    /// Stops matching at the next page boundary once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Locates every candidate and safety-net hit on every page.
    ///
    /// Photo candidates are skipped; images are located from drawing
    /// instructions instead.
    pub fn locate(&self, pages: &[PageText], candidates: &[Candidate]) -> Vec<TextRegion> {
        let rules = MatchRules::new(&self.config);
        let textual: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| c.category != Category::Photo)
            .collect();
        let mut regions = TextRegionSet::new(self.config.dedupe_dx, self.config.dedupe_dy);

        for page in pages {
            if self.cancelled() {
                debug!(page = page.page_index, "matching cancelled");
                break;
            }
            let before = regions.len();
            let chunks = build_chunks(&page.runs, &self.config);

            for chunk in &chunks {
                for candidate in &textual {
                    if !rules.is_match(&chunk.text, candidate) {
                        continue;
                    }
                    for run in &chunk.runs {
                        if !is_noise(&run.text) {
                            regions.insert(region(run, &chunk.text, candidate.category));
                        }
                    }
                }

                for hit in self.safety_net.scan(chunk) {
                    for run in &hit.runs {
                        regions.insert(region(run, &hit.text, hit.category));
                    }
                }
            }

            debug!(
                page = page.page_index,
                runs = page.runs.len(),
                chunks = chunks.len(),
                regions = regions.len() - before,
                "matched page"
            );
        }

        regions.into_vec()
    }
}

fn region(run: &TextRun, text: &str, category: Category) -> TextRegion {
    TextRegion {
        page_index: run.page_index,
        x: run.x,
        y: run.y,
        width: run.width,
        height: run.height,
        text: text.to_string(),
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact_page() -> PageText {
        let words = ["Kontakt:", "jan.kowalski@gmail.com", "|", "123", "456", "789"];
        let mut x = 50.0;
        let runs = words
            .iter()
            .map(|w| {
                let run = TextRun::new(0, *w, x, 700.0, 6.0 * w.len() as f64, 10.0);
                x += run.width + 3.0;
                run
            })
            .collect();
        PageText {
            page_index: 0,
            runs,
        }
    }

    fn name_page() -> PageText {
        PageText {
            page_index: 0,
            runs: vec![
                TextRun::new(0, "Maciej", 0.0, 800.0, 36.0, 18.0),
                TextRun::new(0, "Kowalczyk", 50.0, 800.0, 54.0, 18.0),
                TextRun::new(0, "•", 0.0, 600.0, 4.0, 10.0),
                TextRun::new(0, "Rust", 10.0, 600.0, 24.0, 10.0),
            ],
        }
    }

    #[test]
    fn test_safety_net_alone_finds_contact_data() {
        let regions = SpatialMatcher::default().locate(&[contact_page()], &[]);
        let email: Vec<_> = regions
            .iter()
            .filter(|r| r.category == Category::Email)
            .collect();
        let phone: Vec<_> = regions
            .iter()
            .filter(|r| r.category == Category::Phone)
            .collect();
        assert_eq!(email.len(), 1);
        assert_eq!(email[0].text, "jan.kowalski@gmail.com");
        assert_eq!(phone.len(), 3);
        assert!(regions.iter().all(|r| r.text != "|"));
    }

    #[test]
    fn test_name_chunk_emits_region_per_run() {
        let candidates = [Candidate::new("Maciej Kowalczyk", Category::Name)];
        let regions = SpatialMatcher::default().locate(&[name_page()], &candidates);
        assert_eq!(regions.len(), 2);
        assert!(regions.iter().all(|r| r.text == "Maciej Kowalczyk"));
        assert_eq!(regions[1].x, 50.0);
    }

    #[test]
    fn test_semantic_and_safety_net_duplicates_collapse() {
        let candidates = [Candidate::new("123 456 789", Category::Phone)];
        let page = PageText {
            page_index: 0,
            runs: vec![TextRun::new(0, "123 456 789", 20.0, 500.0, 60.0, 10.0)],
        };
        let regions = SpatialMatcher::default().locate(&[page], &candidates);
        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn test_photo_candidates_ignored() {
        let candidates = [Candidate::new("Maciej Kowalczyk", Category::Photo)];
        let regions = SpatialMatcher::default().locate(&[name_page()], &candidates);
        assert!(regions.is_empty());
    }

    #[test]
    fn test_cancelled_matcher_stops_at_page_boundary() {
        let flag = Arc::new(AtomicBool::new(false));
        let matcher = SpatialMatcher::default().with_cancel(Arc::clone(&flag));
        assert_eq!(matcher.locate(&[contact_page()], &[]).len(), 4);

        flag.store(true, Ordering::Relaxed);
        assert!(matcher.locate(&[contact_page()], &[]).is_empty());
    }

    #[test]
    fn test_no_candidates_on_clean_page() {
        let regions = SpatialMatcher::default().locate(&[name_page()], &[]);
        assert!(regions.is_empty());
    }
}
