//! Greedy same-baseline merging of text runs into chunks.

use std::ops::Range;

use crate::config::MatchConfig;
use crate::layout::TextRun;

/// Runs on one baseline treated as a single unit for matching.
#[derive(Debug, Clone)]
pub struct TextChunk<'a> {
    /// Trimmed run texts joined with single spaces, left to right.
    pub text: String,
    pub runs: Vec<&'a TextRun>,
    /// Byte range of each run's text inside `text`, parallel to `runs`.
    spans: Vec<Range<usize>>,
}

impl<'a> TextChunk<'a> {
    fn from_runs(runs: Vec<&'a TextRun>) -> Self {
        let mut text = String::new();
        let mut spans = Vec::with_capacity(runs.len());
        for run in &runs {
            if !text.is_empty() {
                text.push(' ');
            }
            let start = text.len();
            text.push_str(run.text.trim());
            spans.push(start..text.len());
        }
        Self { text, runs, spans }
    }

    /// Runs whose text overlaps the byte range `hit` of the chunk text.
    pub fn runs_overlapping(&self, hit: &Range<usize>) -> Vec<&'a TextRun> {
        self.runs
            .iter()
            .zip(&self.spans)
            .filter(|(_, span)| span.start < hit.end && hit.start < span.end)
            .map(|(run, _)| *run)
            .collect()
    }
}

/// Clusters a page's runs into chunks.
///
/// Each unconsumed run in source order becomes an anchor; every other
/// unconsumed run within the baseline tolerance that starts to the right of
/// the anchor, inside the configured reach, joins its chunk.
pub fn build_chunks<'a>(runs: &'a [TextRun], config: &MatchConfig) -> Vec<TextChunk<'a>> {
    let mut consumed = vec![false; runs.len()];
    let mut chunks = Vec::new();

    for (i, anchor) in runs.iter().enumerate() {
        if consumed[i] {
            continue;
        }
        consumed[i] = true;

        let mut members = vec![anchor];
        for (j, other) in runs.iter().enumerate() {
            if consumed[j] {
                continue;
            }
            let same_line = (other.y - anchor.y).abs() < config.baseline_tolerance;
            let in_reach = other.x > anchor.x && other.x < anchor.x + config.chunk_reach;
            if same_line && in_reach {
                consumed[j] = true;
                members.push(other);
            }
        }

        members.sort_by(|a, b| a.x.total_cmp(&b.x));
        chunks.push(TextChunk::from_runs(members));
    }
    chunks
}
