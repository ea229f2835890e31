//! Groups glyphs reported by `pdf-extract` into word-level runs.

use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};

use super::{PageText, TextRun};

/// Fraction of the glyph height a baseline may drift within one run.
const BASELINE_DRIFT: f64 = 0.2;
/// Horizontal gap, as a fraction of the glyph height, that starts a new run.
const WORD_GAP: f64 = 0.3;

#[derive(Debug)]
struct PendingRun {
    text: String,
    x: f64,
    y: f64,
    end_x: f64,
    height: f64,
}

impl PendingRun {
    fn continues_at(&self, x: f64, y: f64, height: f64) -> bool {
        let scale = self.height.max(height).max(f64::EPSILON);
        (y - self.y).abs() <= scale * BASELINE_DRIFT
            && x - self.end_x <= scale * WORD_GAP
            && x >= self.x
    }
}

/// [`OutputDev`] that records runs instead of rendering.
#[derive(Debug, Default)]
pub(crate) struct RunCollector {
    pages: Vec<PageText>,
    page: Option<PageText>,
    run: Option<PendingRun>,
}

impl RunCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn finish(mut self) -> Vec<PageText> {
        self.close_page();
        self.pages
    }

    fn flush(&mut self) {
        let (Some(run), Some(page)) = (self.run.take(), self.page.as_mut()) else {
            return;
        };
        if run.text.is_empty() {
            return;
        }
        page.runs.push(TextRun::new(
            page.page_index,
            run.text,
            run.x,
            run.y,
            (run.end_x - run.x).max(0.0),
            run.height,
        ));
    }

    fn close_page(&mut self) {
        self.flush();
        if let Some(page) = self.page.take() {
            self.pages.push(page);
        }
    }
}

impl OutputDev for RunCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.close_page();
        self.page = Some(PageText {
            page_index: page_num.saturating_sub(1) as usize,
            runs: Vec::new(),
        });
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        self.close_page();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        spacing: f64,
        font_size: f64,
        char: &str,
    ) -> Result<(), OutputError> {
        if char.trim().is_empty() {
            self.flush();
            return Ok(());
        }

        let (x, y) = (trm.m31, trm.m32);
        let height = font_size * trm.m21.hypot(trm.m22);
        let advance = (width * font_size + spacing) * trm.m11.hypot(trm.m12);

        match self.run.as_mut() {
            Some(run) if run.continues_at(x, y, height) => {
                run.text.push_str(char);
                run.end_x = run.end_x.max(x + advance);
                run.height = run.height.max(height);
            }
            _ => {
                self.flush();
                self.run = Some(PendingRun {
                    text: char.to_string(),
                    x,
                    y,
                    end_x: x + advance,
                    height,
                });
            }
        }
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        self.flush();
        Ok(())
    }
}
