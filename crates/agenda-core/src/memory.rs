//! In-memory document source
//!
//! Holds pre-positioned text lines per page. Useful when text has already
//! been extracted elsewhere, and as a deterministic source in tests.
//! Coordinates follow PDF user space: the origin is bottom-left and `y`
//! grows upward, so reading order is descending `y`.

use crate::error::SourceError;
use crate::geometry::Rect;
use crate::source::DocumentSource;

const DEFAULT_LEFT_MARGIN: f64 = 72.0;
const DEFAULT_LINE_STEP: f64 = 14.0;

/// A line of text anchored at its baseline origin
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPage {
    bounds: Rect,
    marks: Vec<Rect>,
    lines: Vec<PlacedLine>,
}

impl MemoryPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, width, height),
            marks: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Empty US Letter page
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    pub fn with_mark(mut self, rect: Rect) -> Self {
        self.marks.push(rect);
        self
    }

    pub fn with_line(mut self, x: f64, y: f64, text: impl Into<String>) -> Self {
        self.lines.push(PlacedLine {
            x,
            y,
            text: text.into(),
        });
        self
    }

    /// Stack `lines` downward from `top`, one line every 14 points
    pub fn with_column(mut self, x: f64, top: f64, lines: &[&str]) -> Self {
        for (idx, text) in lines.iter().enumerate() {
            self.lines.push(PlacedLine {
                x,
                y: top - idx as f64 * DEFAULT_LINE_STEP,
                text: (*text).to_string(),
            });
        }
        self
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    fn text_in(&self, clip: Option<&Rect>) -> String {
        let mut visible: Vec<&PlacedLine> = self
            .lines
            .iter()
            .filter(|line| clip.map_or(true, |rect| rect.contains(line.x, line.y)))
            .collect();

        visible.sort_by(|a, b| {
            b.y.partial_cmp(&a.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        });

        visible
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: MemoryPage) -> Self {
        self.pages.push(page);
        self
    }

    /// Single page holding `text` line by line in the left column.
    /// The page grows taller than Letter when the text needs it.
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let needed = 2.0 * DEFAULT_LEFT_MARGIN + lines.len() as f64 * DEFAULT_LINE_STEP;
        let height = needed.max(792.0);
        let page = MemoryPage::new(612.0, height).with_column(
            DEFAULT_LEFT_MARGIN,
            height - DEFAULT_LEFT_MARGIN,
            &lines,
        );
        Self::new().with_page(page)
    }

    fn page(&self, page: usize) -> Result<&MemoryPage, SourceError> {
        self.pages.get(page).ok_or(SourceError::PageOutOfRange {
            page,
            count: self.pages.len(),
        })
    }
}

impl DocumentSource for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_bounds(&self, page: usize) -> Result<Rect, SourceError> {
        Ok(self.page(page)?.bounds)
    }

    fn marked_rects(&self, page: usize) -> Result<Vec<Rect>, SourceError> {
        Ok(self.page(page)?.marks.clone())
    }

    fn text_in(&self, page: usize, clip: Option<&Rect>) -> Result<String, SourceError> {
        Ok(self.page(page)?.text_in(clip))
    }
}
