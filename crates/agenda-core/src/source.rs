//! Document text source seam
//!
//! The pipeline never opens files. Callers hand it anything that can report
//! page bounds, marked rectangles and clipped plain text.

use crate::error::SourceError;
use crate::geometry::Rect;

/// Read-only view of a paginated document.
///
/// Pages are 0-indexed. `text_in` must return text in reading order, one
/// visual line per `\n`-separated line, so the label grammar can see line
/// starts.
pub trait DocumentSource {
    fn page_count(&self) -> usize;

    fn page_bounds(&self, page: usize) -> Result<Rect, SourceError>;

    /// Marked rectangles (annotations) on the page, in document order
    fn marked_rects(&self, page: usize) -> Result<Vec<Rect>, SourceError>;

    /// Plain text restricted to `clip`, or the whole page when `None`
    fn text_in(&self, page: usize, clip: Option<&Rect>) -> Result<String, SourceError>;
}

impl<T: DocumentSource + ?Sized> DocumentSource for &T {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn page_bounds(&self, page: usize) -> Result<Rect, SourceError> {
        (**self).page_bounds(page)
    }

    fn marked_rects(&self, page: usize) -> Result<Vec<Rect>, SourceError> {
        (**self).marked_rects(page)
    }

    fn text_in(&self, page: usize, clip: Option<&Rect>) -> Result<String, SourceError> {
        (**self).text_in(page, clip)
    }
}
