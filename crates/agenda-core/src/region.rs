//! Agenda region location
//!
//! Resolution order:
//! 1. the first marked rectangle larger than the minimum size, in page
//!    order, grown by a margin and clipped to the page;
//! 2. the first page whose left column holds a label line;
//! 3. the left column of the first page.
//!
//! Per-page read failures in steps 1 and 2 skip the page. Only an empty
//! document or an unreadable fallback page is an error.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::geometry::Rect;
use crate::grammar::LabelGrammar;
use crate::options::CompareOptions;
use crate::source::DocumentSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionSource {
    Marked,
    LabelScan,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// 0-indexed page
    pub page: usize,
    pub rect: Rect,
    pub source: RegionSource,
}

/// A located region together with the text extracted from it
#[derive(Debug, Clone, PartialEq)]
pub struct RegionText {
    pub region: Region,
    pub text: String,
}

pub struct RegionLocator<'a> {
    grammar: &'a LabelGrammar,
    options: &'a CompareOptions,
}

impl<'a> RegionLocator<'a> {
    pub fn new(grammar: &'a LabelGrammar, options: &'a CompareOptions) -> Self {
        Self { grammar, options }
    }

    pub fn locate<S: DocumentSource + ?Sized>(&self, doc: &S) -> Result<RegionText, SourceError> {
        if doc.page_count() == 0 {
            return Err(SourceError::NoPages);
        }

        if let Some(found) = self.find_marked(doc) {
            return Ok(found);
        }

        if let Some(found) = self.scan_left_column(doc) {
            return Ok(found);
        }

        warn!("No marked rectangle or label found, falling back to page 1 left column");
        let bounds = doc.page_bounds(0)?;
        let rect = Rect::left_clip(&bounds, self.options.left_clip_width);
        let text = doc.text_in(0, Some(&rect))?;
        Ok(RegionText {
            region: Region {
                page: 0,
                rect,
                source: RegionSource::Fallback,
            },
            text,
        })
    }

    fn find_marked<S: DocumentSource + ?Sized>(&self, doc: &S) -> Option<RegionText> {
        let min = self.options.min_marked_size;

        for page in 0..doc.page_count() {
            let marks = match doc.marked_rects(page) {
                Ok(marks) => marks,
                Err(e) => {
                    warn!(page, error = %e, "Skipping page: annotations unreadable");
                    continue;
                }
            };

            let Some(mark) = marks
                .into_iter()
                .find(|rect| rect.width() > min && rect.height() > min)
            else {
                continue;
            };

            let read = doc.page_bounds(page).and_then(|bounds| {
                let rect = mark.expand(self.options.marked_margin).clip_to(&bounds);
                doc.text_in(page, Some(&rect)).map(|text| (rect, text))
            });

            match read {
                Ok((rect, text)) => {
                    debug!(page, ?rect, "Using marked rectangle");
                    return Some(RegionText {
                        region: Region {
                            page,
                            rect,
                            source: RegionSource::Marked,
                        },
                        text,
                    });
                }
                Err(e) => {
                    warn!(page, error = %e, "Skipping page: marked region unreadable");
                }
            }
        }

        None
    }

    fn scan_left_column<S: DocumentSource + ?Sized>(&self, doc: &S) -> Option<RegionText> {
        for page in 0..doc.page_count() {
            let read = doc.page_bounds(page).and_then(|bounds| {
                let rect = Rect::left_clip(&bounds, self.options.left_clip_width);
                doc.text_in(page, Some(&rect)).map(|text| (rect, text))
            });

            let (rect, text) = match read {
                Ok(found) => found,
                Err(e) => {
                    warn!(page, error = %e, "Skipping page: left column unreadable");
                    continue;
                }
            };

            if self.grammar.matches_any_line(&text) {
                debug!(page, "Label found in left column");
                return Some(RegionText {
                    region: Region {
                        page,
                        rect,
                        source: RegionSource::LabelScan,
                    },
                    text,
                });
            }
            debug!(page, "No label in left column");
        }

        None
    }
}
