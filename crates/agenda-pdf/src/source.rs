//! [`DocumentSource`] over a loaded lopdf document

use std::path::Path;

use agenda_core::{DocumentSource, Rect, SourceError};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use crate::cmap::page_fonts;
use crate::error::PdfSourceError;
use crate::text::{clipped_text, extract_spans};

/// Annotation subtypes that are never human markings
const IGNORED_SUBTYPES: &[&[u8]] = &[b"Link", b"Popup", b"Widget"];

/// Guards `Parent` walks against reference cycles
const MAX_INHERIT_DEPTH: usize = 32;

pub struct PdfSource {
    id: String,
    doc: Document,
    pages: Vec<ObjectId>,
}

impl std::fmt::Debug for PdfSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfSource")
            .field("id", &self.id)
            .field("pages", &self.pages.len())
            .finish()
    }
}

impl PdfSource {
    /// Load a PDF from disk. The path doubles as the document id.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PdfSourceError> {
        let path = path.as_ref();
        let id = path.display().to_string();
        let doc = Document::load(path).map_err(|e| PdfSourceError::Load {
            id: id.clone(),
            message: e.to_string(),
        })?;
        Self::from_document(doc, id)
    }

    pub fn from_bytes(bytes: &[u8], id: impl Into<String>) -> Result<Self, PdfSourceError> {
        let id = id.into();
        let doc = Document::load_mem(bytes).map_err(|e| PdfSourceError::Load {
            id: id.clone(),
            message: e.to_string(),
        })?;
        Self::from_document(doc, id)
    }

    pub fn from_document(doc: Document, id: impl Into<String>) -> Result<Self, PdfSourceError> {
        let id = id.into();
        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(PdfSourceError::Encrypted(id));
        }

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if pages.is_empty() {
            return Err(PdfSourceError::NoPages(id));
        }

        debug!(id = %id, pages = pages.len(), "Loaded PDF");
        Ok(Self { id, doc, pages })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn page_id(&self, page: usize) -> Result<ObjectId, SourceError> {
        self.pages
            .get(page)
            .copied()
            .ok_or(SourceError::PageOutOfRange {
                page,
                count: self.pages.len(),
            })
    }

    fn page_dict(&self, page: usize) -> Result<&Dictionary, SourceError> {
        let page_id = self.page_id(page)?;
        self.doc
            .get_dictionary(page_id)
            .map_err(|e| unreadable(page, e))
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        match object {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    /// Look `key` up on the page, then on each `Parent` in turn
    fn inherited<'a>(&'a self, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut dict = page;
        for _ in 0..MAX_INHERIT_DEPTH {
            if let Ok(value) = dict.get(key) {
                return self.resolve(value);
            }
            let parent = dict.get(b"Parent").ok().and_then(|p| self.resolve(p))?;
            dict = parent.as_dict().ok()?;
        }
        None
    }

    fn rect_from(&self, object: &Object) -> Option<Rect> {
        let Object::Array(values) = self.resolve(object)? else {
            return None;
        };
        if values.len() != 4 {
            return None;
        }
        let mut coords = [0.0; 4];
        for (slot, value) in coords.iter_mut().zip(values) {
            *slot = match self.resolve(value)? {
                Object::Integer(i) => *i as f64,
                Object::Real(r) => *r as f64,
                _ => return None,
            };
        }
        Some(Rect::new(coords[0], coords[1], coords[2], coords[3]))
    }
}

fn unreadable(page: usize, err: impl std::fmt::Display) -> SourceError {
    SourceError::PageUnreadable {
        page,
        message: err.to_string(),
    }
}

impl DocumentSource for PdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// `CropBox`, else `MediaBox`, else US Letter
    fn page_bounds(&self, page: usize) -> Result<Rect, SourceError> {
        let dict = self.page_dict(page)?;
        let bounds = [b"CropBox".as_slice(), b"MediaBox".as_slice()]
            .into_iter()
            .find_map(|key| self.inherited(dict, key).and_then(|obj| self.rect_from(obj)));
        Ok(bounds.unwrap_or_else(Rect::letter))
    }

    fn marked_rects(&self, page: usize) -> Result<Vec<Rect>, SourceError> {
        let dict = self.page_dict(page)?;
        let Some(annots) = dict.get(b"Annots").ok().and_then(|a| self.resolve(a)) else {
            return Ok(Vec::new());
        };
        let Object::Array(annots) = annots else {
            return Err(unreadable(page, "Annots is not an array"));
        };

        let mut rects = Vec::new();
        for annot in annots {
            let Some(annot) = self.resolve(annot).and_then(|a| a.as_dict().ok()) else {
                continue;
            };
            let subtype = annot
                .get(b"Subtype")
                .ok()
                .and_then(|s| s.as_name().ok())
                .unwrap_or_default();
            if IGNORED_SUBTYPES.iter().any(|ignored| *ignored == subtype) {
                continue;
            }
            match annot.get(b"Rect").ok().and_then(|r| self.rect_from(r)) {
                Some(rect) => rects.push(rect),
                None => debug!(page, "Annotation without a usable Rect"),
            }
        }
        Ok(rects)
    }

    fn text_in(&self, page: usize, clip: Option<&Rect>) -> Result<String, SourceError> {
        let page_id = self.page_id(page)?;
        let data = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| unreadable(page, e))?;
        let content = Content::decode(&data).map_err(|e| unreadable(page, e))?;
        let fonts = page_fonts(&self.doc, page_id);
        Ok(clipped_text(extract_spans(&content.operations, &fonts), clip))
    }
}
