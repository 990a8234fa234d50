//! Minimal paginated text writer on top of lopdf
//!
//! Writes left-aligned Helvetica lines top-down on US Letter pages and
//! starts a new page whenever the cursor passes the bottom margin.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::ReportError;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: f64 = 36.0;
const LINE_GAP: f64 = 3.0;

pub struct PageWriter {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<ObjectId>,
    operations: Vec<Operation>,
    cursor: f64,
    page_open: bool,
}

impl Default for PageWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PageWriter {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        Self {
            doc,
            pages_id,
            font_id,
            kids: Vec::new(),
            operations: Vec::new(),
            cursor: PAGE_HEIGHT as f64 - MARGIN,
            page_open: false,
        }
    }

    /// Close the current page, if any, and open a fresh one
    pub fn new_page(&mut self) -> Result<(), ReportError> {
        self.flush_page()?;
        self.page_open = true;
        self.cursor = PAGE_HEIGHT as f64 - MARGIN;
        Ok(())
    }

    /// Write one line at `indent` points from the left margin
    pub fn line(&mut self, text: &str, size: f64, indent: f64) -> Result<(), ReportError> {
        if !self.page_open || self.cursor - size < MARGIN {
            self.new_page()?;
        }
        self.cursor -= size;

        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), Object::Real(size as f32)]),
            Operation::new(
                "Td",
                vec![
                    Object::Real((MARGIN + indent) as f32),
                    Object::Real(self.cursor as f32),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);

        self.cursor -= LINE_GAP;
        Ok(())
    }

    /// Wrap `text` at `columns` characters and write each piece
    pub fn paragraph(
        &mut self,
        text: &str,
        size: f64,
        indent: f64,
        columns: usize,
    ) -> Result<(), ReportError> {
        for piece in wrap(text, columns) {
            self.line(&piece, size, indent)?;
        }
        Ok(())
    }

    pub fn gap(&mut self, points: f64) {
        self.cursor -= points;
    }

    fn flush_page(&mut self) -> Result<(), ReportError> {
        if !self.page_open {
            return Ok(());
        }
        let content = Content {
            operations: std::mem::take(&mut self.operations),
        };
        let encoded = content
            .encode()
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), encoded));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => self.font_id },
            },
        });
        self.kids.push(page_id);
        self.page_open = false;
        Ok(())
    }

    /// Serialize every written page
    pub fn finish(mut self) -> Result<Vec<u8>, ReportError> {
        self.flush_page()?;

        let kids: Vec<Object> = self.kids.iter().map(|id| Object::Reference(*id)).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| ReportError::Pdf(format!("Save failed: {}", e)))?;
        Ok(buffer)
    }
}

/// Latin-1 bytes for the standard font. Characters outside it become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
        .collect()
}

/// Greedy word wrap. Words longer than a full line are split.
pub fn wrap(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > columns {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(columns);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let current_len = current.chars().count();
        if !current.is_empty() && current_len + 1 + word.len() > columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
