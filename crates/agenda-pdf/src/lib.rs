//! PDF document source
//!
//! Implements [`agenda_core::DocumentSource`] over lopdf: page bounds from
//! `CropBox`/`MediaBox`, marked rectangles from page annotations, and
//! clipped text from a reduced content-stream interpreter that decodes
//! strings through each font's `ToUnicode` CMap.

pub mod cmap;
pub mod error;
pub mod source;
pub mod text;

pub use cmap::{FontDecoder, FontMap, ToUnicodeMap};
pub use error::PdfSourceError;
pub use source::PdfSource;
pub use text::{decode_pdf_string, TextLine, TextSpan};
