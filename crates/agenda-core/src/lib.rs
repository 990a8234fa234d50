//! Agenda proposal extraction and comparison
//!
//! This crate locates the agenda region of two related documents, splits
//! each region into labeled proposal items and compares the items label by
//! label.
//!
//! Documents are read through the [`DocumentSource`] trait:
//! - [`MemoryDocument`]: pre-positioned text lines, no parsing
//! - `agenda_pdf::PdfSource`: PDF files via lopdf
//!
//! The entry point is [`compare_documents`], or [`ComparisonPipeline`] for
//! a custom [`LabelGrammar`].

pub mod compare;
pub mod error;
pub mod geometry;
pub mod grammar;
pub mod memory;
pub mod normalize;
pub mod options;
pub mod pipeline;
pub mod region;
pub mod segment;
pub mod source;

pub use compare::{
    compare_contents, compare_items, compare_positional, ComparisonResult, DocumentRole,
    MismatchReason, Status,
};
pub use error::{CompareError, SourceError};
pub use geometry::Rect;
pub use grammar::{LabelGrammar, LabelKind, LabelMatch};
pub use memory::{MemoryDocument, MemoryPage};
pub use normalize::collapse_whitespace;
pub use options::{Alignment, CompareOptions, DocumentLabels};
pub use pipeline::{
    compare_documents, ComparisonPipeline, ComparisonRun, DocumentExtraction, RunOutcome,
    StatusCounts,
};
pub use region::{Region, RegionLocator, RegionSource, RegionText};
pub use segment::{segment, segment_region, Item, ItemList, NOTE_LABEL};
pub use source::DocumentSource;
