//! Comparison reports
//!
//! [`Report`] captures one comparison run with its document identifiers and
//! generation time. Renderers turn it into bytes:
//! - [`PdfReportRenderer`]: title page, summary, one detail page per label
//! - [`TextReportRenderer`]: the same sections as plain text
//! - [`JsonReportRenderer`]: the whole report as pretty JSON

pub mod error;
pub mod model;
pub mod pdf;
pub mod render;

pub use error::ReportError;
pub use model::{Report, REPORT_TITLE};
pub use render::{JsonReportRenderer, PdfReportRenderer, ReportRenderer, TextReportRenderer};
