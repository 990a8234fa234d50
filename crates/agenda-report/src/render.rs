//! Report renderers

use agenda_core::{ComparisonResult, DocumentRole};
use tracing::debug;

use crate::error::ReportError;
use crate::model::Report;
use crate::pdf::{wrap, PageWriter};

const EMPTY_MARKER: &str = "[EMPTY]";
const NO_DIFF_MARKER: &str = "[diff unavailable]";

const TITLE_SIZE: f64 = 14.0;
const HEADING_SIZE: f64 = 10.0;
const BODY_SIZE: f64 = 9.0;
const DIFF_SIZE: f64 = 8.0;
const BODY_COLUMNS: usize = 100;
const DIFF_COLUMNS: usize = 115;

pub trait ReportRenderer {
    fn render(&self, report: &Report) -> Result<Vec<u8>, ReportError>;

    /// File extension for the rendered artifact, without the dot
    fn extension(&self) -> &'static str;
}

fn content_or_empty(text: Option<&str>) -> &str {
    match text {
        Some(text) if !text.is_empty() => text,
        _ => EMPTY_MARKER,
    }
}

fn detail_header(result: &ComparisonResult) -> String {
    format!("Label: {}   Status: {}", result.label, result.status)
}

/// Title page, summary lines, then one detail page per label
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReportRenderer;

impl PdfReportRenderer {
    fn title_page(&self, report: &Report, writer: &mut PageWriter) -> Result<(), ReportError> {
        writer.new_page()?;
        writer.line(&report.title, TITLE_SIZE, 0.0)?;
        writer.line(
            &format!("Generated: {}", report.generated_label()),
            HEADING_SIZE,
            0.0,
        )?;
        writer.gap(HEADING_SIZE);

        for role in [DocumentRole::A, DocumentRole::B] {
            writer.paragraph(&report.document_line(role), HEADING_SIZE, 0.0, BODY_COLUMNS)?;
        }
        writer.gap(HEADING_SIZE);

        writer.line("Rules applied:", HEADING_SIZE, 0.0)?;
        for rule in report.rules() {
            writer.line(&format!("- {}", rule), BODY_SIZE, 4.0)?;
        }
        writer.gap(HEADING_SIZE);

        if let Some(banner) = report.banner() {
            writer.paragraph(&banner, HEADING_SIZE, 0.0, BODY_COLUMNS)?;
            writer.gap(HEADING_SIZE);
        }

        writer.line("Summary:", HEADING_SIZE, 0.0)?;
        writer.line(&report.summary_line(), BODY_SIZE, 4.0)?;
        for result in &report.run.results {
            writer.line(
                &format!("{}: {}", result.label, result.status),
                BODY_SIZE,
                4.0,
            )?;
        }
        Ok(())
    }

    fn detail_page(
        &self,
        report: &Report,
        result: &ComparisonResult,
        writer: &mut PageWriter,
    ) -> Result<(), ReportError> {
        writer.new_page()?;
        writer.line(&detail_header(result), HEADING_SIZE, 0.0)?;
        if let Some(reason) = &result.reason {
            writer.paragraph(&format!("Reason: {}", reason), HEADING_SIZE, 0.0, BODY_COLUMNS)?;
        }
        writer.gap(HEADING_SIZE);

        let sides = [
            (DocumentRole::A, result.text_a.as_deref()),
            (DocumentRole::B, result.text_b.as_deref()),
        ];
        for (role, text) in sides {
            writer.line(
                &format!("{} text:", report.document_name(role)),
                BODY_SIZE,
                0.0,
            )?;
            writer.paragraph(content_or_empty(text), BODY_SIZE, 0.0, BODY_COLUMNS)?;
            writer.gap(BODY_SIZE);
        }

        if !result.is_match() {
            writer.line("Word diff:", BODY_SIZE, 0.0)?;
            let diff = result.diff.as_deref().unwrap_or(NO_DIFF_MARKER);
            writer.paragraph(diff, DIFF_SIZE, 0.0, DIFF_COLUMNS)?;
        }
        Ok(())
    }
}

impl ReportRenderer for PdfReportRenderer {
    fn render(&self, report: &Report) -> Result<Vec<u8>, ReportError> {
        let mut writer = PageWriter::new();
        self.title_page(report, &mut writer)?;
        for result in &report.run.results {
            self.detail_page(report, result, &mut writer)?;
        }
        let bytes = writer.finish()?;
        debug!(
            results = report.run.results.len(),
            bytes = bytes.len(),
            "Rendered PDF report"
        );
        Ok(bytes)
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }
}

/// Plain-text rendition with the same sections as the PDF
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReportRenderer;

impl TextReportRenderer {
    pub fn to_text(&self, report: &Report) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", report.title));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("Generated: {}\n\n", report.generated_label()));
        output.push_str(&format!("{}\n", report.document_line(DocumentRole::A)));
        output.push_str(&format!("{}\n\n", report.document_line(DocumentRole::B)));

        output.push_str("Rules applied:\n");
        for rule in report.rules() {
            output.push_str(&format!(" - {}\n", rule));
        }
        output.push('\n');

        if let Some(banner) = report.banner() {
            output.push_str(&format!("!! {}\n\n", banner));
        }

        output.push_str("Summary:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!("{}\n", report.summary_line()));
        for result in &report.run.results {
            output.push_str(&format!("{}: {}\n", result.label, result.status));
        }

        for result in &report.run.results {
            output.push('\n');
            output.push_str(&detail_header(result));
            output.push('\n');
            output.push_str(&"-".repeat(40));
            output.push('\n');
            if let Some(reason) = &result.reason {
                output.push_str(&format!("Reason: {}\n", reason));
            }
            for (role, text) in [
                (DocumentRole::A, result.text_a.as_deref()),
                (DocumentRole::B, result.text_b.as_deref()),
            ] {
                output.push_str(&format!("{} text:\n", report.document_name(role)));
                for piece in wrap(content_or_empty(text), BODY_COLUMNS) {
                    output.push_str(&format!("    {}\n", piece));
                }
            }
            if !result.is_match() {
                let diff = result.diff.as_deref().unwrap_or(NO_DIFF_MARKER);
                output.push_str(&format!("Word diff:\n    {}\n", diff));
            }
        }

        output
    }
}

impl ReportRenderer for TextReportRenderer {
    fn render(&self, report: &Report) -> Result<Vec<u8>, ReportError> {
        Ok(self.to_text(report).into_bytes())
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportRenderer;

impl ReportRenderer for JsonReportRenderer {
    fn render(&self, report: &Report) -> Result<Vec<u8>, ReportError> {
        Ok(serde_json::to_vec_pretty(report)?)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
