//! Report data contract shared by every renderer

use agenda_core::{Alignment, ComparisonRun, DocumentRole, RunOutcome, StatusCounts};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub const REPORT_TITLE: &str = "Agenda Comparison Report";

const POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub generated_at: DateTime<Local>,
    /// Identifier of document A, usually its path
    pub document_a: String,
    /// Identifier of document B, usually its path
    pub document_b: String,
    pub summary: StatusCounts,
    pub run: ComparisonRun,
}

impl Report {
    pub fn new(
        run: ComparisonRun,
        document_a: impl Into<String>,
        document_b: impl Into<String>,
        generated_at: DateTime<Local>,
    ) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            generated_at,
            document_a: document_a.into(),
            document_b: document_b.into(),
            summary: run.counts(),
            run,
        }
    }

    pub fn summary(&self) -> StatusCounts {
        self.summary
    }

    pub fn generated_label(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn document_name(&self, role: DocumentRole) -> &str {
        self.run.options.labels.name(role)
    }

    /// `proxy (A): path/to/proxy.pdf`
    pub fn document_line(&self, role: DocumentRole) -> String {
        let id = match role {
            DocumentRole::A => &self.document_a,
            DocumentRole::B => &self.document_b,
        };
        let region = self.run.region(role);
        format!(
            "{} ({}): {} [page {}, {:?} region]",
            self.document_name(role),
            role,
            id,
            region.page + 1,
            region.source
        )
    }

    /// Comparison rules in effect for this run
    pub fn rules(&self) -> Vec<String> {
        let options = &self.run.options;
        let mut rules = vec![
            format!(
                "Left column up to {:.1} in ({} pts) or rectangle annotation if present",
                options.left_clip_width / POINTS_PER_INCH,
                options.left_clip_width
            ),
            "Soft returns and line breaks collapsed before comparing".to_string(),
            "Exact match required (case & punctuation). Any difference is a mismatch".to_string(),
        ];
        rules.push(if options.include_note {
            "Note block is included (if present)".to_string()
        } else {
            "Note block is excluded".to_string()
        });
        if options.alignment == Alignment::Positional {
            rules.push("Items paired by position, not by label".to_string());
        }
        rules
    }

    /// Warning shown when a document produced no labeled items
    pub fn banner(&self) -> Option<String> {
        let RunOutcome::NoLabelsFound { documents } = &self.run.outcome else {
            return None;
        };
        let names: Vec<String> = documents
            .iter()
            .map(|role| format!("{} ({})", self.document_name(*role), role))
            .collect();
        Some(format!(
            "NO LABELS FOUND in {}. This comparison is incomplete.",
            names.join(" and ")
        ))
    }

    pub fn summary_line(&self) -> String {
        let counts = self.summary;
        format!(
            "{} labels: {} match, {} mismatch, {} missing in {}, {} missing in {}",
            counts.total(),
            counts.matched,
            counts.mismatched,
            counts.missing_in_a,
            self.document_name(DocumentRole::A),
            counts.missing_in_b,
            self.document_name(DocumentRole::B),
        )
    }
}
