//! Caller-supplied comparison options
//!
//! Nothing here is read from the environment; every run receives its
//! options explicitly.

use serde::{Deserialize, Serialize};

use crate::compare::DocumentRole;

/// 7.5 inches at 72 points per inch
pub const DEFAULT_LEFT_CLIP_WIDTH: f64 = 540.0;
pub const DEFAULT_MIN_MARKED_SIZE: f64 = 10.0;
pub const DEFAULT_MARKED_MARGIN: f64 = 6.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Pair items carrying the same label
    #[default]
    ByLabel,
    /// Pair the Nth item of A with the Nth item of B
    Positional,
}

/// Display names for the two documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLabels {
    pub a: String,
    pub b: String,
}

impl Default for DocumentLabels {
    fn default() -> Self {
        Self {
            a: "proxy".to_string(),
            b: "notice".to_string(),
        }
    }
}

impl DocumentLabels {
    pub fn name(&self, role: DocumentRole) -> &str {
        match role {
            DocumentRole::A => &self.a,
            DocumentRole::B => &self.b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Capture the trailing NOTE block as its own item
    pub include_note: bool,
    /// Width of the left-column clip, in points
    pub left_clip_width: f64,
    /// Marked rectangles must exceed this in both width and height
    pub min_marked_size: f64,
    /// Points added around a marked rectangle
    pub marked_margin: f64,
    pub alignment: Alignment,
    pub labels: DocumentLabels,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            include_note: true,
            left_clip_width: DEFAULT_LEFT_CLIP_WIDTH,
            min_marked_size: DEFAULT_MIN_MARKED_SIZE,
            marked_margin: DEFAULT_MARKED_MARGIN,
            alignment: Alignment::ByLabel,
            labels: DocumentLabels::default(),
        }
    }
}

impl CompareOptions {
    pub fn with_note(mut self, include_note: bool) -> Self {
        self.include_note = include_note;
        self
    }

    pub fn with_left_clip_width(mut self, width: f64) -> Self {
        self.left_clip_width = width;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_labels(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.labels = DocumentLabels {
            a: a.into(),
            b: b.into(),
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompareOptions::default();
        assert!(options.include_note);
        assert_eq!(options.left_clip_width, 540.0);
        assert_eq!(options.min_marked_size, 10.0);
        assert_eq!(options.marked_margin, 6.0);
        assert_eq!(options.alignment, Alignment::ByLabel);
        assert_eq!(options.labels.name(DocumentRole::A), "proxy");
        assert_eq!(options.labels.name(DocumentRole::B), "notice");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let options: CompareOptions =
            serde_json::from_str(r#"{"include_note":false,"alignment":"positional"}"#).unwrap();
        assert!(!options.include_note);
        assert_eq!(options.alignment, Alignment::Positional);
        assert_eq!(options.left_clip_width, DEFAULT_LEFT_CLIP_WIDTH);
    }
}
