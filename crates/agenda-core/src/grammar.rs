//! Proposal label grammar
//!
//! One ordered set of label variants shared by the region scan and the
//! segmenter. Variants are tried in order and the first hit wins:
//!
//! | Variant         | Shape                         | Examples      |
//! |-----------------|-------------------------------|---------------|
//! | `Numbered`      | 1-2 digits, optional a-z, `.` | `1.` `12.` `2a.` |
//! | `ZeroPadded`    | `0` + digit, `)`              | `01)` `07)`   |
//! | `Parenthesized` | 1-2 digits, `)`               | `1)` `12)`    |
//!
//! Leading whitespace before the label is ignored.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref NUMBERED: Regex = Regex::new(r"^\s*(\d{1,2}[a-z]?\.)").unwrap();
    static ref ZERO_PADDED: Regex = Regex::new(r"^\s*(0\d\))").unwrap();
    static ref PARENTHESIZED: Regex = Regex::new(r"^\s*(\d{1,2}\))").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    Numbered,
    ZeroPadded,
    Parenthesized,
}

impl LabelKind {
    fn regex(self) -> &'static Regex {
        match self {
            LabelKind::Numbered => &NUMBERED,
            LabelKind::ZeroPadded => &ZERO_PADDED,
            LabelKind::Parenthesized => &PARENTHESIZED,
        }
    }
}

/// A recognized label line, borrowing from the input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMatch<'a> {
    pub kind: LabelKind,
    /// Label token with surrounding whitespace trimmed, e.g. `2a.`
    pub label: &'a str,
    /// Rest of the line after the label, trimmed
    pub rest: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGrammar {
    variants: Vec<LabelKind>,
}

impl Default for LabelGrammar {
    fn default() -> Self {
        Self {
            variants: vec![
                LabelKind::Numbered,
                LabelKind::ZeroPadded,
                LabelKind::Parenthesized,
            ],
        }
    }
}

impl LabelGrammar {
    /// Grammar with a custom variant order. Duplicates are dropped.
    pub fn new(variants: impl IntoIterator<Item = LabelKind>) -> Self {
        let mut ordered: Vec<LabelKind> = Vec::new();
        for kind in variants {
            if !ordered.contains(&kind) {
                ordered.push(kind);
            }
        }
        Self { variants: ordered }
    }

    pub fn variants(&self) -> &[LabelKind] {
        &self.variants
    }

    /// Recognize a label at the start of `line`
    pub fn recognize<'a>(&self, line: &'a str) -> Option<LabelMatch<'a>> {
        self.variants.iter().find_map(|&kind| {
            let captures = kind.regex().captures(line)?;
            let whole = captures.get(0)?;
            let label = captures.get(1)?;
            Some(LabelMatch {
                kind,
                label: label.as_str().trim(),
                rest: line[whole.end()..].trim(),
            })
        })
    }

    /// True when at least one line of `text` opens with a label
    pub fn matches_any_line(&self, text: &str) -> bool {
        text.lines().any(|line| self.recognize(line).is_some())
    }
}
