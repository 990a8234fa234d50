//! Label alignment, match decision and mismatch classification
//!
//! The match decision only ever uses the baseline whitespace-collapsed key.
//! Case and punctuation folds are consulted afterwards to explain a
//! mismatch, never to excuse one.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use crate::normalize::{case_fold, collapse_whitespace, strip_punctuation};
use crate::segment::ItemList;

/// Which side of the comparison a document sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentRole {
    A,
    B,
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentRole::A => f.write_str("A"),
            DocumentRole::B => f.write_str("B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Match,
    Mismatch,
    MissingInA,
    MissingInB,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Match => "MATCH",
            Status::Mismatch => "MISMATCH",
            Status::MissingInA => "MISSING_IN_A",
            Status::MissingInB => "MISSING_IN_B",
        }
    }

    /// Status the same label would get with documents A and B swapped
    pub fn swapped(&self) -> Self {
        match self {
            Status::MissingInA => Status::MissingInB,
            Status::MissingInB => Status::MissingInA,
            other => *other,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchReason {
    CaseOnly,
    PunctuationOnly,
    WhitespaceOnly,
    ContentDiffers,
}

impl MismatchReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MismatchReason::CaseOnly => "case-only difference",
            MismatchReason::PunctuationOnly => "punctuation-only difference",
            MismatchReason::WhitespaceOnly => "whitespace/linebreak differences only",
            MismatchReason::ContentDiffers => "content differs",
        }
    }
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub label: String,
    /// Raw content from document A, if the label exists there
    pub text_a: Option<String>,
    /// Raw content from document B, if the label exists there
    pub text_b: Option<String>,
    /// Baseline key of `text_a`
    pub key_a: Option<String>,
    /// Baseline key of `text_b`
    pub key_b: Option<String>,
    pub status: Status,
    /// Classified reasons, empty for MATCH
    pub reasons: Vec<MismatchReason>,
    /// Human-readable reason, `None` for MATCH
    pub reason: Option<String>,
    /// Word-level diff for display only
    pub diff: Option<String>,
}

impl ComparisonResult {
    pub fn is_match(&self) -> bool {
        self.status == Status::Match
    }

    /// Name the document a missing label was expected in, using the
    /// display names of A and B
    pub fn with_document_names(mut self, name_a: &str, name_b: &str) -> Self {
        match self.status {
            Status::MissingInA => self.reason = Some(missing_reason(name_a)),
            Status::MissingInB => self.reason = Some(missing_reason(name_b)),
            Status::Match | Status::Mismatch => {}
        }
        self
    }
}

fn missing_reason(document: &str) -> String {
    format!("Label missing in {}", document)
}

/// Compare one label's contents. `a` and `b` must not both be absent.
pub fn compare_contents(label: &str, a: Option<&str>, b: Option<&str>) -> ComparisonResult {
    let key_a = a.map(collapse_whitespace);
    let key_b = b.map(collapse_whitespace);

    let (status, reasons, reason, diff) = match (&key_a, &key_b) {
        (Some(_), None) => (
            Status::MissingInB,
            Vec::new(),
            Some(missing_reason("B")),
            None,
        ),
        (None, Some(_)) => (
            Status::MissingInA,
            Vec::new(),
            Some(missing_reason("A")),
            None,
        ),
        (Some(ka), Some(kb)) if ka == kb => (Status::Match, Vec::new(), None, None),
        (Some(ka), Some(kb)) => {
            let reasons = classify_mismatch(ka, kb);
            let reason = reasons
                .iter()
                .map(MismatchReason::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            (Status::Mismatch, reasons, Some(reason), Some(word_diff(ka, kb)))
        }
        // Unreachable through compare_items; treated as a mismatch with no content
        (None, None) => (
            Status::Mismatch,
            vec![MismatchReason::ContentDiffers],
            Some(MismatchReason::ContentDiffers.to_string()),
            None,
        ),
    };

    ComparisonResult {
        label: label.to_string(),
        text_a: a.map(str::to_string),
        text_b: b.map(str::to_string),
        key_a,
        key_b,
        status,
        reasons,
        reason,
        diff,
    }
}

/// Explain why two unequal baseline keys differ.
///
/// Case and punctuation are only reported when folding both of them makes
/// the keys equal; each is reported when that fold was actually needed.
pub fn classify_mismatch(a: &str, b: &str) -> Vec<MismatchReason> {
    let mut reasons = Vec::new();

    let fully_folded_equal = strip_punctuation(&case_fold(a)) == strip_punctuation(&case_fold(b));
    if fully_folded_equal {
        if strip_punctuation(a) != strip_punctuation(b) {
            reasons.push(MismatchReason::CaseOnly);
        }
        if case_fold(a) != case_fold(b) {
            reasons.push(MismatchReason::PunctuationOnly);
        }
    }

    if collapse_whitespace(a) == collapse_whitespace(b) {
        reasons.push(MismatchReason::WhitespaceOnly);
    }

    if reasons.is_empty() {
        reasons.push(MismatchReason::ContentDiffers);
    }
    reasons
}

/// Word-level inline diff: removed runs as `[-...-]`, added runs as `{+...+}`
pub fn word_diff(a: &str, b: &str) -> String {
    let diff = TextDiff::from_words(a, b);
    let mut out = String::new();
    let mut run_tag = ChangeTag::Equal;
    let mut run = String::new();

    for change in diff.iter_all_changes() {
        if change.tag() != run_tag {
            flush_run(&mut out, run_tag, &run);
            run.clear();
            run_tag = change.tag();
        }
        run.push_str(change.value());
    }
    flush_run(&mut out, run_tag, &run);

    out
}

fn flush_run(out: &mut String, tag: ChangeTag, run: &str) {
    if run.is_empty() {
        return;
    }
    match tag {
        ChangeTag::Equal => out.push_str(run),
        ChangeTag::Delete => {
            out.push_str("[-");
            out.push_str(run);
            out.push_str("-]");
        }
        ChangeTag::Insert => {
            out.push_str("{+");
            out.push_str(run);
            out.push_str("+}");
        }
    }
}

/// A's labels in discovery order, then labels only B has, in B's order
pub fn label_universe<'a>(a: &'a ItemList, b: &'a ItemList) -> Vec<&'a str> {
    let mut seen: HashSet<&str> = HashSet::new();
    a.labels()
        .chain(b.labels())
        .filter(|label| seen.insert(*label))
        .collect()
}

/// Align items by label and compare each pair
pub fn compare_items(a: &ItemList, b: &ItemList) -> Vec<ComparisonResult> {
    label_universe(a, b)
        .into_iter()
        .filter_map(|label| match (a.get(label), b.get(label)) {
            (None, None) => None,
            (text_a, text_b) => Some(compare_contents(label, text_a, text_b)),
        })
        .collect()
}

/// Align items by position: the Nth item of A against the Nth item of B.
/// Differing labels are shown as `"<a> / <b>"`.
pub fn compare_positional(a: &ItemList, b: &ItemList) -> Vec<ComparisonResult> {
    let count = a.len().max(b.len());
    let mut a_items = a.iter();
    let mut b_items = b.iter();

    (0..count)
        .filter_map(|_| match (a_items.next(), b_items.next()) {
            (Some(ia), Some(ib)) => {
                let label = if ia.label == ib.label {
                    ia.label.clone()
                } else {
                    format!("{} / {}", ia.label, ib.label)
                };
                Some(compare_contents(
                    &label,
                    Some(&ia.content),
                    Some(&ib.content),
                ))
            }
            (Some(ia), None) => Some(compare_contents(&ia.label, Some(&ia.content), None)),
            (None, Some(ib)) => Some(compare_contents(&ib.label, None, Some(&ib.content))),
            (None, None) => None,
        })
        .collect()
}
