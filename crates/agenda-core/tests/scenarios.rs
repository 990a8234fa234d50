//! End-to-end runs over in-memory documents

use agenda_core::{
    compare_documents, CompareOptions, ComparisonRun, DocumentRole, MemoryDocument, MemoryPage,
    MismatchReason, Rect, RegionSource, RunOutcome, Status, NOTE_LABEL,
};
use pretty_assertions::assert_eq;

fn run(a: &str, b: &str) -> ComparisonRun {
    compare_documents(
        &MemoryDocument::from_text(a),
        &MemoryDocument::from_text(b),
        &CompareOptions::default(),
    )
    .unwrap()
}

fn status_of(run: &ComparisonRun, label: &str) -> Status {
    run.results
        .iter()
        .find(|r| r.label == label)
        .map(|r| r.status)
        .unwrap_or_else(|| panic!("no result for {label}"))
}

const PROXY: &str = "\
ANNUAL MEETING OF SHAREHOLDERS
The Board of Directors recommends you vote FOR
1. Elect Director Jane Smith
2. Ratify Auditor ABC LLP
3. Approve Merger.
4. Approve the 2026 Equity Plan";

const NOTICE: &str = "\
NOTICE OF ANNUAL MEETING
Items of business
1. Elect Director Jane Smith
2. Ratify  Auditor
   ABC LLP
3. approve merger";

#[test]
fn test_identical_item_matches() {
    let run = run(PROXY, NOTICE);
    assert_eq!(status_of(&run, "1."), Status::Match);
}

#[test]
fn test_whitespace_and_linebreaks_match() {
    let run = run(PROXY, NOTICE);
    let result = &run.results[1];

    assert_eq!(result.label, "2.");
    assert_eq!(result.status, Status::Match);
    assert_eq!(result.key_b.as_deref(), Some("Ratify Auditor ABC LLP"));
}

#[test]
fn test_case_and_punctuation_reasons() {
    let run = run(PROXY, NOTICE);
    let result = &run.results[2];

    assert_eq!(result.status, Status::Mismatch);
    assert!(result.reasons.contains(&MismatchReason::CaseOnly));
    assert!(result.reasons.contains(&MismatchReason::PunctuationOnly));
    let reason = result.reason.as_deref().unwrap();
    assert!(reason.contains("case-only difference"));
    assert!(reason.contains("punctuation-only difference"));
}

#[test]
fn test_label_only_in_proxy_is_missing_in_notice() {
    let run = run(PROXY, NOTICE);
    let result = &run.results[3];

    assert_eq!(result.label, "4.");
    assert_eq!(result.status, Status::MissingInB);
    assert_eq!(result.reason.as_deref(), Some("Label missing in notice"));
    assert_eq!(result.text_b, None);
}

#[test]
fn test_result_order_follows_proxy_then_notice() {
    let run = run("2. B\n1. A", "1. A\n3. C\n2. B");
    let labels: Vec<&str> = run.results.iter().map(|r| r.label.as_str()).collect();

    assert_eq!(labels, vec!["2.", "1.", "3."]);
    assert_eq!(status_of(&run, "3."), Status::MissingInA);
}

#[test]
fn test_no_labels_is_not_an_empty_match() {
    let doc = MemoryDocument::new()
        .with_page(MemoryPage::letter().with_column(72.0, 700.0, &["Dear shareholder,"]))
        .with_page(MemoryPage::letter().with_column(72.0, 700.0, &["Please vote today."]));
    let run = compare_documents(&doc, &doc, &CompareOptions::default()).unwrap();

    assert!(run.results.is_empty());
    assert_eq!(
        run.outcome,
        RunOutcome::NoLabelsFound {
            documents: vec![DocumentRole::A, DocumentRole::B]
        }
    );
    assert_eq!(run.region_a.source, RegionSource::Fallback);
    assert_eq!(run.region_a.page, 0);
    assert!(!run.is_clean());
}

#[test]
fn test_one_sided_no_labels_still_reports_items() {
    let run = run("1. Elect", "Nothing here");

    assert_eq!(
        run.outcome,
        RunOutcome::NoLabelsFound {
            documents: vec![DocumentRole::B]
        }
    );
    assert_eq!(status_of(&run, "1."), Status::MissingInB);
}

#[test]
fn test_marked_region_beats_label_pages() {
    let marked = MemoryDocument::new()
        .with_page(MemoryPage::letter().with_column(72.0, 700.0, &["1. Cover page item"]))
        .with_page(
            MemoryPage::letter()
                .with_mark(Rect::new(60.0, 500.0, 500.0, 720.0))
                .with_column(72.0, 700.0, &["1. Elect Director", "2. Ratify Auditor"])
                .with_column(72.0, 300.0, &["3. Outside the mark"]),
        );
    let plain = MemoryDocument::from_text("1. Elect Director\n2. Ratify Auditor");

    let run = compare_documents(&marked, &plain, &CompareOptions::default()).unwrap();

    assert_eq!(run.region_a.source, RegionSource::Marked);
    assert_eq!(run.region_a.page, 1);
    assert_eq!(run.region_b.source, RegionSource::LabelScan);
    assert!(run.is_clean());
}

#[test]
fn test_note_block_compared_as_item() {
    let a = "1. Elect\nNOTE: Such other business as may properly come before the meeting.";
    let b = "1. Elect\nNote - Such other business as may properly come before the meeting";
    let run = run(a, b);

    assert_eq!(run.items_a.labels().last(), Some(NOTE_LABEL));
    assert_eq!(status_of(&run, NOTE_LABEL), Status::Mismatch);
}

#[test]
fn test_note_block_disabled() {
    let a = MemoryDocument::from_text("1. Elect\nNOTE: Other business");
    let options = CompareOptions::default().with_note(false);
    let run = compare_documents(&a, &a, &options).unwrap();

    assert!(!run.items_a.contains(NOTE_LABEL));
    assert_eq!(run.results.len(), 1);
}

#[test]
fn test_duplicate_label_keeps_first() {
    let run = run("1. First\n1. Second", "1. First");

    assert_eq!(run.item_count(DocumentRole::A), 1);
    assert_eq!(status_of(&run, "1."), Status::Match);
}

#[test]
fn test_label_variants_and_non_labels() {
    let run = run(
        "2a. Lettered\n01) Padded\n1) Parenthesized\n100. Not a label\na. Not a label",
        "2a. Lettered\n01) Padded\n1) Parenthesized",
    );
    let labels: Vec<&str> = run.items_a.labels().collect();

    assert_eq!(labels, vec!["2a.", "01)", "1)"]);
    assert_eq!(
        run.items_a.get("1)"),
        Some("Parenthesized 100. Not a label a. Not a label")
    );
}

#[test]
fn test_note_text_without_labels_is_still_no_labels_found() {
    let text = "Dear Shareholder,\nPlease note the annual meeting date.\nNOTE: Bring identification";
    let run = run(text, text);

    assert_eq!(
        run.outcome,
        RunOutcome::NoLabelsFound {
            documents: vec![DocumentRole::A, DocumentRole::B]
        }
    );
    assert!(run.results.is_empty());
    assert!(!run.is_clean());
}

#[test]
fn test_different_notes_mismatch() {
    let a = "1. Elect\nNOTE: Please note that proxies will be voted as directed";
    let b = "1. Elect\nNOTE: Shareholders should note that proxies will be voted as directed";
    let run = run(a, b);

    assert_eq!(status_of(&run, NOTE_LABEL), Status::Mismatch);
}

#[test]
fn test_missing_reason_uses_document_labels() {
    let options = CompareOptions::default().with_labels("prospectus", "ballot");
    let run = compare_documents(
        &MemoryDocument::from_text("1. Elect\n2. Ratify"),
        &MemoryDocument::from_text("1. Elect\n3. Adjourn"),
        &options,
    )
    .unwrap();

    let reasons: Vec<(&str, Option<&str>)> = run
        .results
        .iter()
        .map(|r| (r.label.as_str(), r.reason.as_deref()))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("1.", None),
            ("2.", Some("Label missing in ballot")),
            ("3.", Some("Label missing in prospectus")),
        ]
    );
}
