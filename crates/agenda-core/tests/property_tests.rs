//! Property tests for normalization and label alignment

use std::collections::HashSet;

use agenda_core::compare::classify_mismatch;
use agenda_core::{
    collapse_whitespace, compare_contents, compare_items, Item, ItemList, MismatchReason, Status,
};
use proptest::prelude::*;

fn item_list() -> impl Strategy<Value = ItemList> {
    prop::collection::vec(("[1-9][0-9]?\\.", "[A-Za-z ,.]{0,24}"), 0..12).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(label, content)| Item::new(label, content))
            .collect()
    })
}

proptest! {
    /// Property: collapsing whitespace twice changes nothing
    #[test]
    fn collapse_is_idempotent(text in "\\PC*") {
        let once = collapse_whitespace(&text);
        prop_assert_eq!(collapse_whitespace(&once), once);
    }

    /// Property: collapsed keys never carry leading, trailing or doubled whitespace
    #[test]
    fn collapse_leaves_single_spaces(text in "[a-z \\t\\n]{0,64}") {
        let key = collapse_whitespace(&text);
        prop_assert!(!key.starts_with(' '));
        prop_assert!(!key.ends_with(' '));
        prop_assert!(!key.contains("  "));
        prop_assert!(!key.contains('\n'));
    }

    /// Property: result labels are the union of both label sets, A's order first
    #[test]
    fn results_cover_label_union_in_order(a in item_list(), b in item_list()) {
        let results = compare_items(&a, &b);
        let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();

        let mut expected: Vec<&str> = a.labels().collect();
        expected.extend(b.labels().filter(|label| !a.contains(label)));
        prop_assert_eq!(&labels, &expected);

        let unique: HashSet<&str> = labels.iter().copied().collect();
        prop_assert_eq!(unique.len(), labels.len());
    }

    /// Property: one-sided labels are MISSING on the other side
    #[test]
    fn one_sided_labels_are_missing(a in item_list(), b in item_list()) {
        for result in compare_items(&a, &b) {
            let in_a = a.contains(&result.label);
            let in_b = b.contains(&result.label);
            match (in_a, in_b) {
                (true, false) => {
                    prop_assert_eq!(result.status, Status::MissingInB);
                }
                (false, true) => {
                    prop_assert_eq!(result.status, Status::MissingInA);
                }
                _ => {
                    prop_assert!(matches!(result.status, Status::Match | Status::Mismatch));
                }
            }
        }
    }

    /// Property: swapping A and B swaps MISSING statuses and keeps the rest
    #[test]
    fn swapping_documents_is_symmetric(a in item_list(), b in item_list()) {
        let forward = compare_items(&a, &b);
        let backward = compare_items(&b, &a);
        prop_assert_eq!(forward.len(), backward.len());

        for result in &forward {
            let mirrored = backward
                .iter()
                .find(|r| r.label == result.label)
                .map(|r| r.status);
            prop_assert_eq!(mirrored, Some(result.status.swapped()));
        }
    }

    /// Property: a difference in letter case alone is reported as case-only
    #[test]
    fn case_only_difference_is_reported(text in "[a-z]{1,12}( [a-z]{1,12}){0,4}") {
        let upper = text.to_uppercase();
        let result = compare_contents("1.", Some(&text), Some(&upper));

        prop_assert_eq!(result.status, Status::Mismatch);
        prop_assert!(result.reasons.contains(&MismatchReason::CaseOnly));
        prop_assert!(result.reason.unwrap_or_default().contains("case-only difference"));
    }

    /// Property: classification never comes back empty
    #[test]
    fn classification_is_never_empty(a in "[A-Za-z .,]{1,20}", b in "[A-Za-z .,]{1,20}") {
        prop_assume!(collapse_whitespace(&a) != collapse_whitespace(&b));
        prop_assert!(!classify_mismatch(&collapse_whitespace(&a), &collapse_whitespace(&b)).is_empty());
    }
}
