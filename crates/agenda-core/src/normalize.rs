//! Comparison keys for proposal text
//!
//! `collapse_whitespace` produces the baseline key that decides MATCH.
//! `case_fold` and `strip_punctuation` exist only to explain mismatches.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").unwrap();
}

/// Replace every whitespace run (newlines included) with one space and trim
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Baseline key, lowercased
pub fn case_fold(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// Baseline key with every character that is neither a word character nor
/// whitespace removed. Whitespace left behind by removed characters is
/// collapsed again.
pub fn strip_punctuation(text: &str) -> String {
    collapse_whitespace(&NON_WORD.replace_all(text, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("  Ratify\n Auditor\t\tABC   LLP \n"),
            "Ratify Auditor ABC LLP"
        );
        assert_eq!(collapse_whitespace(""), "");
        assert_eq!(collapse_whitespace(" \n\t "), "");
    }

    #[test]
    fn test_collapse_keeps_case_and_punctuation() {
        assert_eq!(collapse_whitespace("Approve  Merger."), "Approve Merger.");
    }

    #[test]
    fn test_case_fold() {
        assert_eq!(case_fold("Approve\nMERGER"), "approve merger");
    }

    #[test]
    fn test_strip_punctuation() {
        assert_eq!(strip_punctuation("Approve Merger."), "Approve Merger");
        assert_eq!(strip_punctuation("Say-on-Pay (advisory)"), "SayonPay advisory");
        assert_eq!(strip_punctuation("A - B"), "A B");
        assert_eq!(strip_punctuation("snake_case"), "snake_case");
    }
}
