//! Filter term parsing for listing commands.
//!
//! A filter term is a whitespace-separated sequence of tokens. Tokens of
//! the form `keyword=value` with a known keyword control pagination and
//! ordering; everything else is free text forwarded to the backend's
//! query layer untouched.
//!
//! Known keywords: `first`, `max`, `sort`, `sort-reverse`,
//! `apply_overrides`.

use crate::constants::{DEFAULT_FIRST, DEFAULT_MAX};

/// Parsed filter controls plus the cleaned term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// First row to return, 1-based.
    pub first: i64,
    /// Maximum rows to return; -1 means unlimited.
    pub max: i64,
    /// Field to sort by.
    pub sort_field: String,
    /// True for descending order (`sort-reverse=`).
    pub sort_desc: bool,
    /// Whether overrides apply to result severities.
    pub apply_overrides: bool,
    /// The whole term, whitespace-normalized, echoed back to clients.
    pub term: String,
    /// Free-text tokens with the control keywords removed.
    pub rest: String,
}

impl Filter {
    /// Parse a term, falling back to `default_sort` when no sort keyword
    /// is present.
    ///
    /// Unparseable keyword values keep their defaults; parsing never
    /// fails on client input.
    pub fn parse(term: &str, default_sort: &str) -> Self {
        let mut filter = Filter {
            first: DEFAULT_FIRST,
            max: DEFAULT_MAX,
            sort_field: default_sort.to_owned(),
            sort_desc: false,
            apply_overrides: false,
            term: String::new(),
            rest: String::new(),
        };

        let tokens: Vec<&str> = term.split_whitespace().collect();
        let mut rest = Vec::new();
        for token in &tokens {
            match token.split_once('=') {
                Some(("first", value)) => {
                    if let Ok(n) = value.parse::<i64>() {
                        filter.first = n.max(1);
                    }
                }
                Some(("max", value)) => {
                    if let Ok(n) = value.parse::<i64>() {
                        filter.max = if n < 1 { DEFAULT_MAX } else { n };
                    }
                }
                Some(("sort", value)) if !value.is_empty() => {
                    filter.sort_field = value.to_owned();
                    filter.sort_desc = false;
                }
                Some(("sort-reverse", value)) if !value.is_empty() => {
                    filter.sort_field = value.to_owned();
                    filter.sort_desc = true;
                }
                Some(("apply_overrides", value)) => {
                    filter.apply_overrides = value == "1";
                }
                _ => rest.push(*token),
            }
        }

        filter.term = tokens.join(" ");
        filter.rest = rest.join(" ");
        filter
    }

    /// Rebuild this filter with the page offset reset to the start.
    ///
    /// Used by the single bounded pagination retry when a page turns out
    /// empty because resources vanished between count and fetch.
    pub fn with_first_reset(&self) -> Self {
        let mut filter = self.clone();
        filter.first = 1;
        filter
    }

    /// Sort order as the wire keyword.
    pub fn sort_order(&self) -> &'static str {
        if self.sort_desc {
            "descending"
        } else {
            "ascending"
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Filter::parse("", "name")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_term_uses_defaults() {
        let f = Filter::parse("", "name");
        assert_eq!(f.first, 1);
        assert_eq!(f.max, -1);
        assert_eq!(f.sort_field, "name");
        assert!(!f.sort_desc);
        assert_eq!(f.term, "");
        assert_eq!(f.rest, "");
    }

    #[test]
    fn keywords_are_extracted() {
        let f = Filter::parse("web first=11 max=10 sort=modified", "name");
        assert_eq!(f.first, 11);
        assert_eq!(f.max, 10);
        assert_eq!(f.sort_field, "modified");
        assert_eq!(f.rest, "web");
        assert_eq!(f.term, "web first=11 max=10 sort=modified");
    }

    #[test]
    fn sort_reverse_sets_descending() {
        let f = Filter::parse("sort-reverse=created", "name");
        assert_eq!(f.sort_field, "created");
        assert!(f.sort_desc);
        assert_eq!(f.sort_order(), "descending");
    }

    #[test]
    fn bad_numbers_keep_defaults() {
        let f = Filter::parse("first=banana max=", "name");
        assert_eq!(f.first, 1);
        assert_eq!(f.max, -1);
    }

    #[test]
    fn first_is_clamped_to_one() {
        let f = Filter::parse("first=0", "name");
        assert_eq!(f.first, 1);
        let f = Filter::parse("first=-5", "name");
        assert_eq!(f.first, 1);
    }

    #[test]
    fn term_is_whitespace_normalized() {
        let f = Filter::parse("  a   b\tfirst=2 ", "name");
        assert_eq!(f.term, "a b first=2");
    }

    #[test]
    fn reset_retry_only_changes_first() {
        let f = Filter::parse("x first=9 max=5", "name");
        let retry = f.with_first_reset();
        assert_eq!(retry.first, 1);
        assert_eq!(retry.max, 5);
        assert_eq!(retry.rest, "x");
    }

    #[test]
    fn apply_overrides_keyword() {
        assert!(Filter::parse("apply_overrides=1", "name").apply_overrides);
        assert!(!Filter::parse("apply_overrides=0", "name").apply_overrides);
    }

    proptest! {
        #[test]
        fn parse_never_panics(term in ".{0,200}") {
            let f = Filter::parse(&term, "name");
            prop_assert!(f.first >= 1);
        }

        #[test]
        fn first_always_positive(n in any::<i64>()) {
            let f = Filter::parse(&format!("first={}", n), "name");
            prop_assert!(f.first >= 1);
        }
    }
}
