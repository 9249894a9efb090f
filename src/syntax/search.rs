// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Literal search within a buffer.
//!
//! Search terms are always treated literally. Any regular expression syntax in
//! the term is escaped before matching, and matching ignores case.

use regex::{Regex, RegexBuilder};
use std::ops::Range;
use tracing::warn;

/// Case-insensitive literal search term.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    regex: Regex,
}

impl SearchQuery {
    /// Build search query from literal term.
    ///
    /// Returns `None` for an empty term, or for a term too large to compile.
    pub fn new(term: impl AsRef<str>) -> Option<Self> {
        let term = term.as_ref();
        if term.is_empty() {
            return None;
        }

        match RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
        {
            Ok(regex) => Some(Self { regex }),
            Err(error) => {
                warn!("cannot search for {term:?}: {error}");
                None
            }
        }
    }

    /// All non-overlapping matches in text, in offset order.
    pub fn find_all(&self, text: &str) -> Vec<Range<usize>> {
        self.regex.find_iter(text).map(|found| found.range()).collect()
    }
}

/// All case-insensitive literal matches of term in text.
pub fn find_matches(text: &str, term: &str) -> Vec<Range<usize>> {
    SearchQuery::new(term)
        .map(|query| query.find_all(text))
        .unwrap_or_default()
}

/// Match selected by search navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Span of matched text.
    pub span: Range<usize>,

    /// 1-based position of match among all matches.
    pub index: usize,

    /// Total number of matches in buffer.
    pub count: usize,
}

/// Find first match starting at or after the end of the selection.
///
/// Wraps around to the first match of the buffer if nothing follows the
/// selection.
pub fn find_next(text: &str, term: &str, selection: Range<usize>) -> Option<SearchHit> {
    let matches = find_matches(text, term);
    let position = matches
        .iter()
        .position(|found| found.start >= selection.end)
        .unwrap_or(0);

    hit(matches, position)
}

/// Find last match starting before the start of the selection.
///
/// Wraps around to the last match of the buffer if nothing precedes the
/// selection.
pub fn find_previous(text: &str, term: &str, selection: Range<usize>) -> Option<SearchHit> {
    let matches = find_matches(text, term);
    let position = matches
        .iter()
        .rposition(|found| found.start < selection.start)
        .unwrap_or(matches.len().saturating_sub(1));

    hit(matches, position)
}

fn hit(matches: Vec<Range<usize>>, position: usize) -> Option<SearchHit> {
    let count = matches.len();
    matches.into_iter().nth(position).map(|span| SearchHit {
        span,
        index: position + 1,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn search_is_literal_and_case_insensitive() {
        let text = "a.b A.B axb";
        assert_eq!(find_matches(text, "a.b"), vec![0..3, 4..7]);
        assert_eq!(find_matches(text, ""), Vec::<Range<usize>>::new());
        assert_eq!(find_matches("(x) [y]", "[y]"), vec![4..7]);
    }

    #[test]
    fn find_next_wraps_around() {
        let text = "foo bar foo bar foo";
        let hit = find_next(text, "foo", 0..3);
        assert_eq!(hit, Some(SearchHit { span: 8..11, index: 2, count: 3 }));

        let hit = find_next(text, "foo", 16..19);
        assert_eq!(hit, Some(SearchHit { span: 0..3, index: 1, count: 3 }));
    }

    #[test]
    fn find_previous_wraps_around() {
        let text = "foo bar foo bar foo";
        let hit = find_previous(text, "foo", 8..11);
        assert_eq!(hit, Some(SearchHit { span: 0..3, index: 1, count: 3 }));

        let hit = find_previous(text, "foo", 0..0);
        assert_eq!(hit, Some(SearchHit { span: 16..19, index: 3, count: 3 }));
    }

    #[test]
    fn no_match_gives_no_hit() {
        assert_eq!(find_next("abc", "zzz", 0..0), None);
        assert_eq!(find_previous("abc", "zzz", 0..0), None);
    }
}
