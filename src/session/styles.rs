// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Styles currently painted onto a buffer.

use crate::syntax::{HighlightPass, StyleLayer, StyledRange};

use std::ops::Range;

/// Painted styles of a buffer.
///
/// Holds the union of every highlight pass applied so far. Applying a pass
/// resets its line-aligned region before painting, so re-applying the same
/// pass is a no-op. Text edits shift styles after the edit point instead of
/// throwing everything away, which keeps the rest of the buffer painted while
/// a debounced pass is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    ranges: Vec<StyledRange>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint highlight pass, resetting its region first.
    pub fn apply(&mut self, pass: &HighlightPass) {
        let reset = &pass.range;
        let mut kept = Vec::with_capacity(self.ranges.len() + pass.ranges.len());
        for range in self.ranges.drain(..) {
            if range.end() <= reset.start || range.start >= reset.end || reset.is_empty() {
                kept.push(range);
                continue;
            }

            // INVARIANT: Only the portion inside the reset region is cleared.
            if range.start < reset.start {
                kept.push(StyledRange::new(range.start..reset.start, range.class));
            }
            if range.end() > reset.end {
                kept.push(StyledRange::new(reset.end..range.end(), range.class));
            }
        }

        kept.extend(pass.ranges.iter().filter(|range| range.len > 0).copied());
        kept.sort_by_key(|range| (range.layer() == StyleLayer::Background, range.start));
        self.ranges = kept;
    }

    /// Shift styles to follow a text edit.
    ///
    /// The `edited` range is in the coordinates of the buffer _before_ the
    /// edit, and `inserted` is the byte length of its replacement. Styles
    /// touched by the edit are dropped until the next pass repaints them.
    pub fn splice(&mut self, edited: Range<usize>, inserted: usize) {
        let removed = edited.len();
        self.ranges.retain_mut(|range| {
            if range.end() <= edited.start {
                return true;
            }
            if range.start >= edited.end {
                range.start = range.start - removed + inserted;
                return true;
            }
            false
        });
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// All painted ranges, foreground first then background, each in offset
    /// order.
    pub fn ranges(&self) -> &[StyledRange] {
        self.ranges.as_slice()
    }

    /// Painted ranges intersecting span.
    pub fn within(&self, span: Range<usize>) -> impl Iterator<Item = &StyledRange> {
        self.ranges
            .iter()
            .filter(move |range| range.start < span.end && range.end() > span.start)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{highlight, ContentType, HighlightClass};
    use pretty_assertions::assert_eq;

    #[test]
    fn apply_is_idempotent() {
        let text = "[core]\n  editor = vim # fallback\n";
        let pass = highlight(text, ContentType::Git, 0..text.len(), "vim");

        let mut styles = StyleMap::new();
        styles.apply(&pass);
        let once = styles.clone();
        styles.apply(&pass);
        assert_eq!(styles, once);
    }

    #[test]
    fn apply_resets_only_pass_region() {
        let text = "# one\n# two\n# three";
        let mut styles = StyleMap::new();
        styles.apply(&highlight(text, ContentType::Ini, 0..text.len(), ""));
        assert_eq!(styles.len(), 3);

        let second_line = highlight("# one\n  two\n# three", ContentType::Ini, 7..7, "");
        styles.apply(&second_line);
        let result = styles
            .ranges()
            .iter()
            .map(|range| range.span())
            .collect::<Vec<_>>();
        assert_eq!(result, vec![0..5, 12..19]);
    }

    #[test]
    fn splice_shifts_ranges_after_edit() {
        let mut styles = StyleMap::new();
        styles.apply(&HighlightPass {
            range: 0..20,
            ranges: vec![
                StyledRange::new(0..3, HighlightClass::Keyword),
                StyledRange::new(5..8, HighlightClass::String),
                StyledRange::new(10..12, HighlightClass::Number),
            ],
        });

        // Replace "6..7" with four bytes, then insert two bytes at offset 0.
        styles.splice(6..7, 4);
        styles.splice(0..0, 2);

        let result = styles
            .ranges()
            .iter()
            .map(|range| (range.span(), range.class))
            .collect::<Vec<_>>();
        let expect = vec![
            (2..5, HighlightClass::Keyword),
            (15..17, HighlightClass::Number),
        ];
        assert_eq!(result, expect);
    }

    #[test]
    fn splice_drops_ranges_split_by_insertion() {
        let mut styles = StyleMap::new();
        styles.apply(&HighlightPass {
            range: 0..10,
            ranges: vec![StyledRange::new(2..6, HighlightClass::Property)],
        });
        styles.splice(4..4, 1);
        assert!(styles.is_empty());
    }
}
