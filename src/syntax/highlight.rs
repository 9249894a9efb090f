// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Pattern-based highlight engine.
//!
//! Turn a region of a buffer into a list of [`StyledRange`]s. The engine is a
//! pure function of its inputs: it never mutates the buffer, and it never
//! depends on the styling produced by an earlier pass.
//!
//! # Highlight Pass
//!
//! A single pass runs in four steps:
//!
//! 1. Widen the requested range to whole lines. The renderer resets this
//!    widened region to normal text before painting.
//! 2. Collect the comment ranges of the region. These act as an exclusion
//!    mask for every non-comment pattern.
//! 3. Apply the ordered pattern list. Comment patterns always apply. Any other
//!    match that touches a comment range is dropped entirely.
//! 4. Overlay a background range for every literal match of the search term.
//!
//! # Overlapping Matches
//!
//! When two patterns claim the same bytes, the pattern applied _last_ wins.
//! Foreground styling is flattened, so each byte of the output carries at most
//! one foreground class, and the returned foreground ranges never overlap.
//! Search matches live on the background layer and never remove the foreground
//! class underneath them.

use crate::syntax::{
    classify::ContentType,
    pattern::{HighlightClass, PatternSet, StyleLayer},
    search::SearchQuery,
};

use std::ops::Range;

/// Styled span of a buffer.
///
/// Offsets are UTF-8 byte offsets relative to the start of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyledRange {
    pub start: usize,
    pub len: usize,
    pub class: HighlightClass,
}

impl StyledRange {
    /// Construct new styled range from a span.
    pub fn new(span: Range<usize>, class: HighlightClass) -> Self {
        Self {
            start: span.start,
            len: span.len(),
            class,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end()
    }

    pub fn layer(&self) -> StyleLayer {
        self.class.layer()
    }
}

/// Result of one highlight pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightPass {
    /// Line-aligned region to reset to normal text before painting.
    pub range: Range<usize>,

    /// Foreground ranges in offset order, followed by background ranges.
    pub ranges: Vec<StyledRange>,
}

impl HighlightPass {
    /// Foreground ranges only.
    pub fn foreground(&self) -> impl Iterator<Item = &StyledRange> {
        self.ranges
            .iter()
            .filter(|range| range.layer() == StyleLayer::Foreground)
    }

    /// Background ranges only.
    pub fn background(&self) -> impl Iterator<Item = &StyledRange> {
        self.ranges
            .iter()
            .filter(|range| range.layer() == StyleLayer::Background)
    }
}

/// Highlight region of buffer for content type.
pub fn highlight(
    text: &str,
    content_type: ContentType,
    range: Range<usize>,
    search: &str,
) -> HighlightPass {
    highlight_with(
        text,
        PatternSet::for_family(content_type.family()),
        range,
        search,
    )
}

/// Highlight region of buffer with an explicit pattern set.
pub fn highlight_with(
    text: &str,
    patterns: &PatternSet,
    range: Range<usize>,
    search: &str,
) -> HighlightPass {
    let range = line_span(text, range);
    let region = &text[range.clone()];
    let comments = mask(region, patterns);

    // INVARIANT: One slot per byte, last applied pattern wins.
    let mut paint: Vec<Option<HighlightClass>> = vec![None; region.len()];
    for pattern in patterns.iter() {
        let is_comment = pattern.class() == HighlightClass::Comment;
        for span in pattern.find_spans(region) {
            if !is_comment && intersects(&comments, &span) {
                continue;
            }
            paint[span].fill(Some(pattern.class()));
        }
    }

    let mut ranges = flatten(&paint, range.start);
    if let Some(query) = SearchQuery::new(search) {
        ranges.extend(query.find_all(region).into_iter().map(|span| {
            StyledRange::new(
                span.start + range.start..span.end + range.start,
                HighlightClass::SearchMatch,
            )
        }));
    }

    HighlightPass { range, ranges }
}

/// Comment ranges of region of buffer for content type.
///
/// Returned ranges are sorted, disjoint, and relative to the start of the
/// buffer.
pub fn comment_ranges(
    text: &str,
    content_type: ContentType,
    range: Range<usize>,
) -> Vec<Range<usize>> {
    let range = line_span(text, range);
    let patterns = PatternSet::for_family(content_type.family());
    mask(&text[range.clone()], patterns)
        .into_iter()
        .map(|span| span.start + range.start..span.end + range.start)
        .collect()
}

/// Widen range to the whole lines it touches.
///
/// The range is clamped to the buffer first. The result never includes the
/// trailing newline of its last line, and always falls on character
/// boundaries.
pub fn line_span(text: &str, range: Range<usize>) -> Range<usize> {
    let bytes = text.as_bytes();
    let end = range.end.min(bytes.len());
    let start = range.start.min(end);

    let start = bytes[..start]
        .iter()
        .rposition(|byte| *byte == b'\n')
        .map_or(0, |newline| newline + 1);
    let end = bytes[end..]
        .iter()
        .position(|byte| *byte == b'\n')
        .map_or(bytes.len(), |newline| end + newline);

    start..end
}

fn mask(region: &str, patterns: &PatternSet) -> Vec<Range<usize>> {
    let mut spans = patterns
        .comments()
        .flat_map(|pattern| pattern.find_spans(region))
        .collect::<Vec<_>>();
    spans.sort_by_key(|span| span.start);

    // INVARIANT: Merge overlapping spans so the mask can be binary searched.
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }

    merged
}

fn intersects(mask: &[Range<usize>], span: &Range<usize>) -> bool {
    let index = mask.partition_point(|comment| comment.end <= span.start);
    mask.get(index)
        .is_some_and(|comment| comment.start < span.end)
}

fn flatten(paint: &[Option<HighlightClass>], offset: usize) -> Vec<StyledRange> {
    let mut ranges = Vec::new();
    let mut run: Option<(usize, HighlightClass)> = None;

    for (index, slot) in paint.iter().enumerate() {
        match (run, slot) {
            (Some((_, class)), Some(next)) if class == *next => continue,
            (Some((start, class)), _) => {
                ranges.push(StyledRange::new(offset + start..offset + index, class));
                run = slot.map(|next| (index, next));
            }
            (None, _) => run = slot.map(|next| (index, next)),
        }
    }

    if let Some((start, class)) = run {
        ranges.push(StyledRange::new(offset + start..offset + paint.len(), class));
    }

    ranges
}
