// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Buffer and view state of an editing session.

use crate::syntax::{classify, line_span, ContentType};

use std::{
    ops::Range,
    path::{Path, PathBuf},
};

/// Text being edited, tagged with its content type.
///
/// The content type is derived once from the file name when the buffer is
/// created. Switching files replaces the buffer wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentBuffer {
    name: PathBuf,
    text: String,
    content_type: ContentType,
    chars: usize,
}

impl ContentBuffer {
    /// Construct new buffer for file name.
    pub fn new(name: impl AsRef<Path>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            name: name.as_ref().to_path_buf(),
            content_type: classify(name.as_ref()),
            chars: text.chars().count(),
            text,
        }
    }

    pub fn name(&self) -> &Path {
        self.name.as_path()
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Length of buffer in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length of buffer in characters.
    pub fn char_count(&self) -> usize {
        self.chars
    }

    /// Check that a range is inside the buffer and on character boundaries.
    pub fn is_valid_range(&self, range: &Range<usize>) -> bool {
        range.start <= range.end
            && range.end <= self.text.len()
            && self.text.is_char_boundary(range.start)
            && self.text.is_char_boundary(range.end)
    }

    /// Replace range of buffer, returning the removed text.
    ///
    /// Caller must make sure the range is valid, see [`Self::is_valid_range`].
    pub(crate) fn replace(&mut self, range: Range<usize>, replacement: &str) -> String {
        let removed = self.text[range.clone()].to_string();
        self.chars = self.chars - removed.chars().count() + replacement.chars().count();
        self.text.replace_range(range, replacement);
        removed
    }

    /// Line containing offset, without its trailing newline.
    pub fn line_at(&self, offset: usize) -> Range<usize> {
        line_span(&self.text, offset..offset)
    }

    /// Byte range covering `count` lines starting at line `first`.
    ///
    /// Lines past the end of the buffer are ignored, so the result is empty
    /// and positioned at the end of the buffer if `first` is out of range.
    pub fn lines(&self, first: usize, count: usize) -> Range<usize> {
        let mut newlines = self
            .text
            .bytes()
            .enumerate()
            .filter(|(_, byte)| *byte == b'\n')
            .map(|(offset, _)| offset);

        let start = match first {
            0 => 0,
            _ => match newlines.nth(first - 1) {
                Some(offset) => offset + 1,
                None => return self.text.len()..self.text.len(),
            },
        };
        let end = match count {
            0 => start,
            _ => newlines.nth(count - 1).unwrap_or(self.text.len()),
        };

        start..end
    }
}

/// Caret, selection, and scroll position of a view.
///
/// Highlighting never touches this state. Only user actions move the caret or
/// the scroll position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Selected byte range; empty when only the caret is shown.
    pub selection: Range<usize>,

    /// First visible line.
    pub scroll_line: usize,

    /// Number of visible lines.
    pub visible_lines: usize,
}

impl ViewState {
    /// Offset of caret.
    pub fn caret(&self) -> usize {
        self.selection.end
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            selection: 0..0,
            scroll_line: 0,
            visible_lines: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_classifies_once_from_name() {
        let buffer = ContentBuffer::new("/home/blah/.zshrc", "alias ll='ls -la'");
        assert_eq!(buffer.content_type(), ContentType::Shell);
        assert_eq!(buffer.name(), Path::new("/home/blah/.zshrc"));
    }

    #[test]
    fn replace_tracks_char_count() {
        let mut buffer = ContentBuffer::new("notes.txt", "héllo");
        assert_eq!(buffer.char_count(), 5);

        let removed = buffer.replace(1..3, "e wörld, h");
        assert_eq!(removed, "é");
        assert_eq!(buffer.text(), "he wörld, hllo");
        assert_eq!(buffer.char_count(), 14);
        assert!(!buffer.is_valid_range(&(5..6)));
    }

    #[test]
    fn lines_select_viewport() {
        let buffer = ContentBuffer::new("a.ini", "l0\nl1\nl2\nl3");
        assert_eq!(buffer.lines(0, 2), 0..5);
        assert_eq!(buffer.lines(1, 2), 3..8);
        assert_eq!(buffer.lines(2, 10), 6..11);
        assert_eq!(buffer.lines(9, 1), 11..11);
        assert_eq!(buffer.line_at(4), 3..5);
    }
}
