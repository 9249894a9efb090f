// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Undo history of text edits.
//!
//! Only edits to the text are recorded. Styling is never part of undo history,
//! so undoing a keystroke restores exactly the text that was there before it.

use std::ops::Range;

/// Single replacement of buffer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Offset the edit starts at.
    pub start: usize,

    /// Text that was replaced.
    pub removed: String,

    /// Text that replaced it.
    pub inserted: String,
}

impl TextEdit {
    /// Range of buffer covered by inserted text after the edit.
    pub fn inserted_range(&self) -> Range<usize> {
        self.start..self.start + self.inserted.len()
    }

    /// Edit that reverts this one.
    pub fn inverse(&self) -> Self {
        Self {
            start: self.start,
            removed: self.inserted.clone(),
            inserted: self.removed.clone(),
        }
    }
}

/// Stack of reversible text edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoStack {
    edits: Vec<TextEdit>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    pub fn pop(&mut self) -> Option<TextEdit> {
        self.edits.pop()
    }

    pub fn clear(&mut self) {
        self.edits.clear();
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn inverse_swaps_text() {
        let edit = TextEdit {
            start: 4,
            removed: "ab".into(),
            inserted: "xyz".into(),
        };
        assert_eq!(edit.inserted_range(), 4..7);

        let inverse = edit.inverse();
        assert_eq!(inverse.inserted_range(), 4..6);
        assert_eq!(inverse.inverse(), edit);
    }
}
