// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Line comment toggling.

use crate::syntax::{classify::ContentType, highlight::line_span};

use std::ops::Range;

/// Result of toggling line comments over a selection.
///
/// Describes a single replacement of a line-aligned block of the original
/// buffer, plus where the selection lands afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentToggle {
    /// Line-aligned block of the original buffer being replaced.
    pub range: Range<usize>,

    /// New content of the block.
    pub replacement: String,

    /// Selection remapped into the edited buffer.
    pub selection: Range<usize>,
}

impl CommentToggle {
    /// Apply toggle to the buffer it was computed from.
    pub fn apply(&self, text: &str) -> String {
        let mut edited = String::with_capacity(text.len() + self.replacement.len());
        edited.push_str(&text[..self.range.start]);
        edited.push_str(&self.replacement);
        edited.push_str(&text[self.range.end..]);
        edited
    }
}

/// Toggle line comments on every line touched by the selection.
///
/// An empty selection toggles the caret line. Each line is toggled on its own:
/// blank lines are left alone, lines whose content already starts with the
/// comment marker lose the marker and one following space, and every other
/// line gets the comment prefix inserted after its leading whitespace.
pub fn toggle_comment(
    text: &str,
    selection: Range<usize>,
    content_type: ContentType,
) -> CommentToggle {
    let prefix = content_type.comment_prefix();
    let marker = prefix.trim_end();

    // INVARIANT: A selection ending right after a newline does not touch the
    // line that follows it.
    let mut end = selection.end.min(text.len());
    if end > selection.start && text.as_bytes().get(end - 1) == Some(&b'\n') {
        end -= 1;
    }
    let block = line_span(text, selection.start..end);

    let mut replacement = String::with_capacity(block.len() + prefix.len());
    let mut edits: Vec<(usize, usize, usize)> = Vec::new();
    let mut line_start = block.start;

    for (index, line) in text[block.clone()].split('\n').enumerate() {
        if index > 0 {
            replacement.push('\n');
        }

        let content = line.trim_start_matches([' ', '\t']);
        let indent = line.len() - content.len();
        let at = line_start + indent;

        if content.trim().is_empty() {
            replacement.push_str(line);
        } else if let Some(rest) = content.strip_prefix(marker) {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            let removed = content.len() - rest.len();
            replacement.push_str(&line[..indent]);
            replacement.push_str(rest);
            edits.push((at, removed, 0));
        } else {
            replacement.push_str(&line[..indent]);
            replacement.push_str(prefix);
            replacement.push_str(content);
            edits.push((at, 0, prefix.len()));
        }

        line_start += line.len() + 1;
    }

    let remap = |offset: usize| -> usize {
        let mut mapped = offset as isize;
        for &(at, removed, inserted) in &edits {
            if removed == 0 {
                if offset > at {
                    mapped += inserted as isize;
                }
            } else if offset >= at + removed {
                mapped -= removed as isize;
            } else if offset > at {
                mapped -= (offset - at) as isize;
            }
        }
        mapped.max(0) as usize
    };

    CommentToggle {
        range: block,
        replacement,
        selection: remap(selection.start)..remap(selection.end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn toggle_comment_on_selected_lines() {
        let text = indoc! {r#"
            export A=1
              export B=2

            export C=3
        "#};
        let toggle = toggle_comment(text, 0..text.len(), ContentType::Shell);
        let result = toggle.apply(text);
        let expect = indoc! {r#"
            # export A=1
              # export B=2

            # export C=3
        "#};
        assert_eq!(result, expect);

        let toggle = toggle_comment(&result, 0..result.len(), ContentType::Shell);
        assert_eq!(toggle.apply(&result), text);
    }

    #[test]
    fn toggle_comment_on_caret_line_only() {
        let text = "one\ntwo\nthree";
        let toggle = toggle_comment(text, 5..5, ContentType::Rust);
        assert_eq!(toggle.apply(text), "one\n// two\nthree");
        assert_eq!(toggle.selection, 8..8);
    }

    #[test]
    fn selection_ending_at_line_start_skips_next_line() {
        let text = "one\ntwo\n";
        let toggle = toggle_comment(text, 0..4, ContentType::Ini);
        assert_eq!(toggle.apply(text), "# one\ntwo\n");
        assert_eq!(toggle.selection, 0..6);
    }

    #[test]
    fn uncomment_without_trailing_space() {
        let text = "#compact\n# spaced";
        let toggle = toggle_comment(text, 0..text.len(), ContentType::Yaml);
        assert_eq!(toggle.apply(text), "compact\nspaced");
    }
}
