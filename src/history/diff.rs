// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Typed textual diffs between snapshots.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Kind of line in a unified diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffLineKind {
    /// File header, e.g., `--- a/config` and `+++ b/config`.
    FileHeader,

    /// Hunk header, e.g., `@@ -1,2 +1,3 @@`.
    HunkHeader,

    Added,
    Removed,
    Context,

    /// Marker such as "no newline at end of file".
    Marker,
}

/// Single line of a unified diff.
///
/// Content never carries its trailing newline. File headers may span several
/// physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    pub content: String,
}

impl DiffLine {
    /// Construct new diff line from a libgit2 line origin.
    pub fn new(origin: char, content: &str) -> Self {
        let kind = match origin {
            'F' => DiffLineKind::FileHeader,
            'H' => DiffLineKind::HunkHeader,
            '+' => DiffLineKind::Added,
            '-' => DiffLineKind::Removed,
            ' ' => DiffLineKind::Context,
            _ => DiffLineKind::Marker,
        };

        Self {
            kind,
            content: content.trim_end_matches('\n').to_string(),
        }
    }
}

impl Display for DiffLine {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self.kind {
            DiffLineKind::Added => write!(fmt, "+{}", self.content),
            DiffLineKind::Removed => write!(fmt, "-{}", self.content),
            DiffLineKind::Context => write!(fmt, " {}", self.content),
            DiffLineKind::FileHeader | DiffLineKind::HunkHeader => {
                fmt.write_str(&self.content)
            }
            DiffLineKind::Marker => fmt.write_str(self.content.trim_start_matches('\n')),
        }
    }
}

/// Changes a snapshot introduced relative to its predecessor.
///
/// The first snapshot of a history has no predecessor, so every line of it
/// shows up as added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Identifier of snapshot the diff belongs to.
    pub id: String,

    /// Lines of unified diff in order.
    pub lines: Vec<DiffLine>,
}

impl SnapshotDiff {
    /// Content of added lines.
    pub fn added(&self) -> impl Iterator<Item = &str> {
        self.lines_of(DiffLineKind::Added)
    }

    /// Content of removed lines.
    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.lines_of(DiffLineKind::Removed)
    }

    /// Check if snapshot changed nothing, e.g., a forced checkpoint.
    pub fn is_empty(&self) -> bool {
        !self.lines.iter().any(|line| {
            matches!(line.kind, DiffLineKind::Added | DiffLineKind::Removed)
        })
    }

    fn lines_of(&self, kind: DiffLineKind) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(move |line| line.kind == kind)
            .map(|line| line.content.as_str())
    }
}

impl Display for SnapshotDiff {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        for line in &self.lines {
            writeln!(fmt, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_as_unified_diff() {
        let diff = SnapshotDiff {
            id: "abc".into(),
            lines: vec![
                DiffLine::new('F', "--- a/config\n+++ b/config\n"),
                DiffLine::new('H', "@@ -1,2 +1,2 @@\n"),
                DiffLine::new(' ', "a = 1\n"),
                DiffLine::new('-', "b = 2\n"),
                DiffLine::new('+', "b = 3"),
                DiffLine::new('>', "\n\\ No newline at end of file\n"),
            ],
        };

        let expect = indoc! {r#"
            --- a/config
            +++ b/config
            @@ -1,2 +1,2 @@
             a = 1
            -b = 2
            +b = 3
            \ No newline at end of file
        "#};
        assert_eq!(diff.to_string(), expect);
        assert_eq!(diff.added().collect::<Vec<_>>(), vec!["b = 3"]);
        assert_eq!(diff.removed().collect::<Vec<_>>(), vec!["b = 2"]);
        assert!(!diff.is_empty());
    }
}
