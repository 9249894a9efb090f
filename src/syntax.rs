// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Pattern-based syntax highlighting.
//!
//! Confkeep highlights configuration files with ordered tables of regular
//! expressions instead of a real grammar. That is plenty for dotfiles, which
//! are mostly comments, keys, values, and the odd shell command.
//!
//! # Pipeline
//!
//! 1. [`classify`] maps a file name to a [`ContentType`]. The content type
//!    selects a highlight [`Family`], and the family selects a pattern table.
//! 2. [`highlight`] runs the pattern table over a region of the buffer and
//!    returns a [`HighlightPass`] of [`StyledRange`]s.
//! 3. A renderer paints the ranges. [`paint_ansi`] is the terminal renderer
//!    used by the command-line front end.
//!
//! Everything in this module is a pure function of its arguments. Owning the
//! buffer, deciding _when_ to highlight, and painting results back onto a view
//! is the job of [`crate::session`].

pub mod classify;
pub mod comment;
pub mod highlight;
pub mod pattern;
pub mod render;
pub mod search;
pub mod theme;

pub use classify::{classify, ContentType, Family};
pub use comment::{toggle_comment, CommentToggle};
pub use highlight::{comment_ranges, highlight, line_span, HighlightPass, StyledRange};
pub use pattern::{HighlightClass, PatternCompileError, PatternSet, StyleLayer};
pub use render::paint_ansi;
pub use search::{find_matches, find_next, find_previous, SearchHit, SearchQuery};
pub use theme::{Rgb, Theme};
