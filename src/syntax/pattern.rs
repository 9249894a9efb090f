// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Highlight pattern tables.
//!
//! Each highlight [`Family`] owns an ordered list of pattern specifications.
//! A specification pairs a regular expression with the [`HighlightClass`] it
//! paints. Order matters, because later patterns overlay earlier ones where
//! they overlap.
//!
//! Every family's list ends with the link pattern, so plain buffers still get
//! clickable-looking URLs.
//!
//! # Capture Groups
//!
//! If a pattern has at least one capture group, the styled span is the span of
//! the first group rather than the whole match. This keeps separators like the
//! colon in `key: value` out of the property span.

use crate::syntax::classify::Family;

use regex::{Regex, RegexBuilder};
use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Range,
    sync::LazyLock,
};
use tracing::warn;

/// Semantic class of a styled range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightClass {
    Keyword,
    String,
    Comment,
    Number,
    Property,
    Command,
    Variable,
    Punctuation,
    Link,
    SearchMatch,
}

impl HighlightClass {
    /// Styling layer the class is painted on.
    pub fn layer(&self) -> StyleLayer {
        match self {
            Self::SearchMatch => StyleLayer::Background,
            _ => StyleLayer::Foreground,
        }
    }
}

impl Display for HighlightClass {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Keyword => "keyword",
            Self::String => "string",
            Self::Comment => "comment",
            Self::Number => "number",
            Self::Property => "property",
            Self::Command => "command",
            Self::Variable => "variable",
            Self::Punctuation => "punctuation",
            Self::Link => "link",
            Self::SearchMatch => "search-match",
        };
        fmt.write_str(name)
    }
}

/// Whether a class colors the text itself or the area behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleLayer {
    Foreground,
    Background,
}

/// Uncompiled pattern specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternSpec {
    pub pattern: &'static str,
    pub class: HighlightClass,
}

const fn spec(pattern: &'static str, class: HighlightClass) -> PatternSpec {
    PatternSpec { pattern, class }
}

use HighlightClass::{Command, Comment, Keyword, Link, Number, Property, Punctuation, Variable};

const LINK: PatternSpec = spec(r"(https?://[^\s]+)", Link);

static JSON: &[PatternSpec] = &[
    spec(r"([{}\[\],:])", Punctuation),
    spec(r"(-?\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)\b", Number),
    spec(r"\b(true|false|null)\b", Keyword),
    spec(r#"("[^"\n]*")"#, HighlightClass::String),
    spec(r#"("[^"\n]*")\s*:"#, Property),
    LINK,
];

static YAML: &[PatternSpec] = &[
    spec(r"^[ \t]*(?:-[ \t]+)?([-\w.]+)[ \t]*:", Property),
    spec(r#"("[^"\n]*"|'[^'\n]*')"#, HighlightClass::String),
    spec(r"(?:^|[ \t])(#.*)", Comment),
    LINK,
];

static SHELL: &[PatternSpec] = &[
    spec(r"(?:^|[ \t])(#.*)", Comment),
    spec(
        r"\b(if|then|else|elif|fi|for|while|do|done|case|esac|in|function|export|return|local|alias|source)\b",
        Keyword,
    ),
    spec(
        r"\b(echo|printf|cd|ls|rm|mv|cp|mkdir|touch|grep|sed|awk|cat|head|tail|chmod|chown|eval)\b",
        Command,
    ),
    spec(r#"("[^"\n]*"|'[^'\n]*')"#, HighlightClass::String),
    spec(r"(\$[a-zA-Z_][a-zA-Z0-9_]*|\$\{[^}\n]*\})", Variable),
    LINK,
];

static INI: &[PatternSpec] = &[
    spec(r"^[ \t]*(#.*)", Comment),
    spec(r"^[ \t]*(;.*)", Comment),
    spec(r"^[ \t]*(\[[^\]\n]+\])", Keyword),
    spec(r"^[ \t]*([^=\s#;\[][^=\n]*?)[ \t]*=", Property),
    LINK,
];

static TOML: &[PatternSpec] = &[
    spec(r"^[ \t]*(\[\[?[^\]\n]+\]\]?)", Keyword),
    spec(r"^[ \t]*([\w.\-]+)[ \t]*=", Property),
    spec(r"=[ \t]*(true|false)\b", Keyword),
    spec(r"=[ \t]*([-+]?\d[\d_]*(?:\.\d+)?)\b", Number),
    spec(r#"("[^"\n]*"|'[^'\n]*')"#, HighlightClass::String),
    spec(r"(?:^|[ \t])(#.*)", Comment),
    LINK,
];

static PYTHON: &[PatternSpec] = &[
    spec(
        r"\b(def|class|import|from|as|if|elif|else|for|while|return|with|try|except|finally|lambda|pass|True|False|None|and|or|not|in|is)\b",
        Keyword,
    ),
    spec(r"\b(\d+(?:\.\d+)?)\b", Number),
    spec(r#"("[^"\n]*"|'[^'\n]*')"#, HighlightClass::String),
    spec(r"(?:^|[ \t])(#.*)", Comment),
    LINK,
];

static XML: &[PatternSpec] = &[
    spec(r"</?([A-Za-z_][\w:.\-]*)", Keyword),
    spec(r"\b([A-Za-z_][\w:.\-]*)=", Property),
    spec(r#"("[^"\n]*"|'[^'\n]*')"#, HighlightClass::String),
    spec(r"(?s)(<!--.*?-->)", Comment),
    LINK,
];

static PLAIN: &[PatternSpec] = &[LINK];

/// Ordered pattern specifications of highlight family.
pub fn specs_for(family: Family) -> &'static [PatternSpec] {
    match family {
        Family::Json => JSON,
        Family::Yaml => YAML,
        Family::Shell => SHELL,
        Family::Ini => INI,
        Family::Toml => TOML,
        Family::Python => PYTHON,
        Family::Xml => XML,
        Family::Plain => PLAIN,
    }
}

/// Compiled highlight pattern.
#[derive(Debug, Clone)]
pub struct HighlightPattern {
    regex: Regex,
    class: HighlightClass,
}

impl HighlightPattern {
    /// Compile pattern specification.
    ///
    /// Patterns are compiled case-insensitive, and with `^`/`$` anchored to
    /// line boundaries.
    ///
    /// # Errors
    ///
    /// - Return [`PatternCompileError`] if the regular expression is invalid.
    pub fn try_new(spec: &PatternSpec) -> Result<Self, PatternCompileError> {
        let regex = RegexBuilder::new(spec.pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .map_err(|source| PatternCompileError {
                pattern: spec.pattern.to_string(),
                source,
            })?;

        Ok(Self {
            regex,
            class: spec.class,
        })
    }

    pub fn class(&self) -> HighlightClass {
        self.class
    }

    /// Find styled spans in text.
    ///
    /// Returns the span of the first capture group if the pattern has one,
    /// or the whole match otherwise. Empty spans are skipped.
    pub fn find_spans<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Range<usize>> + 't {
        let grouped = self.regex.captures_len() > 1;
        self.regex
            .captures_iter(text)
            .filter_map(move |caps| {
                let span = if grouped { caps.get(1) } else { caps.get(0) };
                span.map(|span| span.range())
            })
            .filter(|span| !span.is_empty())
    }
}

/// Compiled, ordered pattern list for one highlight family.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<HighlightPattern>,
}

impl PatternSet {
    /// Compile a list of pattern specifications.
    ///
    /// Patterns that fail to compile are logged and skipped. One bad pattern
    /// never prevents the rest of the set from being used.
    pub fn compile(specs: &[PatternSpec]) -> Self {
        let patterns = specs
            .iter()
            .filter_map(|spec| match HighlightPattern::try_new(spec) {
                Ok(pattern) => Some(pattern),
                Err(error) => {
                    warn!("skip highlight pattern: {error}");
                    None
                }
            })
            .collect();

        Self { patterns }
    }

    /// Shared compiled pattern set of a highlight family.
    pub fn for_family(family: Family) -> &'static PatternSet {
        static EMPTY: PatternSet = PatternSet {
            patterns: Vec::new(),
        };
        static SETS: LazyLock<HashMap<Family, PatternSet>> = LazyLock::new(|| {
            [
                Family::Json,
                Family::Yaml,
                Family::Shell,
                Family::Ini,
                Family::Toml,
                Family::Python,
                Family::Xml,
                Family::Plain,
            ]
            .into_iter()
            .map(|family| (family, PatternSet::compile(specs_for(family))))
            .collect()
        });

        SETS.get(&family).unwrap_or(&EMPTY)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HighlightPattern> {
        self.patterns.iter()
    }

    /// Only the comment patterns of the set.
    pub fn comments(&self) -> impl Iterator<Item = &HighlightPattern> {
        self.patterns
            .iter()
            .filter(|pattern| pattern.class == HighlightClass::Comment)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Highlight pattern failed to compile.
#[derive(Debug, thiserror::Error)]
#[error("invalid highlight pattern {pattern:?}")]
pub struct PatternCompileError {
    pub pattern: String,

    #[source]
    pub source: regex::Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_builtin_pattern_compiles() {
        for family in [
            Family::Json,
            Family::Yaml,
            Family::Shell,
            Family::Ini,
            Family::Toml,
            Family::Python,
            Family::Xml,
            Family::Plain,
        ] {
            let specs = specs_for(family);
            assert_eq!(PatternSet::compile(specs).len(), specs.len(), "{family:?}");
            assert_eq!(specs.last(), Some(&LINK));
        }
    }

    #[test]
    fn bad_pattern_is_skipped() {
        let specs = [
            spec(r"(unclosed", Keyword),
            spec(r"\b(echo)\b", Command),
        ];
        let set = PatternSet::compile(&specs);
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().map(HighlightPattern::class), Some(Command));
    }

    #[test]
    fn capture_group_span_excludes_separator() -> anyhow::Result<()> {
        let pattern = HighlightPattern::try_new(&YAML[0])?;
        let spans = pattern.find_spans("name: value\n  nested: 1").collect::<Vec<_>>();
        assert_eq!(spans, vec![0..4, 14..20]);
        Ok(())
    }

    #[test]
    fn search_match_is_background() {
        assert_eq!(HighlightClass::SearchMatch.layer(), StyleLayer::Background);
        assert_eq!(Comment.layer(), StyleLayer::Foreground);
        assert_eq!(HighlightClass::SearchMatch.to_string(), "search-match");
    }
}
