// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Content-type classification.
//!
//! Map a file name to the logical syntax family used for highlighting. The
//! classifier only ever looks at the name of a file, never its contents.
//!
//! # Rule Table
//!
//! Classification is driven by an ordered table of rule groups. Each group
//! belongs to an ecosystem, e.g., shell configuration, Git configuration,
//! Node.js tooling, etc. Groups are checked in a fixed priority order: shell
//! first, then Git, then the ecosystem-specific groups, and finally a generic
//! extension table. The first rule that matches wins. Names that match nothing
//! are classified as [`ContentType::Generic`].
//!
//! All matching is case-insensitive. Both the file name and the rule text are
//! lowercased before comparison.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
};

/// Logical syntax family of a buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Shell,
    Git,
    Json,
    Yaml,
    Python,
    Ruby,
    Xml,
    Go,
    Toml,
    Php,
    Cpp,
    C,
    R,
    Docker,
    Sql,
    JavaScript,
    TypeScript,
    Ini,
    Conf,
    Markdown,
    Html,
    Css,
    Scss,
    Less,
    Vue,
    Svelte,
    Rust,
    Java,
    Kotlin,
    Swift,
    Lua,
    Perl,
    Scala,
    Groovy,
    Terraform,
    Hcl,
    Protobuf,
    GraphQl,
    Env,
    Properties,
    Log,
    Text,
    #[default]
    Generic,
}

impl ContentType {
    /// Short tag of content type.
    ///
    /// The generic content type has an empty tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Shell => "sh",
            Self::Git => "git",
            Self::Json => "json",
            Self::Yaml => "yml",
            Self::Python => "py",
            Self::Ruby => "ruby",
            Self::Xml => "xml",
            Self::Go => "go",
            Self::Toml => "toml",
            Self::Php => "php",
            Self::Cpp => "cpp",
            Self::C => "c",
            Self::R => "r",
            Self::Docker => "docker",
            Self::Sql => "sql",
            Self::JavaScript => "js",
            Self::TypeScript => "ts",
            Self::Ini => "ini",
            Self::Conf => "conf",
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Css => "css",
            Self::Scss => "scss",
            Self::Less => "less",
            Self::Vue => "vue",
            Self::Svelte => "svelte",
            Self::Rust => "rust",
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::Swift => "swift",
            Self::Lua => "lua",
            Self::Perl => "perl",
            Self::Scala => "scala",
            Self::Groovy => "groovy",
            Self::Terraform => "terraform",
            Self::Hcl => "hcl",
            Self::Protobuf => "protobuf",
            Self::GraphQl => "graphql",
            Self::Env => "env",
            Self::Properties => "properties",
            Self::Log => "log",
            Self::Text => "text",
            Self::Generic => "",
        }
    }

    /// Highlight family whose pattern table styles this content type.
    pub fn family(&self) -> Family {
        match self {
            Self::Json => Family::Json,
            Self::Yaml => Family::Yaml,
            Self::Shell => Family::Shell,
            Self::Git | Self::Ini | Self::Conf | Self::Env | Self::Properties => Family::Ini,
            Self::Toml => Family::Toml,
            Self::Python => Family::Python,
            Self::Xml | Self::Html | Self::Vue | Self::Svelte => Family::Xml,
            _ => Family::Plain,
        }
    }

    /// Line comment prefix used when toggling comments.
    pub fn comment_prefix(&self) -> &'static str {
        match self {
            Self::JavaScript
            | Self::TypeScript
            | Self::C
            | Self::Cpp
            | Self::Java
            | Self::Swift
            | Self::Go
            | Self::Rust
            | Self::Kotlin
            | Self::Scala
            | Self::Groovy => "// ",
            _ => "# ",
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        if self.tag().is_empty() {
            return fmt.write_str("generic");
        }

        fmt.write_str(self.tag())
    }
}

/// Group of content types that share one pattern table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Json,
    Yaml,
    Shell,
    Ini,
    Toml,
    Python,
    Xml,
    Plain,
}

/// Single classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Lowercased file name ends with text.
    Suffix(&'static str),

    /// Lowercased file name starts with text.
    Prefix(&'static str),
}

impl Rule {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Suffix(text) => name.ends_with(&text.to_lowercase()),
            Self::Prefix(text) => name.starts_with(&text.to_lowercase()),
        }
    }
}

/// Ecosystem rule group mapping to one content type.
#[derive(Debug, Clone, Copy)]
pub struct RuleGroup {
    pub ecosystem: &'static str,
    pub rules: &'static [Rule],
    pub content_type: ContentType,
}

use Rule::{Prefix, Suffix};

macro_rules! group {
    ($ecosystem:literal => $ty:ident [$($rule:expr),* $(,)?]) => {
        RuleGroup {
            ecosystem: $ecosystem,
            rules: &[$($rule),*],
            content_type: ContentType::$ty,
        }
    };
}

/// Ecosystem-specific rule groups in priority order.
pub static ECOSYSTEM_RULES: &[RuleGroup] = &[
    group!("shell" => Shell [
        Suffix(".sh"), Suffix(".zsh"), Suffix(".bash"), Prefix(".zsh"), Prefix(".bash"),
        Suffix(".profile"), Suffix(".zprofile"), Suffix(".rc"), Suffix(".bashrc"),
        Suffix(".zshrc"), Suffix(".zshenv"), Suffix(".zlogin"), Suffix(".zlogout"),
        Suffix(".inputrc"), Suffix(".dir_colors"), Suffix(".tmux.conf"), Suffix(".screenrc"),
        Suffix(".nanorc"), Suffix(".fzf.zsh"), Suffix(".fzf.bash"),
    ]),
    group!("git" => Git [
        Suffix(".gitconfig"), Suffix(".gitignore"), Suffix(".gitattributes"), Suffix(".gitmodules"),
    ]),
    group!("node" => Json [
        Suffix(".npmrc"), Suffix(".yarnrc"), Suffix(".nvmrc"), Suffix(".npmignore"),
        Suffix(".prettierrc"), Suffix(".prettierignore"), Suffix(".eslintrc"),
        Suffix(".eslintrc.json"), Suffix(".eslintignore"), Suffix(".stylelintrc"),
        Suffix(".stylelintignore"), Suffix(".babelrc"), Suffix(".babelrc.js"),
        Suffix(".parcelrc"), Suffix(".mocharc.json"), Suffix(".mocharc.js"),
    ]),
    group!("python" => Python [
        Suffix(".pypirc"), Suffix(".pythonrc"), Suffix(".condarc"),
        Suffix("jupyter_notebook_config.py"), Suffix("ipython_config.py"),
    ]),
    group!("ruby" => Ruby [
        Suffix(".irbrc"), Suffix(".pryrc"), Suffix(".gemrc"), Suffix(".railsrc"), Suffix(".rspec"),
        Suffix(".rubocop.yml"), Suffix(".ruby-version"), Suffix(".ruby-gemset"),
    ]),
    group!("java" => Xml [
        Suffix("settings.xml"), Suffix("pom.xml"), Suffix("gradle.properties"),
        Suffix("gradle-wrapper.properties"),
    ]),
    group!("go" => Go [Suffix(".goenv"), Suffix(".gorc")]),
    group!("rust" => Toml [Suffix("Cargo.toml"), Suffix("rustfmt.toml"), Suffix("clippy.toml")]),
    group!("php" => Php [Suffix(".phpenv"), Suffix(".php.ini")]),
    group!("c/c++" => Cpp [
        Suffix(".clang-format"), Suffix(".clang-tidy"), Suffix(".gdbinit"), Suffix(".lldbinit"),
    ]),
    group!("r" => R [Suffix(".Rprofile"), Suffix(".Renviron"), Suffix(".Rhistory")]),
    group!("docker" => Docker [
        Suffix("Dockerfile"), Suffix(".dockerignore"), Suffix("docker-compose.yml"),
        Suffix("docker-compose.yaml"),
    ]),
    group!("database" => Sql [
        Suffix(".my.cnf"), Suffix(".psqlrc"), Suffix(".pgpass"), Suffix(".sqliterc"),
    ]),
];

/// Generic extension rules checked after every ecosystem group.
pub static EXTENSION_RULES: &[RuleGroup] = &[
    group!("generic" => Json [Suffix(".json")]),
    group!("generic" => Yaml [Suffix(".yml"), Suffix(".yaml")]),
    group!("generic" => Python [Suffix(".py"), Prefix(".python")]),
    group!("generic" => JavaScript [Suffix(".js")]),
    group!("generic" => TypeScript [Suffix(".ts")]),
    group!("generic" => Toml [Suffix(".toml")]),
    group!("generic" => Ini [Suffix(".ini")]),
    group!("generic" => Conf [Suffix(".conf"), Suffix(".config")]),
    group!("generic" => Xml [Suffix(".xml")]),
    group!("generic" => Markdown [Suffix(".md")]),
    group!("generic" => Html [Suffix(".html"), Suffix(".htm")]),
    group!("generic" => Css [Suffix(".css")]),
    group!("generic" => Scss [Suffix(".scss"), Suffix(".sass")]),
    group!("generic" => Less [Suffix(".less")]),
    group!("generic" => Vue [Suffix(".vue")]),
    group!("generic" => Svelte [Suffix(".svelte")]),
    group!("generic" => Rust [Suffix(".rs")]),
    group!("generic" => Go [Suffix(".go")]),
    group!("generic" => Ruby [Suffix(".rb")]),
    group!("generic" => Php [Suffix(".php")]),
    group!("generic" => Java [Suffix(".java")]),
    group!("generic" => Kotlin [Suffix(".kt")]),
    group!("generic" => Swift [Suffix(".swift")]),
    group!("generic" => C [Suffix(".c")]),
    group!("generic" => Cpp [
        Suffix(".cpp"), Suffix(".cc"), Suffix(".cxx"), Suffix(".h"), Suffix(".hpp"),
    ]),
    group!("generic" => Sql [Suffix(".sql")]),
    group!("generic" => Lua [Suffix(".lua")]),
    group!("generic" => Perl [Suffix(".pl"), Suffix(".pm")]),
    group!("generic" => R [Suffix(".r")]),
    group!("generic" => Scala [Suffix(".scala")]),
    group!("generic" => Groovy [Suffix(".groovy"), Suffix(".gradle")]),
    group!("generic" => Terraform [Suffix(".tf"), Suffix(".tfvars")]),
    group!("generic" => Hcl [Suffix(".hcl")]),
    group!("generic" => Protobuf [Suffix(".proto")]),
    group!("generic" => GraphQl [Suffix(".graphql"), Suffix(".gql")]),
    group!("generic" => Env [Suffix(".env")]),
    group!("generic" => Properties [Suffix(".properties")]),
    group!("generic" => Log [Suffix(".log")]),
    group!("generic" => Text [Suffix(".txt")]),
];

/// Classify file name into a content type.
///
/// Only the final path component is considered, so `~/.config/git/.gitconfig`
/// and `.gitconfig` classify the same way. Never fails, names that match no
/// rule are [`ContentType::Generic`].
pub fn classify(name: impl AsRef<Path>) -> ContentType {
    let name = match name.as_ref().file_name() {
        Some(name) => name.to_string_lossy().to_lowercase(),
        None => return ContentType::Generic,
    };

    ECOSYSTEM_RULES
        .iter()
        .chain(EXTENSION_RULES)
        .find(|group| group.rules.iter().any(|rule| rule.matches(&name)))
        .map(|group| group.content_type)
        .unwrap_or_default()
}
