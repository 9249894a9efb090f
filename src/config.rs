// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the settings file that Confkeep uses to simplify the
//! process of serialization and deserialization. File I/O is left to the
//! caller to figure out.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

/// Settings file layout.
///
/// # General Layout
///
/// Settings are split into two tables. The `highlight` table tunes how
/// editing sessions schedule highlight passes. The `history` table tunes where
/// snapshots are stored and who authors them. Every field is optional, so an
/// empty file yields the defaults.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Highlight scheduling settings.
    pub highlight: HighlightOptions,

    /// Snapshot history settings.
    pub history: HistorySettings,
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: Settings = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on store directory field.
        if let Some(store_dir) = settings.history.store_dir.take() {
            settings.history.store_dir = Some(PathBuf::from(
                shellexpand::full(store_dir.to_string_lossy().as_ref())
                    .map_err(ConfigError::ShellExpansion)?
                    .into_owned(),
            ));
        }

        Ok(settings)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Highlight scheduling settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HighlightOptions {
    /// Buffers with at least this many characters use tiered highlighting.
    pub large_file_threshold_chars: usize,

    /// Quiet time after the last keystroke before the caret line of a large
    /// buffer is highlighted again.
    pub debounce_ms: u64,
}

impl HighlightOptions {
    /// Debounce interval as [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Check if buffer of `chars` characters counts as large.
    pub fn is_large(&self, chars: usize) -> bool {
        chars >= self.large_file_threshold_chars
    }
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            large_file_threshold_chars: 100_000,
            debounce_ms: 200,
        }
    }
}

/// Snapshot history settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Directory holding one history repository per tracked file.
    ///
    /// Uses [`crate::path::default_history_store_dir`] when unset.
    pub store_dir: Option<PathBuf>,

    /// Author name recorded on snapshots.
    pub author_name: String,

    /// Author email recorded on snapshots.
    pub author_email: String,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            store_dir: None,
            author_name: "Configs App".into(),
            author_email: "configs@app.local".into(),
        }
    }
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("BLAH", "/home/blah")])]
    fn deserialize_settings() -> anyhow::Result<()> {
        let result: Settings = r#"
            [highlight]
            large_file_threshold_chars = 5000
            debounce_ms = 50

            [history]
            store_dir = "$BLAH/versions"
            author_name = "Blah"
            author_email = "blah@blah.org"
        "#
        .parse()?;

        let expect = Settings {
            highlight: HighlightOptions {
                large_file_threshold_chars: 5000,
                debounce_ms: 50,
            },
            history: HistorySettings {
                store_dir: Some("/home/blah/versions".into()),
                author_name: "Blah".into(),
                author_email: "blah@blah.org".into(),
            },
        };
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn missing_fields_use_defaults() -> anyhow::Result<()> {
        let result: Settings = "[highlight]\ndebounce_ms = 10\n".parse()?;
        assert_eq!(result.highlight.debounce(), Duration::from_millis(10));
        assert_eq!(result.highlight.large_file_threshold_chars, 100_000);
        assert_eq!(result.history, HistorySettings::default());

        let result: Settings = "".parse()?;
        assert_eq!(result, Settings::default());

        Ok(())
    }

    #[test]
    fn serialize_settings() {
        let result = Settings {
            history: HistorySettings {
                store_dir: Some("/home/blah/versions".into()),
                ..Default::default()
            },
            ..Default::default()
        }
        .to_string();

        let expect = indoc! {r#"
            [highlight]
            large_file_threshold_chars = 100000
            debounce_ms = 200

            [history]
            store_dir = "/home/blah/versions"
            author_name = "Configs App"
            author_email = "configs@app.local"
        "#};

        assert_eq!(result, expect);
    }
}
