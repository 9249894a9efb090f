// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

mod integration;

use anyhow::Result;
use confkeep::history::HistoryStore;
use git2::Repository;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

/// Fake home directory with its own history store.
pub(crate) struct HomeFixture {
    root: TempDir,
    store: HistoryStore,
}

impl HomeFixture {
    pub(crate) fn new() -> Result<Self> {
        let root = TempDir::new()?;
        let store = HistoryStore::new(root.path().join("versions"))?;
        fs::create_dir_all(root.path().join("home"))?;

        Ok(Self { root, store })
    }

    pub(crate) fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Write configuration file under fake home directory.
    pub(crate) fn write(&self, name: impl AsRef<Path>, contents: impl AsRef<str>) -> Result<PathBuf> {
        let path = self.root.path().join("home").join(name.as_ref());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents.as_ref())?;

        Ok(path)
    }

    /// Open history repository of tracked file directly through libgit2.
    pub(crate) fn repository(&self, path: impl AsRef<Path>) -> Result<Repository> {
        Ok(Repository::open(self.store.repository_dir(path)?)?)
    }
}
