// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Snapshot history of tracked configuration files.
//!
//! Every tracked file gets its own linear history of __snapshots__, kept apart
//! from the live copy of the file itself. Saving a file commits a snapshot,
//! and any snapshot can be viewed, diffed against its predecessor, or
//! restored into an editor buffer.
//!
//! # History Store Layout
//!
//! The history store can be placed anywhere on the user's file system.
//! However, the default location is `$XDG_DATA_HOME/confkeep/versions`. Each
//! tracked file gets one repository directory named after its file name with
//! dots replaced by underscores, plus a short hash of its full path. So,
//! `/home/blah/.bashrc` lives in something like `_bashrc-1f3a9c0e22b4`.
//! Distinct files with the same name never share a history.
//!
//! # Lifecycle
//!
//! A tracked path starts out uninitialized. Its repository is created lazily
//! on the first [`HistoryStore::ensure_repository`] or commit, and gains its
//! first snapshot on the first successful commit. Histories only ever grow.
//!
//! # Concurrency
//!
//! Operations on the same tracked path are serialized through a per-path
//! lock. Operations on different paths proceed independently.

pub mod backend;
pub mod diff;

pub use backend::{BackendError, Git2Versioning, Revision, Versioning};
pub use diff::{DiffLine, DiffLineKind, SnapshotDiff};

use backend::short_hash;

use chrono::{DateTime, FixedOffset, Local};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{info, instrument};

/// One historical version of a tracked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Opaque identifier.
    pub id: String,

    /// Time snapshot was taken.
    pub timestamp: DateTime<FixedOffset>,

    /// Snapshot message.
    pub message: String,

    /// Tracked file snapshot belongs to.
    pub path: PathBuf,
}

impl Snapshot {
    fn new(path: &Path, revision: Revision) -> Self {
        Self {
            id: revision.id,
            timestamp: revision.timestamp,
            message: revision.message,
            path: path.to_path_buf(),
        }
    }

    /// Abbreviated identifier for display.
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(7)]
    }
}

/// Commit behavior for unchanged content.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Always create a snapshot, even if content did not change.
    Force,

    /// Skip commit if content matches the newest snapshot.
    #[default]
    IfChanged,
}

/// Store of snapshot histories.
///
/// Scoped to whatever root directory it is constructed with. Nothing about it
/// is global, so tests can point it at a temporary directory.
#[derive(Debug)]
pub struct HistoryStore<V = Git2Versioning>
where
    V: Versioning,
{
    root: PathBuf,
    backend: V,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl HistoryStore<Git2Versioning> {
    /// Construct new history store at root using libgit2.
    ///
    /// # Errors
    ///
    /// - Return [`HistoryError::Io`] if root directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_backend(root, Git2Versioning::default())
    }
}

impl<V> HistoryStore<V>
where
    V: Versioning,
{
    /// Construct new history store at root with given versioning backend.
    ///
    /// # Errors
    ///
    /// - Return [`HistoryError::Io`] if root directory cannot be created.
    pub fn with_backend(root: impl Into<PathBuf>, backend: V) -> Result<Self> {
        let root = root.into();
        mkdirp::mkdirp(&root)?;

        Ok(Self {
            root,
            backend,
            locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Repository directory holding the history of tracked path.
    ///
    /// # Errors
    ///
    /// - Return [`HistoryError::Backend`] if path cannot be hashed.
    pub fn repository_dir(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().replace('.', "_"))
            .unwrap_or_else(|| "file".into());
        let hash = short_hash(path.as_os_str().as_encoded_bytes())?;

        Ok(self.root.join(format!("{name}-{hash}")))
    }

    /// Provision history of tracked path if it does not exist yet.
    ///
    /// # Errors
    ///
    /// - Return [`HistoryError::Backend`] if repository cannot be created.
    #[instrument(skip(self, path), level = "debug")]
    pub fn ensure_repository(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = self.repository_dir(path)?;
        let lock = self.lock(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.backend.initialize(&dir)?;
        Ok(())
    }

    /// Commit content as newest snapshot of tracked path.
    ///
    /// Uses a timestamped default message when `message` is `None`. Return
    /// `None` if `mode` is [`CommitMode::IfChanged`] and content matches the
    /// newest snapshot.
    ///
    /// # Errors
    ///
    /// - Return [`HistoryError::SnapshotWrite`] if the snapshot cannot be
    ///   written. History is left exactly as it was.
    #[instrument(skip(self, path, content, message), level = "debug")]
    pub fn commit(
        &self,
        path: impl AsRef<Path>,
        content: impl AsRef<str>,
        message: Option<&str>,
        mode: CommitMode,
    ) -> Result<Option<Snapshot>> {
        let path = path.as_ref();
        let dir = self.repository_dir(path)?;
        let message = match message {
            Some(message) => message.to_string(),
            None => default_message(),
        };

        let lock = self.lock(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let revision = self
            .backend
            .commit(
                &dir,
                content.as_ref(),
                &message,
                mode == CommitMode::Force,
            )
            .map_err(|source| HistoryError::SnapshotWrite {
                path: path.to_path_buf(),
                source,
            })?;

        match revision {
            Some(revision) => {
                info!("snapshot {} of {:?}", revision.id, path.display());
                Ok(Some(Snapshot::new(path, revision)))
            }
            None => {
                info!("{:?} unchanged, skip snapshot", path.display());
                Ok(None)
            }
        }
    }

    /// Commit content only if it differs from the newest snapshot.
    ///
    /// # Errors
    ///
    /// - Return [`HistoryError::SnapshotWrite`] if the snapshot cannot be
    ///   written.
    pub fn commit_if_changed(
        &self,
        path: impl AsRef<Path>,
        content: impl AsRef<str>,
        message: Option<&str>,
    ) -> Result<Option<Snapshot>> {
        self.commit(path, content, message, CommitMode::IfChanged)
    }

    /// Snapshots of tracked path, newest first.
    ///
    /// An untracked path has an empty history.
    ///
    /// # Errors
    ///
    /// - Return [`HistoryError::Backend`] if history cannot be read.
    pub fn history(&self, path: impl AsRef<Path>) -> Result<Vec<Snapshot>> {
        let path = path.as_ref();
        let dir = self.repository_dir(path)?;
        let lock = self.lock(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(self
            .backend
            .log(&dir)?
            .into_iter()
            .map(|revision| Snapshot::new(path, revision))
            .collect())
    }

    /// Content of tracked path at snapshot, or `None` if no such snapshot.
    ///
    /// # Errors
    ///
    /// - Return [`HistoryError::Backend`] if history cannot be read.
    pub fn content_at(&self, path: impl AsRef<Path>, id: &str) -> Result<Option<String>> {
        let path = path.as_ref();
        let dir = self.repository_dir(path)?;
        let lock = self.lock(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(self.backend.show(&dir, id)?)
    }

    /// Changes snapshot introduced relative to its predecessor, or `None` if
    /// no such snapshot.
    ///
    /// # Errors
    ///
    /// - Return [`HistoryError::Backend`] if history cannot be read.
    pub fn diff(&self, path: impl AsRef<Path>, id: &str) -> Result<Option<SnapshotDiff>> {
        let path = path.as_ref();
        let dir = self.repository_dir(path)?;
        let lock = self.lock(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(self.backend.diff(&dir, id)?)
    }

    /// Content to load back into an editor buffer.
    ///
    /// Restoring never commits. Saving the restored content afterwards is what
    /// creates a new snapshot.
    ///
    /// # Errors
    ///
    /// - Return [`HistoryError::SnapshotNotFound`] if no such snapshot.
    /// - Return [`HistoryError::Backend`] if history cannot be read.
    pub fn restore(&self, path: impl AsRef<Path>, id: &str) -> Result<String> {
        let path = path.as_ref();
        self.content_at(path, id)?
            .ok_or_else(|| HistoryError::SnapshotNotFound {
                path: path.to_path_buf(),
                id: id.to_string(),
            })
    }

    // Entries are never removed, so the map is bounded by the number of
    // tracked files this store has seen.
    fn lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(path.to_path_buf()).or_default().clone()
    }
}

fn default_message() -> String {
    format!("Update at {}", Local::now().format("%Y-%m-%d %H:%M:%S"))
}

/// History store error types.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Snapshot could not be written. History is unchanged.
    #[error("failed to write snapshot of {path:?}")]
    SnapshotWrite {
        path: PathBuf,
        #[source]
        source: BackendError,
    },

    /// Snapshot does not exist in history of tracked path.
    #[error("no snapshot {id:?} in history of {path:?}")]
    SnapshotNotFound { path: PathBuf, id: String },

    /// Versioning backend fails.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// History store I/O fails.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Friendly result alias :3
type Result<T, E = HistoryError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::{fs, thread};
    use tempfile::TempDir;

    fn store() -> anyhow::Result<(TempDir, HistoryStore)> {
        let root = TempDir::new()?;
        let store = HistoryStore::new(root.path().join("versions"))?;
        Ok((root, store))
    }

    #[test]
    fn history_is_linear_and_skips_unchanged() -> anyhow::Result<()> {
        let (_root, store) = store()?;
        let path = Path::new("/home/blah/.bashrc");

        store.commit_if_changed(path, "a", None)?;
        let second = store.commit_if_changed(path, "b", Some("second"))?;
        let third = store.commit_if_changed(path, "b", None)?;
        assert!(second.is_some());
        assert_eq!(third, None);

        let history = store.history(path)?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message, "second");
        assert_eq!(store.content_at(path, &history[0].id)?.as_deref(), Some("b"));
        assert_eq!(store.content_at(path, &history[1].id)?.as_deref(), Some("a"));
        assert!(history[1].message.starts_with("Update at "));

        Ok(())
    }

    #[test]
    fn force_commits_unchanged_content() -> anyhow::Result<()> {
        let (_root, store) = store()?;
        let path = Path::new("/etc/hosts");

        store.commit(path, "127.0.0.1 localhost", None, CommitMode::Force)?;
        let checkpoint = store.commit(path, "127.0.0.1 localhost", Some("checkpoint"), CommitMode::Force)?;
        assert_eq!(store.history(path)?.len(), 2);

        let id = checkpoint.map(|snapshot| snapshot.id).unwrap_or_default();
        let diff = store.diff(path, &id)?;
        assert!(diff.is_some_and(|diff| diff.is_empty()));

        Ok(())
    }

    #[test]
    fn first_snapshot_diff_is_all_added() -> anyhow::Result<()> {
        let (_root, store) = store()?;
        let path = Path::new("/home/blah/.vimrc");
        let snapshot = store
            .commit_if_changed(path, "line1\nline2", None)?
            .ok_or_else(|| anyhow::anyhow!("no snapshot"))?;

        let diff = store
            .diff(path, &snapshot.id)?
            .ok_or_else(|| anyhow::anyhow!("no diff"))?;
        assert_eq!(diff.added().collect::<Vec<_>>(), vec!["line1", "line2"]);
        assert_eq!(diff.removed().count(), 0);

        Ok(())
    }

    #[test]
    fn diff_against_predecessor() -> anyhow::Result<()> {
        let (_root, store) = store()?;
        let path = Path::new("/home/blah/.gitconfig");
        let before = indoc! {r#"
            [user]
              name = blah
              email = blah@blah.org
        "#};
        let after = indoc! {r#"
            [user]
              name = foo
              email = blah@blah.org
        "#};
        store.commit_if_changed(path, before, None)?;
        let snapshot = store
            .commit_if_changed(path, after, None)?
            .ok_or_else(|| anyhow::anyhow!("no snapshot"))?;

        let diff = store
            .diff(path, snapshot.short_id())?
            .ok_or_else(|| anyhow::anyhow!("no diff"))?;
        assert_eq!(diff.added().collect::<Vec<_>>(), vec!["  name = foo"]);
        assert_eq!(diff.removed().collect::<Vec<_>>(), vec!["  name = blah"]);

        Ok(())
    }

    #[test]
    fn restore_does_not_commit() -> anyhow::Result<()> {
        let (_root, store) = store()?;
        let path = Path::new("/home/blah/.zshrc");
        store.commit_if_changed(path, "old", None)?;
        store.commit_if_changed(path, "new", None)?;

        let history = store.history(path)?;
        let content = store.restore(path, &history[1].id)?;
        assert_eq!(content, "old");
        assert_eq!(store.history(path)?, history);

        let result = store.restore(path, "deadbeef");
        assert!(matches!(result, Err(HistoryError::SnapshotNotFound { .. })));
        assert_eq!(store.content_at(path, "not hex")?, None);
        assert_eq!(store.diff(path, "deadbeef")?, None);

        Ok(())
    }

    #[test]
    fn round_trip_content() -> anyhow::Result<()> {
        let (_root, store) = store()?;
        let path = Path::new("/home/blah/settings.json");
        for content in ["", "{}", "héllo\n\twörld\n", "no trailing newline"] {
            let snapshot = store.commit(path, content, None, CommitMode::Force)?;
            let id = snapshot.map(|snapshot| snapshot.id).unwrap_or_default();
            assert_eq!(store.content_at(path, &id)?.as_deref(), Some(content));
        }

        Ok(())
    }

    #[test]
    fn same_name_different_paths_stay_separate() -> anyhow::Result<()> {
        let (_root, store) = store()?;
        let home = Path::new("/home/blah/.config/app/config.toml");
        let work = Path::new("/srv/work/config.toml");
        assert_ne!(store.repository_dir(home)?, store.repository_dir(work)?);

        store.commit_if_changed(home, "a = 1", None)?;
        assert!(store.history(work)?.is_empty());

        let dir = store.repository_dir(home)?;
        let name = dir.file_name().map(|name| name.to_string_lossy().into_owned());
        assert!(name.is_some_and(|name| name.starts_with("config_toml-")));

        Ok(())
    }

    #[test]
    fn uninitialized_and_initialized_paths_have_no_history() -> anyhow::Result<()> {
        let (_root, store) = store()?;
        let path = Path::new("/home/blah/.profile");
        assert!(store.history(path)?.is_empty());

        store.ensure_repository(path)?;
        store.ensure_repository(path)?;
        assert!(store.repository_dir(path)?.join(".git").exists());
        assert!(store.history(path)?.is_empty());

        Ok(())
    }

    #[test]
    fn failed_commit_leaves_history_intact() -> anyhow::Result<()> {
        let (_root, store) = store()?;
        let path = Path::new("/home/blah/.inputrc");
        store.commit_if_changed(path, "set editing-mode vi", None)?;
        let before = store.history(path)?;

        // Working copy cannot be replaced by a file while a directory sits
        // in its place.
        let working = store.repository_dir(path)?.join(backend::WORKING_FILE);
        fs::remove_file(&working)?;
        fs::create_dir(&working)?;
        fs::write(working.join("blocker"), "")?;

        let result = store.commit_if_changed(path, "set editing-mode emacs", None);
        assert!(matches!(result, Err(HistoryError::SnapshotWrite { .. })));
        assert_eq!(store.history(path)?, before);
        assert_eq!(
            store.content_at(path, &before[0].id)?.as_deref(),
            Some("set editing-mode vi")
        );

        Ok(())
    }

    #[test]
    fn locked_index_does_not_fail_recorded_commit() -> anyhow::Result<()> {
        let (_root, store) = store()?;
        let path = Path::new("/home/blah/.wgetrc");
        store.commit_if_changed(path, "timeout = 10", None)?;

        // Another process holds the index lock.
        let dir = store.repository_dir(path)?;
        fs::write(dir.join(".git").join("index.lock"), "")?;

        let snapshot = store.commit_if_changed(path, "timeout = 30", None)?;
        let history = store.history(path)?;
        assert_eq!(history.len(), 2);
        assert_eq!(snapshot.map(|snapshot| snapshot.id), Some(history[0].id.clone()));
        assert_eq!(
            fs::read_to_string(dir.join(backend::WORKING_FILE))?,
            "timeout = 30"
        );

        Ok(())
    }

    #[test]
    fn concurrent_commits_are_serialized() -> anyhow::Result<()> {
        let (_root, store) = store()?;
        let store = Arc::new(store);
        let paths = [Path::new("/home/blah/.tmux.conf"), Path::new("/home/blah/.npmrc")];

        let handles = (0..8)
            .map(|index| {
                let store = Arc::clone(&store);
                let path = paths[index % 2];
                thread::spawn(move || {
                    store.commit(path, format!("value = {index}"), None, CommitMode::Force)
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            let result = handle
                .join()
                .map_err(|_| anyhow::anyhow!("commit thread panicked"))?;
            assert!(result?.is_some());
        }

        for path in paths {
            let history = store.history(path)?;
            assert_eq!(history.len(), 4);

            let mut ids = history.iter().map(|snapshot| snapshot.id.clone()).collect::<Vec<_>>();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), 4);
        }

        Ok(())
    }
}
