// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Versioning backends.
//!
//! A backend keeps the linear revision history of a single repository
//! directory. The [`HistoryStore`](crate::history::HistoryStore) decides which
//! directory belongs to which tracked file, and serializes access to it.
//!
//! # Working Copy
//!
//! Each repository keeps one working copy file named [`WORKING_FILE`]. It
//! always holds the content of the newest revision. Commits follow a strict
//! order so that a failure at any step leaves the history exactly as it was:
//!
//! 1. Stage the new content in a temporary file next to the working copy.
//! 2. Write blob, tree, and commit objects without moving any reference.
//! 3. Persist the staged file over the working copy.
//! 4. Move the branch reference to the new commit.
//! 5. Sync the index with the new tree. Failing here only logs a warning,
//!    because the revision is already part of the history.
//!
//! Objects written by a failed commit are unreachable, and never show up in
//! the history.

use crate::history::diff::{DiffLine, SnapshotDiff};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::{
    Commit, DiffFormat, DiffOptions, ErrorCode, FileMode, Oid, Repository,
    RepositoryInitOptions, Signature, Sort, Tree,
};
use std::{io::Write, path::Path};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

/// Name of working copy file inside a repository directory.
pub const WORKING_FILE: &str = "config";

/// Name of branch holding the history.
pub const BRANCH: &str = "main";

/// Single revision of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// Full hexadecimal identifier.
    pub id: String,

    /// Author timestamp.
    pub timestamp: DateTime<FixedOffset>,

    /// Commit message.
    pub message: String,
}

/// Linear history backend.
///
/// Every method takes the repository directory it operates on. Callers must
/// not invoke methods concurrently for the same directory.
pub trait Versioning: Send + Sync {
    /// Initialize repository at directory if it does not exist yet.
    fn initialize(&self, dir: &Path) -> Result<()>;

    /// Commit content as the new newest revision.
    ///
    /// Return `None` if `allow_empty` is false and content matches the newest
    /// revision.
    fn commit(
        &self,
        dir: &Path,
        content: &str,
        message: &str,
        allow_empty: bool,
    ) -> Result<Option<Revision>>;

    /// All revisions, newest first.
    fn log(&self, dir: &Path) -> Result<Vec<Revision>>;

    /// Content of revision, or `None` if revision is not part of the history.
    fn show(&self, dir: &Path, id: &str) -> Result<Option<String>>;

    /// Changes introduced by revision relative to its predecessor, or `None`
    /// if revision is not part of the history.
    fn diff(&self, dir: &Path, id: &str) -> Result<Option<SnapshotDiff>>;
}

/// Versioning through libgit2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Git2Versioning {
    author_name: String,
    author_email: String,
}

impl Git2Versioning {
    /// Construct new libgit2 backend that signs commits with given identity.
    pub fn new(author_name: impl Into<String>, author_email: impl Into<String>) -> Self {
        Self {
            author_name: author_name.into(),
            author_email: author_email.into(),
        }
    }

    fn open(&self, dir: &Path) -> Result<Option<Repository>> {
        if !dir.join(".git").exists() {
            return Ok(None);
        }

        Ok(Some(Repository::open(dir)?))
    }

    fn open_or_init(&self, dir: &Path) -> Result<Repository> {
        match self.open(dir)? {
            Some(repo) => Ok(repo),
            None => {
                info!("initialize history repository at {:?}", dir.display());
                let mut opts = RepositoryInitOptions::new();
                opts.initial_head(BRANCH);
                opts.mkpath(true);
                let repo = Repository::init_opts(dir, &opts)?;

                // INVARIANT: Always provide valid name and email.
                //   - Git will complain if this is not set in CI/CD environments.
                let mut config = repo.config()?;
                config.set_str("user.name", &self.author_name)?;
                config.set_str("user.email", &self.author_email)?;

                Ok(repo)
            }
        }
    }
}

impl Default for Git2Versioning {
    fn default() -> Self {
        Self::new("Configs App", "configs@app.local")
    }
}

impl Versioning for Git2Versioning {
    fn initialize(&self, dir: &Path) -> Result<()> {
        self.open_or_init(dir).map(|_| ())
    }

    #[instrument(skip(self, content, message), level = "debug")]
    fn commit(
        &self,
        dir: &Path,
        content: &str,
        message: &str,
        allow_empty: bool,
    ) -> Result<Option<Revision>> {
        let repo = self.open_or_init(dir)?;
        let head = head_commit(&repo)?;
        let blob = repo.blob(content.as_bytes())?;

        if !allow_empty {
            if let Some(head) = head.as_ref() {
                let current = head.tree()?.get_name(WORKING_FILE).map(|entry| entry.id());
                if current == Some(blob) {
                    debug!("content unchanged since {}", head.id());
                    return Ok(None);
                }
            }
        }

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(content.as_bytes())?;
        staged.as_file().sync_all()?;

        let mut builder = repo.treebuilder(None)?;
        builder.insert(WORKING_FILE, blob, FileMode::Blob.into())?;
        let tree = repo.find_tree(builder.write()?)?;

        // INVARIANT: Write commit object without touching any reference.
        let signature = Signature::now(&self.author_name, &self.author_email)?;
        let parents = head.iter().collect::<Vec<_>>();
        let oid = repo.commit(None, &signature, &signature, message, &tree, &parents)?;

        staged
            .persist(dir.join(WORKING_FILE))
            .map_err(|error| BackendError::Io(error.error))?;
        repo.reference(&format!("refs/heads/{BRANCH}"), oid, true, message)?;

        // INVARIANT: Revision is part of the history once the branch moves.
        //   - Index only keeps the working copy reading as clean, so failing
        //     to sync it must not fail the commit.
        if let Err(error) = sync_index(&repo, &tree) {
            warn!("failed to sync index of {:?}: {error}", dir.display());
        }

        info!("commit {oid} to {:?}", dir.display());
        let commit = repo.find_commit(oid)?;
        Ok(Some(revision(&commit)))
    }

    fn log(&self, dir: &Path) -> Result<Vec<Revision>> {
        let Some(repo) = self.open(dir)? else {
            return Ok(Vec::new());
        };
        if head_commit(&repo)?.is_none() {
            return Ok(Vec::new());
        }

        let mut walk = repo.revwalk()?;
        walk.push_head()?;
        walk.set_sorting(Sort::TOPOLOGICAL)?;
        walk.map(|oid| -> Result<Revision> { Ok(revision(&repo.find_commit(oid?)?)) })
            .collect()
    }

    fn show(&self, dir: &Path, id: &str) -> Result<Option<String>> {
        let Some(repo) = self.open(dir)? else {
            return Ok(None);
        };
        let Some(commit) = find_revision(&repo, id)? else {
            return Ok(None);
        };

        let tree = commit.tree()?;
        let Some(entry) = tree.get_name(WORKING_FILE) else {
            return Ok(None);
        };
        let blob = repo.find_blob(entry.id())?;
        Ok(Some(String::from_utf8_lossy(blob.content()).into_owned()))
    }

    fn diff(&self, dir: &Path, id: &str) -> Result<Option<SnapshotDiff>> {
        let Some(repo) = self.open(dir)? else {
            return Ok(None);
        };
        let Some(commit) = find_revision(&repo, id)? else {
            return Ok(None);
        };

        // INVARIANT: First revision is diffed against the empty tree.
        let tree = commit.tree()?;
        let parent_tree = match commit.parent_count() {
            0 => None,
            _ => Some(commit.parent(0)?.tree()?),
        };

        let mut opts = DiffOptions::new();
        opts.context_lines(3);
        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

        let mut lines = Vec::new();
        diff.print(DiffFormat::Patch, |_, _, line| {
            lines.push(DiffLine::new(
                line.origin(),
                String::from_utf8_lossy(line.content()).as_ref(),
            ));
            true
        })?;

        Ok(Some(SnapshotDiff {
            id: commit.id().to_string(),
            lines,
        }))
    }
}

fn sync_index(repo: &Repository, tree: &Tree<'_>) -> Result<()> {
    let mut index = repo.index()?;
    index.read_tree(tree)?;
    index.write()?;
    Ok(())
}

fn head_commit(repo: &Repository) -> Result<Option<Commit<'_>>> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?)),
        Err(error) if matches!(error.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
            Ok(None)
        }
        Err(error) => Err(error.into()),
    }
}

/// Find commit by full or abbreviated id, only if it is part of the history.
fn find_revision<'repo>(repo: &'repo Repository, id: &str) -> Result<Option<Commit<'repo>>> {
    if id.len() < 4 || id.len() > 40 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(None);
    }
    let Some(head) = head_commit(repo)? else {
        return Ok(None);
    };

    let commit = match repo.find_commit_by_prefix(id) {
        Ok(commit) => commit,
        Err(error) if matches!(error.code(), ErrorCode::NotFound | ErrorCode::Ambiguous) => {
            return Ok(None)
        }
        Err(error) => return Err(error.into()),
    };

    // INVARIANT: Objects left behind by failed commits are not history.
    if commit.id() != head.id() && !repo.graph_descendant_of(head.id(), commit.id())? {
        return Ok(None);
    }

    Ok(Some(commit))
}

fn revision(commit: &Commit<'_>) -> Revision {
    let time = commit.time();
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60)
        .unwrap_or_else(|| Utc.fix());
    let timestamp = DateTime::from_timestamp(time.seconds(), 0)
        .unwrap_or_default()
        .with_timezone(&offset);

    Revision {
        id: commit.id().to_string(),
        timestamp,
        message: commit.message().unwrap_or_default().trim_end().to_string(),
    }
}

/// Compute short stable hash of arbitrary bytes.
pub(crate) fn short_hash(data: &[u8]) -> Result<String> {
    let oid = Oid::hash_object(git2::ObjectType::Blob, data)?;
    Ok(oid.to_string()[..12].to_string())
}

/// Versioning backend error types.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),

    /// Working copy file I/O fails.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Friendly result alias :3
type Result<T, E = BackendError> = std::result::Result<T, E>;
