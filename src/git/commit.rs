//! Commit creation.
//!
//! The release commit records the changelog-bearing files on top of the
//! current branch. It is written straight into the object database and the
//! working tree is then hard-reset onto it, so the checkout never lags
//! behind the branch.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use git2::ResetType;

use crate::git::error::{GitError, GitResult};
use crate::git::repository::RepositoryHandle;
use crate::git::types::{CommitId, Signature, TreeId};

/// information about a commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub id: CommitId,
    pub tree_id: TreeId,
    pub parent_ids: Vec<CommitId>,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    /// create CommitInfo from a git2::Commit
    pub(crate) fn from_git2(commit: &git2::Commit<'_>) -> Self {
        let author = commit.author();
        let time = commit.time();
        let timestamp = Utc
            .timestamp_opt(time.seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now);

        Self {
            id: CommitId::new(commit.id()),
            tree_id: TreeId::new(commit.tree_id()),
            parent_ids: commit.parent_ids().map(CommitId::new).collect(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            author_name: author.name().unwrap_or("Unknown").to_string(),
            author_email: author.email().unwrap_or("unknown@unknown").to_string(),
            timestamp,
        }
    }

    /// get a short summary of the commit (first line of message)
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or(&self.message)
    }
}

/// commit `files` on top of HEAD and move the current branch to the result.
///
/// Paths are relative to the working directory and must exist on disk;
/// their current content is what gets recorded. Author and committer are
/// both `signature`.
///
/// The commit object is created detached from any ref; the hard reset that
/// follows moves HEAD and rewrites the index and working tree together. A
/// failed reset therefore leaves HEAD on the previous commit, with the new
/// commit only an unreferenced object.
pub fn commit_files<P: AsRef<Path>>(
    repo: &RepositoryHandle,
    signature: &Signature,
    files: &[P],
    message: &str,
) -> GitResult<CommitInfo> {
    let repo = repo.raw();
    let sig = signature.to_git2()?;

    let mut index = repo.index()?;
    for file in files {
        let path = file.as_ref();
        index.add_path(path).map_err(|source| GitError::IndexStage {
            path: PathBuf::from(path),
            source,
        })?;
    }

    let tree_oid = index.write_tree().map_err(GitError::TreeWrite)?;
    let tree = repo.find_tree(tree_oid).map_err(GitError::TreeWrite)?;

    let head = repo
        .head()
        .map_err(|e| GitError::HeadResolution(e.message().to_string()))?;
    let parent = head
        .peel_to_commit()
        .map_err(|e| GitError::HeadResolution(e.message().to_string()))?;

    let commit_oid = repo
        .commit(None, &sig, &sig, message, &tree, &[&parent])
        .map_err(GitError::CommitCreation)?;
    let new_head = repo.find_commit(commit_oid).map_err(GitError::CommitCreation)?;

    repo.reset(new_head.as_object(), ResetType::Hard, None)
        .map_err(|source| GitError::Reset {
            commit: commit_oid.to_string(),
            source,
        })?;

    Ok(CommitInfo::from_git2(&new_head))
}

/// read the content of `path` as recorded in the tree of `commit`.
pub fn file_at_commit(repo: &RepositoryHandle, commit: CommitId, path: &Path) -> GitResult<Vec<u8>> {
    let repo = repo.raw();
    let tree = repo.find_commit(commit.raw())?.tree()?;
    let entry = tree.get_path(path)?;
    let blob = repo.find_blob(entry.id())?;
    Ok(blob.content().to_vec())
}
