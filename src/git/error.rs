//! Git layer error types
//!
//! Every failure of the repository, remote, commit and tag operations is
//! defined here. We use `thiserror` so each step of the release workflow
//! surfaces as its own variant with a short message.

use std::path::PathBuf;

use thiserror::Error;

use crate::git::types::InvalidNameError;

/// the main error type for git operations
#[derive(Debug, Error)]
pub enum GitError {
    /// error from the underlying Git library
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// the repository could not be opened (missing or corrupt)
    #[error("cannot open repository at {path}: {source}")]
    OpenFailure { path: PathBuf, source: git2::Error },

    /// HEAD is unborn, detached, or does not name a branch
    #[error("cannot resolve HEAD: {0}")]
    HeadResolution(String),

    /// the named remote is not configured
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// the fetch failed at the transport layer
    #[error("cannot fetch from {remote}: {reason}")]
    FetchFailed { remote: String, reason: String },

    /// the remote advertised no HEAD
    #[error("cannot find HEAD of remote {0}")]
    RemoteHeadMissing(String),

    /// the remote is not reachable over a trusted transport
    #[error("untrusted transport for {remote}: {reason}")]
    UntrustedTransport { remote: String, reason: String },

    /// no usable committer identity
    #[error("invalid signature: {0}")]
    Signature(String),

    /// a path could not be staged
    #[error("cannot stage {path}: {source}")]
    IndexStage { path: PathBuf, source: git2::Error },

    /// the index could not be written into a tree
    #[error("cannot write tree: {0}")]
    TreeWrite(git2::Error),

    /// the commit object could not be created
    #[error("cannot create commit: {0}")]
    CommitCreation(git2::Error),

    /// the working tree could not be reset to the new commit
    #[error("cannot reset working tree to {commit}: {source}")]
    Reset { commit: String, source: git2::Error },

    /// a tag with this name already exists
    #[error("tag already exists: {0}")]
    TagExists(String),

    /// the tag object could not be created
    #[error("cannot create tag {tag}: {source}")]
    TagCreation { tag: String, source: git2::Error },

    /// invalid branch or tag name
    #[error("invalid name: {0}")]
    InvalidName(#[from] InvalidNameError),
}

impl GitError {
    /// check if this error must end the run regardless of how the caller
    /// handles other failures
    pub fn is_terminal(&self) -> bool {
        matches!(self, GitError::UntrustedTransport { .. })
    }
}

/// result type alias for git operations
pub type GitResult<T> = Result<T, GitError>;
