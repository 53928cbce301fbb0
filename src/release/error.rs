//! Release workflow error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::changelog::ChangelogError;
use crate::git::{CommitId, GitError};

/// Result type for release operations.
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Release errors.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("git error: {0}")]
    Git(#[from] GitError),

    #[error("changelog error: {0}")]
    Changelog(#[from] ChangelogError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("branch {branch} is not up to date with {remote}: local {local}, remote {remote_head}")]
    OutOfDate {
        branch: String,
        remote: String,
        local: CommitId,
        remote_head: CommitId,
    },

    #[error("cannot update changelog file {path}: {source}")]
    ChangelogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("repository has no working directory")]
    BareRepository,
}

impl ReleaseError {
    /// check if this error must stop the process immediately
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReleaseError::Git(e) if e.is_terminal())
    }
}

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
