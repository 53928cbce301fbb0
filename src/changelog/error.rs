//! Changelog extraction error types.

use thiserror::Error;

use crate::git::GitError;

/// Errors raised while collecting changelog entries.
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// the walk could not be set up (missing tag, unresolvable HEAD)
    #[error("cannot start history walk: {0}")]
    WalkConstruction(String),

    /// a commit could not be read during the walk
    #[error("history walk failed: {0}")]
    Walk(#[source] GitError),
}

/// result type alias for changelog operations
pub type ChangelogResult<T> = Result<T, ChangelogError>;
