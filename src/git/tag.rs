//! Annotated tag creation.

use git2::ErrorCode;

use crate::git::error::{GitError, GitResult};
use crate::git::repository::RepositoryHandle;
use crate::git::types::{CommitId, Signature, TagId, TagName};

/// Create an annotated tag `tag` on `commit` carrying `message`.
///
/// Existing tags are never overwritten: a tag of the same name fails with
/// [`GitError::TagExists`].
pub fn create_annotated_tag(
    repo: &RepositoryHandle,
    signature: &Signature,
    tag: &TagName,
    commit: CommitId,
    message: &str,
) -> GitResult<TagId> {
    let sig = signature.to_git2()?;
    let repo = repo.raw();

    let target = repo
        .find_commit(commit.raw())
        .map_err(|source| GitError::TagCreation {
            tag: tag.to_string(),
            source,
        })?;

    let oid = repo
        .tag(tag.as_str(), target.as_object(), &sig, message, false)
        .map_err(|source| match source.code() {
            ErrorCode::Exists => GitError::TagExists(tag.to_string()),
            _ => GitError::TagCreation {
                tag: tag.to_string(),
                source,
            },
        })?;

    Ok(TagId::new(oid))
}
