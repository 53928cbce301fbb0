//! Repository handle.
//!
//! This wraps `git2::Repository` for the lifetime of one release run. It is
//! opened once by the caller and lent to every other git operation; nothing
//! here writes to the repository.

use std::path::Path;

use git2::{ErrorCode, Repository};

use crate::git::error::{GitError, GitResult};
use crate::git::types::{BranchName, CommitId, Signature, TagName};

/// an opened, existing repository
pub struct RepositoryHandle {
    repo: Repository,
}

impl RepositoryHandle {
    /// open an existing repository
    ///
    /// Fails for paths that hold no repository or a corrupt one. No parent
    /// directory search is done: `path` must be the repository itself.
    pub fn open(path: impl AsRef<Path>) -> GitResult<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|source| GitError::OpenFailure {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self { repo })
    }

    /// get the working directory, `None` for bare repositories
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// borrow the underlying git2 repository
    pub(crate) fn raw(&self) -> &Repository {
        &self.repo
    }

    /// get the current branch name and the commit it points to
    pub fn current_branch(&self) -> GitResult<(BranchName, CommitId)> {
        let head = self.repo.head().map_err(|e| match e.code() {
            ErrorCode::UnbornBranch => GitError::HeadResolution("HEAD is unborn".to_string()),
            _ => GitError::HeadResolution(format!("cannot read HEAD: {}", e.message())),
        })?;

        if !head.is_branch() {
            return Err(GitError::HeadResolution(
                "HEAD is detached, no current branch".to_string(),
            ));
        }

        let name = head
            .shorthand()
            .ok_or_else(|| GitError::HeadResolution("branch name is not valid UTF-8".to_string()))?;
        let branch = BranchName::new(name)?;

        let commit = head
            .peel_to_commit()
            .map_err(|e| GitError::HeadResolution(format!("cannot peel HEAD: {}", e.message())))?;

        Ok((branch, CommitId::new(commit.id())))
    }

    /// get the commit HEAD points to, whether or not it is on a branch
    pub fn head_commit(&self) -> GitResult<CommitId> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::HeadResolution(e.message().to_string()))?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| GitError::HeadResolution(e.message().to_string()))?;
        Ok(CommitId::new(commit.id()))
    }

    /// check if a tag exists
    pub fn tag_exists(&self, tag: &TagName) -> bool {
        self.repo.find_reference(&tag.as_ref_path()).is_ok()
    }

    /// resolve a tag (lightweight or annotated) to the commit it marks
    pub fn resolve_tag(&self, tag: &TagName) -> GitResult<CommitId> {
        let commit = self
            .repo
            .find_reference(&tag.as_ref_path())?
            .peel_to_commit()?;
        Ok(CommitId::new(commit.id()))
    }

    /// read the default identity (`user.name` / `user.email`) from the git
    /// configuration, stamped with the current time
    ///
    /// This is the only place the ambient identity is read; the result is
    /// handed explicitly to the publishers.
    pub fn default_signature(&self) -> GitResult<Signature> {
        let config = self
            .repo
            .config()
            .map_err(|e| GitError::Signature(format!("cannot read git config: {}", e.message())))?;

        let name = config
            .get_string("user.name")
            .map_err(|_| GitError::Signature("user.name is not configured".to_string()))?;
        let email = config
            .get_string("user.email")
            .map_err(|_| GitError::Signature("user.email is not configured".to_string()))?;

        Ok(Signature::now(name, email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn initial_commit(repo: &Repository) -> git2::Oid {
        let sig = git2::Signature::now("Test", "test@test.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap()
    }

    #[test]
    fn test_open_missing_repository() {
        let dir = TempDir::new().unwrap();
        let result = RepositoryHandle::open(dir.path().join("nope"));
        assert!(matches!(result, Err(GitError::OpenFailure { .. })));
    }

    #[test]
    fn test_current_branch() {
        let (dir, repo) = setup_repo();
        let oid = initial_commit(&repo);
        repo.set_head("refs/heads/main").unwrap();
        repo.branch("main", &repo.find_commit(oid).unwrap(), true).unwrap();

        let handle = RepositoryHandle::open(dir.path()).unwrap();
        let (branch, head) = handle.current_branch().unwrap();
        assert_eq!(branch.as_str(), "main");
        assert_eq!(head, CommitId::new(oid));
        assert_eq!(handle.head_commit().unwrap(), head);
    }

    #[test]
    fn test_unborn_head_fails() {
        let (dir, _repo) = setup_repo();
        let handle = RepositoryHandle::open(dir.path()).unwrap();
        assert!(matches!(handle.current_branch(), Err(GitError::HeadResolution(_))));
    }

    #[test]
    fn test_detached_head_fails() {
        let (dir, repo) = setup_repo();
        let oid = initial_commit(&repo);
        repo.set_head_detached(oid).unwrap();

        let handle = RepositoryHandle::open(dir.path()).unwrap();
        assert!(matches!(handle.current_branch(), Err(GitError::HeadResolution(_))));
        // HEAD itself still resolves
        assert_eq!(handle.head_commit().unwrap(), CommitId::new(oid));
    }

    #[test]
    fn test_default_signature_from_config() {
        let (dir, repo) = setup_repo();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Release Bot").unwrap();
        config.set_str("user.email", "bot@example.com").unwrap();

        let handle = RepositoryHandle::open(dir.path()).unwrap();
        let sig = handle.default_signature().unwrap();
        assert_eq!(sig.name, "Release Bot");
        assert_eq!(sig.email, "bot@example.com");
    }

    #[test]
    fn test_tag_resolution() {
        let (dir, repo) = setup_repo();
        let oid = initial_commit(&repo);
        let sig = git2::Signature::now("Test", "test@test.com").unwrap();
        let commit = repo.find_commit(oid).unwrap();
        repo.tag("v1.0.0", commit.as_object(), &sig, "first", false)
            .unwrap();

        let handle = RepositoryHandle::open(dir.path()).unwrap();
        let tag = TagName::new("v1.0.0").unwrap();
        assert!(handle.tag_exists(&tag));
        assert_eq!(handle.resolve_tag(&tag).unwrap(), CommitId::new(oid));
        assert!(!handle.tag_exists(&TagName::new("v2.0.0").unwrap()));
    }
}
