//! Shared fixtures: throwaway repositories with deterministic history.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chrono::{FixedOffset, TimeZone};
use git2::{Oid, Repository, RepositoryInitOptions};
use tempfile::TempDir;

/// A repository on `main` whose commits are one minute apart.
pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
    clock: i64,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();

        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();

        Self {
            dir,
            repo,
            clock: 1_700_000_000,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn next_signature(&mut self) -> git2::Signature<'static> {
        self.clock += 60;
        git2::Signature::new("Test", "test@test.com", &git2::Time::new(self.clock, 0)).unwrap()
    }

    fn head(&self) -> Option<git2::Commit<'_>> {
        self.repo.head().ok().and_then(|h| h.peel_to_commit().ok())
    }

    pub fn head_id(&self) -> Oid {
        self.head().unwrap().id()
    }

    pub fn write(&self, path: &str, content: &str) {
        fs::write(self.path().join(path), content).unwrap();
    }

    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.path().join(path)).unwrap()
    }

    /// Commit everything in the working tree on top of HEAD.
    pub fn commit(&mut self, message: &str) -> Oid {
        let sig = self.next_signature();
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let parent = self.head();
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Simulate merging pull request `number` through the GitHub UI: a
    /// commit on a side branch, then a merge commit on HEAD.
    pub fn merge_pr(&mut self, number: u32, title: Option<&str>) -> Oid {
        let side_sig = self.next_signature();
        let sig = self.next_signature();
        let base = self.head_id();
        let base_commit = self.repo.find_commit(base).unwrap();
        let tree = base_commit.tree().unwrap();
        let side = self
            .repo
            .commit(
                None,
                &side_sig,
                &side_sig,
                &format!("Work for #{}", number),
                &tree,
                &[&base_commit],
            )
            .unwrap();
        let side_commit = self.repo.find_commit(side).unwrap();

        let message = match title {
            Some(title) => format!(
                "Merge pull request #{} from org/branch-{}\n\n{}\n",
                number, number, title
            ),
            None => format!("Merge pull request #{} from org/branch-{}\n", number, number),
        };
        self.repo
            .commit(
                Some("HEAD"),
                &sig,
                &sig,
                &message,
                &tree,
                &[&base_commit, &side_commit],
            )
            .unwrap()
    }

    /// Annotated tag on HEAD.
    pub fn tag(&mut self, name: &str) {
        let sig = self.next_signature();
        let head = self.head().unwrap();
        self.repo
            .tag(name, head.as_object(), &sig, "release", false)
            .unwrap();
    }

    pub fn ref_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .repo
            .references()
            .unwrap()
            .map(|r| r.unwrap().name().unwrap().to_string())
            .collect();
        names.sort();
        names
    }
}

/// Deterministic release identity.
pub fn signature() -> tagger::git::Signature {
    let time = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 1, 10, 0, 0)
        .unwrap();
    tagger::git::Signature::new("Release Bot", "bot@example.com", time)
}

/// Clone `upstream` into a fresh directory; the clone's `origin` is the
/// upstream path.
pub fn clone(upstream: &TestRepo) -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let url = upstream.path().to_str().unwrap();
    let repo = Repository::clone(url, dir.path()).unwrap();
    (dir, repo)
}
