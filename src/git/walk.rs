//! Commit graph traversal.
//!
//! The walker keeps an explicit frontier (a priority queue ordered by
//! committer time) and a visited set instead of following parents
//! recursively, so deep histories never grow the stack. Hidden commits are
//! resolved up front into the full set of commits reachable from them;
//! anything in that set is neither yielded nor expanded.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use git2::{Oid, Repository};

use crate::git::error::GitResult;
use crate::git::repository::RepositoryHandle;
use crate::git::types::CommitId;

/// An entry in the walk frontier.
struct Pending {
    id: Oid,
    /// Committer timestamp (seconds since epoch).
    time: i64,
    /// Insertion counter for stable ordering.
    seq: u64,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // max-heap: newest first, then whichever was discovered first
        self.time
            .cmp(&other.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Reverse-chronological walk over the commits reachable from the pushed
/// starting points and not reachable from any hidden commit.
pub struct CommitWalker<'repo> {
    repo: &'repo Repository,
    frontier: BinaryHeap<Pending>,
    seen: HashSet<Oid>,
    hidden: HashSet<Oid>,
    seq: u64,
}

impl<'repo> CommitWalker<'repo> {
    /// Create an empty walker.
    pub fn new(repo: &'repo RepositoryHandle) -> Self {
        Self {
            repo: repo.raw(),
            frontier: BinaryHeap::new(),
            seen: HashSet::new(),
            hidden: HashSet::new(),
            seq: 0,
        }
    }

    /// Add a starting point.
    pub fn push(&mut self, id: CommitId) -> GitResult<()> {
        self.enqueue(id.raw())
    }

    /// Exclude `id` and every commit reachable from it.
    pub fn hide(&mut self, id: CommitId) -> GitResult<()> {
        let mut stack = vec![id.raw()];
        while let Some(current) = stack.pop() {
            if !self.hidden.insert(current) {
                continue;
            }
            let commit = self.repo.find_commit(current)?;
            for parent in commit.parent_ids() {
                if !self.hidden.contains(&parent) {
                    stack.push(parent);
                }
            }
        }
        Ok(())
    }

    /// Exclude everything reachable from a reference (e.g. `refs/tags/v1`).
    ///
    /// Annotated tags are peeled to the commit they mark. Fails if the
    /// reference does not exist.
    pub fn hide_ref(&mut self, refname: &str) -> GitResult<()> {
        let commit = self.repo.find_reference(refname)?.peel_to_commit()?;
        self.hide(CommitId::new(commit.id()))
    }

    fn enqueue(&mut self, id: Oid) -> GitResult<()> {
        if !self.seen.insert(id) {
            return Ok(());
        }
        let commit = self.repo.find_commit(id)?;
        self.frontier.push(Pending {
            id,
            time: commit.time().seconds(),
            seq: self.seq,
        });
        self.seq += 1;
        Ok(())
    }

    fn advance(&mut self) -> Option<GitResult<git2::Commit<'repo>>> {
        while let Some(pending) = self.frontier.pop() {
            if self.hidden.contains(&pending.id) {
                continue;
            }

            let commit = match self.repo.find_commit(pending.id) {
                Ok(commit) => commit,
                Err(e) => return Some(Err(e.into())),
            };
            for parent in commit.parent_ids() {
                if self.hidden.contains(&parent) {
                    continue;
                }
                if let Err(e) = self.enqueue(parent) {
                    return Some(Err(e));
                }
            }
            return Some(Ok(commit));
        }
        None
    }
}

impl<'repo> Iterator for CommitWalker<'repo> {
    type Item = GitResult<git2::Commit<'repo>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        repo: Repository,
        clock: i64,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let repo = Repository::init(dir.path()).unwrap();
            Self {
                _dir: dir,
                repo,
                clock: 1_700_000_000,
            }
        }

        fn commit(&mut self, message: &str, parents: &[Oid]) -> Oid {
            self.clock += 60;
            let sig = git2::Signature::new("Test", "test@test.com", &git2::Time::new(self.clock, 0))
                .unwrap();
            let tree = self
                .repo
                .find_tree(self.repo.index().unwrap().write_tree().unwrap())
                .unwrap();
            let parents: Vec<_> = parents
                .iter()
                .map(|p| self.repo.find_commit(*p).unwrap())
                .collect();
            let refs: Vec<_> = parents.iter().collect();
            self.repo
                .commit(None, &sig, &sig, message, &tree, &refs)
                .unwrap()
        }

        fn handle(&self) -> RepositoryHandle {
            RepositoryHandle::open(self.repo.path()).unwrap()
        }
    }

    fn ids(walker: CommitWalker<'_>) -> Vec<Oid> {
        walker.map(|c| c.unwrap().id()).collect()
    }

    #[test]
    fn test_linear_history_newest_first() {
        let mut fx = Fixture::new();
        let c1 = fx.commit("one", &[]);
        let c2 = fx.commit("two", &[c1]);
        let c3 = fx.commit("three", &[c2]);

        let handle = fx.handle();
        let mut walker = CommitWalker::new(&handle);
        walker.push(CommitId::new(c3)).unwrap();

        assert_eq!(ids(walker), vec![c3, c2, c1]);
    }

    #[test]
    fn test_hide_excludes_ancestors() {
        let mut fx = Fixture::new();
        let c1 = fx.commit("one", &[]);
        let c2 = fx.commit("two", &[c1]);
        let c3 = fx.commit("three", &[c2]);
        let c4 = fx.commit("four", &[c3]);

        let handle = fx.handle();
        let mut walker = CommitWalker::new(&handle);
        walker.push(CommitId::new(c4)).unwrap();
        walker.hide(CommitId::new(c2)).unwrap();

        assert_eq!(ids(walker), vec![c4, c3]);
    }

    #[test]
    fn test_merge_visits_each_commit_once() {
        let mut fx = Fixture::new();
        let base = fx.commit("base", &[]);
        let side = fx.commit("side", &[base]);
        let main = fx.commit("main", &[base]);
        let merge = fx.commit("merge", &[main, side]);

        let handle = fx.handle();
        let mut walker = CommitWalker::new(&handle);
        walker.push(CommitId::new(merge)).unwrap();

        assert_eq!(ids(walker), vec![merge, main, side, base]);
    }

    #[test]
    fn test_hidden_side_branch() {
        let mut fx = Fixture::new();
        let base = fx.commit("base", &[]);
        let released = fx.commit("released", &[base]);
        let feature = fx.commit("feature", &[base]);
        let merge = fx.commit("merge", &[released, feature]);

        let handle = fx.handle();
        let mut walker = CommitWalker::new(&handle);
        walker.push(CommitId::new(merge)).unwrap();
        walker.hide(CommitId::new(released)).unwrap();

        assert_eq!(ids(walker), vec![merge, feature]);
    }

    #[test]
    fn test_hide_missing_ref_fails() {
        let mut fx = Fixture::new();
        let c1 = fx.commit("one", &[]);

        let handle = fx.handle();
        let mut walker = CommitWalker::new(&handle);
        walker.push(CommitId::new(c1)).unwrap();
        assert!(walker.hide_ref("refs/tags/missing").is_err());
    }
}
