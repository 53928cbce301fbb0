//! Changelog extraction from merged pull requests.
//!
//! A pull request is recognised by the merge commit GitHub writes:
//!
//! ```text
//! Merge pull request #42 from org/feature-x
//!
//! Add feature X
//! ```
//!
//! The number becomes the entry; the third line, when there is one, is the
//! pull request title and is appended after ` - `.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::changelog::error::{ChangelogError, ChangelogResult};
use crate::git::{CommitWalker, RepositoryHandle, TagName};

fn merge_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Merge pull request (#\d+)").expect("merge pattern is a valid regex")
    })
}

/// Order of the extracted entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangelogOrder {
    /// walk order: most recent merge first
    #[default]
    NewestFirst,
    /// oldest merge first
    OldestFirst,
}

/// Turn one commit into a changelog entry.
///
/// Returns `None` when the summary is not a pull request merge. Messages
/// shorter than three lines, or with a blank third line, yield the bare
/// pull request number.
pub fn parse_merge_commit(summary: &str, message: &str) -> Option<String> {
    let captures = merge_pattern().captures(summary)?;
    let mut entry = captures[1].to_string();

    if let Some(title) = message.splitn(4, '\n').nth(2) {
        let title = title.trim();
        if !title.is_empty() {
            entry.push_str(" - ");
            entry.push_str(title);
        }
    }

    Some(entry)
}

/// Collect entries for every pull request merged into HEAD since `since`.
///
/// See [`changelog_with`].
pub fn changelog(repo: &RepositoryHandle, since: Option<&str>) -> ChangelogResult<Vec<String>> {
    changelog_with(repo, since, ChangelogOrder::NewestFirst)
}

/// Collect entries for every pull request merged into HEAD since `since`.
///
/// Commits reachable from `refs/tags/<since>` are excluded. With `since`
/// set to `None` the whole history is walked, which is what a first
/// release wants. A tag that does not exist is an error, never silently
/// treated as "no tag".
pub fn changelog_with(
    repo: &RepositoryHandle,
    since: Option<&str>,
    order: ChangelogOrder,
) -> ChangelogResult<Vec<String>> {
    let head = repo
        .head_commit()
        .map_err(|e| ChangelogError::WalkConstruction(e.to_string()))?;

    let mut walker = CommitWalker::new(repo);
    walker
        .push(head)
        .map_err(|e| ChangelogError::WalkConstruction(e.to_string()))?;

    if let Some(tag) = since {
        let tag = TagName::new(tag).map_err(|e| ChangelogError::WalkConstruction(e.to_string()))?;
        walker.hide_ref(&tag.as_ref_path()).map_err(|e| {
            ChangelogError::WalkConstruction(format!("tag not found: {} ({})", tag, e))
        })?;
    }

    let mut entries = Vec::new();
    for commit in walker {
        let commit = commit.map_err(ChangelogError::Walk)?;
        let message = String::from_utf8_lossy(commit.message_bytes());
        let summary = message.lines().next().unwrap_or_default();
        if let Some(entry) = parse_merge_commit(summary, &message) {
            entries.push(entry);
        }
    }

    if order == ChangelogOrder::OldestFirst {
        entries.reverse();
    }

    Ok(entries)
}
