//! core type-safe wrappers around git primitives used by the release workflow.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local};
use git2::Oid;
use serde::{Serialize, Serializer};

use crate::git::error::{GitError, GitResult};

/// git commit identifier
///
/// this makes sure we don't accidentally pass a tree ID where a commit ID
/// is expected. The inner Oid is only accessible within the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitId(pub(crate) Oid);

impl CommitId {
    pub(crate) fn new(oid: Oid) -> Self {
        Self(oid)
    }

    /// raw Oid (for internal use only)
    pub(crate) fn raw(&self) -> Oid {
        self.0
    }

    /// parse CommitId from a hex string
    pub fn from_hex(hex: &str) -> Result<Self, git2::Error> {
        Oid::from_str(hex).map(CommitId)
    }

    /// short form of the commit ID
    pub fn short(&self) -> String {
        self.0.to_string()[..7].to_string()
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for CommitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// git tree identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(pub(crate) Oid);

impl TreeId {
    pub(crate) fn new(oid: Oid) -> Self {
        Self(oid)
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// git annotated tag object identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId(pub(crate) Oid);

impl TagId {
    pub(crate) fn new(oid: Oid) -> Self {
        Self(oid)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// characters git refuses anywhere in a ref name
const FORBIDDEN_REF_CHARS: &[char] = &['~', '^', ':', '?', '*', '[', '\\'];

/// check a ref name component the way `git check-ref-format` would, minus
/// the rules that only matter for multi-level refs.
fn validate_ref_name(name: &str) -> Result<(), InvalidNameError> {
    if name.is_empty() {
        return Err(InvalidNameError::Empty);
    }

    if name.contains("..")
        || name.contains("@{")
        || name.contains("//")
        || name == "@"
        || name.starts_with('/')
        || name.ends_with('/')
        || name.ends_with('.')
        || name.ends_with(".lock")
        || name.starts_with('-')
    {
        return Err(InvalidNameError::InvalidPath(name.to_string()));
    }

    for (i, c) in name.chars().enumerate() {
        if c.is_whitespace() || c.is_control() || FORBIDDEN_REF_CHARS.contains(&c) {
            return Err(InvalidNameError::InvalidCharacter { char: c, position: i });
        }
    }

    Ok(())
}

/// a local branch name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// create a new BranchName
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();
        validate_ref_name(&name)?;
        Ok(Self(name))
    }

    /// get the full ref path (e.g., "refs/heads/main")
    pub fn as_ref_path(&self) -> String {
        format!("refs/heads/{}", self.0)
    }

    /// get the short name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// a validated tag name
///
/// tag names end up as `refs/tags/<name>`, so they follow git's ref
/// naming rules: no `..`, no `@{`, no whitespace or control characters,
/// none of `~^:?*[\`, no leading or trailing `/`, no trailing `.` or
/// `.lock`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TagName(String);

impl TagName {
    /// prefix of every tag ref
    pub const REF_PREFIX: &'static str = "refs/tags/";

    /// create a new TagName, validating the input
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();
        validate_ref_name(&name)?;
        Ok(Self(name))
    }

    /// get the full ref path (e.g., "refs/tags/v1.0.0")
    pub fn as_ref_path(&self) -> String {
        format!("{}{}", Self::REF_PREFIX, self.0)
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// git signature (tagger/author/committer info)
///
/// the time is part of the value so that callers decide where it comes
/// from: the wall clock for real releases, a fixed instant in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub time: DateTime<FixedOffset>,
}

impl Signature {
    /// create a signature at a fixed instant
    pub fn new(name: impl Into<String>, email: impl Into<String>, time: DateTime<FixedOffset>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            time,
        }
    }

    /// create a signature stamped with the current local time
    pub fn now(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(name, email, Local::now().into())
    }

    /// convert to git2::Signature
    pub(crate) fn to_git2(&self) -> GitResult<git2::Signature<'static>> {
        if self.name.trim().is_empty() {
            return Err(GitError::Signature("name cannot be empty".to_string()));
        }
        if self.email.trim().is_empty() {
            return Err(GitError::Signature("email cannot be empty".to_string()));
        }

        let offset_minutes = self.time.offset().local_minus_utc() / 60;
        let time = git2::Time::new(self.time.timestamp(), offset_minutes);
        git2::Signature::new(&self.name, &self.email, &time)
            .map_err(|e| GitError::Signature(e.message().to_string()))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// error type for invalid names (branches, tags)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidNameError {
    Empty,
    InvalidCharacter { char: char, position: usize },
    InvalidPath(String),
}

impl fmt::Display for InvalidNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name cannot be empty"),
            Self::InvalidCharacter { char, position } => {
                write!(f, "invalid character '{}' at position {}", char.escape_debug(), position)
            }
            Self::InvalidPath(path) => write!(f, "invalid ref name: '{}'", path),
        }
    }
}

impl std::error::Error for InvalidNameError {}
