//! git layer for tagger
//!
//! this module wraps every interaction with the repository. The changelog
//! and release layers use this API and never touch git2 directly.
//!
//! # Architecture
//!
//! ```text
//!                    ┌──────────────────────┐
//!                    │   RepositoryHandle   │
//!                    │ (open, HEAD, config) │
//!                    └──────────────────────┘
//!                               │
//!      ┌───────────────┬────────┴───────┬───────────────┐
//!      ▼               ▼                ▼               ▼
//! ┌──────────┐   ┌────────────┐   ┌────────────┐  ┌────────────┐
//! │  remote  │   │    walk    │   │   commit   │  │    tag     │
//! │ (fetch)  │   │ (history)  │   │ (publish)  │  │ (publish)  │
//! └──────────┘   └────────────┘   └────────────┘  └────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tagger::git::{self, RepositoryHandle, TagName};
//!
//! let repo = RepositoryHandle::open(".")?;
//! let signature = repo.default_signature()?;
//! let remote_head = git::fetch(&repo, "origin")?;
//!
//! let commit = git::commit_files(&repo, &signature, &["CHANGELOG.md"], "Release v1.2.0")?;
//! let tag = TagName::new("v1.2.0")?;
//! git::create_annotated_tag(&repo, &signature, &tag, commit.id, "Changelog\n\n#42")?;
//! ```

mod commit;
mod error;
mod remote;
mod repository;
mod tag;
mod types;
mod walk;

pub use commit::{commit_files, file_at_commit, CommitInfo};
pub use error::{GitError, GitResult};
pub use remote::{check_certificate, fetch, CertKind, CertVerdict, TransportKind};
pub use repository::RepositoryHandle;
pub use tag::create_annotated_tag;
pub use types::{BranchName, CommitId, InvalidNameError, Signature, TagId, TagName, TreeId};
pub use walk::CommitWalker;
