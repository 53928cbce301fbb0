//! tagger - release tagging from merged pull requests
//!
//! This crate fetches a repository's remote, derives a changelog from the
//! pull requests merged since the previous release tag, commits the
//! changelog-bearing files and creates an annotated tag whose message is
//! that changelog.
//!
//! # Example
//!
//! ```no_run
//! use tagger::release::{Release, ReleaseConfig};
//!
//! let config = ReleaseConfig::new(".", "v1.3.0")
//!     .since(Some("v1.2.0".to_string()))
//!     .changelog_file(Some("CHANGELOG.md".into()));
//! let report = Release::open(config).unwrap().run().unwrap();
//! println!("{}", report.message);
//! ```

pub mod changelog;
pub mod git;
pub mod release;
