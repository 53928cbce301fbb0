//! Changelog derivation.
//!
//! [`changelog`] walks the history between the last release tag and HEAD and
//! keeps one entry per merged pull request; [`compose`] turns those entries
//! into the annotated tag message.

mod compose;
mod error;
mod extract;

pub use compose::{changelog_section, compose, prepend_section, HEADER};
pub use error::{ChangelogError, ChangelogResult};
pub use extract::{changelog, changelog_with, parse_merge_commit, ChangelogOrder};
