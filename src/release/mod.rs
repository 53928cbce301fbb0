//! Release workflow.
//!
//! Ties the git and changelog layers together:
//!
//! 1. resolve the current branch
//! 2. fetch the remote and check the branch is current
//! 3. collect merged pull requests since the previous tag
//! 4. update the changelog file and commit the release files
//! 5. create the annotated tag

mod config;
mod error;

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::changelog::{self, changelog_section, compose, prepend_section};
use crate::git::{self, BranchName, CommitId, GitError, RepositoryHandle, Signature, TagName};

pub use config::{FileConfig, ReleaseConfig, CONFIG_FILE_NAME};
pub use error::{ConfigError, ReleaseError, ReleaseResult};

/// What a release run did (or, for a dry run, would do).
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport {
    pub branch: BranchName,
    pub tag: TagName,
    /// Commit the tag points (or would point) to.
    pub target: CommitId,
    pub entries: Vec<String>,
    pub message: String,
    /// Whether a release commit was created.
    pub committed: bool,
    pub dry_run: bool,
}

/// A release about to be cut from one repository.
pub struct Release {
    config: ReleaseConfig,
    repo: RepositoryHandle,
    signature: Option<Signature>,
}

impl Release {
    /// Open the repository named by `config`.
    pub fn open(config: ReleaseConfig) -> ReleaseResult<Self> {
        let repo = RepositoryHandle::open(&config.path)?;
        Ok(Self {
            config,
            repo,
            signature: None,
        })
    }

    /// Use `signature` for the commit and tag instead of the identity in the
    /// git configuration.
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReleaseConfig {
        &self.config
    }

    /// Get the repository.
    pub fn repository(&self) -> &RepositoryHandle {
        &self.repo
    }

    fn log(&self, message: impl fmt::Display) {
        if self.config.verbose {
            eprintln!("[tagger] {}", message);
        }
    }

    fn signature(&self) -> ReleaseResult<Signature> {
        match &self.signature {
            Some(signature) => Ok(signature.clone()),
            None => Ok(self.repo.default_signature()?),
        }
    }

    /// Run the release.
    pub fn run(&self) -> ReleaseResult<ReleaseReport> {
        let tag = TagName::new(self.config.tag.as_str()).map_err(GitError::from)?;

        let (branch, head) = self.repo.current_branch()?;
        self.log(format_args!("on branch {} at {}", branch, head.short()));

        if self.config.fetch {
            self.log(format_args!("fetching {}", self.config.remote));
            let remote_head = git::fetch(&self.repo, &self.config.remote)?;
            self.log(format_args!("{} HEAD is {}", self.config.remote, remote_head.short()));

            if self.config.require_up_to_date && remote_head != head {
                return Err(ReleaseError::OutOfDate {
                    branch: branch.to_string(),
                    remote: self.config.remote.clone(),
                    local: head,
                    remote_head,
                });
            }
        }

        if self.repo.tag_exists(&tag) {
            return Err(GitError::TagExists(tag.to_string()).into());
        }

        let entries =
            changelog::changelog_with(&self.repo, self.config.since.as_deref(), self.config.order)?;
        match &self.config.since {
            Some(since) => self.log(format_args!("{} pull requests since {}", entries.len(), since)),
            None => self.log(format_args!("{} pull requests in history", entries.len())),
        }
        let message = compose(&entries);

        let mut files = self.config.files.clone();
        if let Some(changelog_file) = &self.config.changelog_file {
            if !files.contains(changelog_file) {
                files.push(changelog_file.clone());
            }
        }

        if self.config.dry_run {
            self.log("dry run, nothing written");
            return Ok(ReleaseReport {
                branch,
                tag,
                target: head,
                entries,
                message,
                committed: !files.is_empty(),
                dry_run: true,
            });
        }

        let signature = self.signature()?;

        let previous = match &self.config.changelog_file {
            Some(changelog_file) => Some((
                changelog_file,
                self.update_changelog_file(changelog_file, &tag, &entries)?,
            )),
            None => None,
        };

        let (target, committed) = if files.is_empty() {
            (head, false)
        } else {
            self.log(format_args!("committing {} file(s)", files.len()));
            let message = format!("Release {}", tag);
            let commit = match git::commit_files(&self.repo, &signature, &files, &message) {
                Ok(commit) => commit,
                Err(err) => {
                    // put the changelog back so a retry does not add the section twice
                    if let Some((changelog_file, previous)) = &previous {
                        if let Err(restore) =
                            self.restore_changelog_file(changelog_file, previous.as_deref())
                        {
                            eprintln!("[tagger] {}", restore);
                        }
                    }
                    return Err(err.into());
                }
            };
            self.log(format_args!("committed {} {}", commit.id.short(), commit.summary()));
            (commit.id, true)
        };

        git::create_annotated_tag(&self.repo, &signature, &tag, target, &message)?;
        self.log(format_args!("tagged {} as {}", target.short(), tag));

        Ok(ReleaseReport {
            branch,
            tag,
            target,
            entries,
            message,
            committed,
            dry_run: false,
        })
    }

    /// prepend the release section to the changelog file and return what
    /// the file held before (`None` if it did not exist)
    fn update_changelog_file(
        &self,
        relative: &Path,
        tag: &TagName,
        entries: &[String],
    ) -> ReleaseResult<Option<String>> {
        let workdir = self.repo.workdir().ok_or(ReleaseError::BareRepository)?;
        let path = workdir.join(relative);

        let existing = match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => return Err(ReleaseError::ChangelogFile { path, source }),
        };

        let section = changelog_section(tag.as_str(), entries);
        let updated = prepend_section(existing.as_deref().unwrap_or_default(), &section);
        fs::write(&path, updated).map_err(|source| ReleaseError::ChangelogFile {
            path: path.clone(),
            source,
        })?;
        self.log(format_args!("updated {}", relative.display()));
        Ok(existing)
    }

    fn restore_changelog_file(&self, relative: &Path, previous: Option<&str>) -> ReleaseResult<()> {
        let workdir = self.repo.workdir().ok_or(ReleaseError::BareRepository)?;
        let path = workdir.join(relative);

        let restored = match previous {
            Some(text) => fs::write(&path, text),
            None => fs::remove_file(&path),
        };
        restored.map_err(|source| ReleaseError::ChangelogFile {
            path: path.clone(),
            source,
        })?;
        self.log(format_args!("restored {}", relative.display()));
        Ok(())
    }
}
