//! Release configuration.
//!
//! [`ReleaseConfig`] is built in code (or by the CLI) with builder methods.
//! Repositories can keep their defaults in a `.tagger.toml` file at the
//! root:
//!
//! ```toml
//! remote = "upstream"
//! files = ["VERSION"]
//! changelog_file = "CHANGELOG.md"
//! order = "oldest-first"
//! fetch = true
//! require_up_to_date = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::changelog::ChangelogOrder;
use crate::release::error::ConfigError;

/// Name of the per-repository configuration file.
pub const CONFIG_FILE_NAME: &str = ".tagger.toml";

/// Release configuration options.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Path to the repository.
    pub path: PathBuf,
    /// Remote to fetch from.
    pub remote: String,
    /// Previous release tag; `None` for a first release.
    pub since: Option<String>,
    /// Tag to create.
    pub tag: String,
    /// Files to commit with the release, relative to the working directory.
    pub files: Vec<PathBuf>,
    /// Markdown changelog to prepend the new section to.
    pub changelog_file: Option<PathBuf>,
    /// Entry order.
    pub order: ChangelogOrder,
    /// Fetch the remote before reading history.
    pub fetch: bool,
    /// Refuse to release when the remote HEAD differs from the local branch.
    pub require_up_to_date: bool,
    /// Compute everything, write nothing.
    pub dry_run: bool,
    /// Enable verbose logging.
    pub verbose: bool,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            remote: "origin".to_string(),
            since: None,
            tag: String::new(),
            files: Vec::new(),
            changelog_file: None,
            order: ChangelogOrder::default(),
            fetch: true,
            require_up_to_date: true,
            dry_run: false,
            verbose: false,
        }
    }
}

impl ReleaseConfig {
    /// Create a new configuration for the repository at `path` creating `tag`.
    pub fn new(path: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set the remote name.
    pub fn remote(mut self, value: impl Into<String>) -> Self {
        self.remote = value.into();
        self
    }

    /// Set the previous release tag.
    pub fn since(mut self, value: Option<String>) -> Self {
        self.since = value;
        self
    }

    /// Add a file to commit with the release.
    pub fn file(mut self, value: impl Into<PathBuf>) -> Self {
        self.files.push(value.into());
        self
    }

    /// Set the changelog file.
    pub fn changelog_file(mut self, value: Option<PathBuf>) -> Self {
        self.changelog_file = value;
        self
    }

    /// Set the entry order.
    pub fn order(mut self, value: ChangelogOrder) -> Self {
        self.order = value;
        self
    }

    /// Set fetch flag.
    pub fn fetch(mut self, value: bool) -> Self {
        self.fetch = value;
        self
    }

    /// Set require_up_to_date flag.
    pub fn require_up_to_date(mut self, value: bool) -> Self {
        self.require_up_to_date = value;
        self
    }

    /// Set dry_run flag.
    pub fn dry_run(mut self, value: bool) -> Self {
        self.dry_run = value;
        self
    }

    /// Set verbose flag.
    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Fill in everything `file` sets. Values already given on the command
    /// line are applied afterwards by the caller, so they win.
    pub fn with_file_config(mut self, file: FileConfig) -> Self {
        if let Some(remote) = file.remote {
            self.remote = remote;
        }
        if let Some(files) = file.files {
            self.files = files;
        }
        if file.changelog_file.is_some() {
            self.changelog_file = file.changelog_file;
        }
        if let Some(order) = file.order {
            self.order = order;
        }
        if let Some(fetch) = file.fetch {
            self.fetch = fetch;
        }
        if let Some(require) = file.require_up_to_date {
            self.require_up_to_date = require;
        }
        self
    }
}

/// Contents of `.tagger.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub remote: Option<String>,
    pub files: Option<Vec<PathBuf>>,
    pub changelog_file: Option<PathBuf>,
    pub order: Option<ChangelogOrder>,
    pub fetch: Option<bool>,
    pub require_up_to_date: Option<bool>,
}

impl FileConfig {
    /// Parse configuration from TOML text.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: FileConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        if matches!(&config.remote, Some(remote) if remote.trim().is_empty()) {
            return Err(ConfigError::Invalid("remote cannot be empty".to_string()));
        }
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Load `.tagger.toml` from the repository root if there is one.
    pub fn discover(repo_root: &Path) -> Result<Option<Self>, ConfigError> {
        let path = repo_root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ReleaseConfig::new("/repo", "v1.0.0");
        assert_eq!(config.remote, "origin");
        assert_eq!(config.tag, "v1.0.0");
        assert!(config.fetch);
        assert!(config.require_up_to_date);
        assert!(!config.dry_run);
        assert_eq!(config.order, ChangelogOrder::NewestFirst);
    }

    #[test]
    fn test_builder() {
        let config = ReleaseConfig::new(".", "v2")
            .remote("upstream")
            .since(Some("v1".to_string()))
            .file("VERSION")
            .file("Cargo.toml")
            .fetch(false)
            .dry_run(true);

        assert_eq!(config.remote, "upstream");
        assert_eq!(config.since.as_deref(), Some("v1"));
        assert_eq!(config.files, vec![PathBuf::from("VERSION"), PathBuf::from("Cargo.toml")]);
        assert!(!config.fetch);
        assert!(config.dry_run);
    }

    #[test]
    fn test_parse_file_config() {
        let text = r#"
            remote = "upstream"
            files = ["VERSION"]
            changelog_file = "CHANGELOG.md"
            order = "oldest-first"
            fetch = false
        "#;
        let file = FileConfig::parse(text, Path::new(".tagger.toml")).unwrap();
        let config = ReleaseConfig::new(".", "v1").with_file_config(file);

        assert_eq!(config.remote, "upstream");
        assert_eq!(config.files, vec![PathBuf::from("VERSION")]);
        assert_eq!(config.changelog_file, Some(PathBuf::from("CHANGELOG.md")));
        assert_eq!(config.order, ChangelogOrder::OldestFirst);
        assert!(!config.fetch);
        assert!(config.require_up_to_date);
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        let result = FileConfig::parse("remtoe = \"x\"", Path::new(".tagger.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_parse_rejects_empty_remote() {
        let result = FileConfig::parse("remote = \"\"", Path::new(".tagger.toml"));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_discover() {
        let dir = TempDir::new().unwrap();
        assert!(FileConfig::discover(dir.path()).unwrap().is_none());

        fs::write(dir.path().join(CONFIG_FILE_NAME), "remote = \"upstream\"\n").unwrap();
        let found = FileConfig::discover(dir.path()).unwrap().unwrap();
        assert_eq!(found.remote.as_deref(), Some("upstream"));
    }
}
