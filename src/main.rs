//! tagger - release tagging from merged pull requests
//!
//! This is the main entry point for the tagger command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use tagger::changelog::ChangelogOrder;
use tagger::release::{FileConfig, Release, ReleaseConfig, ReleaseError, ReleaseReport};

/// Exit status when the remote is not reachable over a trusted transport.
const EXIT_UNTRUSTED: u8 = 3;

/// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(
    name = "tagger",
    version,
    about = "Tag a release with a changelog of the pull requests merged since the last tag"
)]
struct Cli {
    /// Tag to create (e.g. v1.3.0)
    tag: String,

    /// Path to the repository
    #[arg(short = 'C', long, default_value = ".")]
    path: PathBuf,

    /// Remote to fetch from [default: origin]
    #[arg(short, long)]
    remote: Option<String>,

    /// Previous release tag; omit for the first release
    #[arg(short, long)]
    since: Option<String>,

    /// File to commit with the release (repeatable)
    #[arg(short, long = "file")]
    files: Vec<PathBuf>,

    /// Markdown changelog to prepend the new section to
    #[arg(long)]
    changelog_file: Option<PathBuf>,

    /// List the oldest merged pull request first
    #[arg(long)]
    oldest_first: bool,

    /// Do not fetch the remote first
    #[arg(long)]
    no_fetch: bool,

    /// Release even if the local branch differs from the remote HEAD
    #[arg(long)]
    allow_behind: bool,

    /// Print the changelog without committing or tagging
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Configuration file [default: <path>/.tagger.toml if present]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Build the release configuration: defaults, then the config file,
    /// then the flags given on the command line.
    fn release_config(&self) -> Result<ReleaseConfig, ReleaseError> {
        let mut config = ReleaseConfig::new(&self.path, self.tag.as_str());

        let file = match &self.config {
            Some(path) => Some(FileConfig::load(path)?),
            None => FileConfig::discover(&self.path)?,
        };
        if let Some(file) = file {
            config = config.with_file_config(file);
        }

        if let Some(remote) = &self.remote {
            config = config.remote(remote.as_str());
        }
        if !self.files.is_empty() {
            config.files = self.files.clone();
        }
        if self.changelog_file.is_some() {
            config = config.changelog_file(self.changelog_file.clone());
        }
        if self.oldest_first {
            config = config.order(ChangelogOrder::OldestFirst);
        }
        if self.no_fetch {
            config = config.fetch(false);
        }
        if self.allow_behind {
            config = config.require_up_to_date(false);
        }

        Ok(config
            .since(self.since.clone())
            .dry_run(self.dry_run)
            .verbose(self.verbose))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(report) => {
            print_report(&report, cli.json);
            ExitCode::SUCCESS
        }
        Err(e) if e.is_terminal() => {
            eprintln!("{} {}", "fatal:".red().bold(), e);
            ExitCode::from(EXIT_UNTRUSTED)
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ReleaseReport, ReleaseError> {
    let config = cli.release_config()?;
    Release::open(config)?.run()
}

fn print_report(report: &ReleaseReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("{} cannot encode report: {}", "error:".red().bold(), e),
        }
        return;
    }

    println!("{}", report.message);
    println!();
    if report.dry_run {
        println!(
            "{} would tag {} at {} on {}",
            "dry run:".yellow().bold(),
            report.tag,
            report.target.short(),
            report.branch
        );
    } else {
        let how = if report.committed { "new release commit" } else { "branch head" };
        println!(
            "{} tagged {} at {} ({}) on {}",
            "✔".green(),
            report.tag,
            report.target.short(),
            how,
            report.branch
        );
    }
}
