//! CLI command definitions and handlers

mod clean;
mod scan;
mod status;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use gitgraph::cache;
use gitgraph::config::{load_project_config, ProjectConfig};
use gitgraph::git::{GitRepository, LocatedRepository, RepositoryLocator};

/// gitgraph - git history as a graph
#[derive(Parser, Debug)]
#[command(name = "gitgraph")]
#[command(
    version,
    about = "Incrementally ingest git history (commits, authors, files, branches, tags) into a local graph database",
    after_help = "\
Examples:
  gitgraph .                               Scan the repository in the current directory
  gitgraph . scan --range v1.0..           Scan only commits after v1.0
  gitgraph /path/to/repo scan --submodules Scan a repository and its submodules
  gitgraph . status                        Show what has been ingested
  gitgraph . clean                         Delete the graph database"
)]
pub struct Cli {
    /// Path to repository (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest new history into the graph (default command)
    #[command(after_help = "\
Range expressions:
  <rev>..          everything after <rev> up to HEAD
  <rev>..<rev>     everything after the first revision up to the second

When the range ends at a branch that was scanned before, scanning resumes
from that branch's stored head.")]
    Scan {
        /// Range of commits to ingest, e.g. `v1.0..` or `abc123..main`
        #[arg(long)]
        range: Option<String>,

        /// Graph database directory (default: per-repository cache directory)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Also scan initialized submodules
        #[arg(long)]
        submodules: bool,
    },

    /// Show node counts and branch heads stored for the repository
    Status {
        /// Graph database directory
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Delete the graph database of the repository
    Clean {
        /// Graph database directory
        #[arg(long)]
        db: Option<PathBuf>,

        /// Show what would be removed without deleting
        #[arg(long)]
        dry_run: bool,
    },
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Scan {
            range,
            db,
            submodules,
        }) => scan::run(&cli.path, range, db, submodules),
        Some(Commands::Status { db }) => status::run(&cli.path, db),
        Some(Commands::Clean { db, dry_run }) => clean::run(&cli.path, db, dry_run),
        None => scan::run(&cli.path, None, None, false),
    }
}

/// A repository to work on and the database it is stored in
pub(crate) struct Target {
    pub located: LocatedRepository,
    pub db_path: PathBuf,
}

/// Load the project config of the repository at `path` and locate every
/// repository to work on.
///
/// `db` and `submodules` come from the command line and win over the config.
pub(crate) fn locate_targets(
    path: &Path,
    db: Option<PathBuf>,
    submodules: bool,
) -> Result<(ProjectConfig, Vec<Target>)> {
    let repo_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let root = GitRepository::open(&repo_path)
        .with_context(|| format!("Not a git repository: {}", repo_path.display()))?;
    let config_dir = root
        .workdir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.git_dir());
    let config = load_project_config(&config_dir);

    let scan_submodules = submodules || config.scan_submodules();
    let base = db.or_else(|| config.store.path.clone());

    let located = RepositoryLocator::new(scan_submodules)
        .locate(&repo_path)
        .with_context(|| format!("Failed to read repository at {}", repo_path.display()))?;

    let targets = located
        .into_iter()
        .enumerate()
        .map(|(i, located)| {
            let db_path = db_path_for(&located, base.as_deref(), i == 0);
            Target { located, db_path }
        })
        .collect();

    Ok((config, targets))
}

/// Database directory of one repository.
///
/// An explicit base directory holds the root repository; submodules get their
/// own subdirectory so branch names of different repositories never collide.
fn db_path_for(located: &LocatedRepository, base: Option<&Path>, is_root: bool) -> PathBuf {
    let repo_path = located.workdir.as_deref().unwrap_or(&located.git_dir);
    match base {
        Some(base) if is_root => base.to_path_buf(),
        Some(base) => base
            .join("modules")
            .join(cache::get_cache_dir(repo_path).file_name().unwrap_or_default()),
        None => cache::get_graph_db_path(repo_path),
    }
}
