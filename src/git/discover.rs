//! Repository discovery
//!
//! Resolves a user-supplied path to the repositories that should be scanned:
//! the repository containing the path and, optionally, its initialized
//! submodules. A repository reached twice is returned only once.

use git2::Repository;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::repository::repository_name;
use crate::error::ScanResult;

/// A repository found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedRepository {
    /// Canonical `.git` directory
    pub git_dir: PathBuf,
    /// Work tree, `None` for bare repositories
    pub workdir: Option<PathBuf>,
    /// Project name
    pub name: String,
}

/// Finds repositories to scan, remembering what it already handed out.
#[derive(Debug, Default)]
pub struct RepositoryLocator {
    scan_submodules: bool,
    seen: HashSet<PathBuf>,
}

impl RepositoryLocator {
    pub fn new(scan_submodules: bool) -> Self {
        Self {
            scan_submodules,
            seen: HashSet::new(),
        }
    }

    /// Repositories reachable from `path` that were not located before.
    pub fn locate(&mut self, path: &Path) -> ScanResult<Vec<LocatedRepository>> {
        let repo = Repository::discover(path)?;
        let mut found = Vec::new();
        self.collect(&repo, &mut found)?;
        Ok(found)
    }

    fn collect(&mut self, repo: &Repository, found: &mut Vec<LocatedRepository>) -> ScanResult<()> {
        let git_dir = repo
            .path()
            .canonicalize()
            .unwrap_or_else(|_| repo.path().to_path_buf());

        if !self.seen.insert(git_dir.clone()) {
            debug!("Repository {} already located, skipping", git_dir.display());
            return Ok(());
        }

        let workdir = repo.workdir().map(Path::to_path_buf);
        let name = repository_name(&git_dir, workdir.as_deref());
        info!("Accepted git repository '{}' in {}", name, git_dir.display());
        found.push(LocatedRepository {
            git_dir,
            workdir,
            name,
        });

        if !self.scan_submodules {
            return Ok(());
        }

        for submodule in repo.submodules()? {
            match submodule.open() {
                Ok(sub_repo) => self.collect(&sub_repo, found)?,
                Err(e) => warn!(
                    "Submodule '{}' is not initialized, skipping: {}",
                    submodule.name().unwrap_or("?"),
                    e
                ),
            }
        }

        Ok(())
    }
}
