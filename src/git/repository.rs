//! Git history extraction using libgit2
//!
//! Implements [`HistorySource`] with the git2 crate (Rust bindings to libgit2).
//! The underlying repository handle is released when the `GitRepository` is
//! dropped, on every exit path of a scan.

use chrono::{DateTime, TimeZone, Utc};
use git2::{Delta, DiffFindOptions, DiffOptions, ErrorCode, Oid, Repository, Sort};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::model::{CommitRecord, RawChange, RefTarget};
use super::source::HistorySource;
use crate::error::{ScanError, ScanResult};
use crate::ingest::range::RevRange;

/// Git repository reader using libgit2.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open a git repository.
    ///
    /// # Arguments
    /// * `path` - Path to the repository (or any subdirectory)
    pub fn open(path: &Path) -> ScanResult<Self> {
        let repo = Repository::discover(path)?;
        debug!("Opened git repository at {:?}", repo.path());
        Ok(Self { repo })
    }

    /// The `.git` directory, canonicalized when possible
    pub fn git_dir(&self) -> PathBuf {
        let path = self.repo.path();
        path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
    }

    /// The working directory, `None` for bare repositories
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Project name: the work tree directory, or the git directory for bare repos
    pub fn name(&self) -> String {
        repository_name(&self.git_dir(), self.workdir())
    }

    /// Resolve a revision expression to a commit id
    fn resolve_commit(&self, part: &'static str, rev: &str) -> ScanResult<Oid> {
        self.repo
            .revparse_single(rev)
            .and_then(|obj| obj.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|e| {
                debug!("Failed to resolve {} '{}': {}", part, rev, e);
                ScanError::UnresolvedRevision {
                    part,
                    rev: rev.to_string(),
                }
            })
    }

    fn read_commit(&self, oid: Oid) -> ScanResult<CommitRecord> {
        let commit = self.repo.find_commit(oid)?;

        let time = commit_time(&commit.time()).unwrap_or_else(|| {
            warn!(
                "Commit {} has an unrepresentable time ({} s), using the epoch",
                oid,
                commit.time().seconds()
            );
            DateTime::<Utc>::default()
        });
        let mut record = CommitRecord::new(&oid.to_string(), time);
        record.author = Some(identity(&commit.author()));
        record.committer = Some(identity(&commit.committer()));
        record.message = String::from_utf8_lossy(commit.message_bytes()).into_owned();
        record.short_message = commit
            .summary_bytes()
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .unwrap_or_default();
        record.encoding = commit.message_encoding().unwrap_or("UTF-8").to_string();

        let tree = commit.tree()?;
        if commit.parent_count() == 0 {
            record.changes = self.diff_trees(None, &tree)?;
        }
        for parent in commit.parents() {
            let parent_tree = parent.tree()?;
            record
                .changes
                .extend(self.diff_trees(Some(&parent_tree), &tree)?);
            record.parents.push(parent.id().to_string());
        }

        debug!(
            "Commit {} '{}' with {} changes",
            record.sha,
            record.short_message,
            record.changes.len()
        );
        Ok(record)
    }

    /// File-level changes between two trees, with rename and copy detection
    fn diff_trees(
        &self,
        old: Option<&git2::Tree<'_>>,
        new: &git2::Tree<'_>,
    ) -> ScanResult<Vec<RawChange>> {
        let mut diff_opts = DiffOptions::new();
        diff_opts.include_typechange(true);

        let mut diff = self
            .repo
            .diff_tree_to_tree(old, Some(new), Some(&mut diff_opts))?;

        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true).copies(true);
        diff.find_similar(Some(&mut find_opts))?;

        let changes = diff
            .deltas()
            .map(|delta| {
                let path_of = |file: git2::DiffFile<'_>| {
                    file.path()
                        .map(|p| p.to_string_lossy().replace('\\', "/"))
                        .unwrap_or_default()
                };
                RawChange {
                    kind: change_code(delta.status()).to_string(),
                    old_path: path_of(delta.old_file()),
                    new_path: path_of(delta.new_file()),
                }
            })
            .collect();

        Ok(changes)
    }
}

impl HistorySource for GitRepository {
    fn list_commits(&self, range: Option<&RevRange>) -> ScanResult<Vec<CommitRecord>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;

        match range {
            Some(range) => {
                let since = self.resolve_commit("since", &range.since)?;
                let until = self.resolve_commit("until", &range.until)?;
                debug!("Using range from '{}' to '{}'", range.since, range.until);
                revwalk.push(until)?;
                revwalk.hide(since)?;
            }
            None => {
                revwalk.push_glob("*")?;
                match revwalk.push_head() {
                    Ok(()) => {}
                    Err(e) if is_unborn(&e) => debug!("Repository has no HEAD commit yet"),
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            commits.push(self.read_commit(oid?)?);
        }

        debug!("Found #{} commits", commits.len());
        Ok(commits)
    }

    fn list_branches(&self) -> ScanResult<Vec<RefTarget>> {
        let mut result = Vec::new();

        for branch in self.repo.branches(None)? {
            let (branch, _) = branch?;
            let name = match branch.name()? {
                Some(name) => name.to_string(),
                None => continue,
            };
            // Symbolic refs like origin/HEAD resolve to the branch they track
            match branch.get().resolve().ok().and_then(|r| r.target()) {
                Some(oid) => result.push(RefTarget::new(&name, &oid.to_string())),
                None => debug!("Branch '{}' does not point at a commit, skipping", name),
            }
        }

        Ok(result)
    }

    fn list_tags(&self) -> ScanResult<Vec<RefTarget>> {
        let mut result = Vec::new();

        for label in self.repo.tag_names(None)?.iter().flatten() {
            let peeled = self
                .repo
                .revparse_single(&format!("refs/tags/{}", label))
                .and_then(|obj| obj.peel_to_commit());
            match peeled {
                Ok(commit) => {
                    debug!("Found tag '{}' (sha = '{}')", label, commit.id());
                    result.push(RefTarget::new(label, &commit.id().to_string()));
                }
                Err(e) => warn!("Tag '{}' does not peel to a commit, skipping: {}", label, e),
            }
        }

        Ok(result)
    }

    fn current_head(&self) -> ScanResult<Option<RefTarget>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if is_unborn(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let commit = head.peel_to_commit()?;
        Ok(Some(RefTarget::new("HEAD", &commit.id().to_string())))
    }

    fn current_branch(&self) -> ScanResult<Option<String>> {
        let head = self.repo.find_reference("HEAD")?;
        Ok(head.symbolic_target().map(str::to_string))
    }
}

/// Project name for a repository
pub fn repository_name(git_dir: &Path, workdir: Option<&Path>) -> String {
    let dir = match workdir {
        Some(w) => w.to_path_buf(),
        None => git_dir.to_path_buf(),
    };
    let dir = dir.canonicalize().unwrap_or(dir);
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.to_string_lossy().into_owned())
}

fn is_unborn(e: &git2::Error) -> bool {
    matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}

fn identity(sig: &git2::Signature<'_>) -> String {
    format!(
        "{} <{}>",
        String::from_utf8_lossy(sig.name_bytes()),
        String::from_utf8_lossy(sig.email_bytes())
    )
}

fn change_code(status: Delta) -> &'static str {
    match status {
        Delta::Added => "A",
        Delta::Modified => "M",
        Delta::Deleted => "D",
        Delta::Renamed => "R",
        Delta::Copied => "C",
        Delta::Typechange => "T",
        _ => "X",
    }
}

/// Convert a git timestamp to UTC, `None` when chrono cannot represent it.
fn commit_time(time: &git2::Time) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(time.seconds(), 0).single()
}
