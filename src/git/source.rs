use super::model::{CommitRecord, RefTarget};
use crate::error::ScanResult;
use crate::ingest::range::RevRange;

/// Read access to a version-controlled repository.
///
/// All calls are blocking. A failing call aborts the scan that made it.
pub trait HistorySource {
    /// Commits reachable from `range.until` but not from `range.since`, or the
    /// whole history when `range` is `None`. Newest first; parents are not
    /// guaranteed to come after their children.
    fn list_commits(&self, range: Option<&RevRange>) -> ScanResult<Vec<CommitRecord>>;

    /// Local and remote-tracking branches with their head commit
    fn list_branches(&self) -> ScanResult<Vec<RefTarget>>;

    /// Tags with the commit they peel to
    fn list_tags(&self) -> ScanResult<Vec<RefTarget>>;

    /// The repository HEAD, `None` for a repository without commits
    fn current_head(&self) -> ScanResult<Option<RefTarget>>;

    /// Full ref name of the checked-out branch (`refs/heads/main`),
    /// `None` when HEAD is detached
    fn current_branch(&self) -> ScanResult<Option<String>>;
}
