//! Incremental history ingestion
//!
//! Turns the output of a [`HistorySource`](crate::git::HistorySource) into
//! graph entities, creating every entity at most once across any number of
//! scans of the same repository.

pub mod changes;
pub mod commits;
pub mod identity;
pub mod range;
pub mod refs;
pub mod scanner;

pub use changes::{ChangeKind, FileLifecycleTracker};
pub use commits::CommitGraphIngester;
pub use identity::{key_property, CacheMode, IdentityCache, Resolved};
pub use range::{short_branch_name, RangeResolver, RevRange};
pub use refs::RefResolver;
pub use scanner::{scan, scan_repository, RepositoryScanner, ScanCaches, ScanStats};

#[cfg(test)]
pub(crate) mod test_support;
