//! VCS access layer
//!
//! Reads commits, file changes, branches and tags out of a git repository.
//! The ingestion engine only sees the [`HistorySource`] trait; [`GitRepository`]
//! is the libgit2-backed implementation.
//!
//! # Example
//!
//! ```no_run
//! use gitgraph::git::{GitRepository, HistorySource};
//! use std::path::Path;
//!
//! let repository = GitRepository::open(Path::new("/path/to/repo")).unwrap();
//! let commits = repository.list_commits(None).unwrap();
//! println!("{} commits", commits.len());
//! ```

pub mod discover;
pub mod model;
pub mod repository;
pub mod source;

pub use discover::{LocatedRepository, RepositoryLocator};
pub use model::{CommitRecord, RawChange, RefTarget};
pub use repository::GitRepository;
pub use source::HistorySource;
