//! gitgraph - incremental git history ingestion into a graph store
//!
//! Commits, authors, committers, files, branches and tags of a repository are
//! stored as graph nodes. Every entity is created at most once, however often
//! the repository is scanned, and a scan whose range ends at a known branch
//! only walks the commits added since that branch was last stored.

pub mod cache;
pub mod config;
pub mod error;
pub mod git;
pub mod graph;
pub mod ingest;

pub use error::{ErrorKind, ScanError, ScanResult};
