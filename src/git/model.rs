//! Data handed over by the VCS access layer

use chrono::{DateTime, Utc};

/// A commit as read from the repository.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    /// Full commit hash
    pub sha: String,
    /// Author identity string ("Name <email>")
    pub author: Option<String>,
    /// Committer identity string ("Name <email>")
    pub committer: Option<String>,
    /// Commit time
    pub time: DateTime<Utc>,
    /// Full commit message
    pub message: String,
    /// First paragraph of the message, on one line
    pub short_message: String,
    /// Message encoding
    pub encoding: String,
    /// Parent hashes, in parent order
    pub parents: Vec<String>,
    /// File changes versus each parent
    pub changes: Vec<RawChange>,
}

impl CommitRecord {
    /// A commit with no metadata beyond its hash, committed at `time`
    pub fn new(sha: &str, time: DateTime<Utc>) -> Self {
        Self {
            sha: sha.to_string(),
            author: None,
            committer: None,
            time,
            message: String::new(),
            short_message: String::new(),
            encoding: "UTF-8".to_string(),
            parents: Vec::new(),
            changes: Vec::new(),
        }
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    pub fn with_committer(mut self, committer: &str) -> Self {
        self.committer = Some(committer.to_string());
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self.short_message = message.lines().next().unwrap_or("").to_string();
        self
    }

    pub fn with_parent(mut self, sha: &str) -> Self {
        self.parents.push(sha.to_string());
        self
    }

    pub fn with_change(mut self, change: RawChange) -> Self {
        self.changes.push(change);
        self
    }
}

/// One file change of a commit versus a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChange {
    /// Single-letter change code (A, M, D, R, C, ...)
    pub kind: String,
    pub old_path: String,
    pub new_path: String,
}

impl RawChange {
    pub fn new(kind: &str, old_path: &str, new_path: &str) -> Self {
        Self {
            kind: kind.to_string(),
            old_path: old_path.to_string(),
            new_path: new_path.to_string(),
        }
    }
}

/// A named ref resolved to a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefTarget {
    pub name: String,
    pub sha: String,
}

impl RefTarget {
    pub fn new(name: &str, sha: &str) -> Self {
        Self {
            name: name.to_string(),
            sha: sha.to_string(),
        }
    }
}
