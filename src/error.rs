//! Errors that abort a scan

use thiserror::Error;

/// Fatal scan errors.
///
/// Referential gaps (a parent, branch head or tag target that is not in the
/// store) are not errors: they are logged and counted in the scan stats.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    #[error("Could not resolve '{part}' part '{rev}' of range")]
    UnresolvedRevision { part: &'static str, rev: String },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of fatal errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or unresolvable user input, raised before ingestion starts
    Input,
    /// The repository could not be opened or read
    Io,
}

impl ScanError {
    pub fn invalid_range(range: &str, reason: impl Into<String>) -> Self {
        ScanError::InvalidRange {
            range: range.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::InvalidRange { .. } | ScanError::UnresolvedRevision { .. } => {
                ErrorKind::Input
            }
            ScanError::Git(_) | ScanError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
