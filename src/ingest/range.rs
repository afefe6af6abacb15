//! Range expressions and incremental range resolution
//!
//! A range `<since>..<until>` selects the commits reachable from `until` but
//! not from `since`. When `until` names a branch that an earlier scan already
//! ingested, the range is narrowed to start at that branch's persisted head so
//! only new commits are walked.

use std::fmt;
use tracing::{info, warn};

use super::identity::IdentityCache;
use crate::error::{ScanError, ScanResult};
use crate::git::HistorySource;
use crate::graph::{EdgeKind, GraphQuery};

const SEPARATOR: &str = "..";
const HEAD: &str = "HEAD";

/// A validated `since..until` range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevRange {
    pub since: String,
    pub until: String,
}

impl RevRange {
    /// Parse a range expression.
    ///
    /// Accepts `<rev>..` (until = HEAD) and `<rev>..<rev>`. Exactly one `..`
    /// separator is allowed; three-dot and other multi-dot forms are rejected.
    pub fn parse(expr: &str) -> ScanResult<Self> {
        let expr = expr.trim();

        let (since, until) = expr.split_once(SEPARATOR).ok_or_else(|| {
            ScanError::invalid_range(expr, "range must look like '<rev>..' or '<rev>..<rev>'")
        })?;

        if since.is_empty() {
            return Err(ScanError::invalid_range(
                expr,
                "range must start with a revision, like '<rev>..'",
            ));
        }
        if since.ends_with('.') || until.starts_with('.') || until.contains(SEPARATOR) {
            return Err(ScanError::invalid_range(
                expr,
                "three-dot and other multi-dot notations are not supported",
            ));
        }

        let until = if until.is_empty() { HEAD } else { until };

        Ok(Self {
            since: since.to_string(),
            until: until.to_string(),
        })
    }
}

impl fmt::Display for RevRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.since, SEPARATOR, self.until)
    }
}

/// Turns a user range into the minimal range needed to reach full coverage.
pub struct RangeResolver<'a, 's> {
    store: &'s dyn GraphQuery,
    source: &'a dyn HistorySource,
    branches: &'a IdentityCache<'s>,
}

impl<'a, 's> RangeResolver<'a, 's> {
    pub fn new(
        store: &'s dyn GraphQuery,
        source: &'a dyn HistorySource,
        branches: &'a IdentityCache<'s>,
    ) -> Self {
        Self {
            store,
            source,
            branches,
        }
    }

    /// Resolve a raw range expression. `None` (or blank) means full history.
    pub fn resolve(&self, expr: Option<&str>) -> ScanResult<Option<RevRange>> {
        let expr = match expr.map(str::trim) {
            Some(e) if !e.is_empty() => e,
            _ => return Ok(None),
        };

        let range = RevRange::parse(expr)?;

        let branch = self.branch_for_until(&range.until)?;
        let persisted_head = branch
            .as_deref()
            .and_then(|name| self.persisted_head(name).map(|sha| (name, sha)));

        match (branch.as_deref(), persisted_head) {
            (_, Some((name, sha))) => {
                info!(
                    "Found already scanned commit with SHA {} as head of '{}', using it as range start",
                    sha, name
                );
                Ok(Some(RevRange {
                    since: sha,
                    until: range.until,
                }))
            }
            (Some(name), None) => {
                if self.branches.find(name).is_some() {
                    warn!("Could not find head of branch '{}' in the database", name);
                } else {
                    info!("Branch '{}' does not exist in the database yet", name);
                }
                warn!(
                    "Optimized scanning not available, doing a full scan according to range '{}'",
                    range
                );
                Ok(Some(range))
            }
            (None, None) => {
                info!(
                    "Range '{}' does not end at a branch, doing a full scan according to range",
                    range
                );
                Ok(Some(range))
            }
        }
    }

    /// Branch named by the until-part: HEAD (or `.`, or nothing) resolves to the
    /// checked-out branch, anything else is taken literally. `None` when HEAD is detached.
    pub fn branch_for_until(&self, until: &str) -> ScanResult<Option<String>> {
        let until = until.trim();
        if !(until.is_empty() || until == "." || until.eq_ignore_ascii_case(HEAD)) {
            return Ok(Some(until.to_string()));
        }
        Ok(self
            .source
            .current_branch()?
            .map(|full| short_branch_name(&full).to_string()))
    }

    /// SHA of the commit the persisted branch node points at
    fn persisted_head(&self, branch: &str) -> Option<String> {
        let node = self.branches.find(branch)?;
        let head = self
            .store
            .targets(node, EdgeKind::HasHead)
            .into_iter()
            .next()?;
        self.store.get_str(head, "sha")
    }
}

/// `refs/heads/main` -> `main`, `refs/remotes/origin/x` -> `remotes/origin/x`
pub fn short_branch_name(full: &str) -> &str {
    full.strip_prefix("refs/heads/")
        .or_else(|| full.strip_prefix("refs/"))
        .unwrap_or(full)
}
