//! In-memory history source and a counting store for ingestion tests

use chrono::{DateTime, TimeZone, Utc};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::error::{ScanError, ScanResult};
use crate::git::{CommitRecord, HistorySource, RawChange, RefTarget};
use crate::graph::{EdgeKind, GraphNode, GraphQuery, GraphStore, NodeId, NodeKind};
use crate::ingest::range::RevRange;

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Commit with an author/committer, one parent at most and no changes
pub fn commit(sha: &str, parent: Option<&str>, author: &str, secs: i64) -> CommitRecord {
    let mut record = CommitRecord::new(sha, at(secs))
        .with_author(author)
        .with_committer(author)
        .with_message(&format!("commit {}\n\nbody", sha));
    if let Some(parent) = parent {
        record = record.with_parent(parent);
    }
    record
}

pub fn change(kind: &str, old_path: &str, new_path: &str) -> RawChange {
    RawChange::new(kind, old_path, new_path)
}

/// History held in memory. Commits are kept newest first.
#[derive(Default)]
pub struct FakeSource {
    commits: Vec<CommitRecord>,
    branches: Vec<RefTarget>,
    tags: Vec<RefTarget>,
    checked_out: Option<String>,
    detached_head: Option<String>,
    /// Every range `list_commits` was called with
    pub walked: RefCell<Vec<Option<String>>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit newer than every commit added so far
    pub fn with_commit(mut self, commit: CommitRecord) -> Self {
        self.push_commit(commit);
        self
    }

    pub fn push_commit(&mut self, commit: CommitRecord) {
        self.commits.insert(0, commit);
    }

    pub fn with_branch(mut self, name: &str, sha: &str) -> Self {
        self.set_branch(name, sha);
        self
    }

    pub fn set_branch(&mut self, name: &str, sha: &str) {
        self.branches.retain(|b| b.name != name);
        self.branches.push(RefTarget::new(name, sha));
    }

    pub fn with_tag(mut self, name: &str, sha: &str) -> Self {
        self.tags.push(RefTarget::new(name, sha));
        self
    }

    /// Check out `branch`; HEAD follows it
    pub fn checkout(mut self, branch: &str) -> Self {
        self.checked_out = Some(branch.to_string());
        self.detached_head = None;
        self
    }

    pub fn detach(mut self, sha: &str) -> Self {
        self.checked_out = None;
        self.detached_head = Some(sha.to_string());
        self
    }

    pub fn last_walked(&self) -> Option<String> {
        self.walked.borrow().last().cloned().flatten()
    }

    fn head_sha(&self) -> Option<String> {
        match &self.checked_out {
            Some(branch) => self
                .branches
                .iter()
                .find(|b| &b.name == branch)
                .map(|b| b.sha.clone()),
            None => self.detached_head.clone(),
        }
    }

    fn resolve(&self, part: &'static str, rev: &str) -> ScanResult<String> {
        let unresolved = || ScanError::UnresolvedRevision {
            part,
            rev: rev.to_string(),
        };
        if rev == "HEAD" {
            return self.head_sha().ok_or_else(unresolved);
        }
        if let Some(branch) = self.branches.iter().find(|b| b.name == rev) {
            return Ok(branch.sha.clone());
        }
        self.commits
            .iter()
            .find(|c| c.sha == rev)
            .map(|c| c.sha.clone())
            .ok_or_else(unresolved)
    }

    fn reachable(&self, from: &str) -> HashSet<String> {
        let by_sha: HashMap<&str, &CommitRecord> =
            self.commits.iter().map(|c| (c.sha.as_str(), c)).collect();
        let mut seen = HashSet::new();
        let mut stack = vec![from.to_string()];
        while let Some(sha) = stack.pop() {
            if !seen.insert(sha.clone()) {
                continue;
            }
            if let Some(commit) = by_sha.get(sha.as_str()) {
                stack.extend(commit.parents.iter().cloned());
            }
        }
        seen
    }
}

impl HistorySource for FakeSource {
    fn list_commits(&self, range: Option<&RevRange>) -> ScanResult<Vec<CommitRecord>> {
        self.walked.borrow_mut().push(range.map(|r| r.to_string()));

        let range = match range {
            Some(range) => range,
            None => return Ok(self.commits.clone()),
        };

        let since = self.resolve("since", &range.since)?;
        let until = self.resolve("until", &range.until)?;
        let hidden = self.reachable(&since);
        let wanted = self.reachable(&until);

        Ok(self
            .commits
            .iter()
            .filter(|c| wanted.contains(&c.sha) && !hidden.contains(&c.sha))
            .cloned()
            .collect())
    }

    fn list_branches(&self) -> ScanResult<Vec<RefTarget>> {
        Ok(self.branches.clone())
    }

    fn list_tags(&self) -> ScanResult<Vec<RefTarget>> {
        Ok(self.tags.clone())
    }

    fn current_head(&self) -> ScanResult<Option<RefTarget>> {
        let name = match &self.checked_out {
            Some(branch) => format!("refs/heads/{}", branch),
            None => "HEAD".to_string(),
        };
        Ok(self.head_sha().map(|sha| RefTarget::new(&name, &sha)))
    }

    fn current_branch(&self) -> ScanResult<Option<String>> {
        Ok(self
            .checked_out
            .as_ref()
            .map(|branch| format!("refs/heads/{}", branch)))
    }
}

/// `GraphStore` that counts node creations per kind
pub struct CountingStore {
    pub inner: GraphStore,
    created: RefCell<HashMap<NodeKind, usize>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: GraphStore::in_memory(),
            created: RefCell::new(HashMap::new()),
        }
    }

    pub fn created(&self, kind: NodeKind) -> usize {
        self.created.borrow().get(&kind).copied().unwrap_or(0)
    }

    pub fn total_created(&self) -> usize {
        self.created.borrow().values().sum()
    }

    pub fn reset(&self) {
        self.created.borrow_mut().clear();
    }

    /// Repository node the way `scan_repository` creates it
    pub fn repository(&self) -> NodeId {
        self.inner
            .add_node(GraphNode::new(NodeKind::Repository, "/work/demo/.git").with_property("name", "demo"))
    }

    pub fn commit(&self, sha: &str) -> Option<NodeId> {
        self.inner.find_node(NodeKind::Commit, sha)
    }

    pub fn count(&self, kind: NodeKind) -> usize {
        self.inner.get_nodes_by_kind(kind).len()
    }

    pub fn edges(&self, kind: EdgeKind) -> usize {
        self.inner.count_edges(kind)
    }
}

impl GraphQuery for CountingStore {
    fn create_node(&self, node: GraphNode) -> NodeId {
        *self.created.borrow_mut().entry(node.kind).or_insert(0) += 1;
        self.inner.create_node(node)
    }

    fn find_node(&self, kind: NodeKind, key: &str) -> Option<NodeId> {
        self.inner.find_node(kind, key)
    }

    fn find_all(&self, kind: NodeKind) -> Vec<(String, NodeId)> {
        self.inner.find_all(kind)
    }

    fn node(&self, id: NodeId) -> Option<GraphNode> {
        self.inner.node(id)
    }

    fn set_property(&self, id: NodeId, key: &str, value: serde_json::Value) -> bool {
        self.inner.set_property(id, key, value)
    }

    fn relate(&self, from: NodeId, to: NodeId, kind: EdgeKind) -> bool {
        self.inner.relate(from, to, kind)
    }

    fn replace_relation(&self, from: NodeId, kind: EdgeKind, to: NodeId) {
        self.inner.replace_relation(from, kind, to)
    }

    fn targets(&self, from: NodeId, kind: EdgeKind) -> Vec<NodeId> {
        self.inner.targets(from, kind)
    }

    fn sources(&self, to: NodeId, kind: EdgeKind) -> Vec<NodeId> {
        self.inner.sources(to, kind)
    }
}
