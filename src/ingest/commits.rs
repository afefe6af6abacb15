//! Two-phase commit ingestion
//!
//! Phase 1 creates every commit node (with author, committer and changes);
//! phase 2 wires HAS_PARENT edges. Commits arrive newest first and are not
//! topologically sorted, so edges can only be wired once all nodes exist.

use std::collections::HashSet;
use tracing::{debug, warn};

use super::changes::ChangeKind;
use super::scanner::{ScanCaches, ScanStats};
use crate::git::CommitRecord;
use crate::graph::{EdgeKind, GraphNode, GraphQuery, NodeId, NodeKind};

pub struct CommitGraphIngester<'c, 's> {
    store: &'s dyn GraphQuery,
    repository: NodeId,
    caches: &'c mut ScanCaches<'s>,
    stats: &'c mut ScanStats,
}

impl<'c, 's> CommitGraphIngester<'c, 's> {
    pub fn new(
        store: &'s dyn GraphQuery,
        repository: NodeId,
        caches: &'c mut ScanCaches<'s>,
        stats: &'c mut ScanStats,
    ) -> Self {
        Self {
            store,
            repository,
            caches,
            stats,
        }
    }

    pub fn ingest(&mut self, commits: &[CommitRecord]) {
        for commit in commits {
            self.materialize(commit);
        }
        for commit in commits {
            self.wire_parents(commit);
        }
    }

    /// Phase 1: commit node, authorship and changes.
    ///
    /// A commit already in the store is only re-attached to the repository;
    /// its changes were recorded by the scan that created it. A merge lists
    /// its changes against every parent, first parent first; only the first
    /// change of each path is kept.
    fn materialize(&mut self, commit: &CommitRecord) {
        let resolved = self.caches.commits.find_or_create(&commit.sha);
        let node = resolved.id;
        self.store
            .relate(self.repository, node, EdgeKind::ContainsCommit);

        if !resolved.created {
            debug!("Commit {} already ingested", commit.sha);
            return;
        }

        let props: [(&str, serde_json::Value); 7] = [
            ("author", commit.author.clone().unwrap_or_default().into()),
            (
                "committer",
                commit.committer.clone().unwrap_or_default().into(),
            ),
            ("date", commit.time.to_rfc3339().into()),
            ("epoch", commit.time.timestamp_millis().into()),
            ("message", commit.message.clone().into()),
            ("shortMessage", commit.short_message.clone().into()),
            ("encoding", commit.encoding.clone().into()),
        ];
        for (key, value) in props {
            self.store.set_property(node, key, value);
        }

        if let Some(author) = &commit.author {
            let author_node = self.caches.authors.find_or_create(author).id;
            self.store.relate(author_node, node, EdgeKind::Authored);
        }
        if let Some(committer) = &commit.committer {
            let committer_node = self.caches.committers.find_or_create(committer).id;
            self.store
                .relate(committer_node, node, EdgeKind::Committed);
        }

        let mut paths = HashSet::new();
        for change in &commit.changes {
            let kind = ChangeKind::from_code(&change.kind);
            let path = match kind {
                ChangeKind::Delete => change.old_path.as_str(),
                _ => change.new_path.as_str(),
            };
            if !paths.insert(path) {
                debug!(
                    "Commit {} changes '{}' against another parent too, skipping",
                    commit.sha, path
                );
                continue;
            }
            let change_node = self.store.create_node(
                GraphNode::anonymous(NodeKind::Change)
                    .with_property("kind", kind.label())
                    .with_property("modificationKind", change.kind.as_str())
                    .with_property("oldPath", change.old_path.as_str())
                    .with_property("newPath", change.new_path.as_str()),
            );
            self.store.relate(node, change_node, EdgeKind::HasChange);
            self.caches.files.record(change_node, change, commit.time);
            self.stats.changes_created += 1;
        }
    }

    /// Phase 2: parent edges. A parent outside the range that was never
    /// ingested is a gap at the range boundary, not an error.
    fn wire_parents(&mut self, commit: &CommitRecord) {
        let node = match self.caches.commits.get(&commit.sha) {
            Some(node) => node,
            None => return,
        };

        for parent_sha in &commit.parents {
            match self.caches.commits.get(parent_sha) {
                Some(parent) => {
                    if self.store.relate(node, parent, EdgeKind::HasParent) {
                        self.stats.parent_edges += 1;
                    }
                }
                None => {
                    warn!(
                        "Cannot add parent commit with SHA '{}' of '{}' (excluded by range?)",
                        parent_sha, commit.sha
                    );
                    self.stats.gaps += 1;
                }
            }
        }
    }
}
