//! Branch, tag and HEAD resolution against ingested commits

use tracing::{info, warn};

use super::scanner::{ScanCaches, ScanStats};
use crate::git::RefTarget;
use crate::graph::{EdgeKind, GraphQuery, NodeId};

pub struct RefResolver<'c, 's> {
    store: &'s dyn GraphQuery,
    repository: NodeId,
    caches: &'c mut ScanCaches<'s>,
    stats: &'c mut ScanStats,
}

impl<'c, 's> RefResolver<'c, 's> {
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

    /// Point every branch at its head commit.
    ///
    /// A branch whose head is unknown keeps the pointer an earlier scan set.
    pub fn resolve_branches(&mut self, branches: &[RefTarget]) {
        for branch in branches {
            let node = self.caches.branches.find_or_create(&branch.name).id;

            match self.caches.commits.get(&branch.sha) {
                Some(commit) => self.store.replace_relation(node, EdgeKind::HasHead, commit),
                None => {
                    warn!(
                        "Cannot retrieve commit '{}' for branch '{}'",
                        branch.sha, branch.name
                    );
                    self.stats.gaps += 1;
                }
            }

            self.store
                .relate(self.repository, node, EdgeKind::ContainsBranch);
        }
    }

    /// Point every tag at the commit it peels to
    pub fn resolve_tags(&mut self, tags: &[RefTarget]) {
        for tag in tags {
            let node = self.caches.tags.find_or_create(&tag.name).id;

            match self.caches.commits.get(&tag.sha) {
                Some(commit) => self.store.replace_relation(node, EdgeKind::Tags, commit),
                None => {
                    warn!(
                        "Cannot retrieve commit '{}' for tag '{}'",
                        tag.sha, tag.name
                    );
                    self.stats.gaps += 1;
                }
            }

            self.store.relate(self.repository, node, EdgeKind::ContainsTag);
        }
    }

    /// Point the repository at its HEAD commit
    pub fn resolve_head(&mut self, head: Option<&RefTarget>) {
        let head = match head {
            Some(head) => head,
            None => {
                info!("Repository has no HEAD commit");
                return;
            }
        };

        match self.caches.commits.get(&head.sha) {
            Some(commit) => {
                self.store
                    .replace_relation(self.repository, EdgeKind::HasHead, commit)
            }
            None => {
                warn!("Cannot retrieve HEAD commit '{}'", head.sha);
                self.stats.gaps += 1;
            }
        }
    }
}
