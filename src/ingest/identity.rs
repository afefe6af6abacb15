//! Duplicate-safe entity lookup
//!
//! One [`IdentityCache`] per entity kind and scan is the only component that
//! creates nodes of that kind. Constructing two caches for the same kind in
//! one scan breaks the at-most-once guarantee.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::graph::{GraphNode, GraphQuery, NodeId, NodeKind};

/// Whether entities of a kind may already exist in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Nothing has been persisted yet: skip the existence query
    Fresh,
    /// Pre-load every persisted entity of the kind before the first lookup
    Resuming,
}

impl CacheMode {
    pub fn from_fresh(is_fresh_scan: bool) -> Self {
        if is_fresh_scan {
            CacheMode::Fresh
        } else {
            CacheMode::Resuming
        }
    }
}

/// Result of [`IdentityCache::find_or_create`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub id: NodeId,
    /// True if the node was created by this call
    pub created: bool,
}

/// Memoizes natural key -> node for one entity kind.
pub struct IdentityCache<'s> {
    kind: NodeKind,
    store: &'s dyn GraphQuery,
    entries: HashMap<String, NodeId>,
    touched: HashSet<NodeId>,
    created: usize,
}

impl<'s> IdentityCache<'s> {
    pub fn new(store: &'s dyn GraphQuery, kind: NodeKind, mode: CacheMode) -> Self {
        let entries: HashMap<String, NodeId> = match mode {
            CacheMode::Fresh => HashMap::new(),
            CacheMode::Resuming => store.find_all(kind).into_iter().collect(),
        };
        debug!(
            "{} cache ready ({:?}, {} pre-loaded)",
            kind.label(),
            mode,
            entries.len()
        );
        Self {
            kind,
            store,
            entries,
            touched: HashSet::new(),
            created: 0,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Node for `key`, if it exists in this scan or was pre-loaded
    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.entries.get(key).copied()
    }

    /// Same as [`find`](Self::find); reads better after creation
    pub fn get(&self, key: &str) -> Option<NodeId> {
        self.find(key)
    }

    /// Node for `key`, creating it on first sight.
    pub fn find_or_create(&mut self, key: &str) -> Resolved {
        if let Some(&id) = self.entries.get(key) {
            self.touched.insert(id);
            return Resolved { id, created: false };
        }

        let node = GraphNode::new(self.kind, key).with_property(key_property(self.kind), key);
        let id = self.store.create_node(node);
        self.entries.insert(key.to_string(), id);
        self.touched.insert(id);
        self.created += 1;
        Resolved { id, created: true }
    }

    /// Nodes handed out by `find_or_create` during this scan, sorted
    pub fn touched(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.touched.iter().copied().collect();
        ids.sort();
        ids
    }

    /// Number of nodes created through this cache
    pub fn created(&self) -> usize {
        self.created
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Property holding the natural key on a node of `kind`
pub fn key_property(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Repository => "fileName",
        NodeKind::Commit => "sha",
        NodeKind::Author | NodeKind::Committer => "identString",
        NodeKind::Branch => "name",
        NodeKind::Tag => "label",
        NodeKind::File => "relativePath",
        NodeKind::Change => "id",
    }
}
