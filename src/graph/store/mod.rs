//! Pure Rust graph storage using petgraph + redb
//!
//! The whole graph lives in memory while a scan runs; `save()` writes it back
//! in a single redb write transaction, so a scan that fails before `save()`
//! leaves the database untouched.

use anyhow::{Context, Result};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use redb::ReadableTable;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

pub use super::store_models::{EdgeKind, GraphEdge, GraphNode, NodeKind};

/// Graph store for ingested history
pub struct GraphStore {
    /// In-memory graph
    graph: RwLock<DiGraph<GraphNode, GraphEdge>>,
    /// Node lookup by (kind, natural key)
    node_index: RwLock<HashMap<(NodeKind, String), NodeIndex>>,
    /// Persistence layer (optional)
    db: Option<redb::Database>,
    db_path: Option<std::path::PathBuf>,
}

// redb table definitions
const NODES_TABLE: redb::TableDefinition<u64, &[u8]> = redb::TableDefinition::new("nodes");
const EDGES_TABLE: redb::TableDefinition<&str, &[u8]> = redb::TableDefinition::new("edges");
const EDGES_KEY: &str = "__edges__";

type StoredEdge = (u64, u64, GraphEdge);

impl GraphStore {
    /// Create or open a graph store at the given directory
    pub fn new(db_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(db_path)
            .with_context(|| format!("Failed to create {}", db_path.display()))?;

        // redb uses a single file, not a directory
        let db_file = db_path.join("graph.redb");
        let db = redb::Database::create(&db_file).context("Failed to open redb database")?;

        let store = Self {
            graph: RwLock::new(DiGraph::new()),
            node_index: RwLock::new(HashMap::new()),
            db: Some(db),
            db_path: Some(db_path.to_path_buf()),
        };

        store.load()?;

        Ok(store)
    }

    /// Create an in-memory only store (no persistence)
    pub fn in_memory() -> Self {
        Self {
            graph: RwLock::new(DiGraph::new()),
            node_index: RwLock::new(HashMap::new()),
            db: None,
            db_path: None,
        }
    }

    /// Directory backing this store, if persistent
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    // ==================== Lock Helpers ====================
    //
    // RwLock poisoning means a thread panicked while holding the lock,
    // leaving the protected data in a potentially inconsistent state.
    // This is unrecoverable, so the `.expect()` calls live here.

    fn read_graph(&self) -> std::sync::RwLockReadGuard<'_, DiGraph<GraphNode, GraphEdge>> {
        self.graph
            .read()
            .expect("graph lock poisoned: a thread panicked while holding this lock")
    }

    fn write_graph(&self) -> std::sync::RwLockWriteGuard<'_, DiGraph<GraphNode, GraphEdge>> {
        self.graph
            .write()
            .expect("graph lock poisoned: a thread panicked while holding this lock")
    }

    fn read_index(&self) -> std::sync::RwLockReadGuard<'_, HashMap<(NodeKind, String), NodeIndex>> {
        self.node_index
            .read()
            .expect("index lock poisoned: a thread panicked while holding this lock")
    }

    fn write_index(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<(NodeKind, String), NodeIndex>> {
        self.node_index
            .write()
            .expect("index lock poisoned: a thread panicked while holding this lock")
    }

    /// Clear all data
    pub fn clear(&self) -> Result<()> {
        let mut graph = self.write_graph();
        let mut index = self.write_index();

        graph.clear();
        index.clear();

        if let Some(ref db) = self.db {
            let write_txn = db.begin_write()?;
            write_txn.delete_table(NODES_TABLE)?;
            write_txn.delete_table(EDGES_TABLE)?;
            write_txn.commit()?;
        }

        Ok(())
    }

    // ==================== Node Operations ====================

    /// Add a node to the graph.
    ///
    /// A keyed node whose `(kind, key)` is already present is not added twice;
    /// the existing index is returned unchanged.
    pub fn add_node(&self, node: GraphNode) -> NodeIndex {
        // Lock graph before index, same order as every other writer
        let mut graph = self.write_graph();
        let mut index = self.write_index();

        let lookup = node
            .key
            .as_ref()
            .filter(|_| node.kind.is_keyed())
            .map(|k| (node.kind, k.clone()));

        if let Some(ref lookup) = lookup {
            if let Some(&idx) = index.get(lookup) {
                return idx;
            }
        }

        let idx = graph.add_node(node);
        if let Some(lookup) = lookup {
            index.insert(lookup, idx);
        }
        idx
    }

    /// Get node index by kind and natural key
    pub fn get_node_index(&self, kind: NodeKind, key: &str) -> Option<NodeIndex> {
        self.read_index().get(&(kind, key.to_string())).copied()
    }

    /// Get a node by index
    pub fn get_node(&self, idx: NodeIndex) -> Option<GraphNode> {
        self.read_graph().node_weight(idx).cloned()
    }

    /// Update a node's property
    pub fn update_node_property(
        &self,
        idx: NodeIndex,
        key: &str,
        value: impl Into<serde_json::Value>,
    ) -> bool {
        let mut graph = self.write_graph();
        match graph.node_weight_mut(idx) {
            Some(node) => {
                node.set_property(key, value);
                true
            }
            None => false,
        }
    }

    /// Get all keyed nodes of a specific kind as `(key, index)` pairs
    pub fn get_keys_by_kind(&self, kind: NodeKind) -> Vec<(String, NodeIndex)> {
        let index = self.read_index();
        let mut keys: Vec<(String, NodeIndex)> = index
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|((_, key), &idx)| (key.clone(), idx))
            .collect();
        keys.sort_by_key(|(_, idx)| *idx);
        keys
    }

    /// Get all nodes of a specific kind
    pub fn get_nodes_by_kind(&self, kind: NodeKind) -> Vec<GraphNode> {
        let graph = self.read_graph();

        graph
            .node_weights()
            .filter(|n| n.kind == kind)
            .cloned()
            .collect()
    }

    // ==================== Edge Operations ====================

    /// Add an edge unless one of the same kind already connects the two nodes
    pub fn add_edge_unique(&self, from: NodeIndex, to: NodeIndex, kind: EdgeKind) -> bool {
        let mut graph = self.write_graph();
        if graph.node_weight(from).is_none() || graph.node_weight(to).is_none() {
            return false;
        }
        let exists = graph
            .edges_connecting(from, to)
            .any(|e| e.weight().kind == kind);
        if exists {
            return false;
        }
        graph.add_edge(from, to, GraphEdge::new(kind));
        true
    }

    /// Replace all outgoing edges of a kind with a single edge to `to`
    pub fn set_single_edge(&self, from: NodeIndex, kind: EdgeKind, to: NodeIndex) {
        let mut graph = self.write_graph();
        if graph.node_weight(from).is_none() || graph.node_weight(to).is_none() {
            return;
        }

        let mut stale: Vec<EdgeIndex> = graph
            .edges_directed(from, Direction::Outgoing)
            .filter(|e| e.weight().kind == kind)
            .map(|e| e.id())
            .collect();

        // remove_edge swaps the last edge into the removed slot: go high to low
        stale.sort_unstable_by(|a, b| b.cmp(a));
        for edge in stale {
            graph.remove_edge(edge);
        }

        graph.add_edge(from, to, GraphEdge::new(kind));
    }

    /// Neighbors along edges of a kind in the given direction
    pub fn get_neighbors(
        &self,
        idx: NodeIndex,
        kind: EdgeKind,
        direction: Direction,
    ) -> Vec<NodeIndex> {
        let graph = self.read_graph();
        graph
            .edges_directed(idx, direction)
            .filter(|e| e.weight().kind == kind)
            .map(|e| match direction {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            })
            .collect()
    }

    /// Count edges of a specific kind
    pub fn count_edges(&self, kind: EdgeKind) -> usize {
        self.read_graph()
            .edge_references()
            .filter(|e| e.weight().kind == kind)
            .count()
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.read_graph().node_count()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.read_graph().edge_count()
    }

    // ==================== Persistence ====================

    /// Persist graph to redb
    pub fn save(&self) -> Result<()> {
        let db = match &self.db {
            Some(db) => db,
            None => return Ok(()),
        };

        let graph = self.read_graph();

        let write_txn = db.begin_write()?;
        // Full rewrite: drop whatever the previous save left behind
        write_txn.delete_table(NODES_TABLE)?;
        write_txn.delete_table(EDGES_TABLE)?;
        {
            let mut table = write_txn.open_table(NODES_TABLE)?;
            for idx in graph.node_indices() {
                let value = serde_json::to_vec(&graph[idx])?;
                table.insert(idx.index() as u64, value.as_slice())?;
            }

            let edges: Vec<StoredEdge> = graph
                .edge_references()
                .map(|e| {
                    (
                        e.source().index() as u64,
                        e.target().index() as u64,
                        e.weight().clone(),
                    )
                })
                .collect();
            let edges_data = serde_json::to_vec(&edges)?;

            let mut edges_table = write_txn.open_table(EDGES_TABLE)?;
            edges_table.insert(EDGES_KEY, edges_data.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    /// Load graph from redb
    fn load(&self) -> Result<()> {
        let db = match &self.db {
            Some(db) => db,
            None => return Ok(()),
        };

        let read_txn = db.begin_read()?;

        // Missing tables mean a fresh database
        let nodes_table = match read_txn.open_table(NODES_TABLE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut graph = self.write_graph();
        let mut index = self.write_index();
        let mut remap: HashMap<u64, NodeIndex> = HashMap::new();

        for item in nodes_table.iter()? {
            let (key, value) = item?;
            let node: GraphNode = serde_json::from_slice(value.value())
                .context("Corrupt node record in graph database")?;
            let lookup = node
                .key
                .clone()
                .filter(|_| node.kind.is_keyed())
                .map(|k| (node.kind, k));
            let idx = graph.add_node(node);
            if let Some(lookup) = lookup {
                index.insert(lookup, idx);
            }
            remap.insert(key.value(), idx);
        }

        let edges_table = match read_txn.open_table(EDGES_TABLE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if let Some(edges_entry) = edges_table.get(EDGES_KEY)? {
            let edges: Vec<StoredEdge> = serde_json::from_slice(edges_entry.value())
                .context("Corrupt edge records in graph database")?;
            for (src, dst, edge) in edges {
                if let (Some(&src), Some(&dst)) = (remap.get(&src), remap.get(&dst)) {
                    graph.add_edge(src, dst, edge);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
