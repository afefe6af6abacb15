//! Persistence primitives the ingestion engine is written against

use super::{EdgeKind, GraphNode, NodeId, NodeKind};

/// Common interface for graph stores.
///
/// Transaction boundaries are not part of this trait: the owner of the store
/// decides when (and whether) the result of a scan is persisted.
pub trait GraphQuery {
    /// Create a node and return its handle.
    fn create_node(&self, node: GraphNode) -> NodeId;

    /// Look up a node by natural key.
    fn find_node(&self, kind: NodeKind, key: &str) -> Option<NodeId>;

    /// All keyed nodes of a kind as `(key, id)` pairs.
    fn find_all(&self, kind: NodeKind) -> Vec<(String, NodeId)>;

    /// Snapshot of a node
    fn node(&self, id: NodeId) -> Option<GraphNode>;

    /// Set a property on a node. Returns false if the node does not exist.
    fn set_property(&self, id: NodeId, key: &str, value: serde_json::Value) -> bool;

    /// Add an edge unless an edge of the same kind already connects `from` to `to`.
    /// Returns true if an edge was added.
    fn relate(&self, from: NodeId, to: NodeId, kind: EdgeKind) -> bool;

    /// Point a single-valued relation of `from` at `to`, dropping any previous target.
    fn replace_relation(&self, from: NodeId, kind: EdgeKind, to: NodeId);

    /// Targets of outgoing edges of a kind
    fn targets(&self, from: NodeId, kind: EdgeKind) -> Vec<NodeId>;

    /// Sources of incoming edges of a kind
    fn sources(&self, to: NodeId, kind: EdgeKind) -> Vec<NodeId>;

    /// Read a string property
    fn get_str(&self, id: NodeId, key: &str) -> Option<String> {
        self.node(id)
            .and_then(|n| n.get_str(key).map(str::to_string))
    }

    /// Read an integer property
    fn get_i64(&self, id: NodeId, key: &str) -> Option<i64> {
        self.node(id).and_then(|n| n.get_i64(key))
    }
}
