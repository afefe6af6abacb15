use super::store::GraphStore;
use super::store_models::{EdgeKind, GraphNode, NodeKind};
use super::traits::GraphQuery;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use std::collections::BTreeMap;

impl GraphQuery for GraphStore {
    fn create_node(&self, node: GraphNode) -> NodeIndex {
        self.add_node(node)
    }

    fn find_node(&self, kind: NodeKind, key: &str) -> Option<NodeIndex> {
        self.get_node_index(kind, key)
    }

    fn find_all(&self, kind: NodeKind) -> Vec<(String, NodeIndex)> {
        self.get_keys_by_kind(kind)
    }

    fn node(&self, id: NodeIndex) -> Option<GraphNode> {
        self.get_node(id)
    }

    fn set_property(&self, id: NodeIndex, key: &str, value: serde_json::Value) -> bool {
        self.update_node_property(id, key, value)
    }

    fn relate(&self, from: NodeIndex, to: NodeIndex, kind: EdgeKind) -> bool {
        self.add_edge_unique(from, to, kind)
    }

    fn replace_relation(&self, from: NodeIndex, kind: EdgeKind, to: NodeIndex) {
        self.set_single_edge(from, kind, to)
    }

    fn targets(&self, from: NodeIndex, kind: EdgeKind) -> Vec<NodeIndex> {
        self.get_neighbors(from, kind, Direction::Outgoing)
    }

    fn sources(&self, to: NodeIndex, kind: EdgeKind) -> Vec<NodeIndex> {
        self.get_neighbors(to, kind, Direction::Incoming)
    }
}

/// SHA of the commit a persisted branch points at.
///
/// This is the last commit of that branch ingested by an earlier scan.
pub fn branch_head_sha(store: &dyn GraphQuery, branch: &str) -> Option<String> {
    let branch_node = store.find_node(NodeKind::Branch, branch)?;
    let head = store
        .targets(branch_node, EdgeKind::HasHead)
        .into_iter()
        .next()?;
    store.get_str(head, "sha")
}

/// Node counts per kind plus the total edge count
pub fn stats(store: &GraphStore) -> BTreeMap<String, usize> {
    let mut stats = BTreeMap::new();
    for kind in NodeKind::ALL {
        stats.insert(
            kind.label().to_string(),
            store.get_nodes_by_kind(kind).len(),
        );
    }
    stats.insert("edges".to_string(), store.edge_count());
    stats
}

/// `(branch name, head sha)` for every branch, head is `None` when unresolved
pub fn branch_heads(store: &GraphStore) -> Vec<(String, Option<String>)> {
    store
        .get_keys_by_kind(NodeKind::Branch)
        .into_iter()
        .map(|(name, idx)| {
            let head = store
                .targets(idx, EdgeKind::HasHead)
                .into_iter()
                .next()
                .and_then(|c| store.get_str(c, "sha"));
            (name, head)
        })
        .collect()
}
