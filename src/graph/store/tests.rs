use super::*;
use crate::graph::{branch_head_sha, GraphQuery};
use tempfile::tempdir;

#[test]
fn test_basic_operations() {
    let store = GraphStore::in_memory();

    let commit = store.add_node(
        GraphNode::new(NodeKind::Commit, "1234")
            .with_property("sha", "1234")
            .with_property("epoch", 1_000),
    );
    store.add_node(GraphNode::new(NodeKind::Author, "Jane <jane@example.com>"));

    assert_eq!(store.node_count(), 2);
    assert_eq!(store.get_nodes_by_kind(NodeKind::Commit).len(), 1);
    assert_eq!(store.get_node_index(NodeKind::Commit, "1234"), Some(commit));

    let node = store.get_node(commit).unwrap();
    assert_eq!(node.get_str("sha"), Some("1234"));
    assert_eq!(node.get_i64("epoch"), Some(1_000));
}

#[test]
fn test_keyed_nodes_are_not_duplicated() {
    let store = GraphStore::in_memory();

    let first = store.add_node(GraphNode::new(NodeKind::File, "src/main.rs"));
    let second = store.add_node(GraphNode::new(NodeKind::File, "src/main.rs"));

    assert_eq!(first, second);
    assert_eq!(store.node_count(), 1);
}

#[test]
fn test_same_key_different_kind() {
    let store = GraphStore::in_memory();

    store.add_node(GraphNode::new(NodeKind::Author, "Jane <jane@example.com>"));
    store.add_node(GraphNode::new(NodeKind::Committer, "Jane <jane@example.com>"));

    assert_eq!(store.node_count(), 2);
}

#[test]
fn test_anonymous_nodes_always_created() {
    let store = GraphStore::in_memory();

    store.add_node(GraphNode::anonymous(NodeKind::Change));
    store.add_node(GraphNode::anonymous(NodeKind::Change));

    assert_eq!(store.get_nodes_by_kind(NodeKind::Change).len(), 2);
    assert!(store.get_keys_by_kind(NodeKind::Change).is_empty());
}

#[test]
fn test_unique_edges() {
    let store = GraphStore::in_memory();

    let child = store.add_node(GraphNode::new(NodeKind::Commit, "5678"));
    let parent = store.add_node(GraphNode::new(NodeKind::Commit, "1234"));

    assert!(store.add_edge_unique(child, parent, EdgeKind::HasParent));
    assert!(!store.add_edge_unique(child, parent, EdgeKind::HasParent));

    assert_eq!(store.count_edges(EdgeKind::HasParent), 1);
    assert_eq!(store.targets(child, EdgeKind::HasParent), vec![parent]);
    assert_eq!(store.sources(parent, EdgeKind::HasParent), vec![child]);
}

#[test]
fn test_single_edge_is_replaced() {
    let store = GraphStore::in_memory();

    let branch = store.add_node(GraphNode::new(NodeKind::Branch, "main"));
    let old = store.add_node(GraphNode::new(NodeKind::Commit, "aaaa").with_property("sha", "aaaa"));
    let new = store.add_node(GraphNode::new(NodeKind::Commit, "bbbb").with_property("sha", "bbbb"));
    let other = store.add_node(GraphNode::new(NodeKind::Repository, "/tmp/repo/.git"));
    store.add_edge_unique(other, old, EdgeKind::ContainsCommit);

    store.set_single_edge(branch, EdgeKind::HasHead, old);
    store.set_single_edge(branch, EdgeKind::HasHead, new);

    assert_eq!(store.targets(branch, EdgeKind::HasHead), vec![new]);
    assert_eq!(branch_head_sha(&store, "main").as_deref(), Some("bbbb"));
    // Unrelated edges survive the replacement
    assert_eq!(store.count_edges(EdgeKind::ContainsCommit), 1);
}

#[test]
fn test_persistence() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("graph_db");

    {
        let store = GraphStore::new(&path).expect("create graph store");
        let branch = store.add_node(GraphNode::new(NodeKind::Branch, "main"));
        let commit =
            store.add_node(GraphNode::new(NodeKind::Commit, "1234").with_property("sha", "1234"));
        store.add_node(GraphNode::anonymous(NodeKind::Change));
        store.set_single_edge(branch, EdgeKind::HasHead, commit);
        store.save().expect("save graph store");
        drop(store);
    }

    {
        let store = GraphStore::new(&path).expect("reload graph store");
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.get_nodes_by_kind(NodeKind::Change).len(), 1);
        assert_eq!(branch_head_sha(&store, "main").as_deref(), Some("1234"));
    }
}

#[test]
fn test_unsaved_changes_are_not_persisted() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("graph_db");

    {
        let store = GraphStore::new(&path).expect("create graph store");
        store.add_node(GraphNode::new(NodeKind::Commit, "1234"));
        store.save().expect("save graph store");
        store.add_node(GraphNode::new(NodeKind::Commit, "5678"));
        // dropped without save
    }

    let store = GraphStore::new(&path).expect("reload graph store");
    assert_eq!(store.get_nodes_by_kind(NodeKind::Commit).len(), 1);
    assert!(store.get_node_index(NodeKind::Commit, "5678").is_none());
}

#[test]
fn test_clear() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("graph_db");

    let store = GraphStore::new(&path).expect("create graph store");
    store.add_node(GraphNode::new(NodeKind::Tag, "v1.0"));
    store.save().expect("save graph store");
    store.clear().expect("clear graph store");

    assert_eq!(store.node_count(), 0);
    drop(store);

    let store = GraphStore::new(&path).expect("reload graph store");
    assert_eq!(store.node_count(), 0);
}
