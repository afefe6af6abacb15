//! Graph store for ingested git history
//!
//! Pure Rust implementation using petgraph + redb.

pub mod store;
pub mod store_models;
pub mod store_query;
pub mod traits;

pub use store::GraphStore;
pub use store_models::{EdgeKind, GraphEdge, GraphNode, NodeKind};
pub use store_query::{branch_head_sha, branch_heads, stats};
pub use traits::GraphQuery;

/// Handle to a node in the store
pub type NodeId = petgraph::graph::NodeIndex;
