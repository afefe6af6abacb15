use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Node types in the history graph
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Repository,
    Commit,
    Author,
    Committer,
    Branch,
    Tag,
    File,
    Change,
}

impl NodeKind {
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Repository,
        NodeKind::Commit,
        NodeKind::Author,
        NodeKind::Committer,
        NodeKind::Branch,
        NodeKind::Tag,
        NodeKind::File,
        NodeKind::Change,
    ];

    /// Label used in logs and stats output
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Repository => "Repository",
            NodeKind::Commit => "Commit",
            NodeKind::Author => "Author",
            NodeKind::Committer => "Committer",
            NodeKind::Branch => "Branch",
            NodeKind::Tag => "Tag",
            NodeKind::File => "File",
            NodeKind::Change => "Change",
        }
    }

    /// Whether nodes of this kind carry a natural key.
    ///
    /// Changes are identified only by their position under a commit.
    pub fn is_keyed(&self) -> bool {
        !matches!(self, NodeKind::Change)
    }
}

/// A node in the history graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub kind: NodeKind,
    /// Natural key (sha, identity string, ref name, relative path, ...)
    pub key: Option<String>,
    pub properties: HashMap<String, serde_json::Value>,
}

impl GraphNode {
    pub fn new(kind: NodeKind, key: &str) -> Self {
        Self {
            kind,
            key: Some(key.to_string()),
            properties: HashMap::new(),
        }
    }

    /// A node without natural key
    pub fn anonymous(kind: NodeKind) -> Self {
        Self {
            kind,
            key: None,
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn set_property(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.properties.insert(key.to_string(), value.into());
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.properties.get(key).and_then(|v| v.as_i64())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or("")
    }
}

/// Edge types in the history graph
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Commit -> parent Commit
    HasParent,
    /// Commit -> Change
    HasChange,
    /// Author -> Commit
    Authored,
    /// Committer -> Commit
    Committed,
    /// Branch -> Commit, Repository -> Commit
    HasHead,
    /// Tag -> Commit
    Tags,
    /// old-path File -> new-path File
    HasNewName,
    /// copied File -> source File
    CopyOf,
    /// Change -> File
    Adds,
    Updates,
    Deletes,
    Renames,
    /// Repository -> owned entity
    ContainsCommit,
    ContainsBranch,
    ContainsTag,
    ContainsAuthor,
    ContainsCommitter,
    ContainsFile,
}

impl EdgeKind {
    pub fn label(&self) -> &'static str {
        match self {
            EdgeKind::HasParent => "HAS_PARENT",
            EdgeKind::HasChange => "HAS_CHANGE",
            EdgeKind::Authored => "AUTHORED",
            EdgeKind::Committed => "COMMITTED",
            EdgeKind::HasHead => "HAS_HEAD",
            EdgeKind::Tags => "TAGS",
            EdgeKind::HasNewName => "HAS_NEW_NAME",
            EdgeKind::CopyOf => "COPY_OF",
            EdgeKind::Adds => "ADD",
            EdgeKind::Updates => "UPDATE",
            EdgeKind::Deletes => "DELETE",
            EdgeKind::Renames => "RENAMES",
            EdgeKind::ContainsCommit => "CONTAINS_COMMIT",
            EdgeKind::ContainsBranch => "CONTAINS_BRANCH",
            EdgeKind::ContainsTag => "CONTAINS_TAG",
            EdgeKind::ContainsAuthor => "CONTAINS_AUTHOR",
            EdgeKind::ContainsCommitter => "CONTAINS_COMMITTER",
            EdgeKind::ContainsFile => "CONTAINS_FILE",
        }
    }
}

/// An edge in the history graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub kind: EdgeKind,
}

impl GraphEdge {
    pub fn new(kind: EdgeKind) -> Self {
        Self { kind }
    }
}
