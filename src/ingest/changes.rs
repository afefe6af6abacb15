//! Change classification and file lifecycle tracking

use chrono::{DateTime, Utc};
use tracing::debug;

use super::identity::{CacheMode, IdentityCache};
use crate::git::RawChange;
use crate::graph::{EdgeKind, GraphQuery, NodeId, NodeKind};

/// Kind of a file change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Add,
    Update,
    Delete,
    Rename,
    Copy,
    Other,
}

/// (kind, change code, node label, relation from the change node to its file)
static CHANGE_TABLE: [(ChangeKind, &str, &str, Option<EdgeKind>); 6] = [
    (ChangeKind::Add, "A", "Add", Some(EdgeKind::Adds)),
    (ChangeKind::Update, "M", "Update", Some(EdgeKind::Updates)),
    (ChangeKind::Delete, "D", "Delete", Some(EdgeKind::Deletes)),
    (ChangeKind::Rename, "R", "Rename", Some(EdgeKind::Renames)),
    (ChangeKind::Copy, "C", "Copy", None),
    (ChangeKind::Other, "", "Change", None),
];

impl ChangeKind {
    /// Map a change code (case-insensitive) to its kind; unknown codes are `Other`
    pub fn from_code(code: &str) -> Self {
        CHANGE_TABLE
            .iter()
            .find(|(_, c, _, _)| !c.is_empty() && c.eq_ignore_ascii_case(code.trim()))
            .map(|(kind, _, _, _)| *kind)
            .unwrap_or(ChangeKind::Other)
    }

    fn row(&self) -> &'static (ChangeKind, &'static str, &'static str, Option<EdgeKind>) {
        // every kind has exactly one row
        CHANGE_TABLE
            .iter()
            .find(|(kind, _, _, _)| kind == self)
            .unwrap_or(&CHANGE_TABLE[5])
    }

    /// Label stored on the change node
    pub fn label(&self) -> &'static str {
        self.row().2
    }

    /// Relation linking the change node to the file it affects
    pub fn file_relation(&self) -> Option<EdgeKind> {
        self.row().3
    }
}

/// Which direction a lifecycle timestamp may move
#[derive(Debug, Clone, Copy)]
enum Extend {
    Earlier,
    Later,
}

/// Owns the File cache and keeps file lifecycle timestamps current.
///
/// Updates are independent of commit order: `createdAt` only moves earlier,
/// `lastModificationAt` and `deletedAt` only move later.
pub struct FileLifecycleTracker<'s> {
    store: &'s dyn GraphQuery,
    files: IdentityCache<'s>,
}

impl<'s> FileLifecycleTracker<'s> {
    pub fn new(store: &'s dyn GraphQuery, mode: CacheMode) -> Self {
        Self {
            store,
            files: IdentityCache::new(store, NodeKind::File, mode),
        }
    }

    pub fn files(&self) -> &IdentityCache<'s> {
        &self.files
    }

    /// Apply one change of a commit made at `at`, linking `change_node` to the affected file.
    pub fn record(&mut self, change_node: NodeId, change: &RawChange, at: DateTime<Utc>) {
        let kind = ChangeKind::from_code(&change.kind);

        match kind {
            ChangeKind::Add => {
                let file = self.files.find_or_create(&change.new_path).id;
                self.stamp(file, "createdAt", at, Extend::Earlier);
                self.link(change_node, kind, file);
            }
            ChangeKind::Update => {
                let file = self.files.find_or_create(&change.new_path).id;
                self.stamp(file, "lastModificationAt", at, Extend::Later);
                self.link(change_node, kind, file);
            }
            ChangeKind::Delete => {
                let file = self.files.find_or_create(&change.old_path).id;
                self.stamp(file, "deletedAt", at, Extend::Later);
                self.link(change_node, kind, file);
            }
            ChangeKind::Rename => {
                let old = self.files.find_or_create(&change.old_path).id;
                let new = self.files.find_or_create(&change.new_path).id;
                self.store.relate(old, new, EdgeKind::HasNewName);
                self.stamp(new, "createdAt", at, Extend::Earlier);
                self.link(change_node, kind, new);
            }
            ChangeKind::Copy => {
                let source = self.files.find_or_create(&change.old_path).id;
                let copy = self.files.find_or_create(&change.new_path).id;
                self.store.relate(copy, source, EdgeKind::CopyOf);
                self.stamp(copy, "createdAt", at, Extend::Earlier);
            }
            ChangeKind::Other => {
                debug!(
                    "Change '{}' on '{}' has no file lifecycle effect",
                    change.kind, change.new_path
                );
            }
        }
    }

    fn link(&self, change_node: NodeId, kind: ChangeKind, file: NodeId) {
        if let Some(relation) = kind.file_relation() {
            self.store.relate(change_node, file, relation);
        }
    }

    /// Set `<field>` / `<field>Epoch` unless the stored value is already further out
    fn stamp(&self, file: NodeId, field: &str, at: DateTime<Utc>, extend: Extend) {
        let epoch_field = format!("{}Epoch", field);
        let epoch = at.timestamp_millis();

        let update = match self.store.get_i64(file, &epoch_field) {
            None => true,
            Some(current) => match extend {
                Extend::Earlier => epoch < current,
                Extend::Later => epoch > current,
            },
        };

        if update {
            self.store
                .set_property(file, field, serde_json::Value::from(at.to_rfc3339()));
            self.store
                .set_property(file, &epoch_field, serde_json::Value::from(epoch));
        }
    }
}
