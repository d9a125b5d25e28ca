//! Multi-item selection over the virtual tree.
//!
//! A selection is a plain set of [`SelectionKey`]s. Subtree operations take
//! the tree and a node from the caller; nothing here holds on to a tree.

use std::collections::HashSet;

use crate::records::{LeafKind, PathRecord};
use crate::tree::paths::{join_segments, split_segments};
use crate::tree::{NodeId, Tree};

/// Identifies a selectable folder or leaf
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SelectionKey {
    /// Folder by full path (no leading slash)
    Folder(String),
    Leaf(LeafKind, i64),
}

impl SelectionKey {
    pub fn folder(full_path: &str) -> Self {
        SelectionKey::Folder(join_segments(&split_segments(full_path)))
    }

    pub fn photo(id: i64) -> Self {
        SelectionKey::Leaf(LeafKind::Photo, id)
    }

    pub fn text_file(id: i64) -> Self {
        SelectionKey::Leaf(LeafKind::TextFile, id)
    }

    pub fn for_leaf(record: &PathRecord) -> Self {
        SelectionKey::Leaf(record.kind, record.id)
    }

    /// Key of a folder node; the root is never selectable
    pub fn for_node(tree: &Tree, node: NodeId) -> Option<Self> {
        if tree.is_root(node) {
            None
        } else {
            Some(SelectionKey::Folder(tree.node(node).full_path.clone()))
        }
    }

    /// Whether the item still exists in `tree`
    pub fn exists_in(&self, tree: &Tree) -> bool {
        match self {
            SelectionKey::Folder(path) => tree
                .find_folder(path)
                .is_some_and(|id| !tree.is_root(id)),
            SelectionKey::Leaf(kind, id) => tree.leaf_folder(*kind, *id).is_some(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    keys: HashSet<SelectionKey>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &SelectionKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectionKey> {
        self.keys.iter()
    }

    pub fn insert(&mut self, key: SelectionKey) {
        self.keys.insert(key);
    }

    /// Flip membership of one key
    pub fn toggle(&mut self, key: SelectionKey) {
        if !self.keys.remove(&key) {
            self.keys.insert(key);
        }
    }

    fn subtree_keys(tree: &Tree, node: NodeId) -> impl Iterator<Item = SelectionKey> + '_ {
        SelectionKey::for_node(tree, node)
            .into_iter()
            .chain(tree.descendant_leaves(node).into_iter().map(SelectionKey::for_leaf))
    }

    /// Select a folder and every leaf below it
    pub fn select_subtree(&mut self, tree: &Tree, node: NodeId) {
        self.keys.extend(Self::subtree_keys(tree, node));
    }

    /// Remove a folder and every leaf below it
    pub fn deselect_subtree(&mut self, tree: &Tree, node: NodeId) {
        for key in Self::subtree_keys(tree, node) {
            self.keys.remove(&key);
        }
    }

    /// Folder checkbox: deselect the subtree if it is fully selected,
    /// otherwise select it
    pub fn toggle_subtree(&mut self, tree: &Tree, node: NodeId) {
        if self.is_fully_selected(tree, node) {
            self.deselect_subtree(tree, node);
        } else {
            self.select_subtree(tree, node);
        }
    }

    /// The folder and all leaves below it are selected.
    ///
    /// Always false for an empty folder.
    pub fn is_fully_selected(&self, tree: &Tree, node: NodeId) -> bool {
        if tree.node(node).is_empty() {
            return false;
        }
        Self::subtree_keys(tree, node).all(|key| self.keys.contains(&key))
    }

    /// Keys shown directly in the folder view: child folders and direct
    /// leaves, not deeper descendants
    pub fn all_keys_in(tree: &Tree, node: NodeId) -> Vec<SelectionKey> {
        let folder = tree.node(node);
        folder
            .children
            .values()
            .map(|&child| SelectionKey::Folder(tree.node(child).full_path.clone()))
            .chain(folder.leaves().map(SelectionKey::for_leaf))
            .collect()
    }

    /// Every key shown in the folder view is selected (false for an empty view)
    pub fn all_in_view_selected(&self, tree: &Tree, node: NodeId) -> bool {
        let keys = Self::all_keys_in(tree, node);
        !keys.is_empty() && keys.iter().all(|key| self.keys.contains(key))
    }

    /// "Select all" button: deselect the view's keys if all are selected,
    /// otherwise select them
    pub fn toggle_all_in(&mut self, tree: &Tree, node: NodeId) {
        let keys = Self::all_keys_in(tree, node);
        if keys.is_empty() {
            return;
        }
        if keys.iter().all(|key| self.keys.contains(key)) {
            for key in &keys {
                self.keys.remove(key);
            }
        } else {
            self.keys.extend(keys);
        }
    }

    /// Drop keys whose items are gone from a rebuilt tree.
    /// Returns the number of keys removed.
    pub fn retain_existing(&mut self, tree: &Tree) -> usize {
        let before = self.keys.len();
        self.keys.retain(|key| key.exists_in(tree));
        before - self.keys.len()
    }

    /// Selected folder paths, sorted
    pub fn folder_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .keys
            .iter()
            .filter_map(|key| match key {
                SelectionKey::Folder(path) => Some(path.as_str()),
                SelectionKey::Leaf(..) => None,
            })
            .collect();
        paths.sort_unstable();
        paths
    }

    /// Selected leaf ids of one kind, sorted
    pub fn leaf_ids(&self, kind: LeafKind) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .keys
            .iter()
            .filter_map(|key| match key {
                SelectionKey::Leaf(k, id) if *k == kind => Some(*id),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl FromIterator<SelectionKey> for SelectionModel {
    fn from_iter<I: IntoIterator<Item = SelectionKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
