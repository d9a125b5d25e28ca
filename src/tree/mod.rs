//! Virtual folder tree over a flat set of path records.
//!
//! Nodes live in an arena owned by [`Tree`] and refer to each other by
//! [`NodeId`]. A tree is never edited after it is built; a changed record set
//! produces a new tree that replaces the old one wholesale.

mod builder;
mod navigation;
pub mod paths;

use std::collections::{BTreeMap, HashMap};

use crate::records::{LeafKind, PathRecord};

pub use builder::TreeBuilder;
pub use navigation::{child_entries, ChildEntries, NavigationPath};

/// Handle of a folder node inside one [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// A folder in the virtual tree
#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode {
    pub name: String,
    /// Common root plus the relative segments, joined by `/` (no leading slash)
    pub full_path: String,
    pub parent: Option<NodeId>,
    /// Child folders by name; iteration order is ordinal by name
    pub children: BTreeMap<String, NodeId>,
    pub photos: Vec<PathRecord>,
    pub text_files: Vec<PathRecord>,
}

impl FolderNode {
    fn new(name: String, full_path: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            full_path,
            parent,
            children: BTreeMap::new(),
            photos: Vec::new(),
            text_files: Vec::new(),
        }
    }

    /// Direct leaves, photos first
    pub fn leaves(&self) -> impl Iterator<Item = &PathRecord> {
        self.photos.iter().chain(self.text_files.iter())
    }

    /// No child folders and no leaves
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.photos.is_empty() && self.text_files.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    common_root: Vec<String>,
    nodes: Vec<FolderNode>,
    folders_by_path: HashMap<String, NodeId>,
    leaf_owners: HashMap<(LeafKind, i64), NodeId>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::with_root(Vec::new())
    }
}

impl Tree {
    pub(crate) fn with_root(common_root: Vec<String>) -> Self {
        let full_path = paths::join_segments(&common_root);
        let name = common_root.last().cloned().unwrap_or_default();
        let mut folders_by_path = HashMap::new();
        folders_by_path.insert(full_path.clone(), NodeId::ROOT);
        Self {
            common_root,
            nodes: vec![FolderNode::new(name, full_path, None)],
            folders_by_path,
            leaf_owners: HashMap::new(),
        }
    }

    /// Child named `name` under `parent`, created if absent
    pub(crate) fn ensure_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        if let Some(&id) = self.nodes[parent.0].children.get(name) {
            return id;
        }
        let parent_path = &self.nodes[parent.0].full_path;
        let full_path = if parent_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent_path, name)
        };
        let id = NodeId(self.nodes.len());
        self.folders_by_path.insert(full_path.clone(), id);
        self.nodes
            .push(FolderNode::new(name.to_string(), full_path, Some(parent)));
        self.nodes[parent.0].children.insert(name.to_string(), id);
        id
    }

    pub(crate) fn push_leaf(&mut self, node: NodeId, record: PathRecord) {
        self.leaf_owners.insert((record.kind, record.id), node);
        let folder = &mut self.nodes[node.0];
        match record.kind {
            LeafKind::Photo => folder.photos.push(record),
            LeafKind::TextFile => folder.text_files.push(record),
        }
    }

    pub fn common_root(&self) -> &[String] {
        &self.common_root
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        id == NodeId::ROOT
    }

    /// Folder node for a handle issued by this tree.
    ///
    /// Panics on a handle from another tree; use [`Tree::get`] when the
    /// handle may be stale.
    pub fn node(&self, id: NodeId) -> &FolderNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&FolderNode> {
        self.nodes.get(id.0)
    }

    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.get(parent)?.children.get(name).copied()
    }

    /// Number of folder nodes, root included
    pub fn folder_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_owners.len()
    }

    /// Look up a folder by full path (leading slash optional)
    pub fn find_folder(&self, full_path: &str) -> Option<NodeId> {
        let normalized = paths::join_segments(&paths::split_segments(full_path));
        self.folders_by_path.get(&normalized).copied()
    }

    /// Folder a leaf record was placed in
    pub fn leaf_folder(&self, kind: LeafKind, id: i64) -> Option<NodeId> {
        self.leaf_owners.get(&(kind, id)).copied()
    }

    /// Look up a leaf record by its absolute path
    pub fn find_leaf(&self, path: &str) -> Option<&PathRecord> {
        let parent = paths::join_segments(&paths::parent_segments(path));
        let folder = self.find_folder(&parent)?;
        let wanted = paths::split_segments(path);
        self.node(folder)
            .leaves()
            .find(|record| paths::split_segments(&record.path) == wanted)
    }

    /// Ancestor handles (parent, grandparent, ...), not including `id` itself
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.get(id).and_then(|n| n.parent);
        std::iter::successors(first, move |&pid| self.node(pid).parent)
    }

    /// Every leaf reachable under `id`, depth first, children in name order
    pub fn descendant_leaves(&self, id: NodeId) -> Vec<&PathRecord> {
        let mut leaves = Vec::new();
        self.collect_leaves(id, &mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, id: NodeId, leaves: &mut Vec<&'a PathRecord>) {
        let node = self.node(id);
        leaves.extend(node.leaves());
        for &child in node.children.values() {
            self.collect_leaves(child, leaves);
        }
    }

    /// Full path of a folder as an absolute file-system path
    pub fn absolute_path(&self, id: NodeId) -> String {
        format!("/{}", self.node(id).full_path)
    }

    /// Depth below the root (root is 0)
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }
}
