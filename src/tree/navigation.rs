use std::fmt;

use crate::error::TreeError;
use crate::records::PathRecord;

use super::paths::split_segments;
use super::{NodeId, Tree};

/// Folder names from the root to the currently viewed folder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationPath {
    segments: Vec<String>,
}

impl NavigationPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Parse a root-relative path such as `2024/sub`
    pub fn parse(path: &str) -> Self {
        Self::from_segments(split_segments(path))
    }

    /// Path that leads from the root to `node`
    pub fn of(tree: &Tree, node: NodeId) -> Self {
        let mut segments: Vec<String> = std::iter::once(node)
            .chain(tree.ancestors(node))
            .filter(|&id| !tree.is_root(id))
            .map(|id| tree.node(id).name.clone())
            .collect();
        segments.reverse();
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn enter(&mut self, name: &str) {
        self.segments.push(name.to_string());
    }

    /// Go to the parent folder. Returns false at the root.
    pub fn up(&mut self) -> bool {
        self.segments.pop().is_some()
    }

    /// Keep only the first `depth` segments (breadcrumb click)
    pub fn truncate(&mut self, depth: usize) {
        self.segments.truncate(depth);
    }

    pub fn reset(&mut self) {
        self.segments.clear();
    }

    /// Walk the tree from the root following each segment
    pub fn resolve(&self, tree: &Tree) -> Result<NodeId, TreeError> {
        self.segments
            .iter()
            .enumerate()
            .try_fold(tree.root(), |node, (depth, name)| {
                tree.child(node, name).ok_or_else(|| TreeError::StaleNavigation {
                    segment: name.clone(),
                    depth,
                })
            })
    }

    /// Truncate to the deepest prefix that still resolves and return its node
    pub fn clamp(&mut self, tree: &Tree) -> NodeId {
        let mut node = tree.root();
        let mut valid = 0;
        for name in &self.segments {
            match tree.child(node, name) {
                Some(child) => {
                    node = child;
                    valid += 1;
                }
                None => break,
            }
        }
        self.segments.truncate(valid);
        node
    }

    /// One node per segment, root excluded
    pub fn breadcrumb(&self, tree: &Tree) -> Result<Vec<NodeId>, TreeError> {
        let mut trail = Vec::with_capacity(self.segments.len());
        let mut node = tree.root();
        for (depth, name) in self.segments.iter().enumerate() {
            node = tree.child(node, name).ok_or_else(|| TreeError::StaleNavigation {
                segment: name.clone(),
                depth,
            })?;
            trail.push(node);
        }
        Ok(trail)
    }
}

impl fmt::Display for NavigationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Contents of one folder as shown to the user
#[derive(Debug, Clone)]
pub struct ChildEntries<'a> {
    /// Child folders in ordinal name order
    pub folders: Vec<NodeId>,
    /// Leaves in insertion order
    pub photos: &'a [PathRecord],
    pub text_files: &'a [PathRecord],
}

impl ChildEntries<'_> {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.photos.is_empty() && self.text_files.is_empty()
    }
}

pub fn child_entries(tree: &Tree, node: NodeId) -> ChildEntries<'_> {
    let folder = tree.node(node);
    ChildEntries {
        folders: folder.children.values().copied().collect(),
        photos: &folder.photos,
        text_files: &folder.text_files,
    }
}
