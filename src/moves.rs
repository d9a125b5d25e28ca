//! Move validation and the path lists handed to the file mutator.

use crate::records::LeafKind;
use crate::selection::{SelectionKey, SelectionModel};
use crate::tree::paths::{is_ancestor_or_self, join_segments, same_path, split_segments};
use crate::tree::Tree;

/// Decides whether selected items may be moved into a destination folder.
///
/// Holds only a borrow of the current tree, so a validator is always built
/// for the tree the destination is being chosen from.
pub struct MoveValidator<'a> {
    tree: &'a Tree,
}

/// Absolute paths to move, after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub destination: String,
    pub items: Vec<String>,
    /// Items already directly inside the destination (or no longer in the tree)
    pub skipped: Vec<SelectionKey>,
}

impl MovePlan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> MoveValidator<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self { tree }
    }

    /// False when the destination is the virtual root, one of the moving
    /// folders, or lies below one of them. Leaves never restrict a move.
    pub fn can_move_into<'k, I>(&self, moving: I, destination: &str) -> bool
    where
        I: IntoIterator<Item = &'k SelectionKey>,
    {
        if split_segments(destination) == self.tree.common_root() {
            return false;
        }

        let folders = moving_folders(moving);
        if folders.is_empty() {
            return true;
        }

        match self.tree.find_folder(destination) {
            Some(node) => std::iter::once(node)
                .chain(self.tree.ancestors(node))
                .all(|id| {
                    let path = &self.tree.node(id).full_path;
                    !folders.iter().any(|folder| same_path(folder, path))
                }),
            // A folder that does not exist yet: compare by path prefix
            None => !folders
                .iter()
                .any(|folder| is_ancestor_or_self(folder, destination)),
        }
    }

    /// Validate and expand a selection into the item paths to move.
    ///
    /// Returns `None` when the destination is rejected. Items carried along
    /// by a moving ancestor folder are not listed separately.
    pub fn plan(&self, selection: &SelectionModel, destination: &str) -> Option<MovePlan> {
        self.expand(selection, destination, true)
    }

    /// Like [`MoveValidator::plan`], for a copy. The same destinations are
    /// rejected; items already in the destination are copied next to
    /// themselves instead of being skipped.
    pub fn plan_copy(&self, selection: &SelectionModel, destination: &str) -> Option<MovePlan> {
        self.expand(selection, destination, false)
    }

    fn expand(
        &self,
        selection: &SelectionModel,
        destination: &str,
        skip_in_place: bool,
    ) -> Option<MovePlan> {
        if !self.can_move_into(selection.iter(), destination) {
            return None;
        }

        let destination = format!("/{}", join_segments(&split_segments(destination)));
        let folders = moving_folders(selection.iter());
        let mut items = Vec::new();
        let mut skipped = Vec::new();

        for folder in &folders {
            if covered_by_other(folder, &folders) {
                continue;
            }
            if skip_in_place && same_path(&parent_path(folder), &destination) {
                skipped.push(SelectionKey::folder(folder));
            } else {
                items.push(format!("/{}", join_segments(&split_segments(folder))));
            }
        }

        for kind in [LeafKind::Photo, LeafKind::TextFile] {
            for id in selection.leaf_ids(kind) {
                let key = SelectionKey::Leaf(kind, id);
                let Some(path) = leaf_path(self.tree, kind, id) else {
                    skipped.push(key);
                    continue;
                };
                if folders.iter().any(|folder| is_ancestor_or_self(folder, &path)) {
                    continue;
                }
                if skip_in_place && same_path(&parent_path(&path), &destination) {
                    skipped.push(key);
                } else {
                    items.push(path);
                }
            }
        }

        Some(MovePlan {
            destination,
            items,
            skipped,
        })
    }
}

/// Absolute paths to delete for a selection, with per-kind counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletePlan {
    pub items: Vec<String>,
    pub folders: usize,
    pub photos: usize,
    pub text_files: usize,
}

impl DeletePlan {
    pub fn from_selection(tree: &Tree, selection: &SelectionModel) -> Self {
        let folders = moving_folders(selection.iter());
        let mut plan = DeletePlan::default();

        for folder in &folders {
            plan.folders += 1;
            if !covered_by_other(folder, &folders) {
                plan.items.push(format!("/{}", join_segments(&split_segments(folder))));
            }
        }

        for kind in [LeafKind::Photo, LeafKind::TextFile] {
            for id in selection.leaf_ids(kind) {
                match kind {
                    LeafKind::Photo => plan.photos += 1,
                    LeafKind::TextFile => plan.text_files += 1,
                }
                let Some(path) = leaf_path(tree, kind, id) else {
                    continue;
                };
                if !folders.iter().any(|folder| is_ancestor_or_self(folder, &path)) {
                    plan.items.push(path);
                }
            }
        }

        plan
    }

    pub fn total(&self) -> usize {
        self.folders + self.photos + self.text_files
    }
}

fn moving_folders<'k, I>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = &'k SelectionKey>,
{
    let mut folders: Vec<String> = keys
        .into_iter()
        .filter_map(|key| match key {
            SelectionKey::Folder(path) => Some(path.clone()),
            SelectionKey::Leaf(..) => None,
        })
        .collect();
    folders.sort();
    folders
}

/// A proper ancestor of `folder` is also in `folders`
fn covered_by_other(folder: &str, folders: &[String]) -> bool {
    folders
        .iter()
        .any(|other| !same_path(other, folder) && is_ancestor_or_self(other, folder))
}

fn parent_path(path: &str) -> String {
    let mut segments = split_segments(path);
    segments.pop();
    join_segments(&segments)
}

fn leaf_path(tree: &Tree, kind: LeafKind, id: i64) -> Option<String> {
    let folder = tree.leaf_folder(kind, id)?;
    tree.node(folder)
        .leaves()
        .find(|record| record.kind == kind && record.id == id)
        .map(|record| record.path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::PathRecord;
    use crate::tree::TreeBuilder;

    fn keys(list: &[SelectionKey]) -> SelectionModel {
        list.iter().cloned().collect()
    }

    fn sample_tree() -> Tree {
        TreeBuilder::new(vec!["a".into()])
            .build(
                &[
                    PathRecord::photo(1, "/a/b/1.jpg"),
                    PathRecord::photo(2, "/a/b/c/2.jpg"),
                    PathRecord::photo(3, "/a/x/3.jpg"),
                    PathRecord::photo(4, "/a/4.jpg"),
                ],
                &[PathRecord::text_file(5, "/a/b/c/notes.txt")],
                &[],
            )
            .unwrap()
    }

    #[test]
    fn test_self_move_rejected() {
        let tree = Tree::default();
        let validator = MoveValidator::new(&tree);
        let moving = keys(&[SelectionKey::folder("/a/b")]);
        assert!(!validator.can_move_into(moving.iter(), "/a/b"));
    }

    #[test]
    fn test_move_into_descendant_rejected() {
        let tree = Tree::default();
        let validator = MoveValidator::new(&tree);
        let moving = keys(&[SelectionKey::folder("/a/b")]);
        assert!(!validator.can_move_into(moving.iter(), "/a/b/c"));
    }

    #[test]
    fn test_move_into_sibling_allowed() {
        let tree = Tree::default();
        let validator = MoveValidator::new(&tree);
        let moving = keys(&[SelectionKey::folder("/a/b")]);
        assert!(validator.can_move_into(moving.iter(), "/a/x"));
    }

    #[test]
    fn test_prefix_is_not_ancestor() {
        let tree = Tree::default();
        let validator = MoveValidator::new(&tree);
        let moving = keys(&[SelectionKey::folder("/a/b")]);
        assert!(validator.can_move_into(moving.iter(), "/a/bc"));
    }

    #[test]
    fn test_checks_walk_the_tree() {
        let tree = sample_tree();
        let validator = MoveValidator::new(&tree);
        let moving = keys(&[SelectionKey::folder("a/b")]);
        assert!(!validator.can_move_into(moving.iter(), "/a/b"));
        assert!(!validator.can_move_into(moving.iter(), "/a/b/c"));
        assert!(validator.can_move_into(moving.iter(), "/a/x"));
        // New folder below the moving one
        assert!(!validator.can_move_into(moving.iter(), "/a/b/new"));
    }

    #[test]
    fn test_root_is_never_a_target() {
        let tree = sample_tree();
        let validator = MoveValidator::new(&tree);
        let moving = keys(&[SelectionKey::photo(2)]);
        assert!(!validator.can_move_into(moving.iter(), "/a"));
        assert!(validator.can_move_into(moving.iter(), "/a/x"));
    }

    #[test]
    fn test_leaves_move_anywhere() {
        let tree = sample_tree();
        let validator = MoveValidator::new(&tree);
        let moving = keys(&[SelectionKey::photo(1), SelectionKey::text_file(5)]);
        assert!(validator.can_move_into(moving.iter(), "/a/b"));
        assert!(validator.can_move_into(moving.iter(), "/a/b/c"));
    }

    #[test]
    fn test_plan_rejects_invalid_destination() {
        let tree = sample_tree();
        let validator = MoveValidator::new(&tree);
        let selection = keys(&[SelectionKey::folder("a/b")]);
        assert!(validator.plan(&selection, "/a/b/c").is_none());
    }

    #[test]
    fn test_plan_skips_leaves_already_in_destination() {
        let tree = sample_tree();
        let validator = MoveValidator::new(&tree);
        let selection = keys(&[SelectionKey::photo(1), SelectionKey::photo(3)]);
        let plan = validator.plan(&selection, "/a/x").unwrap();
        assert_eq!(plan.destination, "/a/x");
        assert_eq!(plan.items, vec!["/a/b/1.jpg".to_string()]);
        assert_eq!(plan.skipped, vec![SelectionKey::photo(3)]);
    }

    #[test]
    fn test_plan_folder_carries_its_leaves() {
        let tree = sample_tree();
        let b = tree.find_folder("a/b").unwrap();
        let mut selection = SelectionModel::new();
        selection.select_subtree(&tree, b);
        selection.insert(SelectionKey::folder("a/b/c"));
        selection.insert(SelectionKey::photo(4));

        let plan = MoveValidator::new(&tree).plan(&selection, "a/x").unwrap();
        assert_eq!(
            plan.items,
            vec!["/a/b".to_string(), "/a/4.jpg".to_string()]
        );
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn test_plan_folder_already_in_destination() {
        let tree = sample_tree();
        let selection = keys(&[SelectionKey::folder("a/b/c")]);
        let plan = MoveValidator::new(&tree).plan(&selection, "/a/b").unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.skipped, vec![SelectionKey::folder("a/b/c")]);
    }

    #[test]
    fn test_plan_skips_unknown_leaves() {
        let tree = sample_tree();
        let selection = keys(&[SelectionKey::photo(42)]);
        let plan = MoveValidator::new(&tree).plan(&selection, "/a/x").unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.skipped, vec![SelectionKey::photo(42)]);
    }

    #[test]
    fn test_copy_plan_keeps_items_in_place() {
        let tree = sample_tree();
        let selection = keys(&[SelectionKey::folder("a/b/c"), SelectionKey::photo(3)]);

        let plan = MoveValidator::new(&tree).plan_copy(&selection, "/a/b").unwrap();
        assert_eq!(
            plan.items,
            vec!["/a/b/c".to_string(), "/a/x/3.jpg".to_string()]
        );
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn test_copy_plan_rejects_descendant() {
        let tree = sample_tree();
        let selection = keys(&[SelectionKey::folder("a/b")]);
        let validator = MoveValidator::new(&tree);
        assert!(validator.plan_copy(&selection, "/a/b/c").is_none());
        assert!(validator.plan_copy(&selection, "/a/b").is_none());
    }

    #[test]
    fn test_delete_plan() {
        let tree = sample_tree();
        let c = tree.find_folder("a/b/c").unwrap();
        let mut selection = SelectionModel::new();
        selection.select_subtree(&tree, c);
        selection.insert(SelectionKey::photo(4));

        let plan = DeletePlan::from_selection(&tree, &selection);
        assert_eq!(
            plan.items,
            vec!["/a/b/c".to_string(), "/a/4.jpg".to_string()]
        );
        assert_eq!(plan.folders, 1);
        assert_eq!(plan.photos, 2);
        assert_eq!(plan.text_files, 1);
        assert_eq!(plan.total(), 4);
    }
}
