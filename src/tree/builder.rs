use tracing::{debug, instrument, warn};

use crate::error::TreeError;
use crate::records::{FolderRecord, PathRecord, RecordSet};

use super::paths::{common_prefix, common_root, join_segments, parent_segments, split_segments, strip_root};
use super::{NodeId, Tree};

/// Builds a [`Tree`] relative to a fixed common root
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    common_root: Vec<String>,
}

impl TreeBuilder {
    pub fn new(common_root: Vec<String>) -> Self {
        Self { common_root }
    }

    /// Build a tree from leaf and folder records.
    ///
    /// Leaves keep the order of the input slices. Any record whose folder
    /// does not lie under the common root is rejected with
    /// [`TreeError::PathOutsideRoot`].
    pub fn build(
        &self,
        photos: &[PathRecord],
        text_files: &[PathRecord],
        folders: &[FolderRecord],
    ) -> Result<Tree, TreeError> {
        let mut tree = Tree::with_root(self.common_root.clone());

        for folder in folders {
            let segments = split_segments(&folder.path);
            let relative = self.relative(&segments, &folder.path)?;
            walk_or_create(&mut tree, relative);
        }

        for record in photos.iter().chain(text_files) {
            let segments = parent_segments(&record.path);
            let relative = self.relative(&segments, &record.path)?;
            let node = walk_or_create(&mut tree, relative);
            tree.push_leaf(node, record.clone());
        }

        Ok(tree)
    }

    fn relative<'a>(&self, segments: &'a [String], path: &str) -> Result<&'a [String], TreeError> {
        strip_root(segments, &self.common_root).ok_or_else(|| TreeError::PathOutsideRoot {
            path: path.to_string(),
            root: join_segments(&self.common_root),
        })
    }
}

fn walk_or_create(tree: &mut Tree, relative: &[String]) -> NodeId {
    relative
        .iter()
        .fold(tree.root(), |node, name| tree.ensure_child(node, name))
}

impl Tree {
    /// Build the tree for a record-store snapshot.
    ///
    /// The common root is inferred from the leaf records (from the folder
    /// records when there are no leaves). When a folder record falls outside
    /// that root the root is widened to the longest prefix shared by every
    /// record, so nothing is ever placed under the wrong folder.
    #[instrument(skip_all)]
    pub fn from_snapshot(records: &RecordSet) -> Tree {
        let root = if records.photos.is_empty() && records.text_files.is_empty() {
            common_prefix(records.folders.iter().map(|f| split_segments(&f.path)))
        } else {
            common_root(records.leaves())
        };

        let tree = match TreeBuilder::new(root).build(
            &records.photos,
            &records.text_files,
            &records.folders,
        ) {
            Ok(tree) => tree,
            Err(err) => {
                let widened = common_prefix(
                    records
                        .leaves()
                        .map(|r| parent_segments(&r.path))
                        .chain(records.folders.iter().map(|f| split_segments(&f.path))),
                );
                warn!(%err, root = %join_segments(&widened), "widening common root");
                // The widened root is a prefix of every record path
                TreeBuilder::new(widened)
                    .build(&records.photos, &records.text_files, &records.folders)
                    .unwrap_or_default()
            }
        };

        debug!(
            root = %join_segments(tree.common_root()),
            folders = tree.folder_count(),
            leaves = tree.leaf_count(),
            "tree built"
        );
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::LeafKind;

    fn segs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn folder(id: i64, path: &str) -> FolderRecord {
        FolderRecord {
            id,
            path: path.to_string(),
            parent_id: None,
        }
    }

    #[test]
    fn test_build_scenario() {
        let photos = vec![
            PathRecord::photo(1, "/root/2024/img1.jpg"),
            PathRecord::photo(2, "/root/2024/sub/img2.jpg"),
        ];
        let root = common_root(&photos);
        assert_eq!(root, segs(&["root", "2024"]));

        let tree = TreeBuilder::new(root).build(&photos, &[], &[]).unwrap();
        let top = tree.node(tree.root());
        assert_eq!(top.full_path, "root/2024");
        assert_eq!(top.photos.len(), 1);
        assert_eq!(top.photos[0].file_name(), "img1.jpg");
        assert_eq!(top.children.len(), 1);

        let sub = tree.node(top.children["sub"]);
        assert_eq!(sub.full_path, "root/2024/sub");
        assert_eq!(sub.photos.len(), 1);
        assert!(sub.children.is_empty());
    }

    #[test]
    fn test_build_creates_intermediate_folders() {
        let tree = TreeBuilder::new(segs(&["lib"]))
            .build(&[PathRecord::photo(1, "/lib/a/b/c/x.jpg")], &[], &[])
            .unwrap();
        for path in ["lib/a", "lib/a/b", "lib/a/b/c"] {
            assert!(tree.find_folder(path).is_some(), "missing {}", path);
        }
        let c = tree.find_folder("lib/a/b/c").unwrap();
        assert_eq!(tree.node(c).photos[0].id, 1);
    }

    #[test]
    fn test_build_surfaces_empty_folders() {
        let tree = TreeBuilder::new(segs(&["lib"]))
            .build(
                &[PathRecord::photo(1, "/lib/a/x.jpg")],
                &[],
                &[folder(1, "/lib/empty"), folder(2, "/lib/a/nested/empty")],
            )
            .unwrap();
        let empty = tree.find_folder("lib/empty").unwrap();
        assert!(tree.node(empty).is_empty());
        assert!(tree.find_folder("lib/a/nested").is_some());
    }

    #[test]
    fn test_folder_equal_to_root_maps_to_root() {
        let tree = TreeBuilder::new(segs(&["lib"]))
            .build(&[], &[], &[folder(1, "/lib")])
            .unwrap();
        assert_eq!(tree.folder_count(), 1);
    }

    #[test]
    fn test_build_rejects_path_outside_root() {
        let result = TreeBuilder::new(segs(&["lib", "a"])).build(
            &[PathRecord::photo(1, "/other/x.jpg")],
            &[],
            &[],
        );
        assert_eq!(
            result.unwrap_err(),
            TreeError::PathOutsideRoot {
                path: "/other/x.jpg".to_string(),
                root: "lib/a".to_string(),
            }
        );
    }

    #[test]
    fn test_leaf_order_is_insertion_order() {
        let photos = vec![
            PathRecord::photo(3, "/lib/c.jpg"),
            PathRecord::photo(1, "/lib/a.jpg"),
            PathRecord::photo(2, "/lib/b.jpg"),
        ];
        let tree = TreeBuilder::new(segs(&["lib"])).build(&photos, &[], &[]).unwrap();
        let ids: Vec<i64> = tree.node(tree.root()).photos.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_text_files_go_to_their_own_list() {
        let tree = TreeBuilder::new(segs(&["lib"]))
            .build(
                &[PathRecord::photo(1, "/lib/a.jpg")],
                &[PathRecord::text_file(1, "/lib/a.txt")],
                &[],
            )
            .unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.photos.len(), 1);
        assert_eq!(root.text_files.len(), 1);
        assert_eq!(root.text_files[0].kind, LeafKind::TextFile);
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let records = RecordSet {
            photos: vec![
                PathRecord::photo(1, "/lib/x/1.jpg"),
                PathRecord::photo(2, "/lib/y/z/2.jpg"),
                PathRecord::photo(3, "/lib/3.jpg"),
            ],
            text_files: vec![PathRecord::text_file(4, "/lib/y/readme.md")],
            folders: vec![folder(1, "/lib/empty")],
        };
        let first = Tree::from_snapshot(&records);
        let second = Tree::from_snapshot(&records);
        assert_eq!(first, second);
    }

    #[test]
    fn test_snapshot_widens_root_for_outside_folder() {
        let records = RecordSet {
            photos: vec![PathRecord::photo(1, "/lib/2024/a.jpg")],
            text_files: Vec::new(),
            folders: vec![folder(1, "/lib/2023")],
        };
        let tree = Tree::from_snapshot(&records);
        assert_eq!(tree.common_root(), segs(&["lib"]).as_slice());
        assert!(tree.find_folder("lib/2023").is_some());
        let dir_2024 = tree.find_folder("lib/2024").unwrap();
        assert_eq!(tree.node(dir_2024).photos[0].id, 1);
    }

    #[test]
    fn test_snapshot_with_only_folders() {
        let records = RecordSet {
            photos: Vec::new(),
            text_files: Vec::new(),
            folders: vec![folder(1, "/lib/a"), folder(2, "/lib/b")],
        };
        let tree = Tree::from_snapshot(&records);
        assert_eq!(tree.common_root(), segs(&["lib"]).as_slice());
        assert_eq!(tree.node(tree.root()).children.len(), 2);
    }

    #[test]
    fn test_snapshot_empty() {
        let tree = Tree::from_snapshot(&RecordSet::default());
        assert!(tree.common_root().is_empty());
        assert!(tree.node(tree.root()).is_empty());
    }
}
