use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::records::{LeafKind, PathRecord};
use crate::session::Session;
use crate::tree::{NodeId, Tree};

use super::open_existing;

/// One folder's contents, as printed by `ls`
#[derive(Debug, Serialize)]
pub struct Listing {
    /// Absolute path of the listed folder
    pub path: String,
    /// Folder names from the root down to the listed folder
    pub breadcrumb: Vec<String>,
    pub folders: Vec<ListingFolder>,
    pub photos: Vec<LeafEntry>,
    pub text_files: Vec<LeafEntry>,
}

#[derive(Debug, Serialize)]
pub struct ListingFolder {
    pub name: String,
    pub path: String,
    /// Leaves at any depth below the folder
    pub leaves: usize,
}

#[derive(Debug, Serialize)]
pub struct LeafEntry {
    pub id: i64,
    pub kind: LeafKind,
    pub name: String,
    pub path: String,
}

impl From<&PathRecord> for LeafEntry {
    fn from(record: &PathRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind,
            name: record.file_name().to_string(),
            path: record.path.clone(),
        }
    }
}

impl Listing {
    /// Plain-text rendering: folders first with a trailing `/`
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.path);
        for folder in &self.folders {
            let _ = writeln!(out, "  {}/  ({} files)", folder.name, folder.leaves);
        }
        for leaf in self.photos.iter().chain(&self.text_files) {
            let _ = writeln!(out, "  {}", leaf.name);
        }
        out
    }
}

fn load_at(db_path: &Path, path: Option<&str>) -> Result<(Session, NodeId)> {
    let db = open_existing(db_path)?;
    let mut session = Session::load(&db)?;
    let node = match path {
        Some(path) => session.open(path)?,
        None => session.current(),
    };
    Ok((session, node))
}

/// List a folder given as an absolute path or relative to the tree root
pub fn run_ls(db_path: &Path, path: Option<&str>) -> Result<Listing> {
    let (session, node) = load_at(db_path, path)?;
    let tree = session.tree();
    let entries = session.entries();

    Ok(Listing {
        path: tree.absolute_path(node),
        breadcrumb: session.navigation().segments().to_vec(),
        folders: entries
            .folders
            .iter()
            .map(|&id| ListingFolder {
                name: tree.node(id).name.clone(),
                path: tree.absolute_path(id),
                leaves: tree.descendant_leaves(id).len(),
            })
            .collect(),
        photos: entries.photos.iter().map(LeafEntry::from).collect(),
        text_files: entries.text_files.iter().map(LeafEntry::from).collect(),
    })
}

/// Render the folder hierarchy below a folder as an indented outline
pub fn run_tree(db_path: &Path, path: Option<&str>) -> Result<String> {
    let (session, node) = load_at(db_path, path)?;
    let tree = session.tree();

    let mut out = String::new();
    let _ = writeln!(out, "{}{}", tree.absolute_path(node), counts(tree, node));
    render_children(tree, node, 1, &mut out);
    Ok(out)
}

fn render_children(tree: &Tree, node: NodeId, indent: usize, out: &mut String) {
    for &child in tree.node(node).children.values() {
        let _ = writeln!(
            out,
            "{}{}/{}",
            "  ".repeat(indent),
            tree.node(child).name,
            counts(tree, child)
        );
        render_children(tree, child, indent + 1, out);
    }
}

fn counts(tree: &Tree, node: NodeId) -> String {
    let folder = tree.node(node);
    match (folder.photos.len(), folder.text_files.len()) {
        (0, 0) => String::new(),
        (photos, 0) => format!("  [{} photos]", photos),
        (0, texts) => format!("  [{} text files]", texts),
        (photos, texts) => format!("  [{} photos, {} text files]", photos, texts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::run_scan;
    use std::fs;
    use tempfile::TempDir;

    fn scanned_library() -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let library = temp.path().join("library");
        fs::create_dir_all(library.join("2024/sub")).unwrap();
        fs::create_dir_all(library.join("2023")).unwrap();
        fs::write(library.join("2024/a.jpg"), "image").unwrap();
        fs::write(library.join("2024/sub/b.jpg"), "image").unwrap();
        fs::write(library.join("2024/sub/c.txt"), "text").unwrap();

        let db_path = temp.path().join("library.db");
        run_scan(&db_path, &library).unwrap();
        (temp, db_path)
    }

    #[test]
    fn test_ls_root() {
        let (_temp, db_path) = scanned_library();

        let listing = run_ls(&db_path, None).unwrap();
        assert!(listing.breadcrumb.is_empty());
        let names: Vec<&str> = listing.folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["2023", "2024"]);
        assert_eq!(listing.folders[1].leaves, 3);
        assert!(listing.photos.is_empty());
    }

    #[test]
    fn test_ls_relative_path() {
        let (_temp, db_path) = scanned_library();

        let listing = run_ls(&db_path, Some("2024/sub")).unwrap();
        assert_eq!(listing.breadcrumb, vec!["2024", "sub"]);
        assert!(listing.path.ends_with("library/2024/sub"));
        assert_eq!(listing.photos.len(), 1);
        assert_eq!(listing.photos[0].name, "b.jpg");
        assert_eq!(listing.text_files[0].kind, LeafKind::TextFile);

        let rendered = listing.render();
        assert!(rendered.contains("  b.jpg"));
        assert!(rendered.contains("  c.txt"));
    }

    #[test]
    fn test_ls_unknown_path() {
        let (_temp, db_path) = scanned_library();
        assert!(run_ls(&db_path, Some("2024/missing")).is_err());
    }

    #[test]
    fn test_listing_serializes() {
        let (_temp, db_path) = scanned_library();

        let listing = run_ls(&db_path, Some("2024")).unwrap();
        let json: serde_json::Value = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["folders"][0]["name"], "sub");
        assert_eq!(json["photos"][0]["kind"], "photo");
    }

    #[test]
    fn test_tree_outline() {
        let (_temp, db_path) = scanned_library();

        let outline = run_tree(&db_path, None).unwrap();
        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "  2023/");
        assert_eq!(lines[2], "  2024/  [1 photos]");
        assert_eq!(lines[3], "    sub/  [1 photos, 1 text files]");
    }
}
