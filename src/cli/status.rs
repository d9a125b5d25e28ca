use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::records::LeafKind;
use crate::session::Session;
use crate::tree::paths::join_segments;

use crate::logging::log_file_path;

use super::open_existing;

/// Summary of the library database and the tree built from it
#[derive(Debug)]
pub struct StatusReport {
    pub db_path: PathBuf,
    pub folders: usize,
    pub photos: usize,
    pub text_files: usize,
    /// Absolute path of the tree's root folder
    pub common_root: String,
    /// Folder nodes in the tree, root included
    pub tree_folders: usize,
    /// Where this run's log lines went; `None` without a home directory
    pub log_file: Option<PathBuf>,
}

pub fn run_status(db_path: &Path) -> Result<StatusReport> {
    let db = open_existing(db_path)?;
    let session = Session::load(&db)?;
    let tree = session.tree();

    Ok(StatusReport {
        db_path: db_path.to_path_buf(),
        folders: db.folder_count()?,
        photos: db.leaf_count(LeafKind::Photo)?,
        text_files: db.leaf_count(LeafKind::TextFile)?,
        common_root: format!("/{}", join_segments(tree.common_root())),
        tree_folders: tree.folder_count(),
        log_file: log_file_path().ok(),
    })
}
