mod browse;
mod cp;
mod mv;
mod repair;
mod rm;
mod scan;
mod status;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::db::Database;

pub use browse::{run_ls, run_tree, LeafEntry, Listing, ListingFolder};
pub use cp::{run_copy, CopyReport};
pub use mv::{run_move, MoveReport};
pub use repair::run_repair;
pub use rm::{run_remove, RemoveReport};
pub use scan::{run_scan, ScanStats};
pub use status::{run_status, StatusReport};

/// Open the database, creating it and its directory if needed
pub fn open_database(db_path: &Path) -> Result<Database> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Database::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

/// Open a database that a previous `scan` created
pub fn open_existing(db_path: &Path) -> Result<Database> {
    if !db_path.exists() {
        bail!(
            "No database found at {}. Run 'mediatree scan' first.",
            db_path.display()
        );
    }
    Database::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

/// Absolute form of a user-supplied path. Existing paths are canonicalized
/// so they match what `scan` stored; others are joined onto the working
/// directory.
pub(crate) fn absolute_path(path: &Path) -> Result<String> {
    let absolute: PathBuf = if path.exists() {
        path.canonicalize()
            .with_context(|| format!("Failed to resolve {}", path.display()))?
    } else if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to read current directory")?
            .join(path)
    };
    Ok(absolute.to_string_lossy().to_string())
}
