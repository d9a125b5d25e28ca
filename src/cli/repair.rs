use std::path::Path;

use anyhow::Result;
use tracing::info;

use super::open_existing;

/// Run the repair command: fix folder parent_id values based on paths
pub fn run_repair(db_path: &Path) -> Result<usize> {
    let db = open_existing(db_path)?;
    let fixed = db.repair_folder_parents()?;
    info!(fixed, "folder parents repaired");
    Ok(fixed)
}
