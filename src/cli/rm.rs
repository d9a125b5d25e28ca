use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::moves::DeletePlan;
use crate::mutator::FsMutator;
use crate::session::Session;
use crate::store::MutationOutcome;

use super::{absolute_path, open_existing};

#[derive(Debug)]
pub struct RemoveReport {
    pub plan: DeletePlan,
    pub outcome: MutationOutcome,
}

/// Delete files and folders. With `keep_files` only the library records
/// are removed and the disk is left alone.
pub fn run_remove(db_path: &Path, items: &[PathBuf], keep_files: bool) -> Result<RemoveReport> {
    let db = open_existing(db_path)?;
    let mut session = Session::load(&db)?;

    for item in items {
        let key = session.key_for_path(&absolute_path(item)?)?;
        session.select(key);
    }

    let plan = DeletePlan::from_selection(session.tree(), session.selection());
    let outcome = session.delete_selected(&db, &FsMutator::new(&db), !keep_files)?;
    Ok(RemoveReport { plan, outcome })
}
