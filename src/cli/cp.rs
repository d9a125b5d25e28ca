use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::error::TreeError;
use crate::moves::MoveValidator;
use crate::mutator::FsMutator;
use crate::session::Session;
use crate::store::MutationOutcome;

use super::{absolute_path, open_existing};

/// What a copy did, or would do with `--dry-run`
#[derive(Debug)]
pub struct CopyReport {
    pub destination: String,
    pub planned: Vec<String>,
    /// `None` for a dry run
    pub outcome: Option<MutationOutcome>,
}

/// Copy files and folders into `destination`, numbering names that clash
pub fn run_copy(
    db_path: &Path,
    items: &[PathBuf],
    destination: &Path,
    dry_run: bool,
) -> Result<CopyReport> {
    let db = open_existing(db_path)?;
    let mut session = Session::load(&db)?;

    for item in items {
        let key = session.key_for_path(&absolute_path(item)?)?;
        session.select(key);
    }

    let destination = absolute_path(destination)?;
    let plan = MoveValidator::new(session.tree())
        .plan_copy(session.selection(), &destination)
        .ok_or_else(|| TreeError::InvalidMoveTarget {
            destination: destination.clone(),
        })?;

    if dry_run {
        info!(items = plan.items.len(), "dry run");
        return Ok(CopyReport {
            destination: plan.destination,
            planned: plan.items,
            outcome: None,
        });
    }

    let outcome = session.copy_selected(&db, &FsMutator::new(&db), &destination)?;
    Ok(CopyReport {
        destination: plan.destination,
        planned: plan.items,
        outcome: Some(outcome),
    })
}
