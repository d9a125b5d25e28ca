use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::error::TreeError;
use crate::moves::MoveValidator;
use crate::mutator::FsMutator;
use crate::session::Session;
use crate::store::MutationOutcome;

use super::{absolute_path, open_existing};

/// What a move did, or would do with `--dry-run`
#[derive(Debug)]
pub struct MoveReport {
    pub destination: String,
    /// Paths handed to the mover
    pub planned: Vec<String>,
    /// Selected items that were already in the destination
    pub skipped: usize,
    /// `None` for a dry run
    pub outcome: Option<MutationOutcome>,
}

/// Move files and folders into `destination`, creating it if needed
pub fn run_move(
    db_path: &Path,
    items: &[PathBuf],
    destination: &Path,
    dry_run: bool,
) -> Result<MoveReport> {
    let db = open_existing(db_path)?;
    let mut session = Session::load(&db)?;

    for item in items {
        let key = session.key_for_path(&absolute_path(item)?)?;
        session.select(key);
    }

    let destination = absolute_path(destination)?;
    let plan = MoveValidator::new(session.tree())
        .plan(session.selection(), &destination)
        .ok_or_else(|| TreeError::InvalidMoveTarget {
            destination: destination.clone(),
        })?;

    if dry_run {
        info!(items = plan.items.len(), "dry run");
        return Ok(MoveReport {
            destination: plan.destination,
            planned: plan.items,
            skipped: plan.skipped.len(),
            outcome: None,
        });
    }

    let outcome = session.move_selected(&db, &FsMutator::new(&db), &destination)?;
    Ok(MoveReport {
        destination: plan.destination,
        planned: plan.items,
        skipped: plan.skipped.len(),
        outcome: Some(outcome),
    })
}
