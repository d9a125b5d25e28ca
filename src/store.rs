//! Collaborator seams: where records come from and who touches the disk.

use anyhow::Result;

use crate::records::RecordSet;

/// Source of the flat record lists a tree is built from
pub trait RecordStore {
    fn snapshot(&self) -> Result<RecordSet>;
}

/// Result of a batch file operation. Failures are per item; a non-empty
/// `errors` list with a non-zero `count` is a partial success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    pub count: usize,
    pub errors: Vec<String>,
}

impl MutationOutcome {
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Performs the physical side of a move, copy or delete
pub trait FileMutator {
    fn move_paths(&self, items: &[String], destination: &str) -> MutationOutcome;

    /// Copy items into `destination`; the originals stay where they are
    fn copy_paths(&self, items: &[String], destination: &str) -> MutationOutcome;

    /// Delete items; with `physically == false` only the records are dropped
    fn delete_paths(&self, items: &[String], physically: bool) -> MutationOutcome;
}
