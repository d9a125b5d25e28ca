//! File-system side of moves, copies and deletes, keeping the database in step.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::db::Database;
use crate::scanner::Scanner;
use crate::store::{FileMutator, MutationOutcome};

/// Moves, copies and deletes files on disk and rewrites the matching records
pub struct FsMutator<'a> {
    db: &'a Database,
}

impl<'a> FsMutator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn move_one(&self, item: &str, destination: &Path) -> Result<()> {
        let source = Path::new(item);
        if !source.exists() {
            bail!("source not found: {}", item);
        }

        let target = free_target(source, destination)?;
        let target_str = target.to_string_lossy().to_string();

        if source.is_dir() {
            fs::rename(source, &target)
                .with_context(|| format!("Failed to move folder {}", item))?;
            self.db.rename_prefix(item, &target_str)?;
        } else {
            let record = self
                .db
                .find_leaf_by_path(item)?
                .with_context(|| format!("{} is not in the library", item))?;
            fs::rename(source, &target)
                .with_context(|| format!("Failed to move file {}", item))?;
            self.db.update_leaf_path(record.kind, record.id, &target_str)?;
        }
        Ok(())
    }

    fn copy_one(&self, item: &str, destination: &Path) -> Result<()> {
        let source = Path::new(item);
        if !source.exists() {
            bail!("source not found: {}", item);
        }

        let target = free_target(source, destination)?;
        let target_str = target.to_string_lossy().to_string();

        if source.is_dir() {
            copy_tree(source, &target)
                .with_context(|| format!("Failed to copy folder {}", item))?;
            self.register_tree(&target)?;
        } else {
            let record = self
                .db
                .find_leaf_by_path(item)?
                .with_context(|| format!("{} is not in the library", item))?;
            fs::copy(source, &target)
                .with_context(|| format!("Failed to copy file {}", item))?;
            self.db.insert_leaf(record.kind, &target_str)?;
        }
        debug!(from = %item, to = %target_str, "copied");
        Ok(())
    }

    /// Add a freshly copied folder and everything below it to the library
    fn register_tree(&self, root: &Path) -> Result<()> {
        let scanner = Scanner::new(root.to_path_buf());
        self.db.insert_folder(&scanner.root().to_string_lossy())?;
        for dir in scanner.scan_directories() {
            self.db.insert_folder(&dir)?;
        }
        for file in scanner.scan_files() {
            self.db.insert_leaf(file.kind, &file.path)?;
        }
        Ok(())
    }

    fn delete_one(&self, item: &str, physically: bool) -> Result<()> {
        let path = Path::new(item);

        if let Some(record) = self.db.find_leaf_by_path(item)? {
            if physically {
                fs::remove_file(path)
                    .with_context(|| format!("Failed to delete file {}", item))?;
            }
            self.db.delete_leaf(record.kind, record.id)?;
            return Ok(());
        }

        let known_folder = self.db.get_folder_by_path(item)?.is_some()
            || !self.db.leaves_under(item)?.is_empty();
        if !known_folder && !path.is_dir() {
            bail!("{} is not in the library", item);
        }
        if physically {
            fs::remove_dir_all(path)
                .with_context(|| format!("Failed to delete folder {}", item))?;
        }
        self.db.delete_under(item)?;
        Ok(())
    }
}

impl FileMutator for FsMutator<'_> {
    #[instrument(skip(self, items), fields(count = items.len()))]
    fn move_paths(&self, items: &[String], destination: &str) -> MutationOutcome {
        let mut outcome = MutationOutcome::default();
        let dest = Path::new(destination);

        if !dest.exists() {
            if let Err(err) = fs::create_dir_all(dest) {
                outcome
                    .errors
                    .push(format!("Failed to create destination directory: {}", err));
                return outcome;
            }
        }
        if let Err(err) = self.db.insert_folder(destination) {
            outcome.errors.push(format!("{:#}", err));
            return outcome;
        }

        for item in items {
            match self.move_one(item, dest) {
                Ok(()) => outcome.count += 1,
                Err(err) => {
                    warn!(item = %item, error = %err, "move failed");
                    outcome.errors.push(format!("{:#}", err));
                }
            }
        }

        // Moved folders keep their old parent link until re-linked
        if let Err(err) = self.db.repair_folder_parents() {
            outcome.errors.push(format!("{:#}", err));
        }

        info!(moved = outcome.count, errors = outcome.errors.len(), "move finished");
        outcome
    }

    #[instrument(skip(self, items), fields(count = items.len()))]
    fn copy_paths(&self, items: &[String], destination: &str) -> MutationOutcome {
        let mut outcome = MutationOutcome::default();
        let dest = Path::new(destination);

        if let Err(err) = fs::create_dir_all(dest) {
            outcome
                .errors
                .push(format!("Failed to create destination directory: {}", err));
            return outcome;
        }
        if let Err(err) = self.db.insert_folder(destination) {
            outcome.errors.push(format!("{:#}", err));
            return outcome;
        }

        for item in items {
            match self.copy_one(item, dest) {
                Ok(()) => outcome.count += 1,
                Err(err) => {
                    warn!(item = %item, error = %err, "copy failed");
                    outcome.errors.push(format!("{:#}", err));
                }
            }
        }

        info!(copied = outcome.count, errors = outcome.errors.len(), "copy finished");
        outcome
    }

    #[instrument(skip(self, items), fields(count = items.len()))]
    fn delete_paths(&self, items: &[String], physically: bool) -> MutationOutcome {
        let mut outcome = MutationOutcome::default();

        for item in items {
            match self.delete_one(item, physically) {
                Ok(()) => outcome.count += 1,
                Err(err) => {
                    warn!(item = %item, error = %err, "delete failed");
                    outcome.errors.push(format!("{:#}", err));
                }
            }
        }

        info!(deleted = outcome.count, errors = outcome.errors.len(), "delete finished");
        outcome
    }
}

/// Recursively copy a directory; `target` must not exist yet
fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(source)?;
        let dest = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

/// First free name for `source` inside `destination`: `name`, then
/// `name (1)`, `name (2)`, ... keeping a file's extension at the end
fn free_target(source: &Path, destination: &Path) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .with_context(|| format!("Invalid source path: {}", source.display()))?
        .to_string_lossy()
        .to_string();

    let mut target = destination.join(&file_name);
    if !target.exists() {
        return Ok(target);
    }

    let (stem, extension) = if source.is_dir() {
        (file_name.clone(), None)
    } else {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.clone());
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().to_string());
        (stem, extension)
    };

    let mut copy_number = 1;
    while target.exists() {
        let name = match &extension {
            Some(ext) => format!("{} ({}).{}", stem, copy_number, ext),
            None => format!("{} ({})", stem, copy_number),
        };
        target = destination.join(name);
        copy_number += 1;
    }
    Ok(target)
}
