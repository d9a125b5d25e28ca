use std::collections::HashMap;

use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use crate::records::FolderRecord;
use crate::tree::paths::{join_segments, split_segments};

use super::Database;

/// Parent folder path of an absolute path, `None` at the file-system root
fn parent_folder_path(path: &str) -> Option<String> {
    let mut segments = split_segments(path);
    segments.pop()?;
    if segments.is_empty() {
        None
    } else {
        Some(format!("/{}", join_segments(&segments)))
    }
}

fn row_to_folder(row: &rusqlite::Row) -> rusqlite::Result<FolderRecord> {
    Ok(FolderRecord {
        id: row.get(0)?,
        path: row.get(1)?,
        parent_id: row.get(2)?,
    })
}

impl Database {
    /// Insert a folder if it is not known yet, returns its ID.
    /// The parent link is taken from the parent path when that folder exists.
    pub fn insert_folder(&self, path: &str) -> Result<i64> {
        if let Some(existing) = self.get_folder_by_path(path)? {
            return Ok(existing.id);
        }
        let parent_id = match parent_folder_path(path) {
            Some(parent) => self.get_folder_by_path(&parent)?.map(|f| f.id),
            None => None,
        };
        self.connection().execute(
            "INSERT INTO folders (path, parent_id) VALUES (?1, ?2)",
            params![path, parent_id],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    /// Get a folder by its path
    pub fn get_folder_by_path(&self, path: &str) -> Result<Option<FolderRecord>> {
        let result = self
            .connection()
            .query_row(
                "SELECT id, path, parent_id FROM folders WHERE path = ?1",
                [path],
                row_to_folder,
            )
            .optional()?;
        Ok(result)
    }

    /// Get all folders
    pub fn get_all_folders(&self) -> Result<Vec<FolderRecord>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT id, path, parent_id FROM folders ORDER BY path")?;
        let rows = stmt.query_map([], row_to_folder)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn folder_count(&self) -> Result<usize> {
        let count: i64 = self
            .connection()
            .query_row("SELECT COUNT(*) FROM folders", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Repair parent_id values based on path strings.
    /// Returns the number of folders fixed.
    pub fn repair_folder_parents(&self) -> Result<usize> {
        let all_folders = self.get_all_folders()?;

        let path_to_id: HashMap<&str, i64> = all_folders
            .iter()
            .map(|f| (f.path.as_str(), f.id))
            .collect();

        let mut fixed = 0;

        for folder in &all_folders {
            let expected_parent_id = parent_folder_path(&folder.path)
                .and_then(|p| path_to_id.get(p.as_str()).copied());

            if folder.parent_id != expected_parent_id {
                self.connection().execute(
                    "UPDATE folders SET parent_id = ?1 WHERE id = ?2",
                    params![expected_parent_id, folder.id],
                )?;
                fixed += 1;
            }
        }

        Ok(fixed)
    }
}
