use anyhow::Result;
use rusqlite::{params, OptionalExtension};
use tracing::{debug, instrument};

use crate::records::{LeafKind, PathRecord, RecordSet};
use crate::store::RecordStore;

use super::Database;

const LEAF_KINDS: [LeafKind; 2] = [LeafKind::Photo, LeafKind::TextFile];

fn table(kind: LeafKind) -> &'static str {
    match kind {
        LeafKind::Photo => "photos",
        LeafKind::TextFile => "text_files",
    }
}

impl Database {
    /// Insert a leaf record if its path is new, returns its ID
    pub fn insert_leaf(&self, kind: LeafKind, path: &str) -> Result<i64> {
        if let Some(existing) = self.get_leaf_by_path(kind, path)? {
            return Ok(existing.id);
        }
        self.connection().execute(
            &format!("INSERT INTO {} (path) VALUES (?1)", table(kind)),
            [path],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    pub fn get_leaf(&self, kind: LeafKind, id: i64) -> Result<Option<PathRecord>> {
        let result = self
            .connection()
            .query_row(
                &format!("SELECT id, path FROM {} WHERE id = ?1", table(kind)),
                [id],
                |row| {
                    Ok(PathRecord {
                        id: row.get(0)?,
                        path: row.get(1)?,
                        kind,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    pub fn get_leaf_by_path(&self, kind: LeafKind, path: &str) -> Result<Option<PathRecord>> {
        let result = self
            .connection()
            .query_row(
                &format!("SELECT id, path FROM {} WHERE path = ?1", table(kind)),
                [path],
                |row| {
                    Ok(PathRecord {
                        id: row.get(0)?,
                        path: row.get(1)?,
                        kind,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    /// Find a photo or text file by path
    pub fn find_leaf_by_path(&self, path: &str) -> Result<Option<PathRecord>> {
        for kind in LEAF_KINDS {
            if let Some(record) = self.get_leaf_by_path(kind, path)? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// All leaves of one kind in insertion order
    pub fn get_leaves(&self, kind: LeafKind) -> Result<Vec<PathRecord>> {
        let mut stmt = self
            .connection()
            .prepare(&format!("SELECT id, path FROM {} ORDER BY id", table(kind)))?;
        let rows = stmt.query_map([], |row| {
            Ok(PathRecord {
                id: row.get(0)?,
                path: row.get(1)?,
                kind,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn leaf_count(&self, kind: LeafKind) -> Result<usize> {
        let count: i64 = self.connection().query_row(
            &format!("SELECT COUNT(*) FROM {}", table(kind)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn update_leaf_path(&self, kind: LeafKind, id: i64, new_path: &str) -> Result<()> {
        self.connection().execute(
            &format!("UPDATE {} SET path = ?1 WHERE id = ?2", table(kind)),
            params![new_path, id],
        )?;
        Ok(())
    }

    /// Delete a leaf by ID. Returns false if it did not exist.
    pub fn delete_leaf(&self, kind: LeafKind, id: i64) -> Result<bool> {
        let rows = self.connection().execute(
            &format!("DELETE FROM {} WHERE id = ?1", table(kind)),
            [id],
        )?;
        Ok(rows > 0)
    }

    /// Leaves at any depth below a folder path
    pub fn leaves_under(&self, folder: &str) -> Result<Vec<PathRecord>> {
        let prefix = format!("{}/", folder.trim_end_matches('/'));
        let mut records = Vec::new();
        for kind in LEAF_KINDS {
            let mut stmt = self.connection().prepare(&format!(
                "SELECT id, path FROM {} WHERE substr(path, 1, ?2) = ?1 ORDER BY id",
                table(kind)
            ))?;
            let rows = stmt.query_map(params![prefix, prefix.chars().count() as i64], |row| {
                Ok(PathRecord {
                    id: row.get(0)?,
                    path: row.get(1)?,
                    kind,
                })
            })?;
            for row in rows {
                records.push(row?);
            }
        }
        Ok(records)
    }

    /// Delete a folder's records: the folder, its descendant folders and
    /// every leaf below it. Returns the number of leaf records removed.
    #[instrument(skip(self))]
    pub fn delete_under(&self, folder: &str) -> Result<usize> {
        let folder = folder.trim_end_matches('/');
        let prefix = format!("{}/", folder);
        let len = prefix.chars().count() as i64;
        let mut removed = 0;
        for kind in LEAF_KINDS {
            removed += self.connection().execute(
                &format!("DELETE FROM {} WHERE substr(path, 1, ?2) = ?1", table(kind)),
                params![prefix, len],
            )?;
        }
        self.connection().execute(
            "DELETE FROM folders WHERE path = ?1 OR substr(path, 1, ?3) = ?2",
            params![folder, prefix, len],
        )?;
        debug!(removed, "folder records deleted");
        Ok(removed)
    }

    /// Rewrite every record at or below `old` to live under `new` instead.
    /// Returns the number of leaf records updated.
    #[instrument(skip(self))]
    pub fn rename_prefix(&self, old: &str, new: &str) -> Result<usize> {
        let old = old.trim_end_matches('/');
        let new = new.trim_end_matches('/');
        let prefix = format!("{}/", old);
        let len = prefix.chars().count() as i64;
        let mut updated = 0;

        for kind in LEAF_KINDS {
            updated += self.connection().execute(
                &format!(
                    "UPDATE {} SET path = ?1 || substr(path, ?3) WHERE substr(path, 1, ?3) = ?2",
                    table(kind)
                ),
                params![new, prefix, len],
            )?;
        }

        // Descendant folders keep their ids, the moved folder itself too
        self.connection().execute(
            "UPDATE folders SET path = ?1 || substr(path, ?3) WHERE substr(path, 1, ?3) = ?2",
            params![new, prefix, len],
        )?;
        self.connection().execute(
            "UPDATE folders SET path = ?1 WHERE path = ?2",
            params![new, old],
        )?;

        debug!(updated, "records re-rooted");
        Ok(updated)
    }
}

impl RecordStore for Database {
    fn snapshot(&self) -> Result<RecordSet> {
        Ok(RecordSet {
            photos: self.get_leaves(LeafKind::Photo)?,
            text_files: self.get_leaves(LeafKind::TextFile)?,
            folders: self.get_all_folders()?,
        })
    }
}
