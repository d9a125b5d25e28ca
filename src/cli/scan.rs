use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::db::Database;
use crate::records::LeafKind;
use crate::scanner::Scanner;

use super::open_database;

/// Run the scan command: walk a directory and record its folders and files
pub fn run_scan(db_path: &Path, dir: &Path) -> Result<ScanStats> {
    let root = dir
        .canonicalize()
        .with_context(|| format!("Directory does not exist: {}", dir.display()))?;

    let db = open_database(db_path)?;
    let scanner = Scanner::new(root);
    populate_database(&db, &scanner)
}

/// Counts of what a scan found
#[derive(Debug, Default)]
pub struct ScanStats {
    /// Subdirectories, the scanned directory itself not included
    pub folders: usize,
    pub photos: usize,
    pub text_files: usize,
}

impl ScanStats {
    pub fn files(&self) -> usize {
        self.photos + self.text_files
    }
}

#[instrument(skip_all)]
fn populate_database(db: &Database, scanner: &Scanner) -> Result<ScanStats> {
    db.begin_transaction()?;
    match insert_all(db, scanner) {
        Ok(stats) => {
            debug!("committing to database");
            db.commit()?;
            info!(
                folders = stats.folders,
                photos = stats.photos,
                text_files = stats.text_files,
                "scan complete"
            );
            Ok(stats)
        }
        Err(err) => {
            db.rollback()?;
            Err(err)
        }
    }
}

fn insert_all(db: &Database, scanner: &Scanner) -> Result<ScanStats> {
    let mut stats = ScanStats::default();

    // Parents are walked before children, so parent links resolve on insert
    db.insert_folder(&scanner.root().to_string_lossy())?;
    for dir in scanner.scan_directories() {
        db.insert_folder(&dir)?;
        stats.folders += 1;
    }
    info!(count = stats.folders, "folders scanned");

    for file in scanner.scan_files() {
        db.insert_leaf(file.kind, &file.path)?;
        match file.kind {
            LeafKind::Photo => stats.photos += 1,
            LeafKind::TextFile => stats.text_files += 1,
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use std::fs;
    use tempfile::TempDir;

    fn setup_library() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("library");
        fs::create_dir_all(root.join("vacation/beach")).unwrap();
        fs::create_dir_all(root.join("family")).unwrap();
        fs::write(root.join("vacation/photo1.jpg"), "image").unwrap();
        fs::write(root.join("vacation/beach/sunset.jpg"), "image").unwrap();
        fs::write(root.join("vacation/notes.md"), "text").unwrap();
        fs::write(root.join("family/portrait.png"), "image").unwrap();
        fs::write(root.join("family/clip.mp4"), "ignored").unwrap();
        dir
    }

    #[test]
    fn test_scan_counts() {
        let temp = setup_library();
        let db_path = temp.path().join("db/library.db");

        let stats = run_scan(&db_path, &temp.path().join("library")).unwrap();
        assert_eq!(stats.folders, 3);
        assert_eq!(stats.photos, 3);
        assert_eq!(stats.text_files, 1);
        assert_eq!(stats.files(), 4);
        assert!(db_path.exists());
    }

    #[test]
    fn test_scan_is_repeatable() {
        let temp = setup_library();
        let db_path = temp.path().join("library.db");
        let library = temp.path().join("library");

        run_scan(&db_path, &library).unwrap();
        run_scan(&db_path, &library).unwrap();

        let db = Database::open(&db_path).unwrap();
        let snapshot = db.snapshot().unwrap();
        assert_eq!(snapshot.photos.len(), 3);
        // library, vacation, vacation/beach, family
        assert_eq!(snapshot.folders.len(), 4);
    }

    #[test]
    fn test_scan_links_parents() {
        let temp = setup_library();
        let db_path = temp.path().join("library.db");
        let library = temp.path().join("library").canonicalize().unwrap();

        run_scan(&db_path, &library).unwrap();

        let db = Database::open(&db_path).unwrap();
        let vacation = db
            .get_folder_by_path(&library.join("vacation").to_string_lossy())
            .unwrap()
            .unwrap();
        let beach = db
            .get_folder_by_path(&library.join("vacation/beach").to_string_lossy())
            .unwrap()
            .unwrap();
        assert_eq!(beach.parent_id, Some(vacation.id));
    }

    #[test]
    fn test_scan_nonexistent_dir() {
        let temp = TempDir::new().unwrap();
        let result = run_scan(&temp.path().join("library.db"), Path::new("/nonexistent/path"));
        assert!(result.is_err());
    }
}
