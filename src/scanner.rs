use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::records::LeafKind;

/// Classify a file by its extension; `None` for files the library ignores
pub fn classify_leaf(path: &Path) -> Option<LeafKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tiff" | "tif" | "webp" | "heic" | "heif"
        | "raw" | "cr2" | "cr3" | "nef" | "arw" | "orf" | "rw2" | "dng" | "raf" => {
            Some(LeafKind::Photo)
        }
        "txt" | "md" => Some(LeafKind::TextFile),
        _ => None,
    }
}

/// A photo or text file found on disk
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Absolute path
    pub path: String,
    pub kind: LeafKind,
}

/// Walks a directory tree and yields folders and library files.
/// Hidden entries (leading `.`) are skipped together with their contents.
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute paths of all directories (excluding the root itself)
    pub fn scan_directories(&self) -> impl Iterator<Item = String> + '_ {
        WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.path().to_string_lossy().to_string())
    }

    /// All photos and text files, in file-name order per directory
    pub fn scan_files(&self) -> Vec<ScannedFile> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(kind) = classify_leaf(entry.path()) else {
                continue;
            };
            files.push(ScannedFile {
                path: entry.path().to_string_lossy().to_string(),
                kind,
            });
        }
        files
    }
}

/// Check if a directory entry is hidden (starts with .)
/// Never considers the root entry (depth 0) as hidden.
fn is_hidden(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_classify_leaf() {
        assert_eq!(classify_leaf(Path::new("photo.jpg")), Some(LeafKind::Photo));
        assert_eq!(classify_leaf(Path::new("photo.JPEG")), Some(LeafKind::Photo));
        assert_eq!(classify_leaf(Path::new("photo.cr2")), Some(LeafKind::Photo));
        assert_eq!(classify_leaf(Path::new("notes.txt")), Some(LeafKind::TextFile));
        assert_eq!(classify_leaf(Path::new("README.MD")), Some(LeafKind::TextFile));
        assert_eq!(classify_leaf(Path::new("video.mp4")), None);
        assert_eq!(classify_leaf(Path::new("noext")), None);
    }

    #[test]
    fn test_scanner_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("subject1/shoot1")).unwrap();
        fs::create_dir_all(root.join("subject1/shoot2")).unwrap();
        fs::create_dir_all(root.join("subject2")).unwrap();

        let scanner = Scanner::new(root.to_path_buf());
        let dirs: Vec<String> = scanner.scan_directories().collect();

        let expected: Vec<String> = ["subject1", "subject1/shoot1", "subject1/shoot2", "subject2"]
            .iter()
            .map(|p| root.join(p).to_string_lossy().to_string())
            .collect();
        assert_eq!(dirs, expected);
    }

    #[test]
    fn test_scanner_files() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("photos")).unwrap();
        fs::write(root.join("photos/image.jpg"), "fake image data").unwrap();
        fs::write(root.join("photos/notes.txt"), "caption").unwrap();
        fs::write(root.join("photos/video.mp4"), "not tracked").unwrap();

        let scanner = Scanner::new(root.to_path_buf());
        let files = scanner.scan_files();

        assert_eq!(files.len(), 2);
        let image = files.iter().find(|f| f.path.ends_with("image.jpg")).unwrap();
        assert_eq!(image.kind, LeafKind::Photo);
        assert!(Path::new(&image.path).is_absolute());
        let notes = files.iter().find(|f| f.path.ends_with("notes.txt")).unwrap();
        assert_eq!(notes.kind, LeafKind::TextFile);
    }

    #[test]
    fn test_scanner_skips_hidden() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("visible")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::write(root.join("visible/photo.jpg"), "data").unwrap();
        fs::write(root.join(".hidden/secret.jpg"), "hidden").unwrap();
        fs::write(root.join("visible/.hidden.jpg"), "hidden file").unwrap();

        let scanner = Scanner::new(root.to_path_buf());

        let dirs: Vec<String> = scanner.scan_directories().collect();
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0].ends_with("visible"));

        let files = scanner.scan_files();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("photo.jpg"));
    }

    #[test]
    fn test_is_hidden_respects_depth() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join(".library");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("a.jpg"), "data").unwrap();

        let files = Scanner::new(root).scan_files();
        assert_eq!(files.len(), 1, "Root at depth 0 should never be hidden");
    }
}
