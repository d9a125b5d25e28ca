use serde::Serialize;

/// Kind of leaf record attached to a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Photo,
    TextFile,
}

impl LeafKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeafKind::Photo => "photo",
            LeafKind::TextFile => "text_file",
        }
    }
}

/// A photo or text file known to the record store, addressed by absolute path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathRecord {
    pub id: i64,
    pub path: String,
    pub kind: LeafKind,
}

impl PathRecord {
    pub fn photo(id: i64, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            kind: LeafKind::Photo,
        }
    }

    pub fn text_file(id: i64, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            kind: LeafKind::TextFile,
        }
    }

    /// Last path segment (the file name)
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

/// A folder known to the record store. Used to surface empty folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRecord {
    pub id: i64,
    pub path: String,
    pub parent_id: Option<i64>,
}

/// Flat lists returned by a record store for one rebuild
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub photos: Vec<PathRecord>,
    pub text_files: Vec<PathRecord>,
    pub folders: Vec<FolderRecord>,
}

impl RecordSet {
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty() && self.text_files.is_empty() && self.folders.is_empty()
    }

    /// All leaf records, photos first
    pub fn leaves(&self) -> impl Iterator<Item = &PathRecord> {
        self.photos.iter().chain(self.text_files.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let record = PathRecord::photo(1, "/root/2024/img1.jpg");
        assert_eq!(record.file_name(), "img1.jpg");

        let record = PathRecord::text_file(2, "notes.txt");
        assert_eq!(record.file_name(), "notes.txt");
    }

    #[test]
    fn test_leaves_order() {
        let set = RecordSet {
            photos: vec![PathRecord::photo(1, "/a/1.jpg")],
            text_files: vec![PathRecord::text_file(1, "/a/1.txt")],
            folders: Vec::new(),
        };
        let kinds: Vec<LeafKind> = set.leaves().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![LeafKind::Photo, LeafKind::TextFile]);
    }
}
