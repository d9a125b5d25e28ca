//! Runtime configuration: environment variables and per-user directories.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Environment variable overriding the library database location
pub const DB_ENV: &str = "MEDIATREE_DB";

/// Database file name inside the data directory
pub const DB_FILENAME: &str = "library.db";

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "mediatree").context("Failed to determine home directory")
}

/// Database path used when `--db` is not given: `MEDIATREE_DB`, then the
/// per-user data directory
pub fn default_db_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    Ok(project_dirs()?.data_dir().join(DB_FILENAME))
}

/// Pick the database path: an explicit flag wins over the defaults
pub fn resolve_db_path(flag: Option<&Path>) -> Result<PathBuf> {
    match flag {
        Some(path) => Ok(path.to_path_buf()),
        None => default_db_path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins() {
        let path = resolve_db_path(Some(Path::new("/tmp/other.db"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn test_default_ends_with_filename() {
        if std::env::var_os(DB_ENV).is_some() {
            return;
        }
        if let Ok(path) = default_db_path() {
            assert!(path.ends_with(DB_FILENAME));
        }
    }
}
