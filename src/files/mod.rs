//! Synchronous filesystem access for the editor UI.
//!
//! Read/write/list operations are small, user-initiated, and infrequent
//! (opening or saving a file, expanding a tree node), so they stay
//! synchronous; the gateway bridges them onto blocking threads.

mod dialogs;

pub use dialogs::{pick_folder, pick_open_file, pick_save_path};

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::Result;

/// One entry of a directory listing. Transient, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Display name; for grandchildren in a folder walk this is
    /// `parent/child`.
    pub name: String,
    /// Absolute path.
    pub path: PathBuf,
    /// Whether the entry is a directory.
    pub is_directory: bool,
}

/// Read a file to a UTF-8 string.
pub fn read_file(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

/// Write a string to a file, creating or truncating it.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)?;
    Ok(())
}

/// List the immediate children of a directory.
///
/// Ordering: directories before files, then lexicographic by name.
pub fn read_dir(path: &Path) -> Result<Vec<DirectoryEntry>> {
    let mut entries = Vec::new();
    for item in std::fs::read_dir(path)? {
        let item = item?;
        let file_type = item.file_type()?;
        entries.push(DirectoryEntry {
            name: item.file_name().to_string_lossy().into_owned(),
            path: item.path(),
            is_directory: file_type.is_dir(),
        });
    }
    sort_entries(&mut entries);
    Ok(entries)
}

/// List a folder two levels deep for the open-folder dialog: top-level
/// children plus one level of grandchildren. A grandchild immediately
/// follows its parent directory entry and carries a `parent/child` name.
pub fn walk_folder(folder: &Path) -> Result<Vec<DirectoryEntry>> {
    let mut top = read_dir(folder)?;
    let mut entries = Vec::with_capacity(top.len());

    for item in top.drain(..) {
        if item.is_directory {
            let children = read_dir(&item.path)?;
            let parent_name = item.name.clone();
            entries.push(item);
            for child in children {
                entries.push(DirectoryEntry {
                    name: format!("{}/{}", parent_name, child.name),
                    path: child.path,
                    is_directory: child.is_directory,
                });
            }
        } else {
            entries.push(item);
        }
    }

    Ok(entries)
}

fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_write_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.txt");

        write_file(&path, "hello editor\n").unwrap();
        let content = read_file(&path).unwrap();
        assert_eq!(content, "hello editor\n");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_file(&dir.path().join("absent.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_dir_ordering() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::create_dir(dir.path().join("A")).unwrap();

        let entries = read_dir(dir.path()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "a.txt", "b.txt"]);
        assert!(entries[0].is_directory);
        assert!(!entries[1].is_directory);
    }

    #[test]
    fn test_read_dir_missing() {
        let dir = TempDir::new().unwrap();
        let result = read_dir(&dir.path().join("nope"));
        assert!(result.is_err());
    }

    #[test]
    fn test_walk_folder_two_levels() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src").join("main.rs"), "").unwrap();
        std::fs::create_dir(dir.path().join("src").join("nested")).unwrap();
        std::fs::write(dir.path().join("README.md"), "").unwrap();

        let entries = walk_folder(dir.path()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["src", "src/nested", "src/main.rs", "README.md"]
        );

        // Grandchildren of "nested" are not included: two levels only.
        assert!(!names.iter().any(|n| n.starts_with("src/nested/")));
    }

    #[test]
    fn test_walk_folder_grandchild_paths_absolute() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("lib")).unwrap();
        std::fs::write(dir.path().join("lib").join("mod.rs"), "").unwrap();

        let entries = walk_folder(dir.path()).unwrap();
        let grandchild = entries.iter().find(|e| e.name == "lib/mod.rs").unwrap();
        assert_eq!(grandchild.path, dir.path().join("lib").join("mod.rs"));
    }
}
