//! Local file matcher: case-insensitive lookup in a single directory.
//!
//! The lookup is an explicit scan over the directory listing with both
//! names lowercased, never a `Path::exists` probe, so `Local.PNG` is found
//! for `local.png` on case-sensitive filesystems too.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Return the first entry of `directory` whose name equals `file_name`
/// ignoring case. Only immediate entries are considered; subdirectories are
/// skipped. An unreadable directory yields `None`.
pub fn find_local_match(file_name: &str, directory: &Path) -> Option<PathBuf> {
    DirectoryListing::scan(directory).find(file_name)
}

/// Snapshot of one directory's non-directory entries, in listing order.
///
/// Lets the rewriter read the directory once per document instead of once
/// per image reference.
#[derive(Debug, Default)]
pub struct DirectoryListing {
    entries: Vec<(String, PathBuf)>,
}

impl DirectoryListing {
    /// Read `directory`. Errors are logged and produce an empty listing.
    pub fn scan(directory: &Path) -> Self {
        let read = match fs::read_dir(directory) {
            Ok(r) => r,
            Err(e) => {
                debug!("Cannot list {}: {}", directory.display(), e);
                return Self::default();
            }
        };

        let entries = read
            .filter_map(Result::ok)
            .filter(|entry| !entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|entry| {
                let folded = entry.file_name().to_string_lossy().to_lowercase();
                (folded, entry.path())
            })
            .collect();

        Self { entries }
    }

    pub fn find(&self, file_name: &str) -> Option<PathBuf> {
        if file_name.is_empty() {
            return None;
        }
        let wanted = file_name.to_lowercase();
        self.entries
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, path)| path.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn exact_name_matches() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("local.jpg")).unwrap();
        assert_eq!(
            find_local_match("local.jpg", dir.path()),
            Some(dir.path().join("local.jpg"))
        );
    }

    #[test]
    fn match_ignores_case_and_returns_on_disk_name() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("Local.PNG")).unwrap();
        assert_eq!(
            find_local_match("local.png", dir.path()),
            Some(dir.path().join("Local.PNG"))
        );
    }

    #[test]
    fn different_extension_does_not_match() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("local.jpeg")).unwrap();
        assert_eq!(find_local_match("local.jpg", dir.path()), None);
        assert_eq!(find_local_match("local", dir.path()), None);
    }

    #[test]
    fn lookup_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("images")).unwrap();
        File::create(dir.path().join("images").join("deep.png")).unwrap();
        assert_eq!(find_local_match("deep.png", dir.path()), None);
    }

    #[test]
    fn directories_are_not_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("figure.png")).unwrap();
        assert_eq!(find_local_match("figure.png", dir.path()), None);
    }

    #[test]
    fn missing_directory_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_local_match("a.png", &dir.path().join("nope")), None);
    }

    #[test]
    fn empty_name_never_matches() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.png")).unwrap();
        assert_eq!(find_local_match("", dir.path()), None);
    }

    #[test]
    fn listing_reuses_single_scan() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.png")).unwrap();
        File::create(dir.path().join("B.gif")).unwrap();
        let listing = DirectoryListing::scan(dir.path());
        assert_eq!(listing.len(), 2);
        assert!(listing.find("A.PNG").is_some());
        assert!(listing.find("b.GIF").is_some());
        assert!(listing.find("c.png").is_none());
    }
}
