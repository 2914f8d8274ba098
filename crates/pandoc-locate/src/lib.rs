//! # pandoc-locate
//!
//! Find a usable [pandoc](https://pandoc.org/) executable so that callers
//! never have to hard-code where it was installed.
//!
//! ## How it works
//!
//! [`locate_pandoc`] walks the following sources, first hit wins:
//!
//! 1. An explicit path handed in by the caller (e.g. a `--pandoc` flag).
//! 2. `PANDOC_PATH` — path to an existing pandoc binary.
//! 3. The `PATH` search performed by the [`which`] crate.
//! 4. Well-known install locations (Homebrew, the Windows MSI installer,
//!    `~/.local/bin`, `~/.cabal/bin`).
//!
//! The first successful lookup without an explicit path is cached for the
//! lifetime of the process.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pandoc_locate::{locate_pandoc, pandoc_version};
//!
//! let pandoc = locate_pandoc(None).expect("pandoc not installed");
//! let version = pandoc_version(&pandoc).expect("version probe failed");
//! println!("using {} ({version})", pandoc.display());
//! ```
//!
//! ## Environment variable overrides
//!
//! - `PANDOC_PATH` — path to an existing pandoc executable; skips the search.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Environment variable pointing at an explicit pandoc executable.
pub const PANDOC_PATH_ENV: &str = "PANDOC_PATH";

/// Executable name searched on `PATH`.
#[cfg(windows)]
pub const PANDOC_BIN: &str = "pandoc.exe";
#[cfg(not(windows))]
pub const PANDOC_BIN: &str = "pandoc";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by pandoc-locate operations.
#[derive(Error, Debug)]
pub enum LocateError {
    /// An explicitly requested path does not point at a file.
    #[error("pandoc not found at '{path}'")]
    Missing { path: PathBuf },

    /// Nothing usable on `PATH` or in any well-known location.
    #[error("pandoc executable not found (searched PATH and {} install locations)", searched.len())]
    NotFound { searched: Vec<PathBuf> },

    /// The binary exists but `pandoc --version` could not be run or parsed.
    #[error("Failed to probe pandoc version at '{path}': {reason}")]
    VersionProbe { path: PathBuf, reason: String },
}

// ── Thread-safe singleton path cache ─────────────────────────────────────────

static RESOLVED_PATH: OnceLock<PathBuf> = OnceLock::new();

// ── Public API ───────────────────────────────────────────────────────────────

/// Resolve the pandoc executable.
///
/// An `explicit` path is checked as-is and never cached; otherwise the
/// `PANDOC_PATH` → `PATH` → well-known-location chain is walked once and the
/// answer memoised.
pub fn locate_pandoc(explicit: Option<&Path>) -> Result<PathBuf, LocateError> {
    if let Some(path) = explicit {
        return check_explicit(path);
    }

    if let Some(p) = RESOLVED_PATH.get() {
        return Ok(p.clone());
    }

    let found = search()?;
    Ok(RESOLVED_PATH.get_or_init(|| found).clone())
}

/// Returns `true` if [`locate_pandoc`] would succeed without an explicit path.
pub fn is_pandoc_available() -> bool {
    locate_pandoc(None).is_ok()
}

/// Run `pandoc --version` and return the version string from its first line.
///
/// pandoc prints `pandoc 3.1.11` (older builds: `pandoc.exe 2.19`), so the
/// version is the second whitespace-separated token of that line.
pub fn pandoc_version(pandoc: &Path) -> Result<String, LocateError> {
    let output = Command::new(pandoc)
        .arg("--version")
        .output()
        .map_err(|e| LocateError::VersionProbe {
            path: pandoc.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(LocateError::VersionProbe {
            path: pandoc.to_path_buf(),
            reason: format!("exit status {}", output.status),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_version_line(&stdout).ok_or_else(|| LocateError::VersionProbe {
        path: pandoc.to_path_buf(),
        reason: "unrecognised --version output".to_string(),
    })
}

/// Candidate install locations checked after `PATH`, in order.
pub fn well_known_locations() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    #[cfg(windows)]
    {
        if let Some(local) = dirs::data_local_dir() {
            candidates.push(local.join("Pandoc").join(PANDOC_BIN));
        }
        if let Ok(program_files) = std::env::var("ProgramFiles") {
            candidates.push(PathBuf::from(program_files).join("Pandoc").join(PANDOC_BIN));
        }
    }

    #[cfg(not(windows))]
    {
        candidates.push(PathBuf::from("/opt/homebrew/bin").join(PANDOC_BIN));
        candidates.push(PathBuf::from("/usr/local/bin").join(PANDOC_BIN));
        candidates.push(PathBuf::from("/usr/bin").join(PANDOC_BIN));
    }

    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join(PANDOC_BIN));
        candidates.push(home.join(".cabal").join("bin").join(PANDOC_BIN));
    }

    candidates
}

// ── Internals ────────────────────────────────────────────────────────────────

fn check_explicit(path: &Path) -> Result<PathBuf, LocateError> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        // Bare names such as "pandoc-3" are resolved through PATH.
        if path.components().count() == 1 {
            if let Ok(found) = which::which(path) {
                return Ok(found);
            }
        }
        Err(LocateError::Missing {
            path: path.to_path_buf(),
        })
    }
}

fn search() -> Result<PathBuf, LocateError> {
    if let Ok(p) = std::env::var(PANDOC_PATH_ENV) {
        if !p.is_empty() {
            return check_explicit(Path::new(&p));
        }
    }

    if let Ok(found) = which::which(PANDOC_BIN) {
        return Ok(found);
    }

    let searched = well_known_locations();
    if let Some(found) = searched.iter().find(|p| p.is_file()).cloned() {
        return Ok(found);
    }
    Err(LocateError::NotFound { searched })
}

fn parse_version_line(stdout: &str) -> Option<String> {
    let first = stdout.lines().next()?.trim();
    if !first.starts_with("pandoc") {
        return None;
    }
    first.split_whitespace().nth(1).map(str::to_string)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_version_from_first_line() {
        let out = "pandoc 3.1.11\nFeatures: +server +lua\nScripting engine: Lua 5.4\n";
        assert_eq!(parse_version_line(out).as_deref(), Some("3.1.11"));
    }

    #[test]
    fn parse_version_windows_binary_name() {
        assert_eq!(
            parse_version_line("pandoc.exe 2.19.2\r\n").as_deref(),
            Some("2.19.2")
        );
    }

    #[test]
    fn parse_version_rejects_foreign_output() {
        assert_eq!(parse_version_line("Python 3.12.1"), None);
        assert_eq!(parse_version_line(""), None);
    }

    #[test]
    fn explicit_existing_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("pandoc");
        std::fs::write(&fake, b"#!/bin/sh\n").unwrap();
        assert_eq!(locate_pandoc(Some(&fake)).unwrap(), fake);
    }

    #[test]
    fn explicit_missing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-pandoc");
        let err = locate_pandoc(Some(&missing)).unwrap_err();
        assert!(matches!(err, LocateError::Missing { .. }), "got: {err}");
    }

    #[test]
    fn explicit_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(locate_pandoc(Some(dir.path())).is_err());
    }

    #[test]
    fn well_known_locations_end_with_binary_name() {
        let locations = well_known_locations();
        assert!(!locations.is_empty());
        for p in locations {
            assert_eq!(p.file_name().unwrap(), PANDOC_BIN);
        }
    }

    #[test]
    fn not_found_display_counts_locations() {
        let e = LocateError::NotFound {
            searched: vec![PathBuf::from("/a/pandoc"), PathBuf::from("/b/pandoc")],
        };
        assert!(e.to_string().contains("2 install locations"), "got: {e}");
    }
}
