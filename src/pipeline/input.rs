//! Input resolution: turn the user-supplied path into a list of documents.
//!
//! A file is converted on its own; a directory contributes every Markdown
//! file directly inside it (no recursion). Files are returned sorted by
//! name so batch reports and logs come out in a stable order.

use crate::config::ConversionConfig;
use crate::error::{DocumentError, Md2DocxError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What the input path turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    /// A single file, Markdown or not; the batch reports non-Markdown files.
    File(PathBuf),
    /// The Markdown files found directly inside a directory.
    Directory(Vec<PathBuf>),
}

impl ResolvedInput {
    /// Documents to attempt, in order.
    pub fn documents(&self) -> Vec<PathBuf> {
        match self {
            ResolvedInput::File(p) => vec![p.clone()],
            ResolvedInput::Directory(files) => files.clone(),
        }
    }
}

/// True when `path` has one of the configured Markdown extensions.
pub fn is_markdown_file(path: &Path, config: &ConversionConfig) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| config.is_markdown_extension(e))
}

/// Classify `input` and, for directories, list their Markdown files.
pub fn resolve_input(input: &Path, config: &ConversionConfig) -> Result<ResolvedInput, Md2DocxError> {
    if !input.exists() {
        return Err(Md2DocxError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    if input.is_file() {
        debug!("Resolved single file: {}", input.display());
        return Ok(ResolvedInput::File(input.to_path_buf()));
    }

    if !input.is_dir() {
        return Err(Md2DocxError::UnsupportedInput {
            path: input.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(input).map_err(|e| {
        Md2DocxError::Internal(format!("Failed to list '{}': {e}", input.display()))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_markdown_file(p, config))
        .collect();
    files.sort();

    debug!("Found {} Markdown files in {}", files.len(), input.display());
    Ok(ResolvedInput::Directory(files))
}

/// Destination for `source`: same stem, format extension, inside `output_dir`.
pub fn output_path_for(source: &Path, output_dir: &Path, config: &ConversionConfig) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "document".into());
    let mut path = output_dir.join(stem);
    path.set_extension(config.format.extension());
    path
}

/// Documents whose destination is already claimed by an earlier entry of
/// `files`, keyed by source. Only the first claimant may write a destination.
pub fn output_collisions(
    files: &[PathBuf],
    output_dir: &Path,
    config: &ConversionConfig,
) -> HashMap<PathBuf, DocumentError> {
    let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::new();
    let mut collisions = HashMap::new();
    for source in files {
        let output = output_path_for(source, output_dir, config);
        match claimed.get(&output) {
            Some(&first) => {
                debug!("{} collides with {}", source.display(), first.display());
                collisions.insert(
                    source.clone(),
                    DocumentError::OutputCollision {
                        path: output,
                        with: first.clone(),
                    },
                );
            }
            None => {
                claimed.insert(output, source);
            }
        }
    }
    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use std::fs::File;

    #[test]
    fn markdown_extension_is_case_insensitive() {
        let c = ConversionConfig::default();
        assert!(is_markdown_file(Path::new("a.md"), &c));
        assert!(is_markdown_file(Path::new("dir/B.MD"), &c));
        assert!(!is_markdown_file(Path::new("c.txt"), &c));
        assert!(!is_markdown_file(Path::new("md"), &c));
        assert!(!is_markdown_file(Path::new("a.md.bak"), &c));
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_input(&dir.path().join("nope"), &ConversionConfig::default()).unwrap_err();
        assert!(matches!(err, Md2DocxError::InputNotFound { .. }));
    }

    #[test]
    fn single_file_is_kept_even_if_not_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        File::create(&txt).unwrap();
        let resolved = resolve_input(&txt, &ConversionConfig::default()).unwrap();
        assert_eq!(resolved, ResolvedInput::File(txt));
    }

    #[test]
    fn directory_lists_markdown_only_sorted_non_recursive() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.md", "A.MD", "c.txt", "image.png"] {
            File::create(dir.path().join(name)).unwrap();
        }
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub").join("deep.md")).unwrap();
        std::fs::create_dir(dir.path().join("folder.md")).unwrap();

        let resolved = resolve_input(dir.path(), &ConversionConfig::default()).unwrap();
        assert_eq!(
            resolved,
            ResolvedInput::Directory(vec![dir.path().join("A.MD"), dir.path().join("b.md")])
        );
    }

    #[test]
    fn empty_directory_resolves_with_no_documents() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_input(dir.path(), &ConversionConfig::default()).unwrap();
        assert!(resolved.documents().is_empty());
    }

    #[test]
    fn output_path_keeps_stem_and_swaps_extension() {
        let docx = ConversionConfig::default();
        assert_eq!(
            output_path_for(Path::new("in/Report.v2.md"), Path::new("out"), &docx),
            PathBuf::from("out/Report.v2.docx")
        );

        let odt = ConversionConfig::builder().format(OutputFormat::Odt).build().unwrap();
        assert_eq!(
            output_path_for(Path::new("notes.MD"), Path::new("out"), &odt),
            PathBuf::from("out/notes.odt")
        );
    }

    #[test]
    fn later_documents_sharing_a_destination_collide() {
        let c = ConversionConfig::default();
        let files = vec![
            PathBuf::from("in/notes.MD"),
            PathBuf::from("in/notes.md"),
            PathBuf::from("in/other.md"),
        ];
        let collisions = output_collisions(&files, Path::new("out"), &c);

        assert_eq!(collisions.len(), 1);
        assert_eq!(
            collisions[&PathBuf::from("in/notes.md")],
            DocumentError::OutputCollision {
                path: PathBuf::from("out/notes.docx"),
                with: PathBuf::from("in/notes.MD"),
            }
        );
        assert!(output_collisions(&files[1..], Path::new("out"), &c).is_empty());
    }
}
