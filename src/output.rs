//! Result types returned by the conversion entry points.
//!
//! Everything here is `Serialize`/`Deserialize` so the CLI can emit a batch
//! report with `--json` and callers can persist it.

use crate::error::{DocumentError, Md2DocxError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the remote image references of one document were rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStats {
    /// Remote image references found in the source.
    pub remote_refs: usize,
    /// References replaced by an embed of a same-named local file.
    pub embedded: usize,
    /// References replaced by a placeholder link to the online image.
    pub placeholders: usize,
}

/// Outcome for a single Markdown document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// The Markdown file that was attempted.
    pub source: PathBuf,
    /// Written document, set only on success.
    pub output: Option<PathBuf>,
    pub images: ImageStats,
    /// Wall-clock time spent on this document.
    pub duration_ms: u64,
    /// Why the document failed, if it did.
    pub error: Option<DocumentError>,
}

impl DocumentResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.output.is_some()
    }

    pub(crate) fn failed(source: PathBuf, error: DocumentError, duration_ms: u64) -> Self {
        Self {
            source,
            output: None,
            images: ImageStats::default(),
            duration_ms,
            error: Some(error),
        }
    }
}

/// What converting one document would do, computed without running the
/// converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPreview {
    pub source: PathBuf,
    /// Where the document would be written.
    pub output: PathBuf,
    pub images: ImageStats,
    /// Markdown after image rewriting; `None` when the document was rejected.
    pub markdown: Option<String>,
    /// Why the document would fail before reaching the converter.
    pub error: Option<DocumentError>,
}

/// Aggregate counters for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_documents: usize,
    pub converted: usize,
    pub failed: usize,
    /// Remote references that became local embeds, across all documents.
    pub embedded_images: usize,
    /// Remote references that became placeholder links, across all documents.
    pub placeholder_links: usize,
    pub total_duration_ms: u64,
}

impl BatchStats {
    /// Tally `documents`; `total_duration_ms` is the batch wall clock.
    pub fn from_documents(documents: &[DocumentResult], total_duration_ms: u64) -> Self {
        let converted = documents.iter().filter(|d| d.is_success()).count();
        Self {
            total_documents: documents.len(),
            converted,
            failed: documents.len() - converted,
            embedded_images: documents.iter().map(|d| d.images.embedded).sum(),
            placeholder_links: documents.iter().map(|d| d.images.placeholders).sum(),
            total_duration_ms,
        }
    }
}

/// Complete result of converting a file or a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// One entry per attempted document, sorted by source path.
    pub documents: Vec<DocumentResult>,
    pub stats: BatchStats,
}

impl BatchOutput {
    /// True when the input held no Markdown documents at all.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DocumentResult> {
        self.documents.iter().filter(|d| !d.is_success())
    }

    /// Turn any per-document failure into [`Md2DocxError::PartialFailure`].
    pub fn into_result(self) -> Result<Self, Md2DocxError> {
        if self.stats.failed > 0 {
            return Err(Md2DocxError::PartialFailure {
                converted: self.stats.converted,
                failed: self.stats.failed,
                total: self.stats.total_documents,
            });
        }
        Ok(self)
    }
}
