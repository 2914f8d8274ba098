//! Error types for the edgequake-md2docx library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Md2DocxError`] — **Fatal**: the run cannot proceed at all (input path
//!   missing, output directory not creatable, no converter installed).
//!   Returned as `Err(Md2DocxError)` from the top-level `convert*` functions.
//!
//! * [`DocumentError`] — **Non-fatal**: a single document failed (output file
//!   open in Word, pandoc rejected the input) but its siblings are fine.
//!   Stored inside [`crate::output::DocumentResult`] so a batch always
//!   finishes and reports every file.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-md2docx library.
///
/// Per-document failures use [`DocumentError`] and are stored in
/// [`crate::output::DocumentResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Md2DocxError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file or directory does not exist.
    #[error("Input path '{path}' does not exist.")]
    InputNotFound { path: PathBuf },

    /// Input exists but is neither a regular file nor a directory.
    #[error("'{path}' is neither a file nor a directory.")]
    UnsupportedInput { path: PathBuf },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create the output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Converter errors ──────────────────────────────────────────────────
    /// No document converter could be located.
    #[error("Document converter is not available.\n{hint}")]
    ConverterUnavailable { hint: String },

    // ── Batch outcome ─────────────────────────────────────────────────────
    /// Some documents converted but at least one failed.
    ///
    /// Returned by [`crate::output::BatchOutput::into_result`] when the
    /// caller wants to treat any per-document failure as an error.
    #[error("{failed}/{total} documents failed to convert")]
    PartialFailure {
        converted: usize,
        failed: usize,
        total: usize,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document.
///
/// Stored alongside [`crate::output::DocumentResult`] when a document fails.
/// The batch always continues with the next document.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// Single-file mode was given something without a Markdown extension.
    #[error("\"{path}\" is not a Markdown file.")]
    NotAMarkdownFile { path: PathBuf },

    /// The Markdown source could not be read (permissions, invalid UTF-8).
    #[error("Failed to read '{path}': {detail}")]
    ReadFailed { path: PathBuf, detail: String },

    /// The destination exists and cannot be rewritten — usually open elsewhere.
    #[error("Unable to write to \"{path}\" - you probably have it open!")]
    OutputLocked { path: PathBuf },

    /// An earlier document in the batch already writes this destination,
    /// e.g. `notes.md` and `notes.MD` side by side.
    #[error("\"{path}\" is already written from '{with}'")]
    OutputCollision { path: PathBuf, with: PathBuf },

    /// The converter exited unsuccessfully; `diagnostic` carries its output.
    #[error("Converter failed for '{path}': {diagnostic}")]
    ConversionFailed { path: PathBuf, diagnostic: String },

    /// The converter did not finish within the configured timeout.
    #[error("Converter timed out after {secs}s for '{path}'")]
    ConverterTimeout { path: PathBuf, secs: u64 },

    /// Scratch files for the conversion could not be prepared.
    #[error("Failed to stage conversion: {detail}")]
    Staging { detail: String },
}

impl DocumentError {
    /// Short machine-friendly tag, used in JSON reports and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentError::NotAMarkdownFile { .. } => "not_markdown",
            DocumentError::ReadFailed { .. } => "read_failed",
            DocumentError::OutputLocked { .. } => "output_locked",
            DocumentError::OutputCollision { .. } => "output_collision",
            DocumentError::ConversionFailed { .. } => "conversion_failed",
            DocumentError::ConverterTimeout { .. } => "converter_timeout",
            DocumentError::Staging { .. } => "staging",
        }
    }
}
