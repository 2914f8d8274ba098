//! Progress-callback trait for per-document conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the batch works through its documents. The CLI uses this to
//! drive its progress bar and print one status line per file.
//!
//! # Example
//!
//! ```rust
//! use edgequake_md2docx::{ConversionProgressCallback, ConversionConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     converted: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, source: &Path, output: &Path, _images: usize) {
//!         self.converted.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} -> {}", source.display(), output.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { converted: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the batch pipeline as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// With `concurrency > 1` the per-document methods may be called from
/// several tasks at once and in completion order. Protect shared mutable
/// state with `Mutex` or atomics.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after the input is resolved and before any document runs.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document is read.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in the batch
    fn on_document_start(&self, source: &Path, index: usize, total_documents: usize) {
        let _ = (source, index, total_documents);
    }

    /// Called when a document was written successfully.
    ///
    /// # Arguments
    /// * `remote_images` — remote image references found in the source
    fn on_document_complete(&self, source: &Path, output: &Path, remote_images: usize) {
        let _ = (source, output, remote_images);
    }

    /// Called when a document failed; the batch carries on.
    fn on_document_error(&self, source: &Path, error: &str) {
        let _ = (source, error);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, total_documents: usize, converted: usize) {
        let _ = (total_documents, converted);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_document_start(Path::new("a.md"), 1, 2);
        cb.on_document_complete(Path::new("a.md"), Path::new("a.docx"), 3);
        cb.on_document_error(Path::new("b.md"), "locked");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(1);
        cb.on_document_start(Path::new("a.md"), 1, 1);
    }
}
