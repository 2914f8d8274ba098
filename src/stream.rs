//! Streaming conversion API: emit documents as they complete.
//!
//! Unlike the eager [`crate::convert::convert`], which returns only after the
//! whole batch finishes, [`convert_stream`] yields each [`DocumentResult`] as
//! soon as its document is done. With `concurrency > 1` results arrive in
//! completion order; sort by `source` if order matters.

use crate::config::ConversionConfig;
use crate::convert::{convert_tracked, reject_tracked, report_document, resolve_renderer};
use crate::error::{DocumentError, Md2DocxError};
use crate::output::DocumentResult;
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::render::DocumentRenderer;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-document results.
pub type DocumentStream = Pin<Box<dyn Stream<Item = DocumentResult> + Send>>;

/// Convert a file or folder, streaming one result per document.
///
/// Batch-level progress events (`on_batch_start`/`on_batch_complete`) are
/// not emitted; per-document events are.
///
/// # Returns
/// - `Ok(DocumentStream)` — one item per attempted document; an empty
///   folder gives an empty stream
/// - `Err(Md2DocxError)` — fatal error (input missing, output directory not
///   creatable, no converter)
///
/// # Example
/// ```rust,no_run
/// use edgequake_md2docx::{convert_stream, ConversionConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut docs = convert_stream("notes", "word", &ConversionConfig::default()).await?;
/// while let Some(doc) = docs.next().await {
///     match doc.error {
///         None => println!("{} done", doc.source.display()),
///         Some(e) => eprintln!("{}: {e}", doc.source.display()),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn convert_stream(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DocumentStream, Md2DocxError> {
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();
    info!("Starting streaming conversion: {}", input.display());

    let resolved = input::resolve_input(input, config)?;
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| Md2DocxError::OutputDirFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    let files = resolved.documents();
    if files.is_empty() {
        return Ok(Box::pin(stream::empty::<DocumentResult>()));
    }

    if let ResolvedInput::File(path) = resolved {
        if !input::is_markdown_file(&path, config) {
            let result = DocumentResult::failed(
                path.clone(),
                DocumentError::NotAMarkdownFile { path },
                0,
            );
            report_document(&result, config);
            return Ok(Box::pin(stream::once(async move { result })));
        }
    }

    let renderer = resolve_renderer(config)?;
    Ok(document_stream(
        files,
        output_dir.to_path_buf(),
        renderer,
        config.clone(),
    ))
}

/// Run `files` through the renderer, at most `config.concurrency` at a time.
///
/// Each document is isolated: it owns its content, scratch space and output
/// path, and its failure becomes its own [`DocumentResult`]. A destination is
/// written by the first file that maps to it; later ones fail with
/// [`DocumentError::OutputCollision`].
pub(crate) fn document_stream(
    files: Vec<PathBuf>,
    output_dir: PathBuf,
    renderer: Arc<dyn DocumentRenderer>,
    config: ConversionConfig,
) -> DocumentStream {
    let total = files.len();
    let concurrency = config.concurrency.max(1);
    let mut collisions = input::output_collisions(&files, &output_dir, &config);

    let s = stream::iter(files.into_iter().enumerate().map(move |(i, source)| {
        let renderer = Arc::clone(&renderer);
        let config = config.clone();
        let output_dir = output_dir.clone();
        let collision = collisions.remove(&source);
        async move {
            match collision {
                Some(error) => reject_tracked(&source, i + 1, total, error, &config),
                None => {
                    convert_tracked(&source, i + 1, total, &output_dir, renderer.as_ref(), &config)
                        .await
                }
            }
        }
    }))
    .buffer_unordered(concurrency);

    Box::pin(s)
}
