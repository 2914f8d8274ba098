//! Eager (whole-batch) conversion entry points.
//!
//! [`convert`] waits for every document, then returns a [`BatchOutput`]
//! sorted by source path. Use [`crate::stream::convert_stream`] instead to
//! receive each [`DocumentResult`] as soon as it finishes.
//!
//! A document's failure never stops the batch: it is recorded in its
//! [`DocumentResult`] and the remaining files carry on. Only problems with
//! the input path, the output directory or the converter itself are fatal.

use crate::config::ConversionConfig;
use crate::error::{DocumentError, Md2DocxError};
use crate::output::{BatchOutput, BatchStats, DocumentPreview, DocumentResult, ImageStats};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::render::{DocumentRenderer, PandocRenderer, RenderRequest};
use crate::pipeline::rewrite::{self, RewrittenMarkdown};
use crate::pipeline::lock;
use crate::stream::document_stream;
use futures::stream::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a Markdown file, or every Markdown file in a folder, to Word.
///
/// # Arguments
/// * `input`      — a `.md` file or a directory (not searched recursively)
/// * `output_dir` — created if absent; one document per input, same stem
/// * `config`     — conversion configuration
///
/// # Returns
/// `Ok(BatchOutput)` even if some documents failed (check
/// `output.stats.failed`, or call [`BatchOutput::into_result`]). A folder
/// without Markdown files yields an empty batch.
///
/// # Errors
/// Returns `Err(Md2DocxError)` only for fatal errors:
/// - input path missing or not a file/directory
/// - output directory cannot be created
/// - no converter available while there is something to convert
///
/// # Example
/// ```rust,no_run
/// use edgequake_md2docx::{convert, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let output = convert("notes", "word", &ConversionConfig::default()).await?;
/// for doc in output.failures() {
///     eprintln!("{}: {}", doc.source.display(), doc.error.as_ref().unwrap());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn convert(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchOutput, Md2DocxError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();
    info!("Starting conversion: {}", input.display());

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input, config)?;

    // ── Step 2: Output directory ─────────────────────────────────────────
    ensure_output_dir(output_dir).await?;

    let files = resolved.documents();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(files.len());
    }

    // ── Step 3: Nothing to do ────────────────────────────────────────────
    if files.is_empty() {
        info!("No Markdown files found in {}", input.display());
        return Ok(finish(input, output_dir, Vec::new(), total_start, config));
    }

    // A lone non-Markdown file is reported without needing a converter.
    if let ResolvedInput::File(ref path) = resolved {
        if !input::is_markdown_file(path, config) {
            let result = DocumentResult::failed(
                path.clone(),
                DocumentError::NotAMarkdownFile { path: path.clone() },
                0,
            );
            report_document(&result, config);
            return Ok(finish(input, output_dir, vec![result], total_start, config));
        }
    }

    // ── Step 4: Converter ────────────────────────────────────────────────
    let renderer = resolve_renderer(config)?;
    debug!("Rendering with {}", renderer.name());

    // ── Step 5: Convert documents ────────────────────────────────────────
    let mut documents: Vec<DocumentResult> =
        document_stream(files, output_dir.to_path_buf(), renderer, config.clone())
            .collect()
            .await;

    // Completion order depends on concurrency; report in file order.
    documents.sort_by(|a, b| a.source.cmp(&b.source));

    Ok(finish(input, output_dir, documents, total_start, config))
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchOutput, Md2DocxError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Md2DocxError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, output_dir, config))
}

/// Convert one Markdown file with an already-resolved renderer.
///
/// Never fails: every problem ends up in the returned
/// [`DocumentResult::error`].
pub async fn convert_document(
    source: &Path,
    output_dir: &Path,
    renderer: &dyn DocumentRenderer,
    config: &ConversionConfig,
) -> DocumentResult {
    let start = Instant::now();
    match render_document(source, output_dir, renderer, config).await {
        Ok((output, images)) => {
            info!(
                "Converted {} → {} ({} embedded, {} placeholder)",
                source.display(),
                output.display(),
                images.embedded,
                images.placeholders
            );
            DocumentResult {
                source: source.to_path_buf(),
                output: Some(output),
                images,
                duration_ms: start.elapsed().as_millis() as u64,
                error: None,
            }
        }
        Err(e) => {
            warn!("Failed to convert {}: {}", source.display(), e);
            DocumentResult::failed(
                source.to_path_buf(),
                e,
                start.elapsed().as_millis() as u64,
            )
        }
    }
}

/// Rewrite image references without running the converter.
///
/// Reads each document, applies the same rewriting and destination checks as
/// [`convert`], and returns what would be handed to the converter. Does not
/// create `output_dir` and does not need pandoc.
pub async fn preview(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Vec<DocumentPreview>, Md2DocxError> {
    let resolved = input::resolve_input(input.as_ref(), config)?;
    let output_dir = output_dir.as_ref();

    let files = resolved.documents();
    let mut collisions = input::output_collisions(&files, output_dir, config);

    let mut previews = Vec::new();
    for source in files {
        let output = input::output_path_for(&source, output_dir, config);
        let collision = collisions.remove(&source);
        let preview = match prepare_document(&source, output_dir, config).await {
            Ok(prepared) => DocumentPreview {
                error: collision
                    .or_else(|| lock::ensure_output_writable(&prepared.output_path).err()),
                source,
                output,
                images: prepared.image_stats(),
                markdown: Some(prepared.rewritten.markdown),
            },
            Err(e) => DocumentPreview {
                source,
                output,
                images: ImageStats::default(),
                markdown: None,
                error: Some(e),
            },
        };
        previews.push(preview);
    }
    Ok(previews)
}

/// The configured renderer, or pandoc located on this machine.
pub fn resolve_renderer(config: &ConversionConfig) -> Result<Arc<dyn DocumentRenderer>, Md2DocxError> {
    if let Some(ref renderer) = config.renderer {
        return Ok(Arc::clone(renderer));
    }
    Ok(Arc::new(PandocRenderer::locate(config)?))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// A document read and rewritten, ready for the converter.
struct PreparedDocument {
    output_path: PathBuf,
    resource_dir: PathBuf,
    rewritten: RewrittenMarkdown,
}

impl PreparedDocument {
    fn image_stats(&self) -> ImageStats {
        ImageStats {
            remote_refs: self.rewritten.substitutions(),
            embedded: self.rewritten.embedded,
            placeholders: self.rewritten.placeholders,
        }
    }
}

async fn prepare_document(
    source: &Path,
    output_dir: &Path,
    config: &ConversionConfig,
) -> Result<PreparedDocument, DocumentError> {
    if !input::is_markdown_file(source, config) {
        return Err(DocumentError::NotAMarkdownFile {
            path: source.to_path_buf(),
        });
    }

    let content = tokio::fs::read_to_string(source)
        .await
        .map_err(|e| DocumentError::ReadFailed {
            path: source.to_path_buf(),
            detail: e.to_string(),
        })?;

    // Directory listing is blocking I/O.
    let resource_dir = document_dir(source);
    let rewritten = tokio::task::spawn_blocking({
        let dir = resource_dir.clone();
        move || rewrite::rewrite_images_with_stats(&content, &dir)
    })
    .await
    .map_err(|e| DocumentError::Staging {
        detail: format!("image rewrite task: {e}"),
    })?;

    Ok(PreparedDocument {
        output_path: input::output_path_for(source, output_dir, config),
        resource_dir,
        rewritten,
    })
}

async fn render_document(
    source: &Path,
    output_dir: &Path,
    renderer: &dyn DocumentRenderer,
    config: &ConversionConfig,
) -> Result<(PathBuf, ImageStats), DocumentError> {
    let prepared = prepare_document(source, output_dir, config).await?;
    lock::ensure_output_writable(&prepared.output_path)?;

    renderer
        .render(RenderRequest {
            source,
            markdown: &prepared.rewritten.markdown,
            resource_dir: &prepared.resource_dir,
            output_path: &prepared.output_path,
        })
        .await?;

    let images = prepared.image_stats();
    Ok((prepared.output_path, images))
}

/// [`convert_document`] wrapped in progress events.
pub(crate) async fn convert_tracked(
    source: &Path,
    index: usize,
    total: usize,
    output_dir: &Path,
    renderer: &dyn DocumentRenderer,
    config: &ConversionConfig,
) -> DocumentResult {
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(source, index, total);
    }
    let result = convert_document(source, output_dir, renderer, config).await;
    report_document(&result, config);
    result
}

/// Fail `source` without converting it, emitting the same progress events.
pub(crate) fn reject_tracked(
    source: &Path,
    index: usize,
    total: usize,
    error: DocumentError,
    config: &ConversionConfig,
) -> DocumentResult {
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(source, index, total);
    }
    warn!("Skipping {}: {}", source.display(), error);
    let result = DocumentResult::failed(source.to_path_buf(), error, 0);
    report_document(&result, config);
    result
}

pub(crate) fn report_document(result: &DocumentResult, config: &ConversionConfig) {
    let Some(ref cb) = config.progress_callback else {
        return;
    };
    match (&result.output, &result.error) {
        (Some(output), None) => {
            cb.on_document_complete(&result.source, output, result.images.remote_refs)
        }
        (_, Some(e)) => cb.on_document_error(&result.source, &e.to_string()),
        (None, None) => {}
    }
}

/// Absolute directory holding `source`; embeds and `--resource-path` use it.
fn document_dir(source: &Path) -> PathBuf {
    let parent = match source.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::path::absolute(parent).unwrap_or_else(|_| parent.to_path_buf())
}

async fn ensure_output_dir(output_dir: &Path) -> Result<(), Md2DocxError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| Md2DocxError::OutputDirFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })
}

fn finish(
    input: &Path,
    output_dir: &Path,
    documents: Vec<DocumentResult>,
    started: Instant,
    config: &ConversionConfig,
) -> BatchOutput {
    let stats = BatchStats::from_documents(&documents, started.elapsed().as_millis() as u64);
    info!(
        "Conversion complete: {}/{} documents, {}ms total",
        stats.converted, stats.total_documents, stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(stats.total_documents, stats.converted);
    }
    BatchOutput {
        input: input.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        documents,
        stats,
    }
}
