//! # edgequake-md2docx
//!
//! Batch-convert Markdown notes to Word documents with pandoc, fixing up
//! remote image references on the way.
//!
//! Notes exported from online editors usually point at images by their
//! upload URL, while the same files sit next to the `.md` on disk. Before a
//! document is converted, each `![alt](https://…/name.png)` is rewritten:
//!
//! * a same-named file (ignoring case) in the Markdown file's folder becomes
//!   a local embed of that file;
//! * otherwise the image becomes the link
//!   `[CLICK TO VIEW ONLINE IMAGE: (alt)](https://…/name.png)`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file or folder
//!  │
//!  ├─ 1. Input    list Markdown files (non-recursive)
//!  ├─ 2. Rewrite  remote images → local embeds / placeholder links
//!  ├─ 3. Lock     skip destinations that are open in another program
//!  ├─ 4. Render   pandoc, staged in a scratch dir, with a timeout
//!  └─ 5. Output   per-document results + batch stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_md2docx::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let output = convert("notes", "word", &ConversionConfig::default()).await?;
//!     eprintln!(
//!         "{}/{} converted, {} images embedded",
//!         output.stats.converted,
//!         output.stats.total_documents,
//!         output.stats.embedded_images
//!     );
//!     Ok(())
//! }
//! ```
//!
//! The rewriter is usable on its own:
//!
//! ```rust
//! use edgequake_md2docx::rewrite_images;
//! use std::path::Path;
//!
//! let md = "![chart](https://example.com/chart.png)";
//! assert_eq!(
//!     rewrite_images(md, Path::new("/nonexistent")),
//!     "[CLICK TO VIEW ONLINE IMAGE: (chart)](https://example.com/chart.png)"
//! );
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2docx` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-md2docx = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, OutputFormat, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
pub use convert::{convert, convert_document, convert_sync, preview, resolve_renderer};
pub use error::{DocumentError, Md2DocxError};
pub use output::{BatchOutput, BatchStats, DocumentPreview, DocumentResult, ImageStats};
pub use pipeline::matcher::find_local_match;
pub use pipeline::render::{DocumentRenderer, PandocRenderer, RenderRequest};
pub use pipeline::rewrite::{rewrite_images, rewrite_images_with_stats, RewrittenMarkdown};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_stream, DocumentStream};
