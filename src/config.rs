//! Configuration types for Markdown-to-Word conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across worker tasks and to log exactly what a
//! run was asked to do.
//!
//! The default input/output folder names ([`DEFAULT_INPUT_DIR`],
//! [`DEFAULT_OUTPUT_DIR`]) are CLI conveniences; the library itself always
//! takes explicit paths.

use crate::error::Md2DocxError;
use crate::pipeline::render::DocumentRenderer;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Folder read when the CLI is started without arguments.
pub const DEFAULT_INPUT_DIR: &str = "x-INPUT";

/// Folder written when the CLI is started without arguments.
pub const DEFAULT_OUTPUT_DIR: &str = "x-OUTPUT";

/// Configuration for a Markdown-to-Word conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_md2docx::{ConversionConfig, OutputFormat};
///
/// let config = ConversionConfig::builder()
///     .concurrency(4)
///     .format(OutputFormat::Docx)
///     .converter_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Documents converted at the same time. Default: 1 (sequential).
    ///
    /// Each document owns its content, scratch directory and output file, so
    /// raising this is safe; failures stay isolated per document either way.
    pub concurrency: usize,

    /// File extensions (without the dot, compared case-insensitively) that
    /// mark a file as Markdown. Default: `["md"]`.
    pub markdown_extensions: Vec<String>,

    /// Output document format. Default: [`OutputFormat::Docx`].
    pub format: OutputFormat,

    /// Explicit pandoc executable. If None, located via `pandoc-locate`.
    pub pandoc_path: Option<PathBuf>,

    /// Style template passed as `--reference-doc`.
    pub reference_doc: Option<PathBuf>,

    /// Keep source line breaks instead of letting pandoc reflow paragraphs.
    /// Default: true (`--wrap=preserve`).
    pub preserve_line_breaks: bool,

    /// Let pandoc fetch any remaining remote media into a scratch directory
    /// that is removed after each document. Default: true.
    pub extract_remote_media: bool,

    /// Per-document converter timeout in seconds. Default: 120.
    pub converter_timeout_secs: u64,

    /// Additional arguments appended verbatim to the converter command line.
    pub extra_args: Vec<String>,

    /// Pre-constructed renderer. Takes precedence over `pandoc_path`.
    pub renderer: Option<Arc<dyn DocumentRenderer>>,

    /// Optional per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            markdown_extensions: vec!["md".to_string()],
            format: OutputFormat::default(),
            pandoc_path: None,
            reference_doc: None,
            preserve_line_breaks: true,
            extract_remote_media: true,
            converter_timeout_secs: 120,
            extra_args: Vec::new(),
            renderer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("concurrency", &self.concurrency)
            .field("markdown_extensions", &self.markdown_extensions)
            .field("format", &self.format)
            .field("pandoc_path", &self.pandoc_path)
            .field("reference_doc", &self.reference_doc)
            .field("preserve_line_breaks", &self.preserve_line_breaks)
            .field("extract_remote_media", &self.extract_remote_media)
            .field("converter_timeout_secs", &self.converter_timeout_secs)
            .field("extra_args", &self.extra_args)
            .field("renderer", &self.renderer.as_ref().map(|r| r.name().to_string()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// True when `extension` is one of the configured Markdown extensions.
    pub fn is_markdown_extension(&self, extension: &str) -> bool {
        self.markdown_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    /// Replace the Markdown extension list. Leading dots are stripped.
    pub fn markdown_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.markdown_extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn pandoc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pandoc_path = Some(path.into());
        self
    }

    pub fn reference_doc(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.reference_doc = Some(path.into());
        self
    }

    pub fn preserve_line_breaks(mut self, v: bool) -> Self {
        self.config.preserve_line_breaks = v;
        self
    }

    pub fn extract_remote_media(mut self, v: bool) -> Self {
        self.config.extract_remote_media = v;
        self
    }

    pub fn converter_timeout_secs(mut self, secs: u64) -> Self {
        self.config.converter_timeout_secs = secs;
        self
    }

    pub fn extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn DocumentRenderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    /// Set a progress callback to receive per-document events.
    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2DocxError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(Md2DocxError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.markdown_extensions.iter().all(|e| e.is_empty()) {
            return Err(Md2DocxError::InvalidConfig(
                "At least one Markdown extension is required".into(),
            ));
        }
        if c.converter_timeout_secs == 0 {
            return Err(Md2DocxError::InvalidConfig(
                "Converter timeout must be ≥ 1 second".into(),
            ));
        }
        if let Some(ref doc) = c.reference_doc {
            if !doc.is_file() {
                return Err(Md2DocxError::InvalidConfig(format!(
                    "Reference document '{}' does not exist",
                    doc.display()
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Word-processor format written for each input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Office Open XML (Microsoft Word). (default)
    #[default]
    Docx,
    /// OpenDocument Text (LibreOffice Writer).
    Odt,
}

impl OutputFormat {
    /// File extension of the produced document, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Odt => "odt",
        }
    }

    /// Writer name understood by pandoc's `-t` flag.
    pub fn pandoc_writer(self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Odt => "odt",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sequential_docx() {
        let c = ConversionConfig::default();
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.format, OutputFormat::Docx);
        assert!(c.preserve_line_breaks);
        assert!(c.is_markdown_extension("md"));
        assert!(c.is_markdown_extension("MD"));
        assert!(!c.is_markdown_extension("txt"));
    }

    #[test]
    fn builder_clamps_concurrency() {
        let c = ConversionConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn builder_strips_extension_dots() {
        let c = ConversionConfig::builder()
            .markdown_extensions([".md", "markdown"])
            .build()
            .unwrap();
        assert!(c.is_markdown_extension("Markdown"));
        assert!(c.is_markdown_extension("md"));
    }

    #[test]
    fn builder_rejects_empty_extensions() {
        let err = ConversionConfig::builder()
            .markdown_extensions(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, Md2DocxError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        assert!(ConversionConfig::builder()
            .converter_timeout_secs(0)
            .build()
            .is_err());
    }

    #[test]
    fn builder_rejects_missing_reference_doc() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConversionConfig::builder()
            .reference_doc(dir.path().join("style.docx"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("style.docx"), "got: {err}");
    }

    #[test]
    fn output_format_names() {
        assert_eq!(OutputFormat::Docx.extension(), "docx");
        assert_eq!(OutputFormat::Odt.pandoc_writer(), "odt");
        assert_eq!(OutputFormat::Odt.to_string(), "odt");
    }
}
