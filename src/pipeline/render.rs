//! Document rendering: hand rewritten Markdown to the external converter.
//!
//! [`DocumentRenderer`] is the seam between the batch pipeline and whatever
//! actually produces the Word file. The shipped implementation,
//! [`PandocRenderer`], shells out to pandoc; tests plug in fakes through
//! [`crate::config::ConversionConfigBuilder::renderer`].
//!
//! ## Scratch space
//!
//! pandoc reads its input from a file, and `--extract-media` needs a
//! directory to drop any images it still downloads. Both live in one
//! `TempDir` owned by the render call, so they are removed on success,
//! failure, timeout or panic alike.

use crate::config::{ConversionConfig, OutputFormat};
use crate::error::{DocumentError, Md2DocxError};
use futures::future::BoxFuture;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

/// Everything a renderer needs for one document.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Original Markdown file, for diagnostics.
    pub source: &'a Path,
    /// Markdown with image references already rewritten.
    pub markdown: &'a str,
    /// Directory relative resources are resolved against.
    pub resource_dir: &'a Path,
    /// Where the finished document must be written.
    pub output_path: &'a Path,
}

/// Turns Markdown text into a word-processor document on disk.
///
/// Implementations must be `Send + Sync`; the batch pipeline may render
/// several documents at once when `concurrency > 1`.
pub trait DocumentRenderer: Send + Sync {
    /// Short name for logs, e.g. `"pandoc"`.
    fn name(&self) -> &str;

    /// Render `request.markdown` into `request.output_path`.
    fn render<'a>(&'a self, request: RenderRequest<'a>) -> BoxFuture<'a, Result<(), DocumentError>>;
}

/// Renderer backed by the pandoc executable.
#[derive(Debug, Clone)]
pub struct PandocRenderer {
    program: PathBuf,
    format: OutputFormat,
    preserve_line_breaks: bool,
    extract_remote_media: bool,
    reference_doc: Option<PathBuf>,
    timeout: Duration,
    extra_args: Vec<String>,
}

impl PandocRenderer {
    /// Build a renderer for `program` using the options in `config`.
    pub fn new(program: impl Into<PathBuf>, config: &ConversionConfig) -> Self {
        Self {
            program: program.into(),
            format: config.format,
            preserve_line_breaks: config.preserve_line_breaks,
            extract_remote_media: config.extract_remote_media,
            reference_doc: config.reference_doc.clone(),
            timeout: Duration::from_secs(config.converter_timeout_secs),
            extra_args: config.extra_args.clone(),
        }
    }

    /// Locate pandoc (explicit `pandoc_path`, `PANDOC_PATH`, `PATH`, well-known
    /// install dirs) and build a renderer around it.
    pub fn locate(config: &ConversionConfig) -> Result<Self, Md2DocxError> {
        let program = pandoc_locate::locate_pandoc(config.pandoc_path.as_deref()).map_err(|e| {
            Md2DocxError::ConverterUnavailable {
                hint: format!(
                    "{e}\nInstall pandoc (https://pandoc.org/installing.html) or point \
                     --pandoc / {} at an existing binary.",
                    pandoc_locate::PANDOC_PATH_ENV
                ),
            }
        })?;

        match pandoc_locate::pandoc_version(&program) {
            Ok(v) => info!("Using pandoc {} at {}", v, program.display()),
            Err(e) => debug!("pandoc version probe failed: {}", e),
        }

        Ok(Self::new(program, config))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for one conversion.
    fn build_args(
        &self,
        staged: &Path,
        media_dir: &Path,
        request: &RenderRequest<'_>,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            staged.into(),
            "-o".into(),
            request.output_path.into(),
            "-f".into(),
            "markdown".into(),
            "-t".into(),
            self.format.pandoc_writer().into(),
            "--resource-path".into(),
            request.resource_dir.into(),
        ];

        if self.extract_remote_media {
            let mut flag = OsString::from("--extract-media=");
            flag.push(media_dir);
            args.push(flag);
        }
        if self.preserve_line_breaks {
            args.push("--wrap=preserve".into());
        }
        if let Some(ref doc) = self.reference_doc {
            let mut flag = OsString::from("--reference-doc=");
            flag.push(doc);
            args.push(flag);
        }
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    async fn run(&self, request: RenderRequest<'_>) -> Result<(), DocumentError> {
        let scratch = TempDir::new().map_err(|e| DocumentError::Staging {
            detail: format!("tempdir: {e}"),
        })?;
        let staged = scratch.path().join("document.md");
        let media_dir = scratch.path().join("media");

        tokio::fs::write(&staged, request.markdown)
            .await
            .map_err(|e| DocumentError::Staging {
                detail: format!("write {}: {e}", staged.display()),
            })?;

        let args = self.build_args(&staged, &media_dir, &request);
        debug!("{} {:?}", self.program.display(), args);

        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(DocumentError::ConversionFailed {
                    path: request.source.to_path_buf(),
                    diagnostic: format!("failed to run {}: {e}", self.program.display()),
                })
            }
            Err(_) => {
                return Err(DocumentError::ConverterTimeout {
                    path: request.source.to_path_buf(),
                    secs: self.timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            return Err(DocumentError::ConversionFailed {
                path: request.source.to_path_buf(),
                diagnostic: diagnostic_from(&output),
            });
        }

        let warnings = String::from_utf8_lossy(&output.stderr);
        if !warnings.trim().is_empty() {
            debug!("pandoc warnings for {}: {}", request.source.display(), warnings.trim());
        }

        // `scratch` drops here and takes the staged file and media with it.
        Ok(())
    }
}

impl DocumentRenderer for PandocRenderer {
    fn name(&self) -> &str {
        "pandoc"
    }

    fn render<'a>(&'a self, request: RenderRequest<'a>) -> BoxFuture<'a, Result<(), DocumentError>> {
        Box::pin(self.run(request))
    }
}

/// Prefer stderr; fall back to stdout, then to the exit status.
fn diagnostic_from(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return stderr.trim().to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        return stdout.trim().to_string();
    }
    format!("exit status {}", output.status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(src: &'a Path, out: &'a Path, res: &'a Path) -> RenderRequest<'a> {
        RenderRequest {
            source: src,
            markdown: "# Hi\n",
            resource_dir: res,
            output_path: out,
        }
    }

    #[test]
    fn default_args_match_pandoc_contract() {
        let renderer = PandocRenderer::new("pandoc", &ConversionConfig::default());
        let req = request(
            Path::new("notes/a.md"),
            Path::new("out/a.docx"),
            Path::new("notes"),
        );
        let args = renderer.build_args(Path::new("/tmp/s/document.md"), Path::new("/tmp/s/media"), &req);
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(args[0], "/tmp/s/document.md");
        assert!(args.windows(2).any(|w| w == ["-o", "out/a.docx"]));
        assert!(args.windows(2).any(|w| w == ["-t", "docx"]));
        assert!(args.windows(2).any(|w| w == ["--resource-path", "notes"]));
        assert!(args.contains(&"--extract-media=/tmp/s/media".to_string()));
        assert!(args.contains(&"--wrap=preserve".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--reference-doc")));
    }

    #[test]
    fn optional_args_follow_config() {
        let dir = tempfile::tempdir().unwrap();
        let style = dir.path().join("style.odt");
        std::fs::write(&style, b"x").unwrap();

        let config = ConversionConfig::builder()
            .format(OutputFormat::Odt)
            .preserve_line_breaks(false)
            .extract_remote_media(false)
            .reference_doc(&style)
            .extra_arg("--toc")
            .build()
            .unwrap();
        let renderer = PandocRenderer::new("pandoc", &config);
        let req = request(Path::new("a.md"), Path::new("a.odt"), Path::new("."));
        let args: Vec<String> = renderer
            .build_args(Path::new("s.md"), Path::new("m"), &req)
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert!(args.windows(2).any(|w| w == ["-t", "odt"]));
        assert!(!args.iter().any(|a| a.starts_with("--extract-media")));
        assert!(!args.contains(&"--wrap=preserve".to_string()));
        assert!(args.contains(&format!("--reference-doc={}", style.display())));
        assert_eq!(args.last().map(String::as_str), Some("--toc"));
    }

    #[test]
    fn locate_reports_missing_explicit_binary() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConversionConfig::builder()
            .pandoc_path(dir.path().join("no-pandoc-here"))
            .build()
            .unwrap();
        let err = PandocRenderer::locate(&config).unwrap_err();
        assert!(matches!(err, Md2DocxError::ConverterUnavailable { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn missing_program_is_a_conversion_failure() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PandocRenderer::new(dir.path().join("absent"), &ConversionConfig::default());
        let out = dir.path().join("a.docx");
        let err = renderer
            .render(request(Path::new("a.md"), &out, dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::ConversionFailed { .. }), "got: {err}");
        assert!(!out.exists());
    }

    // `sh` executes the staged document as a script, which stands in for a
    // misbehaving converter without writing an executable to disk.
    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PandocRenderer::new("sh", &ConversionConfig::default());
        let out = dir.path().join("a.docx");
        let req = RenderRequest {
            source: Path::new("a.md"),
            markdown: "echo 'Could not fetch resource' >&2\nexit 63\n",
            resource_dir: dir.path(),
            output_path: &out,
        };
        match renderer.render(req).await.unwrap_err() {
            DocumentError::ConversionFailed { diagnostic, .. } => {
                assert_eq!(diagnostic, "Could not fetch resource")
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_converter_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConversionConfig::builder()
            .converter_timeout_secs(1)
            .build()
            .unwrap();
        let renderer = PandocRenderer::new("sh", &config);
        let out = dir.path().join("a.docx");
        let req = RenderRequest {
            source: Path::new("a.md"),
            markdown: "sleep 5\n",
            resource_dir: dir.path(),
            output_path: &out,
        };
        let err = renderer.render(req).await.unwrap_err();
        assert_eq!(
            err,
            DocumentError::ConverterTimeout {
                path: PathBuf::from("a.md"),
                secs: 1
            }
        );
    }
}
