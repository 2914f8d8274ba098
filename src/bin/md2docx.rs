//! CLI binary for edgequake-md2docx.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use edgequake_md2docx::{
    convert, preview, BatchOutput, ConversionConfig, ConversionProgressCallback, DocumentPreview,
    Md2DocxError, OutputFormat, ProgressCallback, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one status line per document, plus a live bar
/// unless progress is disabled. Works when documents finish out of order.
struct CliProgressCallback {
    /// Hidden when `--no-progress`; status lines then go straight to stderr.
    bar: ProgressBar,
    /// Per-document wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<PathBuf, Instant>>,
}

impl CliProgressCallback {
    fn new(show_bar: bool) -> Arc<Self> {
        let bar = if show_bar {
            let bar = ProgressBar::new(0);
            let style = ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
            bar.set_style(style);
            bar.set_prefix("Converting");
            bar
        } else {
            ProgressBar::hidden()
        };

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn line(&self, s: String) {
        if self.bar.is_hidden() {
            eprintln!("{s}");
        } else {
            self.bar.println(s);
        }
    }

    fn elapsed(&self, source: &Path) -> String {
        let ms = self
            .start_times
            .lock()
            .ok()
            .and_then(|mut t| t.remove(source))
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);
        dim(&format!("{:.1}s", ms as f64 / 1000.0))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
        if total_documents > 0 {
            self.bar.enable_steady_tick(Duration::from_millis(80));
        }
    }

    fn on_document_start(&self, source: &Path, _index: usize, _total: usize) {
        if let Ok(mut t) = self.start_times.lock() {
            t.insert(source.to_path_buf(), Instant::now());
        }
        self.bar.set_message(file_name(source));
    }

    fn on_document_complete(&self, source: &Path, output: &Path, _remote_images: usize) {
        let elapsed = self.elapsed(source);
        self.line(format!(
            "  {} Converted {} to {}  {}",
            green("✅"),
            file_name(source),
            file_name(output),
            elapsed,
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, source: &Path, error: &str) {
        let elapsed = self.elapsed(source);
        self.line(format!(
            "  {} Failed to convert {}: {}  {}",
            red("❌"),
            file_name(source),
            red(error),
            elapsed,
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total_documents: usize, _converted: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Use the default folders (x-INPUT → x-OUTPUT)
  md2docx

  # Convert every .md file in a folder
  md2docx notes word

  # Convert a single Markdown file
  md2docx notes/report.md word

  # Show how image references would be rewritten, without converting
  md2docx --dry-run notes word

  # Four documents at a time, styled by a template
  md2docx -j 4 --reference-doc template.docx notes word

IMAGES:
  Remote images such as ![chart](https://host/path/chart.png) are embedded
  from a same-named file next to the Markdown file (name compared ignoring
  case). Without a local copy they become the link
  [CLICK TO VIEW ONLINE IMAGE: (chart)](https://host/path/chart.png).

ENVIRONMENT VARIABLES:
  PANDOC_PATH             pandoc executable to use (same as --pandoc)
  MD2DOCX_*               default for the matching flag, e.g. MD2DOCX_JOBS=4
  RUST_LOG                tracing filter, overrides -v / -q
"#;

/// Convert Markdown files to Word documents.
#[derive(Parser, Debug)]
#[command(
    name = "md2docx",
    version,
    about = "Convert Markdown files to Word documents",
    long_about = "Convert a Markdown file, or every Markdown file in a folder, to Word \
documents with pandoc. Remote image references are pointed at same-named local files \
when present and turned into links otherwise.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown file or folder of Markdown files. Default: x-INPUT.
    input: Option<PathBuf>,

    /// Folder for the converted documents. Default: x-OUTPUT.
    output: Option<PathBuf>,

    /// Number of documents converted at the same time.
    #[arg(short, long, env = "MD2DOCX_JOBS", default_value_t = 1,
          value_parser = clap::value_parser!(u16).range(1..=64))]
    jobs: u16,

    /// Output format.
    #[arg(long, env = "MD2DOCX_FORMAT", value_enum, default_value = "docx")]
    format: FormatArg,

    /// pandoc executable. Default: PANDOC_PATH, then PATH.
    #[arg(long, env = "MD2DOCX_PANDOC")]
    pandoc: Option<PathBuf>,

    /// Style template passed to pandoc as --reference-doc.
    #[arg(long, env = "MD2DOCX_REFERENCE_DOC")]
    reference_doc: Option<PathBuf>,

    /// Per-document converter timeout in seconds.
    #[arg(long, env = "MD2DOCX_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Let pandoc reflow paragraphs instead of keeping source line breaks.
    #[arg(long, env = "MD2DOCX_NO_WRAP_PRESERVE")]
    no_wrap_preserve: bool,

    /// Do not let pandoc download remaining remote media.
    #[arg(long, env = "MD2DOCX_NO_EXTRACT_MEDIA")]
    no_extract_media: bool,

    /// Extra argument passed to pandoc verbatim (repeatable).
    #[arg(long = "pandoc-arg", value_name = "ARG", allow_hyphen_values = true)]
    pandoc_args: Vec<String>,

    /// Rewrite image references and report, without converting.
    #[arg(long)]
    dry_run: bool,

    /// Output a structured JSON report on stdout.
    #[arg(long, env = "MD2DOCX_JSON")]
    json: bool,

    /// Exit with an error when any document fails.
    #[arg(long, env = "MD2DOCX_STRICT")]
    strict: bool,

    /// Disable progress bar.
    #[arg(long, env = "MD2DOCX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2DOCX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2DOCX_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Docx,
    Odt,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Docx => OutputFormat::Docx,
            FormatArg::Odt => OutputFormat::Odt,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.input.is_some() != cli.output.is_some() {
        Cli::command()
            .error(
                clap::error::ErrorKind::ArgumentConflict,
                "Either specify both input and output, or neither",
            )
            .exit();
    }

    // ── Logging setup ────────────────────────────────────────────────────
    // The status lines already say what happened to each file, so library
    // INFO logs are only shown when the bar is off.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Resolve folders ──────────────────────────────────────────────────
    let using_defaults = cli.input.is_none();
    let input = cli
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR));
    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    if using_defaults && !input.exists() {
        std::fs::create_dir_all(&input)
            .with_context(|| format!("Failed to create default input folder {:?}", input))?;
    }

    if !input.exists() {
        eprintln!(" {} For help run 'md2docx --help'", cyan("💡"));
        return Err(Md2DocxError::InputNotFound { path: input }.into());
    }

    let human = !cli.quiet && !cli.json;

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        let config = build_config(&cli, None)?;
        let previews = preview(&input, &output_dir, &config)
            .await
            .context("Preview failed")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&previews).context("Failed to serialise preview")?
            );
        } else if human {
            print_previews(&input, &previews);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if human {
        Some(CliProgressCallback::new(show_progress) as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    if human {
        eprintln!(
            "\n🟤 Processing input from:\n   {}",
            bold(&display_absolute(&input))
        );
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&input, &output_dir, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else if human {
        print_summary(&input, &output_dir, &output);
    }

    if cli.strict {
        output.into_result()?;
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .concurrency(cli.jobs as usize)
        .format(cli.format.into())
        .converter_timeout_secs(cli.timeout)
        .preserve_line_breaks(!cli.no_wrap_preserve)
        .extract_remote_media(!cli.no_extract_media);

    if let Some(ref path) = cli.pandoc {
        builder = builder.pandoc_path(path);
    }
    if let Some(ref doc) = cli.reference_doc {
        builder = builder.reference_doc(doc);
    }
    for arg in &cli.pandoc_args {
        builder = builder.extra_arg(arg.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(input: &Path, output_dir: &Path, output: &BatchOutput) {
    if output.is_empty() {
        eprintln!(
            "  {} No Markdown files found in folder '{}'",
            red("❌"),
            input.display()
        );
    }

    eprintln!(
        "\n🟫 Output directory for converted documents:\n   {}",
        bold(&display_absolute(output_dir))
    );

    let stats = &output.stats;
    if stats.total_documents > 0 {
        eprintln!(
            "\n{}  {}/{} documents  {}  {}ms",
            if stats.failed == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.converted,
            stats.total_documents,
            dim(&format!(
                "{} images embedded, {} linked",
                stats.embedded_images, stats.placeholder_links
            )),
            stats.total_duration_ms,
        );
    }
    eprintln!();
}

fn print_previews(input: &Path, previews: &[DocumentPreview]) {
    if previews.is_empty() {
        eprintln!(
            "  {} No Markdown files found in folder '{}'",
            red("❌"),
            input.display()
        );
        return;
    }
    for p in previews {
        match p.error {
            None => eprintln!(
                "  {} {} → {}  {}",
                cyan("•"),
                file_name(&p.source),
                p.output.display(),
                dim(&format!(
                    "{} embedded, {} linked",
                    p.images.embedded, p.images.placeholders
                )),
            ),
            Some(ref e) => eprintln!("  {} {}: {}", red("❌"), file_name(&p.source), red(&e.to_string())),
        }
    }
}

fn display_absolute(path: &Path) -> String {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
