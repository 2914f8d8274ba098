//! Image reference rewriting: point remote images at local copies.
//!
//! Notes often reference screenshots by their upload URL while the same file
//! sits next to the Markdown source. Letting the converter fetch every URL is
//! slow and fails offline, so before conversion each remote image is either
//! re-targeted at its local twin or turned into a plain link.
//!
//! ## Recognised syntax
//!
//! Only inline images whose destination starts with `http://` or `https://`:
//!
//! ```text
//! ![alt text](https://host/path/name.png)
//! ```
//!
//! The destination runs to the first unescaped `)`. Reference-style images,
//! HTML `<img>` tags and local paths are left alone. This is a single regex
//! pass, not a Markdown parser, so the output is byte-identical to the input
//! outside the substituted spans.
//!
//! ## Substitutions
//!
//! | Local file found | Output |
//! |------------------|--------|
//! | yes | `![alt](/abs/dir/Name.PNG)` |
//! | no  | `[CLICK TO VIEW ONLINE IMAGE: (alt)](https://host/path/name.png)` |

use super::matcher::DirectoryListing;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Label of the link that replaces an image with no local copy.
pub const PLACEHOLDER_LABEL: &str = "CLICK TO VIEW ONLINE IMAGE";

// Alt text may hold backslash escapes and one level of balanced brackets; the
// destination stops at the first `)` not preceded by a backslash.
static RE_REMOTE_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[((?:\\.|\[[^\]\n]*\]|[^\\\[\]\n])*)\]\((https?://(?:\\.|[^\\)\n])*)\)")
        .unwrap()
});

/// One inline remote image found in Markdown text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageReference<'a> {
    /// Text between the brackets; may be empty.
    pub alt_text: &'a str,
    /// The `http(s)://` destination exactly as written.
    pub target: &'a str,
}

impl ImageReference<'_> {
    /// Final path segment of the target URL, used as the local file name.
    ///
    /// Query and fragment are dropped and Markdown backslash escapes removed.
    /// Returns `None` when the URL has no path segment (`https://host/`).
    pub fn file_name(&self) -> Option<String> {
        let (_, rest) = self.target.split_once("://")?;
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);
        let (_, path) = rest.split_once('/')?;
        let segment = path.rsplit('/').next().unwrap_or(path);
        let name = unescape_markdown(segment);
        (!name.is_empty()).then_some(name)
    }
}

/// Outcome of looking up one reference in the document directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A same-named file (ignoring case) exists; full path to it.
    LocalMatch(PathBuf),
    NoMatch,
}

/// Rewritten text plus how many references took each branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenMarkdown {
    pub markdown: String,
    pub embedded: usize,
    pub placeholders: usize,
}

impl RewrittenMarkdown {
    /// Total remote image references substituted.
    pub fn substitutions(&self) -> usize {
        self.embedded + self.placeholders
    }
}

/// Rewrite every remote image reference in `markdown` against `base_dir`.
///
/// Never fails: text without remote images is returned unchanged.
pub fn rewrite_images(markdown: &str, base_dir: &Path) -> String {
    rewrite_images_with_stats(markdown, base_dir).markdown
}

/// Like [`rewrite_images`] but also reports embed/placeholder counts.
pub fn rewrite_images_with_stats(markdown: &str, base_dir: &Path) -> RewrittenMarkdown {
    if !RE_REMOTE_IMAGE.is_match(markdown) {
        return RewrittenMarkdown {
            markdown: markdown.to_string(),
            embedded: 0,
            placeholders: 0,
        };
    }

    let listing = DirectoryListing::scan(base_dir);
    let mut embedded = 0usize;
    let mut placeholders = 0usize;

    let rewritten = RE_REMOTE_IMAGE.replace_all(markdown, |caps: &Captures<'_>| {
        let reference = reference_from(caps);
        match resolve(&reference, &listing) {
            Resolution::LocalMatch(path) => {
                embedded += 1;
                debug!("Image {} → {}", reference.target, path.display());
                local_embed(reference.alt_text, &path)
            }
            Resolution::NoMatch => {
                placeholders += 1;
                debug!("Image {} has no local copy", reference.target);
                placeholder_link(&reference)
            }
        }
    });

    RewrittenMarkdown {
        markdown: rewritten.into_owned(),
        embedded,
        placeholders,
    }
}

/// All remote image references in `markdown`, left to right.
pub fn scan_image_references(markdown: &str) -> Vec<ImageReference<'_>> {
    RE_REMOTE_IMAGE
        .captures_iter(markdown)
        .map(|caps| ImageReference {
            alt_text: caps.get(1).map_or("", |m| m.as_str()),
            target: caps.get(2).map_or("", |m| m.as_str()),
        })
        .collect()
}

/// Look a reference up in an already-scanned directory.
///
/// The raw file name is tried first, then its percent-decoded form
/// (`my%20shot.png` → `my shot.png`).
pub fn resolve(reference: &ImageReference<'_>, listing: &DirectoryListing) -> Resolution {
    let Some(name) = reference.file_name() else {
        return Resolution::NoMatch;
    };

    if let Some(path) = listing.find(&name) {
        return Resolution::LocalMatch(path);
    }

    let decoded = percent_decode_str(&name).decode_utf8_lossy();
    if decoded != name {
        if let Some(path) = listing.find(&decoded) {
            return Resolution::LocalMatch(path);
        }
    }

    Resolution::NoMatch
}

// ── Substitution builders ────────────────────────────────────────────────────

fn reference_from<'t>(caps: &Captures<'t>) -> ImageReference<'t> {
    ImageReference {
        alt_text: caps.get(1).map_or("", |m| m.as_str()),
        target: caps.get(2).map_or("", |m| m.as_str()),
    }
}

fn local_embed(alt_text: &str, path: &Path) -> String {
    format!("![{}]({})", alt_text, format_destination(path))
}

fn placeholder_link(reference: &ImageReference<'_>) -> String {
    format!(
        "[{}: ({})]({})",
        PLACEHOLDER_LABEL, reference.alt_text, reference.target
    )
}

/// Paths with spaces or parentheses would end the destination early, so
/// those go inside `<…>`.
fn format_destination(path: &Path) -> String {
    let s = path.display().to_string();
    if s.chars().any(|c| c.is_whitespace() || c == '(' || c == ')') {
        format!("<{s}>")
    } else {
        s
    }
}

fn unescape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_punctuation() {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────
