//! Pipeline stages for Markdown-to-Word conversion.
//!
//! Each submodule implements one step, so each can be tested on its own and
//! the converter backend can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ rewrite ──▶ lock ──▶ render
//! (files)   (images)   (probe)  (pandoc)
//!              │
//!           matcher
//! ```
//!
//! 1. [`input`]   — classify the user-supplied path and list Markdown files
//! 2. [`rewrite`] — re-target remote images at local twins or placeholder
//!    links; uses [`matcher`] for the case-insensitive directory lookup
//! 3. [`lock`]    — refuse to start when the destination is open elsewhere
//! 4. [`render`]  — hand the rewritten text to the converter with a timeout

pub mod input;
pub mod lock;
pub mod matcher;
pub mod render;
pub mod rewrite;
