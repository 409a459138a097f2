//! # luminar-pdf
//!
//! Turn the highlights of an annotated PDF into styled study notes, and stamp
//! headers, footers and page numbers onto existing PDFs or Jupyter notebooks.
//!
//! ## Why this crate?
//!
//! Highlighting a lecture PDF is quick; rewriting the highlighted passages
//! into notes is not. This crate reads the highlight annotations, gathers the
//! words underneath them, labels each line as a heading, code, mathematics or
//! a plain point, and lays them out into a dark-themed notes document with a
//! table of contents and typeset formulae.
//!
//! ## Pipeline Overview
//!
//! ```text
//! annotated PDF
//!  │
//!  ├─ 1. Input     resolve local file or download from URL
//!  ├─ 2. Collect   highlight rects → words → lines (pdfium, spawn_blocking)
//!  ├─ 3. Classify  heading / code / math / point
//!  ├─ 4. Compose   paginate, contents pages, math images
//!  └─ 5. Output    atomic write + per-kind stats
//!
//! PDF or .ipynb
//!  │
//!  ├─ 1. Input     resolve, convert notebooks with an external program
//!  ├─ 2. Overlay   header / footer / page number under each scaled page
//!  └─ 3. Output    atomic write, same page count and sizes as the source
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use luminar_pdf::{extract_notes, NotesConfig, ScratchDir};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scratch = ScratchDir::new()?;
//!     let config = NotesConfig::builder().title("Compilers, week 5").build()?;
//!     let notes = extract_notes("week5.pdf", "week5_notes.pdf", &config, &scratch).await?;
//!     for entry in &notes.toc {
//!         println!("{:>3}  {}", entry.page, entry.title);
//!     }
//!     eprintln!("{} lines, {} pages", notes.stats.lines, notes.stats.output_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## pdfium
//!
//! All PDF work goes through a pdfium shared library, bound at run time. Set
//! `PDFIUM_LIB_PATH` to the library (or its directory), drop it next to the
//! working directory, or install it on the system search path.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `luminar` binary (clap + anyhow + tracing-subscriber + indicatif + serde_json) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! luminar-pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod scratch;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    Area, NotesConfig, NotesConfigBuilder, OverlayConfig, OverlayConfigBuilder,
    PageNumberPlacement, Palette, Position, Rgb, SlotText,
};
pub use convert::{
    add_header_footer, add_header_footer_from_bytes, add_header_footer_sync,
    add_header_footer_with_progress, default_output_path, extract_notes,
    extract_notes_from_bytes, extract_notes_sync, extract_notes_with_progress, scan_highlights,
    FORMATTED_SUFFIX, NOTES_SUFFIX,
};
pub use error::{LuminarError, MathError};
pub use output::{NotesOutput, NotesStats, OverlayOutput, ScanOutput};
pub use pipeline::classify::{classify, ClassifiedLine, LineKind};
pub use pipeline::compose::TocEntry;
pub use pipeline::notebook::NotebookConverter;
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback};
pub use scratch::ScratchDir;
