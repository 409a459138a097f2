//! Pipeline stages for highlight notes and header / footer compositing.
//!
//! Each submodule implements exactly one transformation step. Everything that
//! can be a pure function of its inputs is one; pdfium is touched only by
//! [`engine`], [`collect`], [`paint`], [`math`], [`compose`] and [`overlay`].
//!
//! ## Data Flow
//!
//! ```text
//! notes:    input ──▶ collect ──▶ classify ──▶ compose ──▶ paint
//!                     (extract,               (metrics,
//!                      cluster)                math)
//!
//! overlay:  input ──▶ [notebook] ──▶ overlay ──▶ paint
//! ```
//!
//! 1. [`input`]    canonicalise the user-supplied path or URL to a local file
//! 2. [`collect`]  find highlight annotations and gather the words under them
//!    ([`extract`]), grouped into lines by vertical position ([`cluster`])
//! 3. [`classify`] label each line heading / code / math / point
//! 4. [`compose`]  lay the lines out into pages as [`paint::DrawOp`]s, with a
//!    contents section and rasterised math ([`math`])
//! 5. [`overlay`]  draw header / footer / page-number bands and fit the
//!    original pages inside them
//! 6. [`notebook`] convert `.ipynb` inputs with an external program first

pub mod classify;
pub mod cluster;
pub mod collect;
pub mod compose;
pub mod engine;
pub mod extract;
pub mod geometry;
pub mod input;
pub mod math;
pub mod metrics;
pub mod notebook;
pub mod overlay;
pub mod paint;
