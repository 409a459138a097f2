//! Progress-callback trait for per-page pipeline events.
//!
//! Pass an [`Arc<dyn PipelineProgressCallback>`] to the entry points in
//! [`crate::convert`] to receive events as the highlight collector scans
//! source pages or the overlay compositor writes output pages. Callers can
//! forward events to a terminal progress bar, a log, or a websocket without
//! the library knowing how the host application communicates.
//!
//! # Example
//!
//! ```rust
//! use luminar_pdf::PipelineProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, items: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("page {page_num}/{total_pages}: {items} items");
//!     }
//! }
//! ```

use std::sync::Arc;

/// Called by the pipelines as they process each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` because the
/// pdfium work runs on a blocking worker thread.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once before the first page, with the source page count.
    fn on_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is processed.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the source document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page is processed.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages
    /// * `items`       — lines collected from the page (notes) or draw
    ///   operations in its overlay layer (overlay)
    fn on_page_complete(&self, page_num: usize, total_pages: usize, items: usize) {
        let _ = (page_num, total_pages, items);
    }

    /// Called once the output document has been written.
    fn on_complete(&self, output_pages: usize) {
        let _ = output_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias for the shared callback handle.
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;

/// The callback to use when the caller supplied none.
pub(crate) fn or_noop(cb: Option<ProgressCallback>) -> ProgressCallback {
    cb.unwrap_or_else(|| Arc::new(NoopProgressCallback))
}
