//! Highlight collection: walk a document and classify every highlighted line.
//!
//! Order of the result is pages ascending, then highlight annotations in the
//! order the page lists them, then lines top to bottom within each
//! annotation. Annotations of any other kind are ignored. An empty result is
//! not an error here; callers decide what "no highlights" means for them.

use super::classify::{classify_line, ClassifiedLine};
use super::cluster::cluster_lines;
use super::extract::{page_words, words_in_region, Word};
use super::geometry::Rect;
use crate::error::LuminarError;
use crate::progress::PipelineProgressCallback;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// The bounding rectangle of one highlight annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRegion {
    /// 0-based page index.
    pub page_index: usize,
    /// Annotation bounds in reading space.
    pub rect: Rect,
}

/// Classified lines for a page's highlights, given the page's words.
///
/// Each region is clustered on its own, so two highlights that share a
/// baseline still yield two lines.
pub fn lines_for_regions(words: &[Word], regions: &[AnnotatedRegion]) -> Vec<ClassifiedLine> {
    regions
        .iter()
        .flat_map(|region| cluster_lines(&words_in_region(words, &region.rect)))
        .map(classify_line)
        .collect()
}

/// Every highlight annotation on page `page_index`, in annotation order.
pub fn highlight_regions(
    page_index: usize,
    page: &PdfPage,
) -> Result<Vec<AnnotatedRegion>, PdfiumError> {
    let page_height = page.height().value;
    let mut regions = Vec::new();
    for annotation in page.annotations().iter() {
        if annotation.annotation_type() != PdfPageAnnotationType::Highlight {
            continue;
        }
        let bounds = annotation.bounds()?;
        regions.push(AnnotatedRegion {
            page_index,
            rect: Rect::from_pdf(&bounds, page_height),
        });
    }
    Ok(regions)
}

/// Collect classified lines from an already opened document.
///
/// `path` is only used to label errors.
pub fn collect_document(
    document: &PdfDocument,
    path: &Path,
    progress: &dyn PipelineProgressCallback,
) -> Result<Vec<ClassifiedLine>, LuminarError> {
    let page_error = |page: usize, e: PdfiumError| LuminarError::SourceOpen {
        path: path.to_path_buf(),
        detail: format!("page {}: {e:?}", page + 1),
    };

    let pages = document.pages();
    let total = pages.len() as usize;
    progress.on_start(total);

    let mut lines = Vec::new();
    for (index, page) in pages.iter().enumerate() {
        progress.on_page_start(index + 1, total);

        let regions = highlight_regions(index, &page).map_err(|e| page_error(index, e))?;
        let page_lines = if regions.is_empty() {
            Vec::new()
        } else {
            // Page text is only read for pages that carry highlights.
            let words = page_words(&page).map_err(|e| page_error(index, e))?;
            for AnnotatedRegion { page_index, rect } in &regions {
                debug!(
                    "Page {}: highlight at ({:.1}, {:.1})-({:.1}, {:.1})",
                    page_index + 1,
                    rect.x0,
                    rect.y0,
                    rect.x1,
                    rect.y1
                );
            }
            lines_for_regions(&words, &regions)
        };

        progress.on_page_complete(index + 1, total, page_lines.len());
        lines.extend(page_lines);
    }

    info!(
        "Collected {} highlighted lines from {} pages",
        lines.len(),
        total
    );
    Ok(lines)
}
