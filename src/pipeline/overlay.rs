//! Header / footer compositing.
//!
//! Every source page becomes one output page of the same size holding, in
//! paint order:
//!
//! 1. the overlay layer: header strings, footer strings and the page number;
//! 2. the original page content, copied as a form XObject, scaled uniformly
//!    to fit the margin-inset content box and centred in it.
//!
//! The copied form is drawn in the source's user space: its MediaBox origin
//! and `/Rotate` are not applied by pdfium, so [`Placement::matrix`] folds
//! both into the form's transform.
//!
//! The overlay layer is the pure function [`overlay_layer`]; only
//! [`composite_document`] touches pdfium.

use super::engine;
use super::geometry::Rect;
use super::metrics::{text_width, FontFace};
use super::paint::{paint_ops, DrawOp, FontSet};
use crate::config::{Area, OverlayConfig, Position, SlotText};
use crate::error::LuminarError;
use crate::output::write_atomic;
use crate::progress::PipelineProgressCallback;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Distance of the band baselines from the margin line, towards the edge.
const BAND_OFFSET: f32 = 10.0;

/// Baseline `y` (PDF space) of the given band.
fn band_y(area: Area, height: f32, margin: f32) -> f32 {
    match area {
        Area::Header => height - margin + BAND_OFFSET,
        Area::Footer => margin - BAND_OFFSET,
    }
}

/// Left edge of `text` aligned at `position` between the margins.
fn aligned_x(position: Position, text: &str, width: f32, config: &OverlayConfig) -> f32 {
    let text_w = text_width(FontFace::Helvetica, text, config.font_size);
    match position {
        Position::Left => config.margin,
        Position::Center => width / 2.0 - text_w / 2.0,
        Position::Right => width - config.margin - text_w,
    }
}

/// The overlay drawn under page `page_index` (0-based) of a
/// `width` × `height` page. Empty strings produce no operation.
pub fn overlay_layer(
    page_index: usize,
    width: f32,
    height: f32,
    config: &OverlayConfig,
) -> Vec<DrawOp> {
    let text_op = |text: &str, area: Area, position: Position| DrawOp::Text {
        text: text.to_string(),
        x: aligned_x(position, text, width, config),
        y: band_y(area, height, config.margin),
        face: FontFace::Helvetica,
        size: config.font_size,
        color: config.text_color,
    };

    let bands: [(Area, &SlotText); 2] = [
        (Area::Header, &config.headers),
        (Area::Footer, &config.footers),
    ];
    let mut ops = Vec::new();
    for (area, slots) in bands {
        for position in [Position::Left, Position::Center, Position::Right] {
            let text = slots.get(position);
            if !text.is_empty() {
                ops.push(text_op(text, area, position));
            }
        }
    }

    // `composite_document` checks the last number fits before painting.
    let number = config
        .start_page
        .saturating_add(page_index as i64)
        .to_string();
    ops.push(text_op(&number, config.placement.area, config.placement.position));
    ops
}

/// The box original content is fitted into: `(margin/2, margin)` to
/// `(width - margin/2, height - margin)`.
pub fn content_box(width: f32, height: f32, margin: f32) -> Rect {
    Rect::new(margin / 2.0, margin, width - margin / 2.0, height - margin)
}

/// Uniform scale plus offset mapping a page onto a target box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Placement {
    /// Transform `[a, b, c, d, e, f]` taking user-space content of a page
    /// with MediaBox `media` (PDF space), shown turned clockwise by
    /// `rotation`, to its place on the output page.
    pub fn matrix(&self, media: &Rect, rotation: PdfPageRenderRotation) -> [f32; 6] {
        let s = self.scale;
        let (x0, y0) = (media.x0, media.y0);
        let (w, h) = (media.width(), media.height());
        match rotation {
            PdfPageRenderRotation::None => [s, 0.0, 0.0, s, self.dx - s * x0, self.dy - s * y0],
            // (u, v) → (v, w - u)
            PdfPageRenderRotation::Degrees90 => [
                0.0,
                -s,
                s,
                0.0,
                self.dx - s * y0,
                self.dy + s * (x0 + w),
            ],
            // (u, v) → (w - u, h - v)
            PdfPageRenderRotation::Degrees180 => [
                -s,
                0.0,
                0.0,
                -s,
                self.dx + s * (x0 + w),
                self.dy + s * (y0 + h),
            ],
            // (u, v) → (h - v, u)
            PdfPageRenderRotation::Degrees270 => [
                0.0,
                s,
                -s,
                0.0,
                self.dx + s * (y0 + h),
                self.dy - s * x0,
            ],
        }
    }
}

/// Size of `media` as displayed under `rotation`.
pub fn displayed_size(media: &Rect, rotation: PdfPageRenderRotation) -> (f32, f32) {
    match rotation {
        PdfPageRenderRotation::Degrees90 | PdfPageRenderRotation::Degrees270 => {
            (media.height(), media.width())
        }
        _ => (media.width(), media.height()),
    }
}

/// MediaBox of `page` in PDF space. Falls back to the unrotated page size
/// at the origin when pdfium cannot report the box (e.g. inherited).
fn media_box(page: &PdfPage, rotation: PdfPageRenderRotation) -> Rect {
    match page.boundaries().media() {
        Ok(media) => {
            let b = media.bounds;
            Rect::new(b.left().value, b.bottom().value, b.right().value, b.top().value)
        }
        Err(_) => {
            let (w, h) = displayed_size(
                &Rect::new(0.0, 0.0, page.width().value, page.height().value),
                rotation,
            );
            Rect::new(0.0, 0.0, w, h)
        }
    }
}

/// Fit a `width` × `height` page into `target`, keeping proportions and
/// centring on the slack axis.
pub fn fit_into(width: f32, height: f32, target: &Rect) -> Placement {
    let scale = (target.width() / width).min(target.height() / height);
    Placement {
        scale,
        dx: target.x0 + (target.width() - width * scale) / 2.0,
        dy: target.y0 + (target.height() - height * scale) / 2.0,
    }
}

/// Build the formatted document from `source` and return its bytes.
///
/// `path` labels errors. Any page failure aborts the whole run.
pub fn composite_document(
    pdfium: &Pdfium,
    source: &PdfDocument,
    path: &Path,
    config: &OverlayConfig,
    progress: &dyn PipelineProgressCallback,
) -> Result<(Vec<u8>, usize), LuminarError> {
    let fail = |detail: String| LuminarError::Overlay {
        path: path.to_path_buf(),
        detail,
    };

    let mut output = pdfium.create_new_pdf().map_err(|e| fail(e.to_string()))?;
    let fonts = FontSet::load(&mut output);

    let pages = source.pages();
    let total = pages.len() as usize;
    if config
        .start_page
        .checked_add(total.saturating_sub(1) as i64)
        .is_none()
    {
        return Err(LuminarError::InvalidConfig(format!(
            "start page {} overflows over {total} pages",
            config.start_page
        )));
    }
    progress.on_start(total);

    for (index, source_page) in pages.iter().enumerate() {
        progress.on_page_start(index + 1, total);
        let page_fail = |e: String| fail(format!("page {}: {e}", index + 1));

        let width = source_page.width().value;
        let height = source_page.height().value;

        let mut page = output
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::from_points(
                PdfPoints::new(width),
                PdfPoints::new(height),
            ))
            .map_err(|e| page_fail(e.to_string()))?;

        let layer = overlay_layer(index, width, height, config);
        paint_ops(&mut page, &fonts, &layer).map_err(|e| page_fail(e.to_string()))?;

        let rotation = source_page
            .rotation()
            .map_err(|e| page_fail(e.to_string()))?;
        let media = media_box(&source_page, rotation);
        let (shown_w, shown_h) = displayed_size(&media, rotation);
        let placement = fit_into(shown_w, shown_h, &content_box(width, height, config.margin));
        let [a, b, c, d, e, f] = placement.matrix(&media, rotation);
        let mut content = source_page
            .objects()
            .copy_into_x_object_form_object(&mut output)
            .map_err(|e| page_fail(e.to_string()))?;
        content
            .transform(a, b, c, d, e, f)
            .map_err(|e| page_fail(e.to_string()))?;
        page.objects_mut()
            .add_object(content)
            .map_err(|e| page_fail(e.to_string()))?;

        debug!(
            "Page {}: {}x{} rotated {:?} scaled {:.3}, {} overlay ops",
            index + 1,
            width,
            height,
            rotation,
            placement.scale,
            layer.len()
        );
        progress.on_page_complete(index + 1, total, layer.len());
    }

    let bytes = output.save_to_bytes().map_err(|e| fail(e.to_string()))?;
    Ok((bytes, total))
}

/// Open `source`, composite it and write the result to `output`.
///
/// Returns the number of pages written. Nothing is written on failure.
pub fn overlay_file(
    pdfium: &Pdfium,
    source: &Path,
    output: &Path,
    config: &OverlayConfig,
    progress: &dyn PipelineProgressCallback,
) -> Result<usize, LuminarError> {
    let document = engine::open_file(pdfium, source, config.password.as_deref())
        .map_err(|e| e.into_overlay_error(source))?;
    let (bytes, pages) = composite_document(pdfium, &document, source, config, progress)?;
    write_atomic(output, &bytes)?;
    progress.on_complete(pages);
    info!("Wrote {} formatted pages → {}", pages, output.display());
    Ok(pages)
}
