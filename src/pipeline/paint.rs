//! Pure draw operations and the pdfium painter that realises them.
//!
//! Layout code (composer pages, overlay layers, math glyphs) produces plain
//! `Vec<DrawOp>` values that tests can inspect directly. Only [`paint_ops`]
//! touches pdfium. Coordinates are PDF space: origin bottom-left, `y` up,
//! text positioned by its baseline start.

use super::metrics::FontFace;
use crate::config::Rgb;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while realising draw operations.
#[derive(Debug, Error)]
pub enum PaintError {
    #[error("pdfium: {0}")]
    Pdfium(#[from] PdfiumError),

    #[error("cannot load image '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// One thing to draw on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A filled, unstroked rectangle.
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    /// A run of text starting at the baseline point `(x, y)`.
    Text {
        text: String,
        x: f32,
        y: f32,
        face: FontFace,
        size: f32,
        color: Rgb,
    },
    /// A raster image scaled into the box with bottom-left `(x, y)`.
    Image {
        path: PathBuf,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl DrawOp {
    /// The text of a `Text` op, if it is one.
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl From<Rgb> for PdfColor {
    fn from(c: Rgb) -> Self {
        PdfColor::new(c.r, c.g, c.b, 255)
    }
}

/// Font handles loaded into one output document.
#[derive(Debug, Clone, Copy)]
pub struct FontSet {
    helvetica: PdfFontToken,
    helvetica_bold: PdfFontToken,
    helvetica_oblique: PdfFontToken,
    courier: PdfFontToken,
    symbol: PdfFontToken,
}

impl FontSet {
    pub fn load(document: &mut PdfDocument) -> Self {
        let fonts = document.fonts_mut();
        Self {
            helvetica: fonts.helvetica(),
            helvetica_bold: fonts.helvetica_bold(),
            helvetica_oblique: fonts.helvetica_oblique(),
            courier: fonts.courier(),
            symbol: fonts.symbol(),
        }
    }

    fn token(&self, face: FontFace) -> PdfFontToken {
        match face {
            FontFace::Helvetica => self.helvetica,
            FontFace::HelveticaBold => self.helvetica_bold,
            FontFace::HelveticaOblique => self.helvetica_oblique,
            FontFace::Courier => self.courier,
            FontFace::Symbol => self.symbol,
        }
    }
}

/// Add `ops` to `page` in order; later ops paint over earlier ones.
pub fn paint_ops(page: &mut PdfPage, fonts: &FontSet, ops: &[DrawOp]) -> Result<(), PaintError> {
    for op in ops {
        match op {
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                let rect = PdfRect::new_from_values(*y, *x, y + height, x + width);
                page.objects_mut().create_path_object_rect(
                    rect,
                    None,
                    None,
                    Some(PdfColor::from(*color)),
                )?;
            }
            DrawOp::Text {
                text,
                x,
                y,
                face,
                size,
                color,
            } => {
                let mut object = page.objects_mut().create_text_object(
                    PdfPoints::new(*x),
                    PdfPoints::new(*y),
                    text,
                    fonts.token(*face),
                    PdfPoints::new(*size),
                )?;
                object.set_fill_color(PdfColor::from(*color))?;
            }
            DrawOp::Image {
                path,
                x,
                y,
                width,
                height,
            } => {
                let image = image::open(path).map_err(|source| PaintError::Image {
                    path: path.clone(),
                    source,
                })?;
                page.objects_mut().create_image_object(
                    PdfPoints::new(*x),
                    PdfPoints::new(*y),
                    &image,
                    Some(PdfPoints::new(*width)),
                    Some(PdfPoints::new(*height)),
                )?;
            }
        }
    }
    Ok(())
}
