//! Axis-aligned rectangles.
//!
//! Two coordinate conventions are used in this crate and never mixed within
//! one value:
//!
//! * **Reading space** (extraction): origin at the top-left of the page, `y`
//!   grows downwards. This is the order text is read in, so sorting by `y`
//!   yields lines top to bottom.
//! * **PDF space** (drawing): origin at the bottom-left, `y` grows upwards,
//!   as pdfium expects.

use pdfium_render::prelude::PdfRect;
use serde::{Deserialize, Serialize};

/// A rectangle given by two corners, `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    /// Build a rectangle from any two corners.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// True when the two rectangles share a region of positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Convert a pdfium rectangle (PDF space) into reading space.
    pub fn from_pdf(rect: &PdfRect, page_height: f32) -> Self {
        Rect::new(
            rect.left().value,
            page_height - rect.top().value,
            rect.right().value,
            page_height - rect.bottom().value,
        )
    }
}
