//! Math rendering: typeset a math-classified line into a transparent PNG.
//!
//! The line is read as TeX math-mode input (a practical subset: scripts,
//! braces, `\frac`, `\sqrt`, Greek letters, common operators and spacing
//! commands), laid out into positioned glyphs and rules, painted in white
//! onto a scratch pdfium page and rendered with a transparent background.
//! The bitmap is cropped to its ink plus 0.1in of padding and saved as
//! `math_<hash>.png` in the scratch directory.
//!
//! Rendering never fails the document: any error becomes
//! [`RenderOutcome::FallbackText`] carrying the raw text and the reason.

use super::metrics::{text_width, FontFace};
use super::paint::{paint_ops, DrawOp, FontSet};
use crate::config::{Rgb, INCH};
use crate::error::MathError;
use crate::scratch::ScratchDir;
use image::{DynamicImage, ImageFormat, RgbaImage};
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Type size of rendered math.
pub const MATH_FONT_SIZE: f32 = 20.0;
/// Scale factor of sub- and superscripts relative to their base.
pub const SCRIPT_SCALE: f32 = 0.7;
/// Minimum canvas, 6in × 1in.
pub const CANVAS_WIDTH: f32 = 6.0 * INCH;
pub const CANVAS_HEIGHT: f32 = 1.0 * INCH;
/// Padding kept around the ink when cropping.
pub const CROP_PADDING: f32 = 0.1 * INCH;
/// Raster resolution.
pub const RASTER_DPI: f32 = 200.0;

/// Result of rendering one expression.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// PNG written to the scratch directory.
    Image { path: PathBuf },
    /// Typesetting failed; show `text` as a plain paragraph instead.
    FallbackText { text: String, reason: MathError },
}

/// Turns math text into a [`RenderOutcome`].
pub trait MathRenderer {
    fn render(&self, expr: &str) -> RenderOutcome;
}

// ── Parsing ──────────────────────────────────────────────────────────────

/// How a single glyph is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphStyle {
    /// Variables: Latin letters in oblique.
    Italic,
    /// Digits, punctuation, function names.
    Upright,
    /// Greek letters and operators from the Symbol font.
    Symbol,
}

/// Parsed math expression.
#[derive(Debug, Clone, PartialEq)]
pub enum MathNode {
    Glyph {
        ch: char,
        style: GlyphStyle,
    },
    /// An upright function name such as `sin`.
    Word(String),
    /// Horizontal space in ems; may be negative.
    Space(f32),
    Row(Vec<MathNode>),
    Scripts {
        base: Box<MathNode>,
        sup: Option<Box<MathNode>>,
        sub: Option<Box<MathNode>>,
    },
    Frac {
        num: Box<MathNode>,
        den: Box<MathNode>,
    },
    Sqrt(Box<MathNode>),
}

#[rustfmt::skip]
static GREEK: &[(&str, char)] = &[
    ("alpha", 'α'), ("beta", 'β'), ("gamma", 'γ'), ("delta", 'δ'),
    ("epsilon", 'ε'), ("varepsilon", 'ε'), ("zeta", 'ζ'), ("eta", 'η'),
    ("theta", 'θ'), ("iota", 'ι'), ("kappa", 'κ'), ("lambda", 'λ'),
    ("mu", 'μ'), ("nu", 'ν'), ("xi", 'ξ'), ("pi", 'π'), ("rho", 'ρ'),
    ("sigma", 'σ'), ("tau", 'τ'), ("upsilon", 'υ'), ("phi", 'φ'),
    ("varphi", 'φ'), ("chi", 'χ'), ("psi", 'ψ'), ("omega", 'ω'),
    ("Gamma", 'Γ'), ("Delta", 'Δ'), ("Theta", 'Θ'), ("Lambda", 'Λ'),
    ("Xi", 'Ξ'), ("Pi", 'Π'), ("Sigma", 'Σ'), ("Phi", 'Φ'), ("Psi", 'Ψ'),
    ("Omega", 'Ω'),
];

#[rustfmt::skip]
static OPERATORS: &[(&str, char)] = &[
    ("times", '×'), ("div", '÷'), ("pm", '±'), ("cdot", '⋅'),
    ("leq", '≤'), ("le", '≤'), ("geq", '≥'), ("ge", '≥'), ("neq", '≠'),
    ("ne", '≠'), ("approx", '≈'), ("equiv", '≡'), ("sim", '∼'),
    ("propto", '∝'), ("infty", '∞'), ("partial", '∂'), ("nabla", '∇'),
    ("in", '∈'), ("forall", '∀'), ("exists", '∃'), ("prime", '′'),
    ("to", '→'), ("rightarrow", '→'), ("leftarrow", '←'),
    ("Rightarrow", '⇒'), ("Leftrightarrow", '⇔'), ("leftrightarrow", '↔'),
    ("sum", '∑'), ("prod", '∏'), ("int", '∫'),
];

static FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "cot", "sec", "csc", "log", "ln", "exp", "lim", "max", "min", "det",
    "arcsin", "arccos", "arctan", "sinh", "cosh", "tanh",
];

/// Characters that get extra space on both sides.
fn is_relation_or_binary(ch: char) -> bool {
    matches!(
        ch,
        '=' | '+' | '-' | '<' | '>' | '×' | '÷' | '±' | '⋅' | '≤' | '≥' | '≠' | '≈' | '≡' | '∼'
            | '∝' | '∈' | '→' | '←' | '⇒' | '⇔' | '↔'
    )
}

fn table_lookup(table: &[(&str, char)], name: &str) -> Option<char> {
    table.iter().find(|&&(n, _)| n == name).map(|&(_, c)| c)
}

struct Parser<'a> {
    expr: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

/// Parse `expr` as math-mode text.
pub fn parse(expr: &str) -> Result<MathNode, MathError> {
    let mut parser = Parser {
        expr,
        chars: expr.char_indices().collect(),
        pos: 0,
    };
    Ok(MathNode::Row(parser.parse_list(false)?))
}

impl Parser<'_> {
    fn error(&self, offset: usize, reason: impl Into<String>) -> MathError {
        MathError::Parse {
            expr: self.expr.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace() || c == '~') {
            self.pos += 1;
        }
    }

    fn parse_list(&mut self, in_group: bool) -> Result<Vec<MathNode>, MathError> {
        let mut items: Vec<MathNode> = Vec::new();
        loop {
            self.skip_whitespace();
            let Some((offset, ch)) = self.peek() else {
                return if in_group {
                    Err(self.error(self.expr.len(), "missing '}'"))
                } else {
                    Ok(items)
                };
            };
            match ch {
                '}' if in_group => {
                    self.pos += 1;
                    return Ok(items);
                }
                '}' => return Err(self.error(offset, "unmatched '}'")),
                '^' | '_' => {
                    self.pos += 1;
                    let base = items
                        .pop()
                        .ok_or_else(|| self.error(offset, format!("'{ch}' without a base")))?;
                    let script = self.parse_atom()?;
                    items.push(self.attach(base, ch, script, offset)?);
                }
                _ => {
                    let atom = self.parse_atom()?;
                    items.push(atom);
                }
            }
        }
    }

    fn attach(
        &self,
        base: MathNode,
        kind: char,
        script: MathNode,
        offset: usize,
    ) -> Result<MathNode, MathError> {
        let (base, mut sup, mut sub) = match base {
            MathNode::Scripts { base, sup, sub } => (base, sup, sub),
            other => (Box::new(other), None, None),
        };
        let slot = if kind == '^' { &mut sup } else { &mut sub };
        if slot.is_some() {
            let which = if kind == '^' { "superscript" } else { "subscript" };
            return Err(self.error(offset, format!("double {which}")));
        }
        *slot = Some(Box::new(script));
        Ok(MathNode::Scripts { base, sup, sub })
    }

    /// One argument: a braced group, a command or a single character.
    fn parse_atom(&mut self) -> Result<MathNode, MathError> {
        self.skip_whitespace();
        let Some((offset, ch)) = self.peek() else {
            return Err(self.error(self.expr.len(), "expected an argument"));
        };
        match ch {
            '{' => {
                self.pos += 1;
                Ok(MathNode::Row(self.parse_list(true)?))
            }
            '}' | '^' | '_' => Err(self.error(offset, format!("unexpected '{ch}'"))),
            '\\' => {
                self.pos += 1;
                self.parse_command(offset)
            }
            '$' | '#' => Err(self.error(offset, format!("'{ch}' is not allowed in math text"))),
            _ => {
                self.pos += 1;
                Ok(glyph(ch))
            }
        }
    }

    fn parse_command(&mut self, start: usize) -> Result<MathNode, MathError> {
        let Some((_, first)) = self.peek() else {
            return Err(self.error(start, "trailing backslash"));
        };

        if !first.is_ascii_alphabetic() {
            self.pos += 1;
            return match first {
                ',' => Ok(MathNode::Space(3.0 / 18.0)),
                ':' | '>' => Ok(MathNode::Space(4.0 / 18.0)),
                ';' => Ok(MathNode::Space(5.0 / 18.0)),
                '!' => Ok(MathNode::Space(-3.0 / 18.0)),
                ' ' => Ok(MathNode::Space(0.25)),
                '{' | '}' | '_' | '%' | '$' | '#' | '&' | '\\' | '|' => Ok(MathNode::Glyph {
                    ch: first,
                    style: GlyphStyle::Upright,
                }),
                other => Err(self.error(start, format!("unknown command '\\{other}'"))),
            };
        }

        let mut name = String::new();
        while let Some((_, c)) = self.peek().filter(|(_, c)| c.is_ascii_alphabetic()) {
            name.push(c);
            self.pos += 1;
        }

        match name.as_str() {
            "frac" => {
                let num = self.parse_atom()?;
                let den = self.parse_atom()?;
                Ok(MathNode::Frac {
                    num: Box::new(num),
                    den: Box::new(den),
                })
            }
            "sqrt" => Ok(MathNode::Sqrt(Box::new(self.parse_atom()?))),
            "quad" => Ok(MathNode::Space(1.0)),
            "qquad" => Ok(MathNode::Space(2.0)),
            // Delimiter sizing is ignored; the delimiter itself is parsed next.
            "left" | "right" => Ok(MathNode::Row(Vec::new())),
            "mathrm" | "text" => Ok(upright(self.parse_atom()?)),
            _ => {
                if let Some(ch) = table_lookup(GREEK, &name).or_else(|| table_lookup(OPERATORS, &name))
                {
                    Ok(MathNode::Glyph {
                        ch,
                        style: GlyphStyle::Symbol,
                    })
                } else if FUNCTIONS.contains(&name.as_str()) {
                    Ok(MathNode::Word(name))
                } else {
                    Err(self.error(start, format!("unknown command '\\{name}'")))
                }
            }
        }
    }
}

fn glyph(ch: char) -> MathNode {
    let style = if ch.is_ascii_alphabetic() {
        GlyphStyle::Italic
    } else if FontFace::is_symbol_char(ch) {
        GlyphStyle::Symbol
    } else {
        GlyphStyle::Upright
    };
    MathNode::Glyph { ch, style }
}

/// Set every Latin letter in `node` upright.
fn upright(node: MathNode) -> MathNode {
    match node {
        MathNode::Glyph {
            ch,
            style: GlyphStyle::Italic,
        } => MathNode::Glyph {
            ch,
            style: GlyphStyle::Upright,
        },
        MathNode::Row(items) => MathNode::Row(items.into_iter().map(upright).collect()),
        other => other,
    }
}

// ── Layout ───────────────────────────────────────────────────────────────

/// A positioned mark, relative to the box's baseline origin (y up).
#[derive(Debug, Clone, PartialEq)]
pub enum Ink {
    Glyph {
        text: String,
        x: f32,
        y: f32,
        face: FontFace,
        size: f32,
    },
    Rule {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl Ink {
    fn shifted(self, dx: f32, dy: f32) -> Ink {
        match self {
            Ink::Glyph {
                text,
                x,
                y,
                face,
                size,
            } => Ink::Glyph {
                text,
                x: x + dx,
                y: y + dy,
                face,
                size,
            },
            Ink::Rule {
                x,
                y,
                width,
                height,
            } => Ink::Rule {
                x: x + dx,
                y: y + dy,
                width,
                height,
            },
        }
    }
}

/// A laid-out expression. `ascent` is above the baseline, `descent` below.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MathBox {
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
    pub ink: Vec<Ink>,
}

impl MathBox {
    fn place(&mut self, other: MathBox, dx: f32, dy: f32) {
        self.ink
            .extend(other.ink.into_iter().map(|i| i.shifted(dx, dy)));
    }

    fn glyph_run(text: String, face: FontFace, size: f32, pad: f32) -> MathBox {
        let width = text_width(face, &text, size);
        MathBox {
            width: width + 2.0 * pad,
            ascent: face.ascent_units() * size / 1000.0,
            descent: face.descent_units() * size / 1000.0,
            ink: vec![Ink::Glyph {
                text,
                x: pad,
                y: 0.0,
                face,
                size,
            }],
        }
    }
}

/// Lay out `node` at `size` points.
pub fn layout(node: &MathNode, size: f32) -> MathBox {
    match node {
        MathNode::Glyph { ch, style } => {
            let face = match style {
                GlyphStyle::Italic => FontFace::HelveticaOblique,
                GlyphStyle::Upright => FontFace::Helvetica,
                GlyphStyle::Symbol => FontFace::Symbol,
            };
            let pad = if is_relation_or_binary(*ch) {
                0.2 * size
            } else {
                0.0
            };
            MathBox::glyph_run(ch.to_string(), face, size, pad)
        }
        MathNode::Word(word) => MathBox::glyph_run(word.clone(), FontFace::Helvetica, size, 0.0),
        MathNode::Space(em) => MathBox {
            width: em * size,
            ..MathBox::default()
        },
        MathNode::Row(items) => {
            let mut row = MathBox::default();
            for item in items {
                let b = layout(item, size);
                let x = row.width;
                row.width += b.width;
                row.ascent = row.ascent.max(b.ascent);
                row.descent = row.descent.max(b.descent);
                row.place(b, x, 0.0);
            }
            row
        }
        MathNode::Scripts { base, sup, sub } => layout_scripts(base, sup.as_deref(), sub.as_deref(), size),
        MathNode::Frac { num, den } => layout_frac(num, den, size),
        MathNode::Sqrt(body) => layout_sqrt(body, size),
    }
}

fn layout_scripts(
    base: &MathNode,
    sup: Option<&MathNode>,
    sub: Option<&MathNode>,
    size: f32,
) -> MathBox {
    let script_size = size * SCRIPT_SCALE;
    let base = layout(base, size);
    let sup = sup.map(|n| layout(n, script_size));
    let sub = sub.map(|n| layout(n, script_size));

    let mut sup_shift = sup
        .as_ref()
        .map_or(0.0, |s| (base.ascent - 0.5 * s.ascent).max(0.35 * size));
    let sub_shift = sub
        .as_ref()
        .map_or(0.0, |_| base.descent.max(0.25 * size));

    // Keep a visible gap between stacked scripts.
    if let (Some(up), Some(down)) = (&sup, &sub) {
        let gap = (sup_shift - up.descent) - (down.ascent - sub_shift);
        let min_gap = 0.1 * size;
        if gap < min_gap {
            sup_shift += min_gap - gap;
        }
    }

    let x = base.width;
    let mut out = MathBox {
        width: base.width,
        ascent: base.ascent,
        descent: base.descent,
        ink: Vec::new(),
    };
    out.place(base, 0.0, 0.0);

    let mut script_width: f32 = 0.0;
    if let Some(up) = sup {
        out.ascent = out.ascent.max(sup_shift + up.ascent);
        script_width = script_width.max(up.width);
        out.place(up, x, sup_shift);
    }
    if let Some(down) = sub {
        out.descent = out.descent.max(sub_shift + down.descent);
        script_width = script_width.max(down.width);
        out.place(down, x, -sub_shift);
    }
    out.width += script_width + 0.05 * size;
    out
}

fn layout_frac(num: &MathNode, den: &MathNode, size: f32) -> MathBox {
    let part_size = size * 0.85;
    let num = layout(num, part_size);
    let den = layout(den, part_size);

    let axis = 0.25 * size;
    let thickness = (0.05 * size).max(0.5);
    let gap = 0.15 * size;
    let width = num.width.max(den.width) + 0.2 * size;

    let num_y = axis + thickness / 2.0 + gap + num.descent;
    let den_y = axis - thickness / 2.0 - gap - den.ascent;

    let mut out = MathBox {
        width,
        ascent: num_y + num.ascent,
        descent: den.descent - den_y,
        ink: vec![Ink::Rule {
            x: 0.0,
            y: axis - thickness / 2.0,
            width,
            height: thickness,
        }],
    };
    let num_x = (width - num.width) / 2.0;
    let den_x = (width - den.width) / 2.0;
    out.place(num, num_x, num_y);
    out.place(den, den_x, den_y);
    out
}

fn layout_sqrt(body: &MathNode, size: f32) -> MathBox {
    let body = layout(body, size);
    let radical = MathBox::glyph_run("√".to_string(), FontFace::Symbol, size, 0.0);
    let gap = 0.1 * size;
    let thickness = (0.05 * size).max(0.5);
    let x = radical.width;
    let bar_width = body.width + 0.1 * size;

    let mut out = MathBox {
        width: x + bar_width,
        ascent: body.ascent + gap + thickness,
        descent: body.descent.max(radical.descent),
        ink: vec![Ink::Rule {
            x,
            y: body.ascent + gap,
            width: bar_width,
            height: thickness,
        }],
    };
    out.place(radical, 0.0, 0.0);
    out.place(body, x, 0.0);
    out
}

/// A typeset expression on its canvas, ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct Typeset {
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

/// Parse and lay out `expr` centred on a canvas of at least 6in × 1in,
/// drawn in `color`.
pub fn typeset(expr: &str, color: Rgb) -> Result<Typeset, MathError> {
    let node = parse(expr)?;
    let laid = layout(&node, MATH_FONT_SIZE);
    if laid.ink.is_empty() {
        return Err(MathError::Parse {
            expr: expr.to_string(),
            offset: 0,
            reason: "nothing to draw".into(),
        });
    }

    let width = CANVAS_WIDTH.max(laid.width + 4.0 * CROP_PADDING);
    let height = CANVAS_HEIGHT.max(laid.ascent + laid.descent + 4.0 * CROP_PADDING);
    let origin_x = (width - laid.width) / 2.0;
    let baseline = (height - (laid.ascent - laid.descent)) / 2.0;

    let ops = laid
        .ink
        .into_iter()
        .map(|ink| match ink {
            Ink::Glyph {
                text,
                x,
                y,
                face,
                size,
            } => DrawOp::Text {
                text,
                x: origin_x + x,
                y: baseline + y,
                face,
                size,
                color,
            },
            Ink::Rule {
                x,
                y,
                width,
                height,
            } => DrawOp::FillRect {
                x: origin_x + x,
                y: baseline + y,
                width,
                height,
                color,
            },
        })
        .collect();

    Ok(Typeset { width, height, ops })
}

// ── Rasterising ──────────────────────────────────────────────────────────

/// Crop `image` to the bounding box of its non-transparent pixels, grown by
/// `padding` pixels on each side (clamped to the image). `None` when the
/// image has no ink.
pub fn crop_to_ink(image: &DynamicImage, padding: u32) -> Option<RgbaImage> {
    let rgba = image.to_rgba8();
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    let mut found = false;
    for (x, y, pixel) in rgba.enumerate_pixels() {
        if pixel[3] > 0 {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if !found {
        return None;
    }

    let x0 = min_x.saturating_sub(padding);
    let y0 = min_y.saturating_sub(padding);
    let x1 = (max_x + padding).min(rgba.width() - 1);
    let y1 = (max_y + padding).min(rgba.height() - 1);
    Some(image::imageops::crop_imm(&rgba, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image())
}

/// Renders math through a pdfium scratch document.
pub struct PdfiumMathRenderer<'a> {
    pdfium: &'a Pdfium,
    scratch: &'a ScratchDir,
}

impl<'a> PdfiumMathRenderer<'a> {
    pub fn new(pdfium: &'a Pdfium, scratch: &'a ScratchDir) -> Self {
        Self { pdfium, scratch }
    }

    fn try_render(&self, expr: &str) -> Result<PathBuf, MathError> {
        let raster = |detail: String| MathError::Raster {
            expr: expr.to_string(),
            detail,
        };

        let typeset = typeset(expr, Rgb::WHITE)?;

        let mut document = self
            .pdfium
            .create_new_pdf()
            .map_err(|e| raster(e.to_string()))?;
        let fonts = FontSet::load(&mut document);
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::from_points(
                PdfPoints::new(typeset.width),
                PdfPoints::new(typeset.height),
            ))
            .map_err(|e| raster(e.to_string()))?;
        paint_ops(&mut page, &fonts, &typeset.ops).map_err(|e| raster(e.to_string()))?;

        let scale = RASTER_DPI / INCH;
        let config = PdfRenderConfig::new()
            .set_target_width((typeset.width * scale).round() as i32)
            .set_maximum_height((typeset.height * scale).round() as i32)
            .set_clear_color(PdfColor::new(0, 0, 0, 0));
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| raster(e.to_string()))?;

        let padding = (CROP_PADDING * scale).round() as u32;
        let cropped = crop_to_ink(&bitmap.as_image(), padding)
            .ok_or_else(|| raster("rendered image is empty".into()))?;

        let path = self.scratch.keyed_path("math", expr, "png");
        cropped
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| raster(e.to_string()))?;
        debug!(
            "Rendered math '{}' → {} ({}x{} px)",
            expr,
            path.display(),
            cropped.width(),
            cropped.height()
        );
        Ok(path)
    }
}

impl MathRenderer for PdfiumMathRenderer<'_> {
    fn render(&self, expr: &str) -> RenderOutcome {
        match self.try_render(expr) {
            Ok(path) => RenderOutcome::Image { path },
            Err(reason) => {
                warn!("Math fallback to text: {reason}");
                RenderOutcome::FallbackText {
                    text: expr.to_string(),
                    reason,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::engine::tests::pdfium_or_skip;
    use image::Rgba;

    fn parse_err(expr: &str) -> (usize, String) {
        match parse(expr) {
            Err(MathError::Parse { offset, reason, .. }) => (offset, reason),
            other => panic!("expected parse error for {expr:?}, got {other:?}"),
        }
    }

    #[test]
    fn whitespace_is_ignored() {
        assert_eq!(parse("x = 1").unwrap(), parse("x=1").unwrap());
    }

    #[test]
    fn letters_are_italic_digits_upright() {
        let MathNode::Row(items) = parse("x2").unwrap() else {
            panic!("expected a row")
        };
        assert_eq!(
            items,
            vec![
                MathNode::Glyph {
                    ch: 'x',
                    style: GlyphStyle::Italic
                },
                MathNode::Glyph {
                    ch: '2',
                    style: GlyphStyle::Upright
                },
            ]
        );
    }

    #[test]
    fn sub_and_superscript_attach_to_one_base() {
        let MathNode::Row(items) = parse("x_1^{2n}").unwrap() else {
            panic!("expected a row")
        };
        assert_eq!(items.len(), 1);
        let MathNode::Scripts { sup, sub, .. } = &items[0] else {
            panic!("expected scripts, got {:?}", items[0])
        };
        assert!(sup.is_some() && sub.is_some());
    }

    #[test]
    fn commands_resolve() {
        let MathNode::Row(items) = parse(r"\alpha \times \frac{a}{b} \sqrt{2} \sin x").unwrap()
        else {
            panic!("expected a row")
        };
        assert_eq!(
            items[0],
            MathNode::Glyph {
                ch: 'α',
                style: GlyphStyle::Symbol
            }
        );
        assert!(matches!(items[2], MathNode::Frac { .. }));
        assert!(matches!(items[3], MathNode::Sqrt(_)));
        assert_eq!(items[4], MathNode::Word("sin".into()));
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert_eq!(parse_err("x^{2").1, "missing '}'");
        assert_eq!(parse_err("a}").0, 1);
        assert!(parse_err(r"\foo x").1.contains("unknown command"));
        assert_eq!(parse_err("x^").1, "expected an argument");
        assert!(parse_err("^2").1.contains("without a base"));
        assert_eq!(parse_err("x^2^3").1, "double superscript");
        assert_eq!(parse_err("x_1_2").1, "double subscript");
        assert!(parse_err("costs $5").1.contains("not allowed"));
        assert!(parse_err("#1").1.contains("not allowed"));
        assert_eq!(parse_err("x \\").1, "trailing backslash");
    }

    #[test]
    fn superscript_is_raised_and_smaller() {
        let b = layout(&parse("x^2").unwrap(), 20.0);
        let sizes: Vec<(f32, f32)> = b
            .ink
            .iter()
            .filter_map(|i| match i {
                Ink::Glyph { y, size, .. } => Some((*y, *size)),
                _ => None,
            })
            .collect();
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[0], (0.0, 20.0));
        assert!(sizes[1].0 > 0.0);
        assert!((sizes[1].1 - 14.0).abs() < 1e-4);
    }

    #[test]
    fn fraction_stacks_around_a_rule() {
        let b = layout(&parse(r"\frac{a}{b}").unwrap(), 20.0);
        let rule_y = b
            .ink
            .iter()
            .find_map(|i| match i {
                Ink::Rule { y, .. } => Some(*y),
                _ => None,
            })
            .unwrap();
        let glyph_ys: Vec<f32> = b
            .ink
            .iter()
            .filter_map(|i| match i {
                Ink::Glyph { y, .. } => Some(*y),
                _ => None,
            })
            .collect();
        assert!(glyph_ys[0] > rule_y, "numerator above the rule");
        assert!(glyph_ys[1] < rule_y, "denominator below the rule");
        assert!(b.descent > 0.0);
    }

    #[test]
    fn typeset_centres_on_minimum_canvas() {
        let t = typeset("x=1", Rgb::WHITE).unwrap();
        assert_eq!((t.width, t.height), (CANVAS_WIDTH, CANVAS_HEIGHT));
        let xs: Vec<f32> = t
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(xs.len(), 3);
        assert!(xs[0] > 150.0 && xs[2] < 282.0);
    }

    #[test]
    fn long_expressions_widen_the_canvas() {
        let expr = "a+".repeat(40) + "b";
        let t = typeset(&expr, Rgb::WHITE).unwrap();
        assert!(t.width > CANVAS_WIDTH);
    }

    #[test]
    fn blank_expression_has_nothing_to_draw() {
        assert!(typeset("   ", Rgb::WHITE).is_err());
    }

    #[test]
    fn crop_finds_ink_and_pads() {
        let mut img = RgbaImage::new(100, 50);
        img.put_pixel(40, 20, Rgba([255, 255, 255, 255]));
        img.put_pixel(60, 25, Rgba([255, 255, 255, 128]));
        let cropped = crop_to_ink(&DynamicImage::ImageRgba8(img), 5).unwrap();
        assert_eq!(cropped.dimensions(), (31, 16));
        assert_eq!(cropped.get_pixel(5, 5)[3], 255);
    }

    #[test]
    fn crop_clamps_to_image_and_rejects_blank() {
        let mut img = RgbaImage::new(10, 10);
        img.put_pixel(0, 9, Rgba([255, 255, 255, 255]));
        let cropped = crop_to_ink(&DynamicImage::ImageRgba8(img), 5).unwrap();
        assert_eq!(cropped.dimensions(), (6, 6));

        let blank = DynamicImage::ImageRgba8(RgbaImage::new(10, 10));
        assert!(crop_to_ink(&blank, 5).is_none());
    }

    #[test]
    fn malformed_math_falls_back_to_text() {
        let Some(pdfium) = pdfium_or_skip("malformed_math_falls_back_to_text") else {
            return;
        };
        let scratch = ScratchDir::new().unwrap();
        let renderer = PdfiumMathRenderer::new(&pdfium, &scratch);
        match renderer.render("x^{2") {
            RenderOutcome::FallbackText { text, reason } => {
                assert_eq!(text, "x^{2");
                assert!(matches!(reason, MathError::Parse { .. }));
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn renders_png_into_scratch() {
        let Some(pdfium) = pdfium_or_skip("renders_png_into_scratch") else {
            return;
        };
        let scratch = ScratchDir::new().unwrap();
        let renderer = PdfiumMathRenderer::new(&pdfium, &scratch);
        match renderer.render("E = mc^2") {
            RenderOutcome::Image { path } => {
                assert_eq!(path, scratch.keyed_path("math", "E = mc^2", "png"));
                let img = image::open(&path).unwrap();
                assert!(img.width() > 0 && img.height() > 0);
            }
            RenderOutcome::FallbackText { reason, .. } => {
                panic!("expected an image, got fallback: {reason}")
            }
        }
    }
}
