//! Notes composition: turn classified lines into the styled notes PDF.
//!
//! Composition is a single pass over the lines:
//!
//! ```text
//! ClassifiedLine ──▶ StyledBlock ──▶ page flow ──▶ Vec<DrawOp> per page ──▶ pdfium
//!                 (math rendered)   (wrap, break)   (+ page template)
//! ```
//!
//! Headings are recorded as table-of-contents entries while the body is laid
//! out. The contents are then set on their own leading page(s), and entry
//! page numbers are shifted by the number of contents pages. Nothing is
//! written until every page has been built.

use super::classify::{ClassifiedLine, LineKind};
use super::math::{MathRenderer, PdfiumMathRenderer, RenderOutcome};
use super::metrics::{text_width, wrap_chars, wrap_words, FontFace};
use super::paint::{paint_ops, DrawOp, FontSet};
use crate::config::{NotesConfig, Rgb, INCH};
use crate::error::LuminarError;
use crate::output::write_atomic;
use crate::scratch::ScratchDir;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const HEADING: TextStyle = TextStyle {
    face: FontFace::HelveticaBold,
    size: 16.0,
    leading: 22.0,
};
const HEADING_SPACE_AFTER: f32 = 12.0;

const BODY: TextStyle = TextStyle {
    face: FontFace::Helvetica,
    size: 12.0,
    leading: 18.0,
};
const BODY_SPACE_AFTER: f32 = 8.0;

const CODE: TextStyle = TextStyle {
    face: FontFace::Courier,
    size: 11.0,
    leading: 14.0,
};
const CODE_PADDING: f32 = 5.0;

const TOC_ENTRY: TextStyle = TextStyle {
    face: FontFace::HelveticaBold,
    size: 10.0,
    leading: 12.0,
};
/// Width reserved for page numbers at the right of the contents.
const TOC_NUMBER_COLUMN: f32 = 36.0;

const BULLET: &str = "•";

/// One entry of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading as displayed (upper-cased).
    pub title: String,
    /// Bookmark key: the original text lower-cased, spaces as underscores.
    pub anchor: String,
    /// 1-based page number in the final document.
    pub page: usize,
}

/// Bookmark key for a heading.
pub fn anchor_for(text: &str) -> String {
    text.to_lowercase().replace(' ', "_")
}

/// A line with its presentation decided.
#[derive(Debug, Clone, PartialEq)]
pub enum StyledBlock {
    Heading { title: String, anchor: String },
    Code(String),
    MathImage(PathBuf),
    /// Unstyled body text; used for math that could not be typeset.
    Paragraph(String),
    Point(String),
    Spacer(f32),
}

/// Style every line, rendering math through `renderer`. Returns the blocks
/// and the number of math lines that fell back to text.
pub fn style_blocks(
    lines: &[ClassifiedLine],
    renderer: &dyn MathRenderer,
    item_spacing: f32,
) -> (Vec<StyledBlock>, usize) {
    let mut blocks = Vec::with_capacity(lines.len() * 2);
    let mut fallbacks = 0;
    for line in lines {
        let block = match line.kind {
            LineKind::Heading => StyledBlock::Heading {
                title: line.text.to_uppercase(),
                anchor: anchor_for(&line.text),
            },
            LineKind::Code => StyledBlock::Code(line.text.clone()),
            LineKind::Math => match renderer.render(&line.text) {
                RenderOutcome::Image { path } => StyledBlock::MathImage(path),
                RenderOutcome::FallbackText { text, .. } => {
                    fallbacks += 1;
                    StyledBlock::Paragraph(text)
                }
            },
            LineKind::Point => StyledBlock::Point(line.text.clone()),
        };
        blocks.push(block);
        blocks.push(StyledBlock::Spacer(item_spacing));
    }
    (blocks, fallbacks)
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    face: FontFace,
    size: f32,
    leading: f32,
}

impl TextStyle {
    /// Baseline distance below the top of a line box.
    fn baseline_drop(&self) -> f32 {
        (self.leading + self.size) / 2.0
    }

    fn op(&self, text: impl Into<String>, x: f32, line_top: f32, color: Rgb) -> DrawOp {
        DrawOp::Text {
            text: text.into(),
            x,
            y: line_top - self.baseline_drop(),
            face: self.face,
            size: self.size,
            color,
        }
    }
}

/// Fills pages top to bottom inside the margin frame.
struct PageFlow<'c> {
    config: &'c NotesConfig,
    pages: Vec<Vec<DrawOp>>,
    /// Top of the free space on the current page (PDF space).
    y: f32,
}

impl<'c> PageFlow<'c> {
    fn new(config: &'c NotesConfig) -> Self {
        Self {
            config,
            pages: vec![Vec::new()],
            y: config.page_height - config.margin,
        }
    }

    fn left(&self) -> f32 {
        self.config.margin
    }

    fn width(&self) -> f32 {
        self.config.frame_width()
    }

    fn top(&self) -> f32 {
        self.config.page_height - self.config.margin
    }

    fn bottom(&self) -> f32 {
        self.config.margin
    }

    fn at_page_top(&self) -> bool {
        self.y >= self.top()
    }

    fn page_index(&self) -> usize {
        self.pages.len() - 1
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = self.top();
    }

    /// Break the page unless `height` still fits. A fresh page always
    /// accepts, so oversized items cannot loop.
    fn reserve(&mut self, height: f32) {
        if self.y - height < self.bottom() && !self.at_page_top() {
            self.new_page();
        }
    }

    /// Vertical space; swallowed at the top of a page.
    fn space(&mut self, height: f32) {
        if !self.at_page_top() {
            self.y = (self.y - height).max(self.bottom());
        }
    }

    /// Reserve one line box and return its top.
    fn next_line(&mut self, leading: f32) -> f32 {
        self.reserve(leading);
        let top = self.y;
        self.y -= leading;
        top
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }

    fn centred_x(&self, text: &str, style: &TextStyle) -> f32 {
        self.left() + (self.width() - text_width(style.face, text, style.size)) / 2.0
    }

    fn heading(&mut self, title: &str, color: Rgb) -> usize {
        let mut first_page = None;
        for line in wrap_words(title, HEADING.face, HEADING.size, self.width()) {
            let top = self.next_line(HEADING.leading);
            first_page.get_or_insert(self.page_index());
            let x = self.centred_x(&line, &HEADING);
            self.push(HEADING.op(line, x, top, color));
        }
        self.space(HEADING_SPACE_AFTER);
        first_page.unwrap_or_else(|| self.page_index())
    }

    fn paragraph(&mut self, text: &str, color: Rgb) {
        for line in wrap_words(text, BODY.face, BODY.size, self.width()) {
            let top = self.next_line(BODY.leading);
            let x = self.left();
            self.push(BODY.op(line, x, top, color));
        }
        self.space(BODY_SPACE_AFTER);
    }

    fn point(&mut self, text: &str, bullet_color: Rgb, color: Rgb) {
        let indent = text_width(BODY.face, &format!("{BULLET} "), BODY.size);
        let lines = wrap_words(text, BODY.face, BODY.size, self.width() - indent);
        for (i, line) in lines.into_iter().enumerate() {
            let top = self.next_line(BODY.leading);
            if i == 0 {
                let x = self.left();
                self.push(BODY.op(BULLET, x, top, bullet_color));
            }
            let x = self.left() + indent;
            self.push(BODY.op(line, x, top, color));
        }
        self.space(BODY_SPACE_AFTER);
    }

    /// Preformatted text on a tinted box. Whitespace is kept; only lines
    /// wider than the frame are broken, by characters.
    fn code(&mut self, text: &str, background: Rgb, color: Rgb) {
        let lines: Vec<String> = text
            .split('\n')
            .flat_map(|line| {
                if text_width(CODE.face, line, CODE.size) > self.width() {
                    wrap_chars(line, CODE.face, CODE.size, self.width())
                } else {
                    vec![line.to_string()]
                }
            })
            .collect();

        let mut segment: Vec<(f32, String)> = Vec::new();
        for line in lines {
            let before = self.page_index();
            let top = self.next_line(CODE.leading);
            if self.page_index() != before && !segment.is_empty() {
                // The box continues on the new page; close the old segment
                // on the page it belongs to.
                let done = std::mem::take(&mut segment);
                let page = self.pages.len() - 2;
                let ops = self.code_segment(&done, background, color);
                self.pages[page].extend(ops);
            }
            segment.push((top, line));
        }
        if !segment.is_empty() {
            let ops = self.code_segment(&segment, background, color);
            for op in ops {
                self.push(op);
            }
        }
    }

    fn code_segment(&self, lines: &[(f32, String)], background: Rgb, color: Rgb) -> Vec<DrawOp> {
        let Some(first_top) = lines.first().map(|(top, _)| *top) else {
            return Vec::new();
        };
        let height = lines.len() as f32 * CODE.leading;
        let mut ops = vec![DrawOp::FillRect {
            x: self.left() - CODE_PADDING,
            y: first_top - height - CODE_PADDING,
            width: self.width() + 2.0 * CODE_PADDING,
            height: height + 2.0 * CODE_PADDING,
            color: background,
        }];
        ops.extend(
            lines
                .iter()
                .map(|(top, line)| CODE.op(line.clone(), self.left(), *top, color)),
        );
        ops
    }

    fn image(&mut self, path: &Path, width: f32, height: f32) {
        self.reserve(height);
        let x = self.left() + (self.width() - width) / 2.0;
        self.y -= height;
        let y = self.y;
        self.push(DrawOp::Image {
            path: path.to_path_buf(),
            x,
            y,
            width,
            height,
        });
    }
}

/// A fully laid-out notes document.
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    /// Draw operations per page, page template included.
    pub pages: Vec<Vec<DrawOp>>,
    pub toc: Vec<TocEntry>,
    /// Leading pages holding the table of contents (0 without headings).
    pub contents_pages: usize,
    pub math_fallbacks: usize,
}

/// Decoration shared by every page: background, running header and the
/// "Page N" footer. A pure function of the page number.
pub fn page_template(page_number: usize, config: &NotesConfig) -> Vec<DrawOp> {
    let w = config.page_width;
    let h = config.page_height;
    let header_size = 10.0;
    let footer_size = 9.0;
    let footer = format!("Page {page_number}");
    vec![
        DrawOp::FillRect {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
            color: config.palette.background,
        },
        DrawOp::Text {
            x: (w - text_width(FontFace::HelveticaBold, &config.title, header_size)) / 2.0,
            y: h - 0.5 * INCH,
            text: config.title.clone(),
            face: FontFace::HelveticaBold,
            size: header_size,
            color: config.palette.heading,
        },
        DrawOp::Text {
            x: (w - text_width(FontFace::Helvetica, &footer, footer_size)) / 2.0,
            y: 0.5 * INCH,
            text: footer,
            face: FontFace::Helvetica,
            size: footer_size,
            color: config.palette.accent,
        },
    ]
}

/// Lay out the contents pages for `entries`, whose `page` fields are body
/// page indices (0-based). Numbers printed are shifted by `offset`.
fn layout_contents(
    entries: &[(String, String, usize)],
    offset: usize,
    config: &NotesConfig,
) -> Vec<Vec<DrawOp>> {
    let palette = &config.palette;
    let mut flow = PageFlow::new(config);
    flow.heading("Contents", palette.heading);

    let title_width = flow.width() - TOC_NUMBER_COLUMN;
    for (title, _, body_page) in entries {
        let number = (offset + body_page + 1).to_string();
        let lines = wrap_words(title, TOC_ENTRY.face, TOC_ENTRY.size, title_width);
        for (i, line) in lines.into_iter().enumerate() {
            let top = flow.next_line(TOC_ENTRY.leading);
            let x = flow.left();
            flow.push(TOC_ENTRY.op(line, x, top, palette.heading));
            if i == 0 {
                let nx = flow.left() + flow.width()
                    - text_width(TOC_ENTRY.face, &number, TOC_ENTRY.size);
                flow.push(TOC_ENTRY.op(number.clone(), nx, top, palette.heading));
            }
        }
    }
    flow.pages
}

/// Lay out `lines` into pages. Math is rendered through `renderer`.
pub fn compose_layout(
    lines: &[ClassifiedLine],
    config: &NotesConfig,
    renderer: &dyn MathRenderer,
) -> Result<ComposedDocument, LuminarError> {
    if lines.is_empty() {
        return Err(LuminarError::Compose {
            detail: "no highlighted lines to compose".into(),
        });
    }

    let (blocks, math_fallbacks) = style_blocks(lines, renderer, config.item_spacing);
    let palette = &config.palette;

    let mut flow = PageFlow::new(config);
    let mut headings: Vec<(String, String, usize)> = Vec::new();
    for block in &blocks {
        match block {
            StyledBlock::Heading { title, anchor } => {
                let page = flow.heading(title, palette.heading);
                headings.push((title.clone(), anchor.clone(), page));
            }
            StyledBlock::Code(text) => flow.code(text, palette.code_background, palette.text),
            StyledBlock::MathImage(path) => flow.image(path, config.math_width, config.math_height),
            StyledBlock::Paragraph(text) => flow.paragraph(text, palette.text),
            StyledBlock::Point(text) => flow.point(text, palette.accent, palette.text),
            StyledBlock::Spacer(h) => flow.space(*h),
        }
    }
    let body = flow.pages;

    // The contents page count does not depend on the numbers printed, so
    // one measuring pass fixes the offset.
    let contents = if headings.is_empty() {
        Vec::new()
    } else {
        let count = layout_contents(&headings, 0, config).len();
        layout_contents(&headings, count, config)
    };
    let contents_pages = contents.len();

    let toc = headings
        .into_iter()
        .map(|(title, anchor, body_page)| TocEntry {
            title,
            anchor,
            page: contents_pages + body_page + 1,
        })
        .collect();

    let pages = contents
        .into_iter()
        .chain(body)
        .enumerate()
        .map(|(i, content)| {
            let mut ops = page_template(i + 1, config);
            ops.extend(content);
            ops
        })
        .collect::<Vec<_>>();

    debug!(
        "Laid out {} blocks on {} pages ({} contents)",
        blocks.len(),
        pages.len(),
        contents_pages
    );

    Ok(ComposedDocument {
        pages,
        toc,
        contents_pages,
        math_fallbacks,
    })
}

/// Paint a composed document into a new PDF and return its bytes.
pub fn render_pdf(
    pdfium: &Pdfium,
    composed: &ComposedDocument,
    config: &NotesConfig,
) -> Result<Vec<u8>, LuminarError> {
    let fail = |detail: String| LuminarError::Compose { detail };

    let mut document = pdfium.create_new_pdf().map_err(|e| fail(e.to_string()))?;
    let fonts = FontSet::load(&mut document);
    for (i, ops) in composed.pages.iter().enumerate() {
        let size = PdfPagePaperSize::from_points(
            PdfPoints::new(config.page_width),
            PdfPoints::new(config.page_height),
        );
        let mut page = document
            .pages_mut()
            .create_page_at_end(size)
            .map_err(|e| fail(format!("page {}: {e}", i + 1)))?;
        paint_ops(&mut page, &fonts, ops).map_err(|e| fail(format!("page {}: {e}", i + 1)))?;
    }
    document.save_to_bytes().map_err(|e| fail(e.to_string()))
}

/// Compose `lines` into a notes PDF at `output`.
///
/// Math images are rendered into `scratch`. The output file is written once,
/// atomically, after the whole document is built.
pub fn compose_notes(
    pdfium: &Pdfium,
    lines: &[ClassifiedLine],
    output: &Path,
    config: &NotesConfig,
    scratch: &ScratchDir,
) -> Result<ComposedDocument, LuminarError> {
    let renderer = PdfiumMathRenderer::new(pdfium, scratch);
    let composed = compose_layout(lines, config, &renderer)?;
    let bytes = render_pdf(pdfium, &composed, config)?;
    write_atomic(output, &bytes)?;
    info!(
        "Wrote notes: {} pages, {} contents entries → {}",
        composed.pages.len(),
        composed.toc.len(),
        output.display()
    );
    Ok(composed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MathError;
    use crate::pipeline::engine::tests::pdfium_or_skip;

    /// Renders every expression to a fixed path, or always falls back.
    struct FakeRenderer {
        fail: bool,
    }

    impl MathRenderer for FakeRenderer {
        fn render(&self, expr: &str) -> RenderOutcome {
            if self.fail {
                RenderOutcome::FallbackText {
                    text: expr.to_string(),
                    reason: MathError::Raster {
                        expr: expr.to_string(),
                        detail: "test".into(),
                    },
                }
            } else {
                RenderOutcome::Image {
                    path: PathBuf::from("/scratch/math_test.png"),
                }
            }
        }
    }

    const OK: FakeRenderer = FakeRenderer { fail: false };

    fn texts(ops: &[DrawOp]) -> Vec<&str> {
        ops.iter().filter_map(DrawOp::text).collect()
    }

    fn line(kind: LineKind, text: &str) -> ClassifiedLine {
        ClassifiedLine::new(kind, text)
    }

    #[test]
    fn anchor_lowercases_and_underscores() {
        assert_eq!(anchor_for("AIM: Learn Rust"), "aim:_learn_rust");
    }

    #[test]
    fn empty_input_is_a_compose_error() {
        let err = compose_layout(&[], &NotesConfig::default(), &OK).unwrap_err();
        assert!(matches!(err, LuminarError::Compose { .. }));
    }

    #[test]
    fn every_item_is_followed_by_a_spacer() {
        let lines = vec![line(LineKind::Point, "a"), line(LineKind::Code, "int x;")];
        let (blocks, fallbacks) = style_blocks(&lines, &OK, 12.0);
        assert_eq!(fallbacks, 0);
        assert_eq!(
            blocks,
            vec![
                StyledBlock::Point("a".into()),
                StyledBlock::Spacer(12.0),
                StyledBlock::Code("int x;".into()),
                StyledBlock::Spacer(12.0),
            ]
        );
    }

    #[test]
    fn heading_is_uppercased_centred_and_listed_after_contents() {
        let config = NotesConfig::default();
        let lines = vec![
            line(LineKind::Heading, "AIM: learn rust"),
            line(LineKind::Point, "ownership"),
        ];
        let doc = compose_layout(&lines, &config, &OK).unwrap();

        assert_eq!(doc.contents_pages, 1);
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(
            doc.toc,
            vec![TocEntry {
                title: "AIM: LEARN RUST".into(),
                anchor: "aim:_learn_rust".into(),
                page: 2,
            }]
        );

        let contents = texts(&doc.pages[0]);
        assert!(contents.contains(&"Contents"));
        assert!(contents.contains(&"AIM: LEARN RUST"));
        assert!(contents.contains(&"2"));

        let heading = doc.pages[1]
            .iter()
            .find(|op| op.text() == Some("AIM: LEARN RUST"))
            .unwrap();
        let DrawOp::Text { x, face, size, color, .. } = heading else {
            unreachable!()
        };
        let width = text_width(FontFace::HelveticaBold, "AIM: LEARN RUST", 16.0);
        assert!((x + width / 2.0 - 306.0).abs() < 0.01);
        assert_eq!((*face, *size), (FontFace::HelveticaBold, 16.0));
        assert_eq!(*color, Rgb::hex(0x00FF41));
    }

    #[test]
    fn without_headings_there_is_no_contents_page() {
        let lines = vec![line(LineKind::Point, "just a point")];
        let doc = compose_layout(&lines, &NotesConfig::default(), &OK).unwrap();
        assert_eq!(doc.contents_pages, 0);
        assert!(doc.toc.is_empty());
        assert_eq!(doc.pages.len(), 1);
    }

    #[test]
    fn every_page_carries_the_template() {
        let config = NotesConfig::default();
        let lines: Vec<ClassifiedLine> = (0..120)
            .map(|i| line(LineKind::Point, &format!("point number {i}")))
            .collect();
        let doc = compose_layout(&lines, &config, &OK).unwrap();
        assert!(doc.pages.len() > 1);

        for (i, page) in doc.pages.iter().enumerate() {
            assert_eq!(&page[..3], &page_template(i + 1, &config)[..]);
            let footer = format!("Page {}", i + 1);
            assert!(texts(page).contains(&footer.as_str()));
            assert!(texts(page).contains(&"Luminar Notes"));
        }
    }

    #[test]
    fn content_stays_inside_the_frame() {
        let config = NotesConfig::default();
        let lines: Vec<ClassifiedLine> = (0..200)
            .map(|i| {
                let kind = [LineKind::Point, LineKind::Code, LineKind::Heading][i % 3];
                line(kind, &format!("item {i} with some words to wrap around"))
            })
            .collect();
        let doc = compose_layout(&lines, &config, &OK).unwrap();
        for page in &doc.pages {
            for op in &page[3..] {
                if let DrawOp::Text { y, .. } = op {
                    assert!(*y >= config.margin - 1.0, "text below frame at {y}");
                    assert!(*y <= config.page_height - config.margin);
                }
            }
        }
        // Each point appears exactly once across pages.
        let all: Vec<&str> = doc.pages.iter().flat_map(|p| texts(p)).collect();
        assert_eq!(
            all.iter()
                .filter(|t| **t == "item 0 with some words to wrap around")
                .count(),
            1
        );
    }

    #[test]
    fn point_has_cyan_bullet_and_literal_text() {
        let config = NotesConfig::default();
        let lines = vec![line(LineKind::Point, "<b>bold?</b> & more")];
        let doc = compose_layout(&lines, &config, &OK).unwrap();
        let body = &doc.pages[0][3..];
        assert_eq!(body[0].text(), Some(BULLET));
        let DrawOp::Text { color, x, .. } = &body[0] else {
            unreachable!()
        };
        assert_eq!(*color, Rgb::hex(0x00D4FF));
        assert_eq!(*x, config.margin);
        assert_eq!(body[1].text(), Some("<b>bold?</b> & more"));
    }

    #[test]
    fn code_keeps_whitespace_on_a_tinted_box() {
        let config = NotesConfig::default();
        let lines = vec![line(LineKind::Code, "    return x;  ")];
        let doc = compose_layout(&lines, &config, &OK).unwrap();
        let body = &doc.pages[0][3..];
        let DrawOp::FillRect { color, width, .. } = &body[0] else {
            panic!("expected the code background first, got {:?}", body[0])
        };
        assert_eq!(*color, Rgb::hex(0x1A1A1A));
        assert_eq!(*width, config.frame_width() + 10.0);
        assert_eq!(body[1].text(), Some("    return x;  "));
        let DrawOp::Text { face, size, .. } = &body[1] else {
            unreachable!()
        };
        assert_eq!((*face, *size), (FontFace::Courier, 11.0));
    }

    #[test]
    fn overlong_code_line_is_broken_by_characters() {
        let config = NotesConfig::default();
        // Courier 11pt is 6.6pt per char; the 504pt frame holds 76.
        let long = "x".repeat(100);
        let doc = compose_layout(&[line(LineKind::Code, &long)], &config, &OK).unwrap();
        let pieces: Vec<&str> = texts(&doc.pages[0][3..]);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].len(), 76);
        assert_eq!(pieces.concat(), long);
    }

    #[test]
    fn math_image_is_centred_at_fixed_size() {
        let config = NotesConfig::default();
        let doc = compose_layout(&[line(LineKind::Math, "x = 1")], &config, &OK).unwrap();
        let image = doc.pages[0]
            .iter()
            .find(|op| matches!(op, DrawOp::Image { .. }))
            .unwrap();
        let DrawOp::Image { x, width, height, .. } = image else {
            unreachable!()
        };
        assert_eq!((*width, *height), (288.0, 36.0));
        assert_eq!(*x, 54.0 + (504.0 - 288.0) / 2.0);
        assert_eq!(doc.math_fallbacks, 0);
    }

    #[test]
    fn failed_math_becomes_a_plain_paragraph() {
        let config = NotesConfig::default();
        let renderer = FakeRenderer { fail: true };
        let doc = compose_layout(&[line(LineKind::Math, "x^{2")], &config, &renderer).unwrap();
        assert_eq!(doc.math_fallbacks, 1);
        assert!(!doc.pages[0]
            .iter()
            .any(|op| matches!(op, DrawOp::Image { .. })));
        let body = &doc.pages[0][3..];
        assert_eq!(body[0].text(), Some("x^{2"));
        let DrawOp::Text { face, color, .. } = &body[0] else {
            unreachable!()
        };
        assert_eq!((*face, *color), (FontFace::Helvetica, Rgb::WHITE));
    }

    #[test]
    fn writes_a_readable_pdf() {
        let Some(pdfium) = pdfium_or_skip("writes_a_readable_pdf") else {
            return;
        };
        let scratch = ScratchDir::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("lecture_notes.pdf");
        let lines = vec![
            line(LineKind::Heading, "Goal: pass"),
            line(LineKind::Point, "remember the borrow checker"),
            line(LineKind::Math, "x^{2"),
        ];
        let doc = compose_notes(&pdfium, &lines, &output, &NotesConfig::default(), &scratch)
            .unwrap();
        assert_eq!(doc.math_fallbacks, 1);

        let written = pdfium.load_pdf_from_file(&output, None).unwrap();
        assert_eq!(written.pages().len() as usize, doc.pages.len());
        let body_text = written.pages().get(1).unwrap().text().unwrap().all();
        assert!(body_text.contains("GOAL: PASS"));
        assert!(body_text.contains("x^{2"));
    }
}
