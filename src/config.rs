//! Configuration types for the notes and overlay pipelines.
//!
//! Each feature is controlled through one struct, built via its builder:
//! [`NotesConfig`] for highlight extraction and composition, [`OverlayConfig`]
//! for the header / footer compositor. Keeping every knob in one struct makes
//! it trivial to share configs across threads, serialise them for logging,
//! and diff two runs to understand why their outputs differ.
//!
//! All lengths are PDF points (1/72 inch).

use crate::error::LuminarError;
use crate::pipeline::notebook::NotebookConverter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Points per inch.
pub const INCH: f32 = 72.0;

/// An opaque 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Build a colour from a `0xRRGGBB` literal.
    pub const fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    pub const WHITE: Rgb = Rgb::hex(0xFFFFFF);
    pub const BLACK: Rgb = Rgb::hex(0x000000);
}

/// Colours used by the notes document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Full-page background.
    pub background: Rgb,
    /// Body text.
    pub text: Rgb,
    /// Headings, running header and contents entries.
    pub heading: Rgb,
    /// Bullets and the page-number footer.
    pub accent: Rgb,
    /// Tint behind code blocks.
    pub code_background: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb::hex(0x0A0A0A),
            text: Rgb::hex(0xFFFFFF),
            heading: Rgb::hex(0x00FF41),
            accent: Rgb::hex(0x00D4FF),
            code_background: Rgb::hex(0x1A1A1A),
        }
    }
}

// ── Notes ────────────────────────────────────────────────────────────────

/// Configuration for highlight extraction and notes composition.
///
/// # Example
/// ```rust
/// use luminar_pdf::NotesConfig;
///
/// let config = NotesConfig::builder()
///     .title("Operating Systems, week 3")
///     .margin(54.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.page_width, 612.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    /// Output page width. Default: 612 (US Letter).
    pub page_width: f32,
    /// Output page height. Default: 792 (US Letter).
    pub page_height: f32,
    /// Margin on all four sides of the content frame. Default: 54 (0.75in).
    pub margin: f32,
    /// Running header text drawn on every page. Default: "Luminar Notes".
    pub title: String,
    pub palette: Palette,
    /// Display width of rendered math images. Default: 288 (4in).
    pub math_width: f32,
    /// Display height of rendered math images. Default: 36 (0.5in).
    pub math_height: f32,
    /// Vertical space after every item. Default: 12.
    pub item_spacing: f32,
    /// PDF user password for encrypted sources.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            page_width: 8.5 * INCH,
            page_height: 11.0 * INCH,
            margin: 0.75 * INCH,
            title: "Luminar Notes".to_string(),
            palette: Palette::default(),
            math_width: 4.0 * INCH,
            math_height: 0.5 * INCH,
            item_spacing: 12.0,
            password: None,
            download_timeout_secs: 120,
        }
    }
}

impl NotesConfig {
    /// Create a new builder for `NotesConfig`.
    pub fn builder() -> NotesConfigBuilder {
        NotesConfigBuilder {
            config: Self::default(),
        }
    }

    /// Width of the content frame between the side margins.
    pub fn frame_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }
}

/// Builder for [`NotesConfig`].
#[derive(Debug)]
pub struct NotesConfigBuilder {
    config: NotesConfig,
}

impl NotesConfigBuilder {
    pub fn page_size(mut self, width: f32, height: f32) -> Self {
        self.config.page_width = width;
        self.config.page_height = height;
        self
    }

    pub fn margin(mut self, margin: f32) -> Self {
        self.config.margin = margin.max(0.0);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.config.palette = palette;
        self
    }

    pub fn math_size(mut self, width: f32, height: f32) -> Self {
        self.config.math_width = width;
        self.config.math_height = height;
        self
    }

    pub fn item_spacing(mut self, spacing: f32) -> Self {
        self.config.item_spacing = spacing.max(0.0);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<NotesConfig, LuminarError> {
        let c = &self.config;
        if c.page_width <= 0.0 || c.page_height <= 0.0 {
            return Err(LuminarError::InvalidConfig(format!(
                "page size must be positive, got {}x{}",
                c.page_width, c.page_height
            )));
        }
        // The frame must hold at least one heading line and the math image.
        if c.frame_width() < 72.0 || c.page_height - 2.0 * c.margin < 72.0 + c.math_height {
            return Err(LuminarError::InvalidConfig(format!(
                "margin {} leaves no room for content on a {}x{} page",
                c.margin, c.page_width, c.page_height
            )));
        }
        if c.math_width <= 0.0 || c.math_height <= 0.0 || c.math_width > c.frame_width() {
            return Err(LuminarError::InvalidConfig(format!(
                "math image size {}x{} does not fit the {}pt frame",
                c.math_width,
                c.math_height,
                c.frame_width()
            )));
        }
        Ok(self.config)
    }
}

// ── Overlay ──────────────────────────────────────────────────────────────

/// Left / centre / right strings for one band (header or footer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotText {
    pub left: String,
    pub center: String,
    pub right: String,
}

impl SlotText {
    pub fn new(
        left: impl Into<String>,
        center: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self {
            left: left.into(),
            center: center.into(),
            right: right.into(),
        }
    }

    /// The string configured for `position`.
    pub fn get(&self, position: Position) -> &str {
        match position {
            Position::Left => &self.left,
            Position::Center => &self.center,
            Position::Right => &self.right,
        }
    }
}

/// The band a page number is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Header,
    Footer,
}

/// Horizontal alignment slot within a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Center,
    Right,
}

/// Where the page number goes, written `"<area>-<position>"`,
/// e.g. `"footer-center"` (the default) or `"header-right"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNumberPlacement {
    pub area: Area,
    pub position: Position,
}

impl Default for PageNumberPlacement {
    fn default() -> Self {
        Self {
            area: Area::Footer,
            position: Position::Center,
        }
    }
}

impl FromStr for PageNumberPlacement {
    type Err = LuminarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            LuminarError::InvalidConfig(format!(
                "page number placement must look like 'footer-center' or 'header-right', got '{s}'"
            ))
        };
        let (area, position) = s.trim().split_once('-').ok_or_else(invalid)?;
        let area = match area.to_ascii_lowercase().as_str() {
            "header" => Area::Header,
            "footer" => Area::Footer,
            _ => return Err(invalid()),
        };
        let position = match position.to_ascii_lowercase().as_str() {
            "left" => Position::Left,
            "center" | "centre" => Position::Center,
            "right" => Position::Right,
            _ => return Err(invalid()),
        };
        Ok(Self { area, position })
    }
}

impl fmt::Display for PageNumberPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let area = match self.area {
            Area::Header => "header",
            Area::Footer => "footer",
        };
        let position = match self.position {
            Position::Left => "left",
            Position::Center => "center",
            Position::Right => "right",
        };
        write!(f, "{area}-{position}")
    }
}

/// Configuration for one header / footer compositing run.
///
/// Supplied whole per invocation and never mutated while pages are
/// composited.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    pub headers: SlotText,
    pub footers: SlotText,
    /// Number printed on the first output page. Default: 1.
    pub start_page: i64,
    pub placement: PageNumberPlacement,
    /// Band offset and content inset. Default: 36 (0.5in).
    pub margin: f32,
    /// Header / footer font size. Default: 9.
    pub font_size: f32,
    pub text_color: Rgb,
    /// PDF user password for encrypted sources.
    pub password: Option<String>,
    /// External converter for `.ipynb` inputs.
    pub notebook: NotebookConverter,
    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            headers: SlotText::default(),
            footers: SlotText::default(),
            start_page: 1,
            placement: PageNumberPlacement::default(),
            margin: 0.5 * INCH,
            font_size: 9.0,
            text_color: Rgb::BLACK,
            password: None,
            notebook: NotebookConverter::default(),
            download_timeout_secs: 120,
        }
    }
}

impl OverlayConfig {
    /// Create a new builder for `OverlayConfig`.
    pub fn builder() -> OverlayConfigBuilder {
        OverlayConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`OverlayConfig`].
#[derive(Debug)]
pub struct OverlayConfigBuilder {
    config: OverlayConfig,
}

impl OverlayConfigBuilder {
    pub fn headers(mut self, headers: SlotText) -> Self {
        self.config.headers = headers;
        self
    }

    pub fn footers(mut self, footers: SlotText) -> Self {
        self.config.footers = footers;
        self
    }

    pub fn start_page(mut self, n: i64) -> Self {
        self.config.start_page = n;
        self
    }

    pub fn placement(mut self, placement: PageNumberPlacement) -> Self {
        self.config.placement = placement;
        self
    }

    pub fn margin(mut self, margin: f32) -> Self {
        self.config.margin = margin;
        self
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.config.font_size = size;
        self
    }

    pub fn text_color(mut self, color: Rgb) -> Self {
        self.config.text_color = color;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn notebook(mut self, converter: NotebookConverter) -> Self {
        self.config.notebook = converter;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OverlayConfig, LuminarError> {
        let c = &self.config;
        if !(c.margin > 0.0 && c.margin < 4.0 * INCH) {
            return Err(LuminarError::InvalidConfig(format!(
                "margin must be between 0 and 288pt, got {}",
                c.margin
            )));
        }
        if !(c.font_size > 0.0 && c.font_size <= c.margin) {
            return Err(LuminarError::InvalidConfig(format!(
                "font size must be positive and no larger than the margin, got {}",
                c.font_size
            )));
        }
        Ok(self.config)
    }
}
