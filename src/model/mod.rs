//! # Request Model
//!
//! What a caller sends to render one worksheet: the header image, the text,
//! which kind of sheet, and an optional configuration. Everything is plain
//! serde data; every configuration field has a default matching an
//! A4 worksheet at 300 dpi, so `{"text": "..."}` is a complete
//! request.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::style::{EmphasisMode, SheetStyle};

/// A complete render request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRequest {
    /// Header image: a file path, a `data:image/...;base64,` URI, or raw
    /// base64. Optional for question sheets.
    #[serde(default)]
    pub header: Option<String>,
    /// Story text (or one question per line for a question sheet).
    pub text: String,
    #[serde(default)]
    pub kind: SheetKind,
    #[serde(default)]
    pub config: RenderConfig,
}

/// The two worksheet variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SheetKind {
    #[default]
    Story,
    Questions,
}

/// All knobs of one render.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub page: PageConfig,
    pub typography: TypographyConfig,
    pub drop_cap: DropCapConfig,
    pub questions: QuestionConfig,
    pub style: SheetStyle,
    pub image_mode: ImageMode,
    pub fonts: FontConfig,
}

impl RenderConfig {
    /// The vertical/horizontal budget the body text is laid out against.
    pub fn budget(&self) -> PageBudget {
        PageBudget {
            max_width: self.page.width as f64 - self.page.margin_left - self.page.margin_right,
            max_height: self.page.max_height,
            line_height: self.typography.line_height,
            paragraph_gap: self.typography.paragraph_gap,
            left_margin: self.page.margin_left,
            right_margin: self.page.margin_right,
        }
    }

    /// Where the body text starts, below the header when there is one.
    pub fn body_top(&self, has_header: bool) -> f64 {
        if has_header {
            self.page.header_height as f64 + self.page.body_top_gap
        } else {
            self.page.top_margin
        }
    }
}

/// Canvas geometry in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageConfig {
    pub width: u32,
    pub height: u32,
    /// Height of the band reserved for the header image.
    pub header_height: u32,
    /// Space between the header band and the first text line.
    pub body_top_gap: f64,
    /// First text line when there is no header.
    pub top_margin: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Lines starting below this y are not drawn.
    pub max_height: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: 2480,
            height: 3508,
            header_height: 1400,
            body_top_gap: 100.0,
            top_margin: 200.0,
            margin_left: 200.0,
            margin_right: 200.0,
            max_height: 3350.0,
        }
    }
}

/// Body text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypographyConfig {
    pub font_size: f64,
    pub line_height: f64,
    /// Extra advance at a paragraph break, in place of a line.
    pub paragraph_gap: f64,
    /// Indent of the first body line when no drop cap is used. 0 disables.
    pub first_line_indent: f64,
    pub justification_threshold: f64,
    /// Width per character when a face cannot measure a run.
    pub fallback_char_width: f64,
    pub emphasis: EmphasisMode,
}

impl Default for TypographyConfig {
    fn default() -> Self {
        Self {
            font_size: 48.0,
            line_height: 70.0,
            paragraph_gap: 35.0,
            first_line_indent: 0.0,
            justification_threshold: crate::text::DEFAULT_JUSTIFICATION_THRESHOLD,
            fallback_char_width: crate::text::DEFAULT_FALLBACK_CHAR_WIDTH,
            emphasis: EmphasisMode::Distinct,
        }
    }
}

/// Drop cap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DropCapConfig {
    pub enabled: bool,
    /// Height of the cap box in body lines.
    pub box_lines: usize,
    /// Cap font size is `line_height * (box_lines + size_fudge)`.
    pub size_fudge: f64,
    /// Space between the cap and the reflowed text.
    pub gutter: f64,
}

impl Default for DropCapConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            box_lines: 3,
            size_fudge: 0.2,
            gutter: 30.0,
        }
    }
}

/// Question sheet settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionConfig {
    /// Writing space left after each question.
    pub answer_gap: f64,
}

impl Default for QuestionConfig {
    fn default() -> Self {
        Self { answer_gap: 140.0 }
    }
}

/// How the header image is fitted into its band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageMode {
    /// Shrink to fit, keep aspect ratio, centre horizontally.
    #[default]
    Contain,
    /// Fill the band, keep aspect ratio, crop the overflow.
    #[serde(alias = "crop")]
    Cover,
    /// Fill the band exactly, distorting if needed.
    Stretch,
}

/// Font files for each style.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontConfig {
    pub normal: PathBuf,
    pub bold: PathBuf,
    pub italic: PathBuf,
    pub bold_italic: PathBuf,
}

impl Default for FontConfig {
    fn default() -> Self {
        let dejavu = |name: &str| PathBuf::from(format!("/usr/share/fonts/truetype/dejavu/{}", name));
        Self {
            normal: dejavu("DejaVuSans.ttf"),
            bold: dejavu("DejaVuSans-Bold.ttf"),
            italic: dejavu("DejaVuSans-Oblique.ttf"),
            bold_italic: dejavu("DejaVuSans-BoldOblique.ttf"),
        }
    }
}

/// Horizontal and vertical limits for the body text, constant for a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBudget {
    pub max_width: f64,
    pub max_height: f64,
    pub line_height: f64,
    pub paragraph_gap: f64,
    pub left_margin: f64,
    pub right_margin: f64,
}
