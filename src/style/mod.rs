//! # Styles
//!
//! Emphasis styles for text runs, colours, and the two worksheet looks
//! (`plain` and `playful`).

use serde::{Deserialize, Serialize};

/// Emphasis style of a run of text. Each style maps to one font face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

/// How asterisk emphasis maps onto styles.
///
/// `Monotone` renders every marked span bold; `Distinct` keeps `*x*` italic
/// and `***x***` bold-italic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmphasisMode {
    #[default]
    Distinct,
    Monotone,
}

/// Overall look of the worksheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SheetStyle {
    #[default]
    Plain,
    Playful,
}

impl SheetStyle {
    pub fn palette(self) -> Palette {
        match self {
            SheetStyle::Plain => Palette {
                body: Color::hex("#2c2c2c"),
                cap: Color::hex("#2c2c2c"),
            },
            SheetStyle::Playful => Palette {
                body: Color::hex("#2c2c2c"),
                cap: Color::hex("#e4572e"),
            },
        }
    }
}

/// Ink colours used on one sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub body: Color,
    pub cap: Color,
}

/// An opaque RGB colour, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    /// Parse `#rgb` or `#rrggbb`. Anything else is black.
    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        match hex.len() {
            3 if hex.is_ascii() => Self {
                r: channel(&hex[0..1].repeat(2)),
                g: channel(&hex[1..2].repeat(2)),
                b: channel(&hex[2..3].repeat(2)),
            },
            6 if hex.is_ascii() => Self {
                r: channel(&hex[0..2]),
                g: channel(&hex[2..4]),
                b: channel(&hex[4..6]),
            },
            _ => Color::BLACK,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}
