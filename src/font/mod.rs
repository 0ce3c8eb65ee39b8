//! # Font Management
//!
//! Loading TrueType/OpenType faces, reading their advance widths with
//! ttf-parser, and exposing them to the layout core as a measurement port.
//!
//! The layout core never loads fonts. It receives a complete
//! [`FontResourceMap`] (one face per [`TextStyle`]) that [`load_fonts`] has
//! already resolved, including any substitution for missing faces.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink};
use crate::error::{FichaError, MeasureError};
use crate::model::FontConfig;
use crate::style::TextStyle;
use crate::text::TextMeasure;

/// Advance widths and vertical metrics parsed from a font.
#[derive(Debug, Clone)]
pub struct FaceMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
}

impl FaceMetrics {
    /// Advance width of a character in pixels at `size_px`.
    pub fn char_width(&self, ch: char, size_px: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * size_px
    }

    /// Advance width of a string in pixels at `size_px`.
    pub fn measure(&self, text: &str, size_px: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, size_px)).sum()
    }

    /// Distance from the top of the line box to the baseline.
    pub fn ascender_px(&self, size_px: f64) -> f64 {
        (self.ascender as f64 / self.units_per_em as f64) * size_px
    }

    /// Parse metrics from font data using ttf-parser.
    ///
    /// Advances are read for every code point the Unicode cmap subtables
    /// map, so the table holds exactly the characters the face can draw.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();
        let cmap = face.tables().cmap?;

        let mut advance_widths = HashMap::new();
        for subtable in cmap.subtables.into_iter().filter(|t| t.is_unicode()) {
            subtable.codepoints(|code| {
                let Some(ch) = char::from_u32(code).filter(|c| !c.is_control()) else {
                    return;
                };
                if let Some(advance) = subtable
                    .glyph_index(code)
                    .and_then(|gid| face.glyph_hor_advance(gid))
                {
                    advance_widths.entry(ch).or_insert(advance);
                }
            });
        }

        let default_advance = match advance_widths.get(&' ') {
            Some(&space) if space > 0 => space,
            _ => units_per_em / 2,
        };

        Some(FaceMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
        })
    }
}

/// A loaded font: the raw bytes (kept for outline rendering) plus metrics.
#[derive(Debug, Clone)]
pub struct FontFace {
    data: Arc<Vec<u8>>,
    metrics: FaceMetrics,
}

impl FontFace {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FichaError> {
        let metrics = FaceMetrics::from_font_data(&data)
            .ok_or_else(|| FichaError::Font("font data is not a valid TrueType/OpenType face".into()))?;
        Ok(Self {
            data: Arc::new(data),
            metrics,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, FichaError> {
        let data = std::fs::read(path)
            .map_err(|e| FichaError::Font(format!("cannot read '{}': {}", path.display(), e)))?;
        Self::from_bytes(data)
            .map_err(|e| FichaError::Font(format!("'{}': {}", path.display(), e)))
    }

    pub fn metrics(&self) -> &FaceMetrics {
        &self.metrics
    }

    /// Parse the face for outline access. Cheap: ttf-parser reads lazily.
    pub fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, 0).ok()
    }
}

/// One resolved face per emphasis style. Read-only once built; faces are
/// shared behind `Arc` so a map can serve concurrent renders.
#[derive(Debug, Clone)]
pub struct FontResourceMap {
    faces: HashMap<TextStyle, Arc<FontFace>>,
}

impl FontResourceMap {
    pub fn new(
        normal: Arc<FontFace>,
        bold: Arc<FontFace>,
        italic: Arc<FontFace>,
        bold_italic: Arc<FontFace>,
    ) -> Self {
        let faces = HashMap::from([
            (TextStyle::Normal, normal),
            (TextStyle::Bold, bold),
            (TextStyle::Italic, italic),
            (TextStyle::BoldItalic, bold_italic),
        ]);
        Self { faces }
    }

    /// Every style drawn with the same face.
    pub fn uniform(face: FontFace) -> Self {
        let face = Arc::new(face);
        Self::new(face.clone(), face.clone(), face.clone(), face)
    }

    pub fn get(&self, style: TextStyle) -> Option<&FontFace> {
        self.faces.get(&style).map(|f| f.as_ref())
    }
}

/// Measurement surface for one render at one font size. Holds no drawing
/// state, so width queries never depend on the canvas.
pub struct FontMeasure<'a> {
    fonts: &'a FontResourceMap,
    size_px: f64,
}

impl<'a> FontMeasure<'a> {
    pub fn new(fonts: &'a FontResourceMap, size_px: f64) -> Self {
        Self { fonts, size_px }
    }
}

impl TextMeasure for FontMeasure<'_> {
    fn measure(&self, text: &str, style: TextStyle) -> Result<f64, MeasureError> {
        let face = self
            .fonts
            .get(style)
            .ok_or(MeasureError::MissingFace(style))?;
        let width = face.metrics().measure(text, self.size_px);
        if width.is_finite() {
            Ok(width)
        } else {
            Err(MeasureError::NonFinite(style))
        }
    }
}

/// Load the four faces named in `config`.
///
/// The normal face is required. A missing styled face is replaced by the
/// closest loaded one (bold-italic → bold → italic → normal) and the
/// substitution is reported to `sink`.
pub fn load_fonts(
    config: &FontConfig,
    sink: &dyn DiagnosticsSink,
) -> Result<FontResourceMap, FichaError> {
    let normal = Arc::new(FontFace::from_path(&config.normal)?);

    let load_optional = |style: TextStyle, path: &Path| match FontFace::from_path(path) {
        Ok(face) => Some(Arc::new(face)),
        Err(e) => {
            sink.record(DiagnosticEvent::FontSubstituted {
                style,
                reason: e.to_string(),
            });
            None
        }
    };

    let bold = load_optional(TextStyle::Bold, &config.bold);
    let italic = load_optional(TextStyle::Italic, &config.italic);
    let bold_italic = load_optional(TextStyle::BoldItalic, &config.bold_italic);

    let bold_italic = bold_italic
        .or_else(|| bold.clone())
        .or_else(|| italic.clone())
        .unwrap_or_else(|| normal.clone());
    let bold = bold.unwrap_or_else(|| normal.clone());
    let italic = italic.unwrap_or_else(|| normal.clone());

    Ok(FontResourceMap::new(normal, bold, italic, bold_italic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use std::path::PathBuf;

    /// A fake face: every glyph is half an em, spaces a quarter.
    fn synthetic_face() -> FontFace {
        let mut advance_widths = HashMap::new();
        advance_widths.insert(' ', 250);
        for ch in 'a'..='z' {
            advance_widths.insert(ch, 500);
        }
        FontFace {
            data: Arc::new(Vec::new()),
            metrics: FaceMetrics {
                units_per_em: 1000,
                advance_widths,
                default_advance: 600,
                ascender: 800,
                descender: -200,
            },
        }
    }

    fn system_font() -> Option<PathBuf> {
        let candidates = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
        ];
        candidates
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    #[test]
    fn metrics_scale_with_size() {
        let face = synthetic_face();
        assert_eq!(face.metrics().char_width('a', 48.0), 24.0);
        assert_eq!(face.metrics().measure("ab c", 100.0), 175.0);
        // Unknown characters use the default advance.
        assert_eq!(face.metrics().char_width('Ω', 10.0), 6.0);
        assert_eq!(face.metrics().ascender_px(50.0), 40.0);
    }

    #[test]
    fn font_measure_uses_style_face() {
        let fonts = FontResourceMap::uniform(synthetic_face());
        let measure = FontMeasure::new(&fonts, 20.0);
        assert_eq!(measure.measure("abc", TextStyle::Bold), Ok(30.0));
        assert_eq!(measure.measure("a b", TextStyle::Normal), Ok(25.0));
    }

    #[test]
    fn invalid_bytes_are_a_font_error() {
        let err = FontFace::from_bytes(vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, FichaError::Font(_)));
    }

    #[test]
    fn missing_normal_face_fails() {
        let config = FontConfig {
            normal: PathBuf::from("/nonexistent/Regular.ttf"),
            ..FontConfig::default()
        };
        let sink = MemorySink::new();
        assert!(matches!(load_fonts(&config, &sink), Err(FichaError::Font(_))));
    }

    #[test]
    fn missing_styled_faces_are_substituted() {
        let Some(path) = system_font() else {
            eprintln!("Skipping: no system font found");
            return;
        };
        let config = FontConfig {
            normal: path,
            bold: PathBuf::from("/nonexistent/Bold.ttf"),
            italic: PathBuf::from("/nonexistent/Italic.ttf"),
            bold_italic: PathBuf::from("/nonexistent/BoldItalic.ttf"),
        };
        let sink = MemorySink::new();
        let fonts = load_fonts(&config, &sink).unwrap();
        for style in [
            TextStyle::Normal,
            TextStyle::Bold,
            TextStyle::Italic,
            TextStyle::BoldItalic,
        ] {
            assert!(fonts.get(style).is_some());
        }
        assert_eq!(
            sink.count(|e| matches!(e, DiagnosticEvent::FontSubstituted { .. })),
            3
        );
    }

    #[test]
    fn real_font_metrics_are_proportional() {
        let Some(path) = system_font() else {
            eprintln!("Skipping: no system font found");
            return;
        };
        let face = FontFace::from_path(&path).unwrap();
        let m = face.metrics();
        assert!(m.char_width('W', 48.0) > m.char_width('i', 48.0));
        assert!(m.ascender > 0);
        assert!(face.face().is_some());
    }

    #[test]
    fn advances_come_from_the_unicode_cmap() {
        let Some(path) = system_font() else {
            eprintln!("Skipping: no system font found");
            return;
        };
        let face = FontFace::from_path(&path).unwrap();
        let m = face.metrics();
        assert!(m.advance_widths.contains_key(&'a'));
        assert!(m.advance_widths.contains_key(&'é'));
        assert!(!m.advance_widths.contains_key(&'\n'));
        assert_eq!(m.default_advance, m.advance_widths[&' ']);
    }
}
