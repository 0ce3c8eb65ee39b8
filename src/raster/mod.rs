//! # Raster Canvas
//!
//! The drawing side of a render: a tiny-skia pixmap that glyph outlines
//! (read with ttf-parser) are filled into, plus header image placement and
//! PNG encoding.
//!
//! Glyphs are placed with their advance widths from [`FaceMetrics`], the
//! same numbers the measurement port reports, so drawn lines end exactly
//! where layout expects them to.
//!
//! [`FaceMetrics`]: crate::font::FaceMetrics

use tiny_skia::{FillRule, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Transform};

use crate::error::{DrawError, FichaError};
use crate::font::FontResourceMap;
use crate::image_loader::FittedImage;
use crate::layout::TextCanvas;
use crate::style::Color;
use crate::text::StyledRun;

/// A white page that text and images are drawn onto.
pub struct RasterCanvas<'a> {
    pixmap: Pixmap,
    fonts: &'a FontResourceMap,
}

impl<'a> RasterCanvas<'a> {
    pub fn new(width: u32, height: u32, fonts: &'a FontResourceMap) -> Result<Self, FichaError> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            FichaError::Encode(format!("invalid canvas size {}x{}", width, height))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(Self { pixmap, fonts })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Composite a fitted header image at its offset.
    pub fn place_image(&mut self, fitted: &FittedImage) -> Result<(), FichaError> {
        let (w, h) = fitted.image.dimensions();
        if w == 0 || h == 0 {
            return Ok(());
        }
        let size = IntSize::from_wh(w, h)
            .ok_or_else(|| FichaError::Image(format!("invalid image size {}x{}", w, h)))?;

        // tiny-skia stores premultiplied alpha.
        let mut data = Vec::with_capacity((w * h * 4) as usize);
        for px in fitted.image.pixels() {
            let [r, g, b, a] = px.0;
            let premultiply = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
            data.extend_from_slice(&[premultiply(r), premultiply(g), premultiply(b), a]);
        }
        let src = Pixmap::from_vec(data, size)
            .ok_or_else(|| FichaError::Image("image buffer does not match its size".into()))?;

        self.pixmap.draw_pixmap(
            fitted.x as i32,
            fitted.y as i32,
            src.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        Ok(())
    }

    /// Encode the page as PNG tagged with the print resolution.
    pub fn encode_png(&self) -> Result<Vec<u8>, FichaError> {
        let mut rgba = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        encode_rgba_png(self.width(), self.height(), &rgba, PRINT_DPI)
    }
}

/// Resolution the sheet is meant to be printed at.
pub const PRINT_DPI: u32 = 300;

/// Encode straight RGBA pixels, recording `dpi` in the `pHYs` chunk.
fn encode_rgba_png(width: u32, height: u32, rgba: &[u8], dpi: u32) -> Result<Vec<u8>, FichaError> {
    let encode_err = |e: png::EncodingError| FichaError::Encode(e.to_string());
    let pixels_per_meter = (dpi as f64 / 0.0254).round() as u32;

    let mut buf = Vec::new();
    let mut encoder = png::Encoder::new(&mut buf, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: pixels_per_meter,
        yppu: pixels_per_meter,
        unit: png::Unit::Meter,
    }));
    let mut writer = encoder.write_header().map_err(encode_err)?;
    writer.write_image_data(rgba).map_err(encode_err)?;
    writer.finish().map_err(encode_err)?;
    Ok(buf)
}

impl TextCanvas for RasterCanvas<'_> {
    fn draw_run(
        &mut self,
        x: f64,
        y: f64,
        run: &StyledRun,
        size_px: f64,
        color: Color,
    ) -> Result<(), DrawError> {
        if !(x.is_finite() && y.is_finite() && size_px.is_finite() && size_px > 0.0) {
            return Err(DrawError::InvalidPosition {
                text: run.text.clone(),
                x,
                y,
            });
        }

        let fonts = self.fonts;
        let font = fonts.get(run.style).ok_or(DrawError::MissingFace(run.style))?;
        let face = font.face().ok_or(DrawError::UnparsableFace(run.style))?;
        let metrics = font.metrics();

        let scale = (size_px / metrics.units_per_em as f64) as f32;
        let baseline = y + metrics.ascender_px(size_px);

        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, 255);
        paint.anti_alias = true;

        let mut pen_x = x;
        for ch in run.text.chars() {
            let glyph = face.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0));
            let mut outline = GlyphOutline(PathBuilder::new());
            if face.outline_glyph(glyph, &mut outline).is_some() {
                let path = outline.0.finish().ok_or(DrawError::Glyph(ch))?;
                // Font units are y-up; flip onto the baseline.
                let transform =
                    Transform::from_row(scale, 0.0, 0.0, -scale, pen_x as f32, baseline as f32);
                self.pixmap
                    .fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
            pen_x += metrics.char_width(ch, size_px);
        }
        Ok(())
    }
}

/// Collects a ttf-parser outline into a tiny-skia path.
struct GlyphOutline(PathBuilder);

impl ttf_parser::OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.0.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.0.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use crate::font::FontFace;
    use crate::style::TextStyle;
    use std::path::Path;

    fn system_fonts() -> Option<FontResourceMap> {
        let path = Path::new("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
        if !path.exists() {
            return None;
        }
        FontFace::from_path(path).ok().map(FontResourceMap::uniform)
    }

    fn is_white(canvas: &RasterCanvas, x: u32, y: u32) -> bool {
        let px = canvas.pixmap().pixel(x, y).unwrap();
        (px.red(), px.green(), px.blue()) == (255, 255, 255)
    }

    #[test]
    fn draws_ink_inside_the_line_box() {
        let Some(fonts) = system_fonts() else {
            eprintln!("Skipping: DejaVuSans not found");
            return;
        };
        let mut canvas = RasterCanvas::new(200, 100, &fonts).unwrap();
        let run = StyledRun::new("HH", TextStyle::Bold);
        canvas.draw_run(10.0, 10.0, &run, 48.0, Color::BLACK).unwrap();

        let inked = (0..200)
            .flat_map(|x| (0..100).map(move |y| (x, y)))
            .filter(|&(x, y)| !is_white(&canvas, x, y))
            .collect::<Vec<_>>();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|&(x, y)| x >= 10 && y >= 10 && y < 10 + 48 + 20));
    }

    #[test]
    fn non_finite_position_is_rejected() {
        let Some(fonts) = system_fonts() else {
            eprintln!("Skipping: DejaVuSans not found");
            return;
        };
        let mut canvas = RasterCanvas::new(10, 10, &fonts).unwrap();
        let err = canvas
            .draw_run(f64::NAN, 0.0, &StyledRun::new("a", TextStyle::Normal), 48.0, Color::BLACK)
            .unwrap_err();
        assert!(matches!(err, DrawError::InvalidPosition { .. }));
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        let Some(fonts) = system_fonts() else {
            eprintln!("Skipping: DejaVuSans not found");
            return;
        };
        assert!(matches!(
            RasterCanvas::new(0, 10, &fonts),
            Err(FichaError::Encode(_))
        ));
    }

    #[test]
    fn places_image_and_encodes_png() {
        let Some(fonts) = system_fonts() else {
            eprintln!("Skipping: DejaVuSans not found");
            return;
        };
        let mut canvas = RasterCanvas::new(20, 10, &fonts).unwrap();
        let fitted = FittedImage {
            image: RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255])),
            x: 8,
            y: 0,
        };
        canvas.place_image(&fitted).unwrap();
        let red = canvas.pixmap().pixel(9, 1).unwrap();
        assert_eq!((red.red(), red.green(), red.blue()), (255, 0, 0));
        assert!(is_white(&canvas, 0, 0));

        let png = canvas.encode_png().unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
    }

    /// Body of the `pHYs` chunk, if present.
    fn phys_chunk(png: &[u8]) -> Option<&[u8]> {
        let at = png.windows(4).position(|w| w == b"pHYs")?;
        png.get(at + 4..at + 13)
    }

    #[test]
    fn png_records_print_resolution() {
        let white = vec![255u8; 3 * 2 * 4];
        let png = encode_rgba_png(3, 2, &white, PRINT_DPI).unwrap();

        let phys = phys_chunk(&png).expect("pHYs chunk");
        let xppu = u32::from_be_bytes([phys[0], phys[1], phys[2], phys[3]]);
        let yppu = u32::from_be_bytes([phys[4], phys[5], phys[6], phys[7]]);
        assert_eq!((xppu, yppu), (11811, 11811));
        // Unit 1 is the metre.
        assert_eq!(phys[8], 1);

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[test]
    fn mismatched_buffer_is_an_encode_error() {
        let result = encode_rgba_png(3, 2, &[0u8; 5], PRINT_DPI);
        assert!(matches!(result, Err(FichaError::Encode(_))));
    }
}
