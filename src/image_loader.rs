//! # Header Image Loading
//!
//! Loads the header image from a file path, a data URI, or a raw base64
//! string, decodes it with the `image` crate and fits it into the header
//! band according to [`ImageMode`].

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::error::FichaError;
use crate::model::ImageMode;

/// A header image resized for its band, with the horizontal offset that
/// centres it on the page.
#[derive(Debug, Clone)]
pub struct FittedImage {
    pub image: RgbaImage,
    pub x: u32,
    pub y: u32,
}

/// Load and decode an image from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...` data URI
/// - File path (absolute or `./`/`../` relative), read from disk
/// - Raw base64-encoded image data
pub fn load_image(src: &str) -> Result<DynamicImage, FichaError> {
    let raw_bytes = read_source_bytes(src).map_err(FichaError::Image)?;
    decode_image_bytes(&raw_bytes).map_err(FichaError::Image)
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str) -> Result<Vec<u8>, String> {
    if src.starts_with("data:image/") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| "Invalid data URI: missing comma".to_string())?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only explicit path prefixes: base64 strings may contain '/'.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return std::fs::read(src)
            .map_err(|e| format!("Failed to read image file '{}': {}", src, e));
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| format!("Base64 decode error: {}", e))
}

/// Detect the format from magic bytes and decode.
fn decode_image_bytes(data: &[u8]) -> Result<DynamicImage, String> {
    if data.len() < 4 {
        return Err("Image data too short".to_string());
    }

    let format = if is_jpeg(data) {
        image::ImageFormat::Jpeg
    } else if is_png(data) {
        image::ImageFormat::Png
    } else if is_webp(data) {
        image::ImageFormat::WebP
    } else {
        return Err("Unsupported image format (expected JPEG, PNG or WebP)".to_string());
    };

    image::load_from_memory_with_format(data, format)
        .map_err(|e| format!("Failed to decode {:?}: {}", format, e))
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

/// Fit `img` into a `band_width × band_height` band at the top of the page.
///
/// `Contain` only shrinks: an image already inside the band keeps its size.
pub fn fit_header(
    img: &DynamicImage,
    band_width: u32,
    band_height: u32,
    mode: ImageMode,
) -> FittedImage {
    let fitted = if band_width == 0 || band_height == 0 {
        DynamicImage::new_rgba8(0, 0)
    } else {
        match mode {
            ImageMode::Contain => {
                if img.width() <= band_width && img.height() <= band_height {
                    img.clone()
                } else {
                    img.resize(band_width, band_height, FilterType::Lanczos3)
                }
            }
            ImageMode::Cover => img.resize_to_fill(band_width, band_height, FilterType::Lanczos3),
            ImageMode::Stretch => img.resize_exact(band_width, band_height, FilterType::Lanczos3),
        }
    };

    let image = fitted.to_rgba8();
    let x = band_width.saturating_sub(image.width()) / 2;
    FittedImage { image, x, y: 0 }
}
