//! # Ficha
//!
//! Printable story worksheets for young readers: a header picture, a story
//! underneath, all on one A4 page at 300 dpi. A companion question sheet
//! numbers comprehension questions and leaves room to answer.
//!
//! The page is fixed. Text that does not fit is cut at the bottom margin and
//! the render still succeeds; the [`RenderReport`](layout::RenderReport)
//! tells how many lines made it.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]  Request, page geometry, typography, drop cap
//!       ↓
//!   [text]  Markup runs, word wrap, justification
//!       ↓
//!   [layout]  Drop cap reflow, single-page pagination
//!       ↓
//!   [raster]  Glyph outlines into a pixmap, PNG out
//! ```
//!
//! The text and layout modules never see a font file or a pixel. They talk
//! to a [`TextMeasure`](text::TextMeasure) port and a
//! [`TextCanvas`](layout::TextCanvas) port, and report anything noteworthy
//! to a [`DiagnosticsSink`](diagnostics::DiagnosticsSink).

pub mod diagnostics;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod raster;
pub mod sheet;
pub mod style;
pub mod text;

use std::path::Path;

use diagnostics::TracingSink;
pub use error::FichaError;
use model::SheetRequest;
pub use sheet::RenderedSheet;

/// Render a worksheet to PNG.
///
/// Loads the fonts named in the request's configuration and logs
/// diagnostics through `tracing`.
pub fn render(request: &SheetRequest) -> Result<RenderedSheet, FichaError> {
    let sink = TracingSink;
    let fonts = font::load_fonts(&request.config.fonts, &sink)?;
    sheet::render_sheet(request, &fonts, &sink)
}

/// Render a worksheet described as JSON to PNG.
pub fn render_json(json: &str) -> Result<RenderedSheet, FichaError> {
    let request: SheetRequest = serde_json::from_str(json)?;
    render(&request)
}

/// Read and parse a request file.
pub fn read_request(path: &Path) -> Result<SheetRequest, FichaError> {
    let json = std::fs::read_to_string(path).map_err(|source| FichaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}

/// Write rendered PNG bytes to disk.
pub fn write_png(path: &Path, sheet: &RenderedSheet) -> Result<(), FichaError> {
    std::fs::write(path, &sheet.png).map_err(|source| FichaError::Io {
        path: path.to_path_buf(),
        source,
    })
}
