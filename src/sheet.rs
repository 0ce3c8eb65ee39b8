//! # Worksheet Composition
//!
//! Puts one sheet together: white page, header image in its band, body text
//! laid out below it, PNG out.
//!
//! [`compose`] is the text half and only needs the two ports, so it runs the
//! same against real fonts and a raster canvas or against a fixed-width
//! estimate and a recording canvas. [`render_sheet`] wires it to the real
//! collaborators.

use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink};
use crate::error::{DrawError, FichaError};
use crate::font::{FontMeasure, FontResourceMap};
use crate::image_loader::{fit_header, load_image};
use crate::layout::drop_cap::{cap_size_px, DropCap};
use crate::layout::{LayoutCursor, LayoutMode, Paginator, RenderReport, TextCanvas};
use crate::model::{SheetKind, SheetRequest};
use crate::raster::RasterCanvas;
use crate::text::{normalize_newlines, TextLayout, TextMeasure};

/// A finished worksheet.
#[derive(Debug, Clone)]
pub struct RenderedSheet {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub report: RenderReport,
}

/// Render a complete worksheet to PNG.
#[tracing::instrument(skip_all, fields(kind = ?request.kind, chars = request.text.len()))]
pub fn render_sheet(
    request: &SheetRequest,
    fonts: &FontResourceMap,
    sink: &dyn DiagnosticsSink,
) -> Result<RenderedSheet, FichaError> {
    let config = &request.config;
    let mut canvas = RasterCanvas::new(config.page.width, config.page.height, fonts)?;

    let header = request.header.as_deref().filter(|s| !s.trim().is_empty());
    if let Some(src) = header {
        let img = load_image(src)?;
        let fitted = fit_header(&img, config.page.width, config.page.header_height, config.image_mode);
        tracing::debug!(
            source_width = img.width(),
            source_height = img.height(),
            width = fitted.image.width(),
            height = fitted.image.height(),
            "header placed"
        );
        canvas.place_image(&fitted)?;
    }

    let body = FontMeasure::new(fonts, config.typography.font_size);
    let cap = FontMeasure::new(
        fonts,
        cap_size_px(&config.drop_cap, config.typography.line_height),
    );
    let report = compose(request, &body, &cap, sink, header.is_some(), &mut canvas)?;

    let png = canvas.encode_png()?;
    tracing::info!(
        lines_drawn = report.lines_drawn,
        total_lines = report.total_lines,
        truncated = report.truncated,
        bytes = png.len(),
        "sheet rendered"
    );
    Ok(RenderedSheet {
        png,
        width: canvas.width(),
        height: canvas.height(),
        report,
    })
}

/// Lay out and draw the body text of `request`.
///
/// `measure` works at the body font size, `cap_measure` at the drop-cap size.
/// Truncation is reported to `sink` once for the whole body.
pub fn compose(
    request: &SheetRequest,
    measure: &dyn TextMeasure,
    cap_measure: &dyn TextMeasure,
    sink: &dyn DiagnosticsSink,
    has_header: bool,
    canvas: &mut dyn TextCanvas,
) -> Result<RenderReport, DrawError> {
    let config = &request.config;
    let typo = &config.typography;
    let palette = config.style.palette();
    let mut budget = config.budget();
    let mut cursor = LayoutCursor::new(budget.left_margin, config.body_top(has_header));

    let text = TextLayout::new(measure, sink)
        .with_emphasis(typo.emphasis)
        .with_fallback_char_width(typo.fallback_char_width)
        .with_justification_threshold(typo.justification_threshold);

    let report = match request.kind {
        SheetKind::Questions => {
            budget.paragraph_gap = config.questions.answer_gap;
            let lines = text.wrap(&number_questions(&request.text), budget.max_width);
            let pager = Paginator::new(&text, budget, typo.font_size, palette.body);
            pager.render(&lines, 0, &mut cursor, LayoutMode::Plain, canvas)?
        }
        SheetKind::Story => {
            let pager = Paginator::new(&text, budget, typo.font_size, palette.body);
            match story_mode(request) {
                LayoutMode::DropCap => {
                    let lines = text.wrap(&request.text, budget.max_width);
                    let cap_size = cap_size_px(&config.drop_cap, typo.line_height);
                    let cap_text = TextLayout::new(cap_measure, sink)
                        .with_emphasis(typo.emphasis)
                        .with_fallback_char_width(
                            typo.fallback_char_width * cap_size / typo.font_size,
                        );
                    let drop_cap = DropCap::new(
                        &text,
                        &cap_text,
                        &config.drop_cap,
                        sink,
                        typo.font_size,
                        palette,
                    );
                    match drop_cap.plan_and_reflow(&lines, &mut cursor, &budget) {
                        Some(layout) => {
                            let first = pager.execute(&layout.commands, canvas)?;
                            let rest = pager.render(
                                &lines,
                                layout.resume_index,
                                &mut cursor,
                                LayoutMode::Plain,
                                canvas,
                            )?;
                            first.then(rest)
                        }
                        None => pager.render(&lines, 0, &mut cursor, LayoutMode::Plain, canvas)?,
                    }
                }
                LayoutMode::FirstLineIndent(indent) => {
                    let lines = text.wrap_with_indent(&request.text, budget.max_width, indent);
                    pager.render(
                        &lines,
                        0,
                        &mut cursor,
                        LayoutMode::FirstLineIndent(indent),
                        canvas,
                    )?
                }
                LayoutMode::Plain => {
                    let lines = text.wrap(&request.text, budget.max_width);
                    pager.render(&lines, 0, &mut cursor, LayoutMode::Plain, canvas)?
                }
            }
        }
    };

    if report.truncated {
        sink.record(DiagnosticEvent::Truncated {
            drawn: report.lines_drawn,
            total: report.total_lines,
        });
    }
    Ok(report)
}

/// The drop cap wins over a first-line indent.
fn story_mode(request: &SheetRequest) -> LayoutMode {
    let config = &request.config;
    if config.drop_cap.enabled {
        LayoutMode::DropCap
    } else if config.typography.first_line_indent > 0.0 {
        LayoutMode::FirstLineIndent(config.typography.first_line_indent)
    } else {
        LayoutMode::Plain
    }
}

/// One question per non-empty line, numbered in bold and separated by
/// paragraph breaks.
pub fn number_questions(text: &str) -> String {
    normalize_newlines(text)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
        .map(|(i, q)| format!("**{}.** {}", i + 1, q))
        .collect::<Vec<_>>()
        .join("\n\n")
}
