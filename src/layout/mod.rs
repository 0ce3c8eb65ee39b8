//! # Single-Page Layout
//!
//! Walks wrapped lines down the page and hands positioned runs to a
//! [`TextCanvas`]. There is exactly one page: once the cursor passes
//! `max_height`, the remaining lines are dropped and the render still
//! succeeds. The [`RenderReport`] says how many lines made it.
//!
//! The algorithm:
//!
//! 1. Start the cursor below the header (or below the drop-cap block)
//! 2. Before each line: if `y > max_height`, stop
//! 3. Paragraph break: advance by the paragraph gap, draw nothing
//! 4. Text line: justify, draw each run left to right, advance one line
//!
//! A drawing failure aborts the whole pass. There is no per-line retry.

pub mod drop_cap;

use crate::error::DrawError;
use crate::model::PageBudget;
use crate::style::Color;
use crate::text::{PositionedRun, StyledRun, TextLayout, WrappedLine};

/// Draws one styled run with its top-left corner at `(x, y)`.
pub trait TextCanvas {
    fn draw_run(
        &mut self,
        x: f64,
        y: f64,
        run: &StyledRun,
        size_px: f64,
        color: Color,
    ) -> Result<(), DrawError>;
}

/// Pen position for one rendering pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub x: f64,
    pub y: f64,
}

impl LayoutCursor {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// How the first body line is treated. Indent and drop cap exclude each
/// other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutMode {
    Plain,
    FirstLineIndent(f64),
    DropCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// The enlarged initial letter.
    Cap,
    /// A line of body text.
    Line,
}

/// A pre-positioned piece of text, produced ahead of pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub kind: CommandKind,
    pub x: f64,
    pub y: f64,
    pub runs: Vec<PositionedRun>,
    pub size_px: f64,
    pub color: Color,
}

/// Outcome of a rendering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderReport {
    pub lines_drawn: usize,
    pub total_lines: usize,
    pub truncated: bool,
    pub final_y: f64,
}

impl RenderReport {
    /// Combine the reports of two consecutive passes.
    pub fn then(self, next: RenderReport) -> RenderReport {
        RenderReport {
            lines_drawn: self.lines_drawn + next.lines_drawn,
            total_lines: self.total_lines + next.total_lines,
            truncated: self.truncated || next.truncated,
            final_y: next.final_y,
        }
    }
}

/// The pagination driver.
pub struct Paginator<'a> {
    text: &'a TextLayout<'a>,
    budget: PageBudget,
    size_px: f64,
    color: Color,
}

impl<'a> Paginator<'a> {
    pub fn new(text: &'a TextLayout<'a>, budget: PageBudget, size_px: f64, color: Color) -> Self {
        Self {
            text,
            budget,
            size_px,
            color,
        }
    }

    /// Draw `lines[start..]` from the cursor down.
    pub fn render(
        &self,
        lines: &[WrappedLine],
        start: usize,
        cursor: &mut LayoutCursor,
        mode: LayoutMode,
        canvas: &mut dyn TextCanvas,
    ) -> Result<RenderReport, DrawError> {
        let remaining = lines.get(start..).unwrap_or(&[]);
        let total_lines = remaining.iter().filter(|l| !l.is_break()).count();
        let mut lines_drawn = 0;

        for line in remaining {
            if cursor.y > self.budget.max_height {
                break;
            }
            if line.is_break() {
                cursor.y += self.budget.paragraph_gap;
                continue;
            }

            let indent = match mode {
                LayoutMode::FirstLineIndent(px) if lines_drawn == 0 => px,
                _ => 0.0,
            };
            let layout = self
                .text
                .layout_line(&line.content, self.budget.max_width - indent);
            draw_runs(
                canvas,
                cursor.x + indent,
                cursor.y,
                &layout.runs,
                self.size_px,
                self.color,
            )?;
            lines_drawn += 1;
            cursor.y += self.budget.line_height;
        }

        Ok(RenderReport {
            lines_drawn,
            total_lines,
            truncated: lines_drawn < total_lines,
            final_y: cursor.y,
        })
    }

    /// Execute pre-positioned commands under the same height limit.
    /// Only `Line` commands count towards the report.
    pub fn execute(
        &self,
        commands: &[DrawCommand],
        canvas: &mut dyn TextCanvas,
    ) -> Result<RenderReport, DrawError> {
        let total_lines = commands
            .iter()
            .filter(|c| c.kind == CommandKind::Line)
            .count();
        let mut lines_drawn = 0;
        let mut final_y = 0.0f64;

        for command in commands {
            if command.y > self.budget.max_height {
                break;
            }
            draw_runs(
                canvas,
                command.x,
                command.y,
                &command.runs,
                command.size_px,
                command.color,
            )?;
            if command.kind == CommandKind::Line {
                lines_drawn += 1;
            }
            final_y = final_y.max(command.y);
        }

        Ok(RenderReport {
            lines_drawn,
            total_lines,
            truncated: lines_drawn < total_lines,
            final_y,
        })
    }
}

fn draw_runs(
    canvas: &mut dyn TextCanvas,
    x: f64,
    y: f64,
    runs: &[PositionedRun],
    size_px: f64,
    color: Color,
) -> Result<(), DrawError> {
    for run in runs.iter().filter(|r| !r.text.is_empty()) {
        let styled = StyledRun::new(run.text.clone(), run.style);
        canvas.draw_run(x + run.x, y, &styled, size_px, color)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::diagnostics::NullSink;
    use crate::style::TextStyle;
    use crate::text::EstimateMeasure;

    /// Records every draw call. Fails on runs containing `fail_on`.
    #[derive(Default)]
    pub(crate) struct RecordingCanvas {
        pub calls: Vec<(f64, f64, String, TextStyle, f64)>,
        pub fail_on: Option<String>,
    }

    impl TextCanvas for RecordingCanvas {
        fn draw_run(
            &mut self,
            x: f64,
            y: f64,
            run: &StyledRun,
            size_px: f64,
            _color: Color,
        ) -> Result<(), DrawError> {
            if let Some(bad) = &self.fail_on {
                if run.text.contains(bad.as_str()) {
                    return Err(DrawError::InvalidPosition {
                        text: run.text.clone(),
                        x,
                        y,
                    });
                }
            }
            self.calls.push((x, y, run.text.clone(), run.style, size_px));
            Ok(())
        }
    }

    pub(crate) fn budget(max_height: f64) -> PageBudget {
        PageBudget {
            max_width: 300.0,
            max_height,
            line_height: 70.0,
            paragraph_gap: 35.0,
            left_margin: 200.0,
            right_margin: 200.0,
        }
    }

    #[test]
    fn draws_every_line_when_it_fits() {
        let m = EstimateMeasure::new(20.0, 10.0);
        let tl = TextLayout::new(&m, &NullSink);
        let lines = tl.wrap("Hello world this is a test of wrapping", 300.0);
        let pager = Paginator::new(&tl, budget(10_000.0), 48.0, Color::BLACK);
        let mut canvas = RecordingCanvas::default();
        let mut cursor = LayoutCursor::new(200.0, 100.0);

        let report = pager
            .render(&lines, 0, &mut cursor, LayoutMode::Plain, &mut canvas)
            .unwrap();

        assert_eq!(report.lines_drawn, 3);
        assert_eq!(report.total_lines, 3);
        assert!(!report.truncated);
        assert_eq!(cursor.y, 100.0 + 3.0 * 70.0);
        let ys: Vec<f64> = canvas.calls.iter().map(|c| c.1).collect();
        assert!(ys.contains(&100.0) && ys.contains(&170.0) && ys.contains(&240.0));
        assert!(canvas.calls.iter().all(|c| c.4 == 48.0));
    }

    #[test]
    fn justified_line_draws_each_styled_run_once() {
        let m = EstimateMeasure::new(20.0, 10.0);
        let tl = TextLayout::new(&m, &NullSink);
        let lines = vec![WrappedLine::text("aaaa bbbb cccc")];
        let pager = Paginator::new(&tl, budget(10_000.0), 48.0, Color::BLACK);
        let mut canvas = RecordingCanvas::default();
        let mut cursor = LayoutCursor::new(0.0, 0.0);
        pager
            .render(&lines, 0, &mut cursor, LayoutMode::Plain, &mut canvas)
            .unwrap();
        let calls: Vec<(f64, &str)> = canvas.calls.iter().map(|c| (c.0, c.2.as_str())).collect();
        assert_eq!(calls, vec![(0.0, "aaaa bbbb cccc")]);
    }

    #[test]
    fn mixed_styles_are_drawn_left_to_right() {
        let m = EstimateMeasure::new(20.0, 10.0);
        let tl = TextLayout::new(&m, &NullSink);
        let lines = vec![WrappedLine::text("**aa** bb cc *dd*")];
        let pager = Paginator::new(
            &tl,
            PageBudget {
                max_width: 250.0,
                ..budget(10_000.0)
            },
            48.0,
            Color::BLACK,
        );
        let mut canvas = RecordingCanvas::default();
        let mut cursor = LayoutCursor::new(100.0, 0.0);
        pager
            .render(&lines, 0, &mut cursor, LayoutMode::Plain, &mut canvas)
            .unwrap();

        // 60px of slack over three spaces, all inside the middle run.
        let calls: Vec<(f64, &str, TextStyle)> = canvas
            .calls
            .iter()
            .map(|c| (c.0, c.2.as_str(), c.3))
            .collect();
        assert_eq!(
            calls,
            vec![
                (100.0, "aa", TextStyle::Bold),
                (140.0, " bb cc ", TextStyle::Normal),
                (310.0, "dd", TextStyle::Italic),
            ]
        );
    }

    #[test]
    fn paragraph_break_advances_by_gap_only() {
        let m = EstimateMeasure::new(20.0, 10.0);
        let tl = TextLayout::new(&m, &NullSink);
        let lines = tl.wrap("A\n\nB", 300.0);
        let pager = Paginator::new(&tl, budget(10_000.0), 48.0, Color::BLACK);
        let mut canvas = RecordingCanvas::default();
        let mut cursor = LayoutCursor::new(0.0, 0.0);
        pager
            .render(&lines, 0, &mut cursor, LayoutMode::Plain, &mut canvas)
            .unwrap();
        assert_eq!(canvas.calls.len(), 2);
        assert_eq!(canvas.calls[0].1, 0.0);
        assert_eq!(canvas.calls[1].1, 70.0 + 35.0);
        assert_eq!(cursor.y, 70.0 + 35.0 + 70.0);
    }

    #[test]
    fn truncates_long_text_without_error() {
        let m = EstimateMeasure::new(20.0, 10.0);
        let tl = TextLayout::new(&m, &NullSink);
        let text = "lorem ipsum dolor sit amet ".repeat(19);
        assert!(text.len() >= 500);
        let lines = tl.wrap(&text, 300.0);
        // Ten lines start at y = 0, 70, ..., 630.
        let pager = Paginator::new(&tl, budget(650.0), 48.0, Color::BLACK);
        let mut canvas = RecordingCanvas::default();
        let mut cursor = LayoutCursor::new(0.0, 0.0);

        let report = pager
            .render(&lines, 0, &mut cursor, LayoutMode::Plain, &mut canvas)
            .unwrap();

        assert_eq!(report.lines_drawn, 10);
        assert!(report.lines_drawn < report.total_lines);
        assert!(report.truncated);
        assert!(canvas.calls.iter().all(|c| c.1 <= 650.0));
    }

    #[test]
    fn never_starts_a_line_below_max_height() {
        let m = EstimateMeasure::new(20.0, 10.0);
        let tl = TextLayout::new(&m, &NullSink);
        let lines = tl.wrap(&"word ".repeat(200), 300.0);
        for max_height in [0.0, 69.0, 70.0, 500.0, 1234.0] {
            let pager = Paginator::new(&tl, budget(max_height), 48.0, Color::BLACK);
            let mut canvas = RecordingCanvas::default();
            let mut cursor = LayoutCursor::new(0.0, 0.0);
            pager
                .render(&lines, 0, &mut cursor, LayoutMode::Plain, &mut canvas)
                .unwrap();
            assert!(canvas.calls.iter().all(|c| c.1 <= max_height));
        }
    }

    #[test]
    fn first_line_indent_shifts_and_narrows_first_line() {
        let m = EstimateMeasure::new(20.0, 10.0);
        let tl = TextLayout::new(&m, &NullSink);
        let lines = tl.wrap_with_indent("Hello world this is a test of wrapping", 300.0, 60.0);
        let pager = Paginator::new(&tl, budget(10_000.0), 48.0, Color::BLACK);
        let mut canvas = RecordingCanvas::default();
        let mut cursor = LayoutCursor::new(200.0, 0.0);
        pager
            .render(
                &lines,
                0,
                &mut cursor,
                LayoutMode::FirstLineIndent(60.0),
                &mut canvas,
            )
            .unwrap();
        let first_y0: Vec<f64> = canvas
            .calls
            .iter()
            .filter(|c| c.1 == 0.0)
            .map(|c| c.0)
            .collect();
        assert_eq!(first_y0.first(), Some(&260.0));
        let second_line_x = canvas.calls.iter().find(|c| c.1 == 70.0).unwrap().0;
        assert_eq!(second_line_x, 200.0);
    }

    #[test]
    fn drawing_failure_aborts_the_pass() {
        let m = EstimateMeasure::new(20.0, 10.0);
        let tl = TextLayout::new(&m, &NullSink);
        let lines = tl.wrap("Hello world this is a test of wrapping", 300.0);
        let pager = Paginator::new(&tl, budget(10_000.0), 48.0, Color::BLACK);
        let mut canvas = RecordingCanvas {
            fail_on: Some("test".into()),
            ..Default::default()
        };
        let mut cursor = LayoutCursor::new(0.0, 0.0);
        let err = pager
            .render(&lines, 0, &mut cursor, LayoutMode::Plain, &mut canvas)
            .unwrap_err();
        assert!(matches!(err, DrawError::InvalidPosition { .. }));
        assert!(canvas.calls.iter().all(|c| c.1 < 70.0 + 1.0));
    }

    #[test]
    fn start_index_past_end_draws_nothing() {
        let m = EstimateMeasure::new(20.0, 10.0);
        let tl = TextLayout::new(&m, &NullSink);
        let lines = tl.wrap("A", 300.0);
        let pager = Paginator::new(&tl, budget(10_000.0), 48.0, Color::BLACK);
        let mut canvas = RecordingCanvas::default();
        let mut cursor = LayoutCursor::new(0.0, 0.0);
        let report = pager
            .render(&lines, 5, &mut cursor, LayoutMode::Plain, &mut canvas)
            .unwrap();
        assert_eq!(report, RenderReport::default());
        assert!(canvas.calls.is_empty());
    }

    #[test]
    fn reports_chain() {
        let a = RenderReport {
            lines_drawn: 3,
            total_lines: 3,
            truncated: false,
            final_y: 10.0,
        };
        let b = RenderReport {
            lines_drawn: 1,
            total_lines: 4,
            truncated: true,
            final_y: 99.0,
        };
        let merged = a.then(b);
        assert_eq!(merged.lines_drawn, 4);
        assert_eq!(merged.total_lines, 7);
        assert!(merged.truncated);
        assert_eq!(merged.final_y, 99.0);
    }
}
