//! Justification: positioning the runs of one wrapped line.

use super::TextLayout;
use crate::style::TextStyle;

/// A run placed on a line. `x` is relative to the line's start.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedRun {
    pub text: String,
    pub style: TextStyle,
    pub x: f64,
    pub width: f64,
}

/// A line ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    pub runs: Vec<PositionedRun>,
    /// Sum of the measured run widths.
    pub natural_width: f64,
    /// Horizontal space the line occupies: `max_width` when justified.
    pub width: f64,
    pub justified: bool,
}

impl<'a> TextLayout<'a> {
    /// Position the runs of `line` within `max_width`.
    ///
    /// The line is stretched only when it has at least one space and its
    /// natural width is above the justification threshold share of
    /// `max_width`. Stretching never compresses: a line already wider than
    /// `max_width` stays ragged. Each run keeps its text and is followed by
    /// `extra * spaces_in_run`, so the line spans exactly `max_width`.
    pub fn layout_line(&self, line: &str, max_width: f64) -> LineLayout {
        let runs = self.parse(line);
        let widths: Vec<f64> = runs.iter().map(|r| self.run_width(r)).collect();
        let natural_width: f64 = widths.iter().sum();
        let spaces: usize = runs.iter().map(|r| r.space_count()).sum();

        let justified = spaces > 0
            && max_width > 0.0
            && natural_width <= max_width
            && natural_width / max_width > self.justification_threshold();
        let extra = if justified {
            (max_width - natural_width) / spaces as f64
        } else {
            0.0
        };

        let mut x = 0.0;
        let positioned = runs
            .into_iter()
            .zip(widths)
            .map(|(run, width)| {
                let advance = width + extra * run.space_count() as f64;
                let placed = PositionedRun {
                    text: run.text,
                    style: run.style,
                    x,
                    width,
                };
                x += advance;
                placed
            })
            .collect();

        LineLayout {
            runs: positioned,
            natural_width,
            width: if justified { max_width } else { natural_width },
            justified,
        }
    }
}
