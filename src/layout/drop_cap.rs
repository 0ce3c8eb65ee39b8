//! Drop cap: an enlarged initial letter spanning several body lines, with
//! the first paragraph reflowed around it.
//!
//! The cap occupies a box `box_lines` lines tall at the left margin. Up to
//! `box_lines` narrow lines sit beside it; whatever does not fit is rewrapped
//! at full width below the box. The box keeps its full height even when the
//! paragraph is shorter.

use unicode_segmentation::UnicodeSegmentation;

use super::{CommandKind, DrawCommand, LayoutCursor};
use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink};
use crate::model::{DropCapConfig, PageBudget};
use crate::style::{Palette, TextStyle};
use crate::text::{PositionedRun, TextLayout, WrappedLine};

/// Font size of the cap for a given body line height.
pub fn cap_size_px(config: &DropCapConfig, line_height: f64) -> f64 {
    line_height * (config.box_lines as f64 + config.size_fudge)
}

/// Geometry decided for the cap.
#[derive(Debug, Clone, PartialEq)]
pub struct DropCapPlan {
    /// The extracted initial, a single grapheme cluster.
    pub character: String,
    pub box_lines: usize,
    pub cap_size_px: f64,
    pub cap_width: f64,
    pub reflow_column_x: f64,
    pub reflow_column_width: f64,
}

/// A planned cap plus the commands that draw it and the reflowed
/// paragraph. Normal pagination resumes at `resume_index`.
#[derive(Debug, Clone, PartialEq)]
pub struct DropCapLayout {
    pub plan: DropCapPlan,
    pub commands: Vec<DrawCommand>,
    pub resume_index: usize,
}

pub struct DropCap<'a> {
    body: &'a TextLayout<'a>,
    /// Layout whose measure works at the cap size.
    cap: &'a TextLayout<'a>,
    config: &'a DropCapConfig,
    sink: &'a dyn DiagnosticsSink,
    body_size_px: f64,
    palette: Palette,
}

impl<'a> DropCap<'a> {
    pub fn new(
        body: &'a TextLayout<'a>,
        cap: &'a TextLayout<'a>,
        config: &'a DropCapConfig,
        sink: &'a dyn DiagnosticsSink,
        body_size_px: f64,
        palette: Palette,
    ) -> Self {
        Self {
            body,
            cap,
            config,
            sink,
            body_size_px,
            palette,
        }
    }

    /// Plan the cap for the first paragraph of `lines` and reflow that
    /// paragraph around it. Returns `None` (and draws nothing) when there is
    /// no visible initial or the narrow column has no room; the caller then
    /// lays the text out plainly.
    ///
    /// On success `cursor.y` is left below the reflowed paragraph, past the
    /// paragraph gap if a break followed it.
    pub fn plan_and_reflow(
        &self,
        lines: &[WrappedLine],
        cursor: &mut LayoutCursor,
        budget: &PageBudget,
    ) -> Option<DropCapLayout> {
        let Some(first) = lines
            .iter()
            .position(|l| !l.is_break() && !l.content.trim().is_empty())
        else {
            self.skip("no text");
            return None;
        };
        let paragraph_end = lines[first..]
            .iter()
            .position(WrappedLine::is_break)
            .map_or(lines.len(), |i| first + i);

        let joined = lines[first..paragraph_end]
            .iter()
            .map(|l| l.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let Some((character, remainder)) = extract_initial(&joined) else {
            self.skip("no visible initial");
            return None;
        };

        let size = cap_size_px(self.config, budget.line_height);
        let cap_width = self.cap.text_width(&character, TextStyle::Bold);
        let column_x = cursor.x + cap_width + self.config.gutter;
        let column_width = budget.max_width - cap_width - self.config.gutter;
        if column_width <= 0.0 {
            self.skip("cap leaves no room for text");
            return None;
        }

        let top = cursor.y;
        let lh = budget.line_height;
        let box_lines = self.config.box_lines;
        let mut commands = vec![DrawCommand {
            kind: CommandKind::Cap,
            x: cursor.x,
            y: top,
            runs: vec![PositionedRun {
                text: character.clone(),
                style: TextStyle::Bold,
                x: 0.0,
                width: cap_width,
            }],
            size_px: size,
            color: self.palette.cap,
        }];

        let narrow = self.body.wrap(&remainder, column_width);
        let beside = narrow.len().min(box_lines);
        for (i, line) in narrow[..beside].iter().enumerate() {
            commands.push(self.line_command(
                &line.content,
                column_x,
                top + i as f64 * lh,
                column_width,
            ));
        }

        let below_top = top + box_lines as f64 * lh;
        let leftover = narrow[beside..]
            .iter()
            .map(|l| l.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let below = self.body.wrap(&leftover, budget.max_width);
        for (j, line) in below.iter().enumerate() {
            commands.push(self.line_command(
                &line.content,
                cursor.x,
                below_top + j as f64 * lh,
                budget.max_width,
            ));
        }

        cursor.y = below_top + below.len() as f64 * lh;
        let mut resume_index = paragraph_end;
        if lines.get(paragraph_end).is_some_and(WrappedLine::is_break) {
            cursor.y += budget.paragraph_gap;
            resume_index += 1;
        }

        self.sink.record(DiagnosticEvent::DropCapPlaced {
            character: character.clone(),
            lines_beside: beside,
            overflow_lines: below.len(),
        });

        Some(DropCapLayout {
            plan: DropCapPlan {
                character,
                box_lines,
                cap_size_px: size,
                cap_width,
                reflow_column_x: column_x,
                reflow_column_width: column_width,
            },
            commands,
            resume_index,
        })
    }

    fn line_command(&self, content: &str, x: f64, y: f64, width: f64) -> DrawCommand {
        let layout = self.body.layout_line(content, width);
        DrawCommand {
            kind: CommandKind::Line,
            x,
            y,
            runs: layout.runs,
            size_px: self.body_size_px,
            color: self.palette.body,
        }
    }

    fn skip(&self, reason: &str) {
        self.sink.record(DiagnosticEvent::DropCapSkipped {
            reason: reason.to_string(),
        });
    }
}

/// Split off the first visible grapheme, skipping whitespace and emphasis
/// markers. An emphasis pair left empty by the removal is dropped too, so
/// `**A** cat` leaves `cat` rather than `**** cat`.
fn extract_initial(text: &str) -> Option<(String, String)> {
    let (idx, grapheme) = text
        .grapheme_indices(true)
        .find(|(_, g)| !g.chars().all(|c| c.is_whitespace() || c == '*'))?;

    let mut kept_prefix = &text[..idx];
    let markers = kept_prefix.trim();
    let mut rest = &text[idx + grapheme.len()..];
    if !markers.is_empty() && markers.chars().all(|c| c == '*') && rest.starts_with(markers) {
        rest = &rest[markers.len()..];
        kept_prefix = "";
    }

    let remainder = format!("{}{}", kept_prefix, rest).trim_start().to_string();
    Some((grapheme.to_string(), remainder))
}
