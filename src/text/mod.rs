//! # Text Layout
//!
//! Word wrapping and line measurement for marked-up story text.
//!
//! The layout code never touches a font directly. Widths come from a
//! [`TextMeasure`] port, which the caller backs with real font metrics
//! (see `font::FontMeasure`) or with a fixed-advance estimate in tests.

pub mod justify;
pub mod markup;

pub use justify::{LineLayout, PositionedRun};
pub use markup::StyledRun;

use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink};
use crate::error::MeasureError;
use crate::style::{EmphasisMode, TextStyle};

/// Lines with a natural width above this share of the target are justified.
pub const DEFAULT_JUSTIFICATION_THRESHOLD: f64 = 0.7;

/// Per-character width used when the measurement port fails.
pub const DEFAULT_FALLBACK_CHAR_WIDTH: f64 = 26.0;

/// Measures the advance width of a run of text in pixels.
///
/// Implementations must be deterministic for a given (text, style).
pub trait TextMeasure {
    fn measure(&self, text: &str, style: TextStyle) -> Result<f64, MeasureError>;
}

/// Fixed-advance measurement: every space is `space_width`, every other
/// character is `char_width`, regardless of style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateMeasure {
    pub char_width: f64,
    pub space_width: f64,
}

impl EstimateMeasure {
    pub fn new(char_width: f64, space_width: f64) -> Self {
        Self {
            char_width,
            space_width,
        }
    }

    pub fn uniform(width: f64) -> Self {
        Self::new(width, width)
    }

    fn width_of(&self, text: &str) -> f64 {
        text.chars()
            .map(|c| {
                if c == ' ' {
                    self.space_width
                } else {
                    self.char_width
                }
            })
            .sum()
    }
}

impl TextMeasure for EstimateMeasure {
    fn measure(&self, text: &str, _style: TextStyle) -> Result<f64, MeasureError> {
        Ok(self.width_of(text))
    }
}

/// Whether a wrapped line carries text or marks a paragraph boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Text,
    ParagraphBreak,
}

/// One output line of the word-wrap engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    pub content: String,
    pub kind: LineKind,
}

impl WrappedLine {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: LineKind::Text,
        }
    }

    pub fn paragraph_break() -> Self {
        Self {
            content: String::new(),
            kind: LineKind::ParagraphBreak,
        }
    }

    pub fn is_break(&self) -> bool {
        self.kind == LineKind::ParagraphBreak
    }
}

/// Collapse CR/CRLF to LF and any run of three or more newlines to exactly
/// one paragraph separator.
pub fn normalize_newlines(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(unified.len());
    let mut newline_run = 0;
    for ch in unified.chars() {
        if ch == '\n' {
            newline_run += 1;
            if newline_run <= 2 {
                out.push(ch);
            }
        } else {
            newline_run = 0;
            out.push(ch);
        }
    }
    out
}

/// Greedy word wrapping over marked-up text.
///
/// Holds the measurement port and the policies that shape measurement
/// (emphasis mode, fallback width, justification threshold). Cheap to build;
/// one per render.
pub struct TextLayout<'a> {
    measure: &'a dyn TextMeasure,
    sink: &'a dyn DiagnosticsSink,
    emphasis: EmphasisMode,
    fallback_char_width: f64,
    justification_threshold: f64,
}

impl<'a> TextLayout<'a> {
    pub fn new(measure: &'a dyn TextMeasure, sink: &'a dyn DiagnosticsSink) -> Self {
        Self {
            measure,
            sink,
            emphasis: EmphasisMode::default(),
            fallback_char_width: DEFAULT_FALLBACK_CHAR_WIDTH,
            justification_threshold: DEFAULT_JUSTIFICATION_THRESHOLD,
        }
    }

    pub fn with_emphasis(mut self, emphasis: EmphasisMode) -> Self {
        self.emphasis = emphasis;
        self
    }

    pub fn with_fallback_char_width(mut self, width: f64) -> Self {
        self.fallback_char_width = width;
        self
    }

    pub fn with_justification_threshold(mut self, threshold: f64) -> Self {
        self.justification_threshold = threshold;
        self
    }

    pub fn justification_threshold(&self) -> f64 {
        self.justification_threshold
    }

    /// Parse one line with this layout's emphasis mode.
    pub fn parse(&self, line: &str) -> Vec<StyledRun> {
        markup::parse(line, self.emphasis)
    }

    /// Width of text in one style, falling back to an estimate when the
    /// measurement port fails.
    pub fn text_width(&self, text: &str, style: TextStyle) -> f64 {
        let reason = match self.measure.measure(text, style) {
            Ok(w) if w.is_finite() => return w,
            Ok(_) => MeasureError::NonFinite(style).to_string(),
            Err(e) => e.to_string(),
        };
        let chars = text.chars().count();
        let estimate = chars as f64 * self.fallback_char_width;
        self.sink.record(DiagnosticEvent::MeasurementFallback {
            style,
            chars,
            estimate,
            reason,
        });
        estimate
    }

    pub fn run_width(&self, run: &StyledRun) -> f64 {
        self.text_width(&run.text, run.style)
    }

    /// Natural width of a marked-up line: the sum of its run widths.
    pub fn line_width(&self, line: &str) -> f64 {
        self.parse(line).iter().map(|r| self.run_width(r)).sum()
    }

    /// Break `text` into lines no wider than `max_width`.
    ///
    /// Paragraphs are separated by a blank line and come out separated by a
    /// single [`LineKind::ParagraphBreak`]. A single newline is a hard break:
    /// each side is wrapped on its own. Words are never split, so a word
    /// wider than `max_width` sits alone on an overlong line.
    pub fn wrap(&self, text: &str, max_width: f64) -> Vec<WrappedLine> {
        self.wrap_with_indent(text, max_width, 0.0)
    }

    /// Like [`wrap`](Self::wrap), but the very first line of the text is
    /// `first_line_indent` narrower.
    pub fn wrap_with_indent(
        &self,
        text: &str,
        max_width: f64,
        first_line_indent: f64,
    ) -> Vec<WrappedLine> {
        let normalized = normalize_newlines(text);
        let mut lines: Vec<WrappedLine> = Vec::new();

        for paragraph in normalized.split("\n\n") {
            let mut paragraph_lines = Vec::new();
            for sub_line in paragraph.split('\n') {
                let first_limit = if lines.is_empty() && paragraph_lines.is_empty() {
                    max_width - first_line_indent
                } else {
                    max_width
                };
                self.wrap_sub_line(sub_line, first_limit, max_width, &mut paragraph_lines);
            }

            if paragraph_lines.is_empty() {
                continue;
            }
            if !lines.is_empty() {
                lines.push(WrappedLine::paragraph_break());
            }
            lines.extend(paragraph_lines);
        }

        lines
    }

    /// Greedy wrap of one hard line. `first_limit` bounds the first emitted
    /// line, `max_width` the rest.
    fn wrap_sub_line(
        &self,
        sub_line: &str,
        first_limit: f64,
        max_width: f64,
        out: &mut Vec<WrappedLine>,
    ) {
        let mut emitted = 0usize;
        let mut current = String::new();

        for word in sub_line.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            let limit = if emitted == 0 { first_limit } else { max_width };
            if self.line_width(&candidate) > limit {
                out.push(WrappedLine::text(std::mem::take(&mut current)));
                emitted += 1;
                current.push_str(word);
            } else {
                current = candidate;
            }
        }

        if !current.is_empty() {
            out.push(WrappedLine::text(current));
        }
    }
}
