//! Inline emphasis markup.
//!
//! Recognises exactly three forms, tried in this order at every position:
//! `***x***`, `**x**`, `*x*`, where `x` is one or more characters other
//! than `*`. Spans never nest. Anything that does not close is literal text.

use crate::style::{EmphasisMode, TextStyle};

/// A contiguous span of text sharing one emphasis style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: TextStyle,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Number of literal spaces in this run.
    pub fn space_count(&self) -> usize {
        self.text.chars().filter(|c| *c == ' ').count()
    }
}

/// Split one line into styled runs.
pub fn parse(line: &str, mode: EmphasisMode) -> Vec<StyledRun> {
    let bytes = line.as_bytes();
    let mut runs = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'*' {
            i += 1;
            continue;
        }
        match match_span(bytes, i) {
            Some((markers, inner_end)) => {
                if plain_start < i {
                    runs.push(StyledRun::new(&line[plain_start..i], TextStyle::Normal));
                }
                let inner = &line[i + markers..inner_end];
                runs.push(StyledRun::new(inner, style_for(markers, mode)));
                i = inner_end + markers;
                plain_start = i;
            }
            None => i += 1,
        }
    }

    if plain_start < bytes.len() {
        runs.push(StyledRun::new(&line[plain_start..], TextStyle::Normal));
    }
    runs
}

/// Remove emphasis markers, keeping only the visible text.
pub fn strip(line: &str, mode: EmphasisMode) -> String {
    parse(line, mode).into_iter().map(|r| r.text).collect()
}

/// Try `***`, `**`, `*` at `start`. Returns the marker length and the byte
/// index where the inner text ends.
fn match_span(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    (1..=3).rev().find_map(|markers| {
        let open_end = start + markers;
        if open_end > bytes.len() || bytes[start..open_end].iter().any(|b| *b != b'*') {
            return None;
        }
        let inner_len = bytes[open_end..].iter().take_while(|b| **b != b'*').count();
        if inner_len == 0 {
            return None;
        }
        let inner_end = open_end + inner_len;
        let close_end = inner_end + markers;
        if close_end <= bytes.len() && bytes[inner_end..close_end].iter().all(|b| *b == b'*') {
            Some((markers, inner_end))
        } else {
            None
        }
    })
}

fn style_for(markers: usize, mode: EmphasisMode) -> TextStyle {
    match (markers, mode) {
        (_, EmphasisMode::Monotone) => TextStyle::Bold,
        (3, EmphasisMode::Distinct) => TextStyle::BoldItalic,
        (2, EmphasisMode::Distinct) => TextStyle::Bold,
        (_, EmphasisMode::Distinct) => TextStyle::Italic,
    }
}
