//! # Diagnostics
//!
//! The layout core never logs on its own. It reports noteworthy events to a
//! [`DiagnosticsSink`] handed in by the caller. [`TracingSink`] forwards them
//! to `tracing`; [`MemorySink`] keeps them for inspection.

use std::cell::RefCell;

use crate::style::TextStyle;

/// Something the layout core wants the outside world to know about.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// The measurement port failed and a width estimate was used instead.
    MeasurementFallback {
        style: TextStyle,
        chars: usize,
        estimate: f64,
        reason: String,
    },
    /// The page budget ran out before all lines were drawn.
    Truncated { drawn: usize, total: usize },
    /// A drop cap was placed.
    DropCapPlaced {
        character: String,
        lines_beside: usize,
        overflow_lines: usize,
    },
    /// A drop cap was requested but could not be laid out.
    DropCapSkipped { reason: String },
    /// A font face was missing and another face stands in for it.
    FontSubstituted { style: TextStyle, reason: String },
}

/// Receiver for [`DiagnosticEvent`]s.
pub trait DiagnosticsSink {
    fn record(&self, event: DiagnosticEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::MeasurementFallback {
                style,
                chars,
                estimate,
                reason,
            } => {
                tracing::warn!(?style, chars, estimate, %reason, "measurement failed, using estimate")
            }
            DiagnosticEvent::Truncated { drawn, total } => {
                tracing::info!(drawn, total, "text truncated at page bottom")
            }
            DiagnosticEvent::DropCapPlaced {
                character,
                lines_beside,
                overflow_lines,
            } => tracing::debug!(%character, lines_beside, overflow_lines, "drop cap placed"),
            DiagnosticEvent::DropCapSkipped { reason } => {
                tracing::warn!(%reason, "drop cap skipped")
            }
            DiagnosticEvent::FontSubstituted { style, reason } => {
                tracing::warn!(?style, %reason, "font face substituted")
            }
        }
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&self, _event: DiagnosticEvent) {}
}

/// Collects events in memory. Scoped to one render; not `Sync`.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RefCell<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&DiagnosticEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, event: DiagnosticEvent) {
        self.events.borrow_mut().push(event);
    }
}
