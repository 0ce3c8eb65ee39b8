//! Structured error types for the worksheet renderer.
//!
//! `FichaError` is what callers see. The two port errors (`MeasureError`,
//! `DrawError`) come from the collaborators the layout core talks to:
//! measurement failures are recovered inside the core, drawing failures are
//! fatal and surface as `FichaError::Render`.

use std::path::PathBuf;

use crate::style::TextStyle;

/// The unified error type returned by all public API functions.
#[derive(Debug, thiserror::Error)]
pub enum FichaError {
    /// The request JSON failed to parse.
    #[error("Failed to parse request: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
    /// A font could not be loaded or parsed.
    #[error("Font error: {0}")]
    Font(String),
    /// The header image could not be read or decoded.
    #[error("Image error: {0}")]
    Image(String),
    /// Drawing a run failed; the whole render is abandoned.
    #[error("Render error: {0}")]
    Render(#[from] DrawError),
    /// The finished canvas could not be encoded.
    #[error("Encode error: {0}")]
    Encode(String),
    /// Reading or writing a file failed.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FichaError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the request schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FichaError::Parse { source: e, hint }
    }
}

/// Failure reported by a measurement port.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasureError {
    #[error("no font face registered for {0:?}")]
    MissingFace(TextStyle),
    #[error("non-finite width measuring {0:?} text")]
    NonFinite(TextStyle),
}

/// Failure reported by a drawing port.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrawError {
    #[error("no font face registered for {0:?}")]
    MissingFace(TextStyle),
    #[error("font face for {0:?} could not be parsed")]
    UnparsableFace(TextStyle),
    #[error("cannot draw '{text}' at ({x}, {y})")]
    InvalidPosition { text: String, x: f64, y: f64 },
    #[error("glyph for {0:?} could not be rendered")]
    Glyph(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_syntax_hint() {
        let err: FichaError = serde_json::from_str::<serde_json::Value>("{\"text\": }")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse request"));
        assert!(msg.contains("Hint: Check for trailing commas"), "{msg}");
    }

    #[test]
    fn parse_error_eof_hint() {
        let err: FichaError = serde_json::from_str::<serde_json::Value>("{\"text\": \"a\"")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn draw_error_converts_to_render() {
        let err: FichaError = DrawError::Glyph('x').into();
        assert!(matches!(err, FichaError::Render(DrawError::Glyph('x'))));
        assert!(err.to_string().starts_with("Render error:"));
    }
}
