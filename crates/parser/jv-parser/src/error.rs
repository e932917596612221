//! Rich error reporting for the parser
//!
//! Note: These struct fields are used by miette's `#[derive(Diagnostic)]` macro
//! for rich error output, which the unused-assignment lint cannot see through.

#![allow(unused_assignments, reason = "fields are read by the miette derive")]

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

// Re-export codespan types for convenience
pub use codespan_reporting;

/// Parse error with rich diagnostic information
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum ParseError {
    /// Syntax error with unexpected input
    #[error("unexpected token `{token}`")]
    #[diagnostic(code(parser::unexpected_token), help("this token is not valid here"))]
    UnexpectedToken {
        /// What was found
        token: String,
        /// Source location
        #[label("unexpected token")]
        span: SourceSpan,
        /// Source code for context
        #[source_code]
        src: miette::NamedSource<String>,
    },

    /// Missing expected token
    #[error("expected `{expected}`, found `{found}`")]
    #[diagnostic(code(parser::missing_token), help("try adding `{expected}` here"))]
    MissingToken {
        /// What was expected
        expected: String,
        /// What was actually found
        found: String,
        /// Source location where it should be
        #[label("expected `{expected}` here")]
        span: SourceSpan,
        /// Source code for context
        #[source_code]
        src: miette::NamedSource<String>,
    },

    /// Unclosed delimiter
    #[error("this file contains an unclosed delimiter")]
    #[diagnostic(code(parser::unclosed_delimiter))]
    UnclosedDelimiter {
        /// The opening character
        opening_char: char,
        /// Opening delimiter location
        #[label("unclosed delimiter")]
        opening: SourceSpan,
        /// Location where closing was expected
        #[label("expected `{closing_char}`")]
        expected_close: SourceSpan,
        /// The expected closing character
        closing_char: char,
        /// Source code for context
        #[source_code]
        src: miette::NamedSource<String>,
    },

    /// Parse failed completely
    #[error("failed to parse source: {reason}")]
    #[diagnostic(code(parser::parse_failed))]
    ParseFailed {
        /// Reason for failure
        reason: String,
    },

    /// IO error
    #[error("failed to read file: {message}")]
    #[diagnostic(code(parser::io_error))]
    IoError {
        /// Error message
        message: String,
    },
}

impl ParseError {
    /// Byte offset where the problem starts, if known
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnexpectedToken { span, .. } | Self::MissingToken { span, .. } => {
                Some(span.offset())
            }
            Self::UnclosedDelimiter { expected_close, .. } => Some(expected_close.offset()),
            Self::ParseFailed { .. } | Self::IoError { .. } => None,
        }
    }

    /// Convert to codespan diagnostic for rustc-style output
    pub fn to_codespan_diagnostic(
        &self,
        file_id: usize,
    ) -> codespan_reporting::diagnostic::Diagnostic<usize> {
        use codespan_reporting::diagnostic::{Diagnostic, Label};

        match self {
            Self::UnexpectedToken { token, span, .. } => Diagnostic::error()
                .with_message(format!("unexpected token `{token}`"))
                .with_labels(vec![
                    Label::primary(file_id, span.offset()..span.offset() + span.len())
                        .with_message("unexpected token"),
                ]),
            Self::MissingToken {
                expected,
                found,
                span,
                ..
            } => Diagnostic::error()
                .with_message(format!("expected `{expected}`, found `{found}`"))
                .with_labels(vec![
                    Label::primary(file_id, span.offset()..span.offset() + span.len())
                        .with_message(format!("expected `{expected}` here")),
                ])
                .with_notes(vec![format!("try adding `{expected}` here")]),
            Self::UnclosedDelimiter {
                opening,
                expected_close,
                closing_char,
                ..
            } => Diagnostic::error()
                .with_message("this file contains an unclosed delimiter")
                .with_labels(vec![
                    Label::secondary(file_id, opening.offset()..opening.offset() + opening.len())
                        .with_message("unclosed delimiter"),
                    Label::primary(
                        file_id,
                        expected_close.offset()..expected_close.offset() + expected_close.len(),
                    )
                    .with_message(format!("expected `{closing_char}`")),
                ]),
            Self::ParseFailed { reason } => {
                Diagnostic::error().with_message(format!("failed to parse source: {reason}"))
            }
            Self::IoError { message } => Diagnostic::error().with_message(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        let source = "var a = (1;".to_string();
        let missing = ParseError::MissingToken {
            expected: ")".to_string(),
            found: ";".to_string(),
            span: (10, 1).into(),
            src: miette::NamedSource::new("test.js", source.clone()),
        };
        assert_eq!(missing.offset(), Some(10));

        let unclosed = ParseError::UnclosedDelimiter {
            opening_char: '(',
            opening: (8, 1).into(),
            expected_close: (10, 1).into(),
            closing_char: ')',
            src: miette::NamedSource::new("test.js", source),
        };
        assert_eq!(unclosed.offset(), Some(10));

        let failed = ParseError::ParseFailed {
            reason: "cancelled".to_string(),
        };
        assert_eq!(failed.offset(), None);
        assert_eq!(failed.to_string(), "failed to parse source: cancelled");
    }
}
