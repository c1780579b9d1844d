//! Error types for statement parsing and join pruning.
//!
//! # Error Handling Strategy
//!
//! Two complementary patterns are used:
//!
//! - [`RewriteError`] (wrapping [`ParseError`]): fatal errors. Malformed SQL, an
//!   empty script or a first statement that is not a `SELECT` abort the rewrite
//!   before any output is produced.
//!
//! - [`crate::types::Issue`]: non-fatal gaps collected while rewriting (a join
//!   dependency that cannot be found, an expression nested too deeply, clauses
//!   that are not carried over). These ride along on a successful
//!   [`crate::RewriteResult`] so a partially pruned statement is still emitted.

use crate::types::Dialect;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
#[cfg(feature = "tracing")]
use tracing::trace;

/// Error encountered while parsing the (preprocessed) SQL text.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Human-readable error message.
    pub message: String,
    /// Line/column where the error occurred, if the parser reported one.
    pub position: Option<Position>,
    /// The SQL dialect being parsed when the error occurred.
    pub dialect: Option<Dialect>,
    /// The specific category of parse error.
    pub kind: ParseErrorKind,
}

/// Position information for a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

/// Category of parse error for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorKind {
    /// Unexpected token or character in input.
    #[default]
    SyntaxError,
    /// Missing required clause or keyword.
    MissingClause,
    /// Invalid or unexpected end of input.
    UnexpectedEof,
    /// Feature not supported by the current dialect.
    UnsupportedFeature,
    /// Lexer/tokenization error.
    LexerError,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            dialect: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    pub fn with_position(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            position: Some(Position { line, column }),
            dialect: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    /// Adds dialect context to the error.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Recovers the position from sqlparser's "... at Line: X, Column: Y" suffix.
    ///
    /// Coupled to the `sqlparser` message format; returns `None` when the
    /// suffix is absent or malformed.
    fn parse_position_from_message(message: &str) -> Option<Position> {
        static POSITION_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = POSITION_REGEX.get_or_init(|| {
            Regex::new(r"Line:\s*(\d+)\s*,\s*Column:\s*(\d+)").expect("Invalid regex pattern")
        });

        let result = re.captures(message).and_then(|caps| {
            let line: usize = caps.get(1)?.as_str().parse().ok()?;
            let column: usize = caps.get(2)?.as_str().parse().ok()?;
            Some(Position { line, column })
        });

        #[cfg(feature = "tracing")]
        if result.is_none() && message.contains("Line") {
            trace!("Failed to parse position from error message: {}", message);
        }

        result
    }

    fn infer_kind_from_message(message: &str) -> ParseErrorKind {
        let lower = message.to_lowercase();
        if lower.contains("unexpected end") || lower.contains("eof") {
            ParseErrorKind::UnexpectedEof
        } else if lower.contains("expected") {
            ParseErrorKind::MissingClause
        } else if lower.contains("not supported") || lower.contains("unsupported") {
            ParseErrorKind::UnsupportedFeature
        } else if lower.contains("lexer") || lower.contains("token") {
            ParseErrorKind::LexerError
        } else {
            ParseErrorKind::SyntaxError
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error")?;

        if let Some(dialect) = self.dialect {
            write!(f, " ({dialect:?})")?;
        }

        if let Some(pos) = self.position {
            write!(f, " at line {}, column {}", pos.line, pos.column)?;
        }

        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        let message = err.to_string();
        let position = Self::parse_position_from_message(&message);
        let kind = Self::infer_kind_from_message(&message);

        Self {
            message,
            position,
            dialect: None,
            kind,
        }
    }
}

/// Fatal failure of a rewrite. No SQL or report is produced when one is returned.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The input contained no SQL text at all.
    #[error("no SQL text to rewrite")]
    EmptyInput,

    /// The preprocessed text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The first statement is not a plain `SELECT` query.
    #[error("unsupported statement: expected a SELECT query, found {0}")]
    UnsupportedStatement(String),

    /// The `SELECT` has no `FROM` clause, so there is no join chain to prune.
    #[error("SELECT statement has no FROM clause")]
    MissingFrom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position_from_message() {
        let msg = "Expected: an expression, found: EOF at Line: 3, Column: 12";
        let pos = ParseError::parse_position_from_message(msg);
        assert_eq!(
            pos,
            Some(Position {
                line: 3,
                column: 12
            })
        );
    }

    #[test]
    fn test_parse_position_missing_or_malformed() {
        assert_eq!(ParseError::parse_position_from_message("Unexpected token"), None);
        assert_eq!(
            ParseError::parse_position_from_message("Error at Line: abc, Column: 5"),
            None
        );
        assert_eq!(
            ParseError::parse_position_from_message("Error at Column: 5, Line: 1"),
            None
        );
    }

    #[test]
    fn test_infer_kind() {
        assert_eq!(
            ParseError::infer_kind_from_message("Unexpected end of input"),
            ParseErrorKind::UnexpectedEof
        );
        assert_eq!(
            ParseError::infer_kind_from_message("Expected SELECT keyword"),
            ParseErrorKind::MissingClause
        );
        assert_eq!(
            ParseError::infer_kind_from_message("Lexer error: invalid character"),
            ParseErrorKind::LexerError
        );
        assert_eq!(
            ParseError::infer_kind_from_message("Something went wrong"),
            ParseErrorKind::SyntaxError
        );
    }

    #[test]
    fn test_display_with_dialect_and_position() {
        let err = ParseError::with_position("Bad syntax", 1, 5).with_dialect(Dialect::Mysql);
        assert_eq!(
            err.to_string(),
            "Parse error (Mysql) at line 1, column 5: Bad syntax"
        );
    }

    #[test]
    fn test_rewrite_error_wraps_parse_error_transparently() {
        let err: RewriteError = ParseError::new("boom").into();
        assert_eq!(err.to_string(), "Parse error: boom");
        assert!(matches!(err, RewriteError::Parse(_)));
    }
}
