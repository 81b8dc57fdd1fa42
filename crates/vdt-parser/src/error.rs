//! Error types for template parsing.
//!
//! All parse errors are fatal: the parser aborts at the first malformed
//! construct and never returns a partial AST. Every error carries the
//! location it was raised at and an excerpt of the offending source line.

use source_span::{excerpt, Loc};
use std::fmt;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location where the error occurred.
    pub loc: Loc,
    /// The rendered source excerpt with a caret at the error column.
    pub excerpt: String,
    /// The error code.
    pub code: ErrorCode,
}

impl ParseError {
    /// Create a new parse error, rendering the excerpt from `source`.
    pub fn new(message: impl Into<String>, loc: Loc, source: &str, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            loc,
            excerpt: excerpt(source, loc),
            code,
        }
    }

    /// Create an unexpected token error.
    pub fn unexpected_token(expected: &str, found: &str, loc: Loc, source: &str) -> Self {
        Self::new(
            format!("Expected {}, found {}", expected, found),
            loc,
            source,
            ErrorCode::UnexpectedToken,
        )
    }

    /// Create an unterminated tag error.
    pub fn unterminated_tag(tag: &str, loc: Loc, source: &str) -> Self {
        Self::new(
            format!("Unterminated tag: <{}>", tag),
            loc,
            source,
            ErrorCode::UnterminatedTag,
        )
    }

    /// Create an unterminated expression error.
    ///
    /// `loc` is the location of the opening delimiter, not end-of-file.
    pub fn unterminated_expression(loc: Loc, source: &str) -> Self {
        Self::new(
            "Unterminated expression",
            loc,
            source,
            ErrorCode::UnterminatedExpression,
        )
    }

    /// Create a missing directive predecessor error.
    pub fn missing_if_predecessor(name: &str, loc: Loc, source: &str) -> Self {
        Self::new(
            format!("{} must follow an element with v-if or v-else-if", name),
            loc,
            source,
            ErrorCode::MissingIfPredecessor,
        )
    }

    /// Create an invalid attribute error.
    pub fn invalid_attribute(found: &str, loc: Loc, source: &str) -> Self {
        Self::new(
            format!("Invalid attribute: {}", found),
            loc,
            source,
            ErrorCode::InvalidAttribute,
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}\n{}", self.message, self.loc, self.excerpt)
    }
}

impl std::error::Error for ParseError {}

/// Error codes for categorizing parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Unexpected token encountered.
    UnexpectedToken,
    /// Tag opened but never closed.
    UnterminatedTag,
    /// String literal opened but never closed.
    UnterminatedString,
    /// Expression delimiter opened but never closed.
    UnterminatedExpression,
    /// HTML comment opened but never closed.
    UnterminatedComment,
    /// v-else-if/v-else without a preceding v-if.
    MissingIfPredecessor,
    /// Unknown tag-name directive prefix (e.g. <q:foo>).
    UnknownDirectivePrefix,
    /// Invalid attribute syntax.
    InvalidAttribute,
    /// Invalid directive usage.
    InvalidDirective,
}

impl ErrorCode {
    /// Get the error code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedToken => "unexpected-token",
            ErrorCode::UnterminatedTag => "unterminated-tag",
            ErrorCode::UnterminatedString => "unterminated-string",
            ErrorCode::UnterminatedExpression => "unterminated-expression",
            ErrorCode::UnterminatedComment => "unterminated-comment",
            ErrorCode::MissingIfPredecessor => "missing-if-predecessor",
            ErrorCode::UnknownDirectivePrefix => "unknown-directive-prefix",
            ErrorCode::InvalidAttribute => "invalid-attribute",
            ErrorCode::InvalidDirective => "invalid-directive",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
