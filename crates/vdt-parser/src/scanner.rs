//! Character cursor over template source.
//!
//! The scanner owns the position bookkeeping the parser relies on: a byte
//! offset for slicing, and a 1-based line counter with a column that resets
//! to 0 at each newline. All parsing rules are resolved with finite
//! lookahead through [`Scanner::char_at`]; there is no backtracking.

use crate::error::{ErrorCode, ParseError, ParseResult};
use source_span::Loc;

/// A cursor over template source text.
pub struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 0,
        }
    }

    /// The full source text.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Get the current byte offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Get the current location.
    pub fn loc(&self) -> Loc {
        Loc::new(self.line, self.column)
    }

    /// Check if at end of input.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Get the remaining source.
    pub fn remaining(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// Peek at the current character.
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Peek at the character `n` characters ahead of the cursor.
    pub fn char_at(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    /// Check if the remaining source starts with the given string.
    pub fn starts_with(&self, s: &str) -> bool {
        self.remaining().starts_with(s)
    }

    /// Consume and return the current character, updating line/column.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume `n` characters.
    pub fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            if self.advance().is_none() {
                break;
            }
        }
    }

    /// Consume a literal if the remaining source starts with it.
    pub fn consume(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.advance_by(s.chars().count());
            true
        } else {
            false
        }
    }

    /// Consume a literal or raise a located error naming it.
    pub fn expect(&mut self, s: &str) -> ParseResult<()> {
        if self.consume(s) {
            Ok(())
        } else {
            let found: String = self.remaining().chars().take(s.chars().count()).collect();
            let found = if found.is_empty() {
                "end of input".to_string()
            } else {
                format!("'{}'", found)
            };
            Err(ParseError::new(
                format!("Expected '{}', found {}", s, found),
                self.loc(),
                self.source,
                ErrorCode::UnexpectedToken,
            ))
        }
    }

    /// Consume characters while the predicate is true, returning the slice.
    pub fn consume_while<F>(&mut self, pred: F) -> &'a str
    where
        F: Fn(char) -> bool,
    {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if pred(c) {
                self.advance();
            } else {
                break;
            }
        }
        &self.source[start..self.pos]
    }

    /// Skip whitespace, returning how many characters were skipped.
    pub fn skip_whitespace(&mut self) -> usize {
        let mut skipped = 0;
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
                skipped += 1;
            } else {
                break;
            }
        }
        skipped
    }

    /// Length of the whitespace run at the cursor, without consuming it.
    pub fn peek_whitespace_run(&self) -> usize {
        self.remaining()
            .chars()
            .take_while(|c| c.is_whitespace())
            .count()
    }

    /// Get the source slice between two byte offsets.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }
}

/// Check if a character can appear in an identifier.
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Check if a character can appear in a tag name.
pub fn is_tag_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ':' || c == '.'
}

/// Check if a character can appear in an attribute name.
pub fn is_attr_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ':' || c == '.' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tracks_lines() {
        let mut scanner = Scanner::new("ab\ncd");
        assert_eq!(scanner.loc(), Loc::new(1, 0));
        scanner.advance();
        scanner.advance();
        assert_eq!(scanner.loc(), Loc::new(1, 2));
        scanner.advance(); // newline
        assert_eq!(scanner.loc(), Loc::new(2, 0));
        scanner.advance();
        assert_eq!(scanner.loc(), Loc::new(2, 1));
    }

    #[test]
    fn test_char_at_lookahead() {
        let scanner = Scanner::new("<div>");
        assert_eq!(scanner.char_at(0), Some('<'));
        assert_eq!(scanner.char_at(1), Some('d'));
        assert_eq!(scanner.char_at(5), None);
    }

    #[test]
    fn test_expect_reports_found() {
        let mut scanner = Scanner::new("</span>");
        let err = scanner.expect("</div>").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::UnexpectedToken);
        assert!(err.message.contains("</div>"));
    }

    #[test]
    fn test_consume_multibyte() {
        let mut scanner = Scanner::new("héllo");
        assert!(scanner.consume("hé"));
        assert_eq!(scanner.remaining(), "llo");
        assert_eq!(scanner.loc(), Loc::new(1, 2));
    }
}
