//! Source position tracking for vdt-rs.
//!
//! This crate provides the position types shared by the template parser:
//! byte-offset spans, the parser's line/column cursor position, and an
//! excerpt renderer used to point error messages at the offending source.

use std::fmt;
use std::ops::Range;

/// A span in the source code, representing a half-open range [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Start offset (inclusive)
    pub start: u32,
    /// End offset (exclusive)
    pub end: u32,
}

impl Span {
    /// Create a new span from start and end offsets.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Create an empty span at the given offset.
    #[inline]
    pub const fn empty(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Create a span from a range.
    #[inline]
    pub fn from_range(range: Range<usize>) -> Self {
        Self {
            start: range.start as u32,
            end: range.end as u32,
        }
    }

    /// Get the length of the span.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span contains an offset.
    #[inline]
    pub const fn contains_offset(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Merge two spans into one that covers both.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Convert to a Range<usize>.
    #[inline]
    pub fn to_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::from_range(range)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.to_range()
    }
}

/// The parser cursor's notion of a source position.
///
/// Lines are 1-based; the column counts characters since the last newline
/// and resets to 0 at each line break. This matches how the scanner
/// advances, so a `Loc` taken at any point during parsing can be stored
/// on an AST node without further translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loc {
    /// 1-based line number.
    pub line: u32,
    /// Column within the line, starting at 0.
    pub column: u32,
}

impl Loc {
    /// Create a new location.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The location of the first character of any source.
    #[inline]
    pub const fn start() -> Self {
        Self { line: 1, column: 0 }
    }
}

impl Default for Loc {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A line index for converting between byte offsets and line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets of the start of each line.
    line_starts: Vec<u32>,
    /// Total length of the source.
    len: u32,
}

impl LineIndex {
    /// Create a new line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self {
            line_starts,
            len: text.len() as u32,
        }
    }

    /// Get the location for a byte offset.
    pub fn loc(&self, offset: u32) -> Loc {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        Loc {
            line: line as u32 + 1,
            column: offset - line_start,
        }
    }

    /// Get the byte offset for a location.
    /// Returns None if the position is out of bounds.
    pub fn offset(&self, loc: Loc) -> Option<u32> {
        let line_start = self.line_starts.get(loc.line.checked_sub(1)? as usize)?;
        let offset = line_start + loc.column;
        if offset <= self.len {
            Some(offset)
        } else {
            None
        }
    }

    /// Get the number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the start offset of a 1-based line.
    pub fn line_start(&self, line: u32) -> Option<u32> {
        self.line_starts.get(line.checked_sub(1)? as usize).copied()
    }
}

/// Render the source line at `loc` with a caret marking the column.
///
/// Used by the parser to attach an excerpt to every fatal error:
///
/// ```text
/// <div v-else>B</div>
///      ^
/// ```
pub fn excerpt(source: &str, loc: Loc) -> String {
    let line_text = source
        .lines()
        .nth(loc.line.saturating_sub(1) as usize)
        .unwrap_or("");
    let mut caret = String::new();
    for c in line_text.chars().take(loc.column as usize) {
        // Keep tabs so the caret lines up in terminals.
        caret.push(if c == '\t' { '\t' } else { ' ' });
    }
    caret.push('^');
    format!("{}\n{}", line_text, caret)
}
