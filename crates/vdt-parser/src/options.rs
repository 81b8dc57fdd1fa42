//! Parser configuration.

/// Options consumed by the template parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// The pair of expression delimiters: (open, close).
    pub delimiters: (String, String),
}

impl ParserOptions {
    /// Create options with a custom delimiter pair.
    pub fn with_delimiters(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            delimiters: (open.into(), close.into()),
        }
    }
}

impl Default for ParserOptions {
    /// Single-brace delimiters: `{` / `}`.
    fn default() -> Self {
        Self::with_delimiters("{", "}")
    }
}
