//! vdt template parser.
//!
//! This crate compiles vdt template source — raw script statements, hoisted
//! `import` statements and inline markup with directive attributes — into an
//! AST consumed by a render-function code generator. Parsing is a single
//! hand-written recursive-descent pass with no separate lexer; all errors
//! are fatal and carry a source location plus a rendered excerpt.

pub mod ast;
pub mod error;
pub mod options;
pub mod parser;
pub mod scanner;
#[cfg(debug_assertions)]
mod validate;

pub use ast::*;
pub use error::{ErrorCode, ParseError, ParseResult};
pub use options::ParserOptions;
pub use parser::parse;
pub use source_span::Loc;

/// Parse a template with default options.
pub fn compile(source: &str) -> ParseResult<Vec<AstNode>> {
    parse(source, &ParserOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_simple_template() {
        let nodes = compile("<div>Hello {name}</div>").unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_compile_mixed_script_and_markup() {
        let source = "const cls = active ? 'on' : 'off';\n<div class={cls}>\n    {label}\n</div>";
        let nodes = compile(source).unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(matches!(nodes[0].kind, AstKind::JsFragment(_)));
        assert!(matches!(nodes[1].kind, AstKind::Element(_)));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let source = "import x from 'x';\n<ul>\n  <li v-if={a}>A</li>\n  <li v-else>B</li>\n</ul>";
        let first = compile(source).unwrap();
        let second = compile(source).unwrap();
        assert_eq!(first, second);
    }
}
