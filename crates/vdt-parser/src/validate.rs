//! Development-only structural validation.
//!
//! These checks run after an element has been fully parsed, in debug builds
//! only; production builds skip them for parse throughput. Violations are
//! reported exactly like parse errors.

use crate::ast::{AstKind, AstNode, Directive};
use crate::error::{ErrorCode, ParseError, ParseResult};

/// Validate tag/directive compatibility for a freshly parsed markup node.
pub(crate) fn validate_element(node: &AstNode, source: &str) -> ParseResult<()> {
    let Some(el) = node.element() else {
        return Ok(());
    };
    let is_block = matches!(node.kind, AstKind::Block(_));
    let is_include = matches!(node.kind, AstKind::Include(_));

    if (is_block || is_include) && el.has_directive(Directive::Model) {
        return Err(ParseError::new(
            format!("v-model is not valid on <{}>", el.tag),
            node.loc,
            source,
            ErrorCode::InvalidDirective,
        ));
    }

    // Blocks take no attributes of their own apart from `args`.
    if is_block {
        for attr in &el.attrs {
            if let AstKind::Attribute(a) = &attr.kind {
                if a.name != "args" {
                    return Err(ParseError::new(
                        format!("Invalid attribute '{}' on <{}>", a.name, el.tag),
                        attr.loc,
                        source,
                        ErrorCode::InvalidAttribute,
                    ));
                }
            }
        }
    }

    if el.has_directive(Directive::If)
        && (el.has_directive(Directive::ElseIf) || el.has_directive(Directive::Else))
    {
        return Err(ParseError::new(
            "v-if cannot be combined with v-else-if/v-else on one element",
            node.loc,
            source,
            ErrorCode::InvalidDirective,
        ));
    }

    if (el.has_directive(Directive::ForValue) || el.has_directive(Directive::ForKey))
        && !el.has_directive(Directive::For)
    {
        return Err(ParseError::new(
            "v-for-value/v-for-key require v-for",
            node.loc,
            source,
            ErrorCode::InvalidDirective,
        ));
    }

    Ok(())
}
