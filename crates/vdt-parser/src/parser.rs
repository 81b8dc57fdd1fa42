//! Recursive-descent parser for vdt templates.
//!
//! The parser tokenizes mixed template/script source directly, without a
//! separate lexer pass. Root-level dispatch distinguishes hoisted `import`
//! statements, markup, and raw script fragments; markup parsing recurses
//! through attributes, children and delimiter-bounded expressions.

use crate::ast::*;
use crate::error::{ErrorCode, ParseError, ParseResult};
use crate::options::ParserOptions;
use crate::scanner::{is_attr_name_char, is_ident_char, is_tag_name_char, Scanner};
use once_cell::sync::Lazy;
use regex::Regex;
use source_span::Loc;

/// Tags that never have children.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Tags whose content is captured verbatim as a text attribute rather than
/// parsed as children.
const TEXT_TAGS: &[&str] = &["script", "style", "textarea"];

/// A `<` only starts markup when followed by a tag-name character, a
/// directive prefix, a closing slash, or a comment opener. Anything else
/// (`a < b`) stays script.
static TAG_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<(?:[\w:{/>]|!--)").unwrap());

/// Parse template source into an ordered sequence of root nodes.
pub fn parse(source: &str, options: &ParserOptions) -> ParseResult<Vec<AstNode>> {
    let mut parser = TemplateParser::new(source, options);
    parser.parse()
}

/// Parser for vdt templates.
struct TemplateParser<'a> {
    scanner: Scanner<'a>,
    open: String,
    close: String,
}

impl<'a> TemplateParser<'a> {
    /// Create a new parser.
    fn new(source: &'a str, options: &ParserOptions) -> Self {
        Self {
            scanner: Scanner::new(source),
            open: options.delimiters.0.clone(),
            close: options.delimiters.1.clone(),
        }
    }

    /// Parse the whole template.
    fn parse(&mut self) -> ParseResult<Vec<AstNode>> {
        let mut braces = 0isize;
        let nodes = self.parse_nodes(&mut braces, 0)?;
        if !self.scanner.is_eof() {
            // Only a stray closing delimiter at depth 0 can stop the loop
            // before end-of-input.
            return Err(ParseError::new(
                format!("Unexpected '{}'", self.close),
                self.scanner.loc(),
                self.scanner.source(),
                ErrorCode::UnexpectedToken,
            ));
        }
        Ok(nodes)
    }

    /// Parse a sequence of nodes until end-of-input or until the shared
    /// brace count goes negative (a closing delimiter at depth 0).
    fn parse_nodes(&mut self, braces: &mut isize, strip_spaces: usize) -> ParseResult<Vec<AstNode>> {
        let mut nodes = Vec::new();
        while !self.scanner.is_eof() && *braces >= 0 {
            self.advance_node(&mut nodes, braces, strip_spaces)?;
        }
        Ok(nodes)
    }

    /// Parse one node, dispatching on the leading character.
    fn advance_node(
        &mut self,
        nodes: &mut Vec<AstNode>,
        braces: &mut isize,
        strip_spaces: usize,
    ) -> ParseResult<()> {
        let ch = self.scanner.peek();
        if ch != Some('<') && self.is_import_start() {
            nodes.push(self.scan_js_import()?);
            return Ok(());
        }
        if ch == Some('<') && self.is_tag_start() {
            let node = self.scan_jsx()?;
            return self.push_markup(nodes, node);
        }
        let js = self.scan_js(braces, strip_spaces)?;
        if let AstKind::JsFragment(fragment) = &js.kind {
            if !fragment.code.trim().is_empty() {
                nodes.push(js);
            }
        }
        Ok(())
    }

    /// Check for markup at the cursor.
    fn is_tag_start(&self) -> bool {
        TAG_START.is_match(self.scanner.remaining())
    }

    /// Check for an `import` keyword at the cursor.
    fn is_import_start(&self) -> bool {
        self.scanner.starts_with("import")
            && self
                .scanner
                .char_at(6)
                .is_some_and(|c| c.is_whitespace() || c == '"' || c == '\'')
    }

    /// Scan a hoisted import statement, up to and including its `;`.
    fn scan_js_import(&mut self) -> ParseResult<AstNode> {
        let loc = self.scanner.loc();
        let start = self.scanner.pos();
        while let Some(c) = self.scanner.peek() {
            match c {
                '\'' | '"' => self.scan_string(c)?,
                ';' => {
                    self.scanner.advance();
                    break;
                }
                '\n' => {
                    // Import statements do not span lines.
                    break;
                }
                _ => {
                    self.scanner.advance();
                }
            }
        }
        let code = self.scanner.slice(start, self.scanner.pos()).to_string();
        Ok(AstNode::new(AstKind::Import(code), loc))
    }

    /// Scan a raw script fragment.
    ///
    /// Strings, template literals, comments and regex literals are opaque:
    /// their contents are never inspected for tag starts or delimiters.
    /// Nested `{`/`}` depth is tracked so a closing delimiter at depth 0
    /// ends the enclosing expression; `strip_spaces` leading spaces are
    /// removed from each continuation line.
    fn scan_js(&mut self, braces: &mut isize, strip_spaces: usize) -> ParseResult<AstNode> {
        let loc = self.scanner.loc();
        let mut code = String::new();
        let mut last_significant: Option<char> = None;
        let mut min_extra_spaces = usize::MAX;
        let mut stopped_at_delimiter = false;

        while let Some(c) = self.scanner.peek() {
            if c == '\'' || c == '"' || c == '`' {
                let start = self.scanner.pos();
                self.scan_string(c)?;
                code.push_str(self.scanner.slice(start, self.scanner.pos()));
                last_significant = Some(c);
            } else if self.scanner.starts_with("//") {
                let start = self.scanner.pos();
                while let Some(c) = self.scanner.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.scanner.advance();
                }
                code.push_str(self.scanner.slice(start, self.scanner.pos()));
            } else if self.scanner.starts_with("/*") {
                let start = self.scanner.pos();
                self.scanner.advance_by(2);
                while !self.scanner.is_eof() && !self.scanner.starts_with("*/") {
                    self.scanner.advance();
                }
                self.scanner.consume("*/");
                code.push_str(self.scanner.slice(start, self.scanner.pos()));
            } else if c == '/'
                && !matches!(last_significant, Some(l) if is_ident_char(l) || l == ')')
            {
                // Division needs an operand on the left; anything else
                // starts a regex literal.
                let start = self.scanner.pos();
                self.scan_regex();
                code.push_str(self.scanner.slice(start, self.scanner.pos()));
                last_significant = Some('/');
            } else if self.is_tag_start() {
                break;
            } else if self.is_import_start()
                && !matches!(last_significant, Some(l) if is_ident_char(l) || l == '.')
            {
                break;
            } else {
                if c == '{' {
                    *braces += 1;
                } else if *braces > 0 && c == '}' {
                    *braces -= 1;
                } else if self.scanner.starts_with(&self.close) {
                    *braces -= 1;
                    stopped_at_delimiter = true;
                    break;
                }
                self.scanner.advance();
                code.push(c);
                if !c.is_whitespace() {
                    last_significant = Some(c);
                }
                if c == '\n' {
                    let mut stripped = 0;
                    while stripped < strip_spaces && self.scanner.peek() == Some(' ') {
                        self.scanner.advance();
                        stripped += 1;
                    }
                    let mut extra = 0;
                    while self.scanner.char_at(extra) == Some(' ') {
                        extra += 1;
                    }
                    let line_has_content =
                        !matches!(self.scanner.char_at(extra), None | Some('\n'));
                    if line_has_content {
                        min_extra_spaces = min_extra_spaces.min(extra);
                    }
                }
            }
        }

        if stopped_at_delimiter {
            // The final line often holds only the closing delimiter's
            // indentation; drop it.
            if let Some(newline) = code.rfind('\n') {
                if code[newline + 1..].chars().all(|c| c == ' ' || c == '\t') {
                    code.truncate(newline + 1);
                }
            }
        }

        let spaces = if min_extra_spaces == usize::MAX {
            0
        } else {
            min_extra_spaces
        };
        Ok(AstNode::new(AstKind::JsFragment(JsFragment { code, spaces }), loc))
    }

    /// Scan a string or template literal, consuming through the closing
    /// quote and honoring backslash escapes.
    fn scan_string(&mut self, quote: char) -> ParseResult<()> {
        let loc = self.scanner.loc();
        self.scanner.advance();
        while let Some(c) = self.scanner.peek() {
            if c == quote {
                self.scanner.advance();
                return Ok(());
            }
            if c == '\\' {
                self.scanner.advance();
            }
            if c == '\n' && quote != '`' {
                break;
            }
            self.scanner.advance();
        }
        Err(ParseError::new(
            "Unterminated string literal",
            loc,
            self.scanner.source(),
            ErrorCode::UnterminatedString,
        ))
    }

    /// Scan a regex literal. Stops at the closing `/`, honoring escapes and
    /// character classes; regexes cannot span lines, so a newline ends the
    /// scan without error.
    fn scan_regex(&mut self) {
        self.scanner.advance();
        let mut in_class = false;
        while let Some(c) = self.scanner.peek() {
            match c {
                '\\' => {
                    self.scanner.advance();
                    self.scanner.advance();
                    continue;
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    self.scanner.advance();
                    self.scanner.consume_while(|c| c.is_ascii_alphabetic());
                    return;
                }
                '\n' => return,
                _ => {}
            }
            self.scanner.advance();
        }
    }

    /// Scan markup: an HTML comment or an element.
    fn scan_jsx(&mut self) -> ParseResult<AstNode> {
        if self.scanner.starts_with("<!--") {
            return self.parse_jsx_comment();
        }
        self.parse_jsx_element()
    }

    /// Parse an HTML comment, captured verbatim.
    fn parse_jsx_comment(&mut self) -> ParseResult<AstNode> {
        let loc = self.scanner.loc();
        self.scanner.expect("<!--")?;
        let start = self.scanner.pos();
        while !self.scanner.is_eof() && !self.scanner.starts_with("-->") {
            self.scanner.advance();
        }
        if self.scanner.is_eof() {
            return Err(ParseError::new(
                "Unterminated comment",
                loc,
                self.scanner.source(),
                ErrorCode::UnterminatedComment,
            ));
        }
        let content = self.scanner.slice(start, self.scanner.pos()).to_string();
        self.scanner.expect("-->")?;
        Ok(AstNode::new(AstKind::Comment(content), loc))
    }

    /// Parse an element, component, block or include.
    fn parse_jsx_element(&mut self) -> ParseResult<AstNode> {
        let loc = self.scanner.loc();
        self.scanner.expect("<")?;
        let tag_loc = self.scanner.loc();
        let tag = self.scanner.consume_while(is_tag_name_char).to_string();
        if tag.is_empty() {
            let found: String = self.scanner.remaining().chars().take(1).collect();
            return Err(ParseError::unexpected_token(
                "tag name",
                &format!("'{}'", found),
                tag_loc,
                self.scanner.source(),
            ));
        }

        let kind = self.classify_tag(&tag, tag_loc)?;
        let mut el = ElementNode::new(tag);
        let raw = self.parse_jsx_attributes(&mut el, loc)?;

        let self_closing = self.scanner.consume("/>");
        if !self_closing {
            self.scanner.expect(">")?;
        }

        let is_void = VOID_TAGS.contains(&el.tag.as_str());
        if !self_closing && !is_void {
            if TEXT_TAGS.contains(&el.tag.as_str()) {
                self.parse_text_tag_content(&mut el, loc)?;
            } else {
                self.parse_jsx_children(&mut el, raw, loc)?;
            }
        }

        let node = AstNode::new(
            match kind {
                TagKind::Element => AstKind::Element(Box::new(el)),
                TagKind::Component => AstKind::Component(Box::new(el)),
                TagKind::Block => AstKind::Block(Box::new(el)),
                TagKind::Include => AstKind::Include(Box::new(el)),
            },
            loc,
        );

        #[cfg(debug_assertions)]
        crate::validate::validate_element(&node, self.scanner.source())?;

        Ok(node)
    }

    /// Classify a tag name: uppercase first letter makes a component, a
    /// single-letter `x:` prefix a block/include directive.
    fn classify_tag(&self, tag: &str, tag_loc: Loc) -> ParseResult<TagKind> {
        let mut chars = tag.chars();
        let first = chars.next().unwrap_or_default();
        if first.is_ascii_uppercase() {
            return Ok(TagKind::Component);
        }
        if chars.next() == Some(':') {
            return match first {
                't' => Ok(TagKind::Include),
                'b' => Ok(TagKind::Block),
                _ => Err(ParseError::new(
                    format!("Unknown directive prefix: {}:", first),
                    tag_loc,
                    self.scanner.source(),
                    ErrorCode::UnknownDirectivePrefix,
                )),
            };
        }
        Ok(TagKind::Element)
    }

    /// Parse the attribute list. Returns true when a `v-raw` directive was
    /// seen, which makes the children parser treat content as opaque text.
    fn parse_jsx_attributes(&mut self, el: &mut ElementNode, elem_loc: Loc) -> ParseResult<bool> {
        let mut raw = false;
        loop {
            self.scanner.skip_whitespace();
            if self.scanner.is_eof() {
                return Err(ParseError::unterminated_tag(
                    &el.tag,
                    elem_loc,
                    self.scanner.source(),
                ));
            }
            if self.scanner.starts_with(">") || self.scanner.starts_with("/>") {
                break;
            }

            if self.scanner.starts_with(&self.open) {
                // Spread attribute: a bare expression whose value is
                // appended as-is. Empty expressions are dropped.
                let expr = self.parse_jsx_expression()?;
                if let AstKind::Expression(e) = &expr.kind {
                    if !e.body.is_empty() {
                        el.attrs.push(expr);
                    }
                }
                continue;
            }

            let attr_loc = self.scanner.loc();
            let name = self.scanner.consume_while(is_attr_name_char).to_string();
            if name.is_empty() {
                let found: String = self.scanner.remaining().chars().take(1).collect();
                return Err(ParseError::invalid_attribute(
                    &format!("'{}'", found),
                    attr_loc,
                    self.scanner.source(),
                ));
            }

            self.scanner.skip_whitespace();
            let value = if self.scanner.consume("=") {
                self.scanner.skip_whitespace();
                match self.scanner.peek() {
                    Some(q @ ('"' | '\'')) => {
                        let value_loc = self.scanner.loc();
                        let literal = self.parse_attr_string(q)?;
                        AstNode::new(AstKind::StringLiteral(literal), value_loc)
                    }
                    _ if self.scanner.starts_with(&self.open) => self.parse_jsx_expression()?,
                    _ => {
                        return Err(ParseError::new(
                            format!("Expected value for attribute '{}'", name),
                            self.scanner.loc(),
                            self.scanner.source(),
                            ErrorCode::InvalidAttribute,
                        ));
                    }
                }
            } else {
                AstNode::new(AstKind::None, attr_loc)
            };

            if let Some(directive) = Directive::from_attr_name(&name) {
                if el.directives.contains_key(&directive) {
                    return Err(ParseError::new(
                        format!("Duplicate directive: {}", name),
                        attr_loc,
                        self.scanner.source(),
                        ErrorCode::InvalidDirective,
                    ));
                }
                if directive == Directive::Raw {
                    raw = true;
                }
                let dir_value = if directive.is_conditional() {
                    AstNode::new(
                        AstKind::DirectiveIf(Box::new(DirectiveIfNode {
                            condition: value,
                            next: None,
                        })),
                        attr_loc,
                    )
                } else {
                    value
                };
                el.directives.insert(directive, dir_value);
            } else {
                if name == "key" {
                    el.keyed = true;
                }
                el.attrs.push(AstNode::new(
                    AstKind::Attribute(Box::new(AttributeNode {
                        name: name.into(),
                        value,
                    })),
                    attr_loc,
                ));
            }
        }
        Ok(raw)
    }

    /// Parse a quoted attribute value. The contents are kept raw (escapes
    /// uninterpreted) for the code generator to re-emit.
    fn parse_attr_string(&mut self, quote: char) -> ParseResult<String> {
        let loc = self.scanner.loc();
        self.scanner.advance();
        let start = self.scanner.pos();
        while let Some(c) = self.scanner.peek() {
            if c == quote {
                let value = self.scanner.slice(start, self.scanner.pos()).to_string();
                self.scanner.advance();
                return Ok(value);
            }
            if c == '\\' {
                self.scanner.advance();
            }
            self.scanner.advance();
        }
        Err(ParseError::new(
            "Unterminated string literal",
            loc,
            self.scanner.source(),
            ErrorCode::UnterminatedString,
        ))
    }

    /// Capture a text tag's content verbatim into a `value` (textarea) or
    /// `innerHTML` attribute, then consume the closing tag.
    fn parse_text_tag_content(&mut self, el: &mut ElementNode, elem_loc: Loc) -> ParseResult<()> {
        let close_tag = format!("</{}", el.tag);
        let content_loc = self.scanner.loc();
        let start = self.scanner.pos();
        while !self.scanner.is_eof() && !self.scanner.starts_with(&close_tag) {
            self.scanner.advance();
        }
        if self.scanner.is_eof() {
            return Err(ParseError::unterminated_tag(
                &el.tag,
                elem_loc,
                self.scanner.source(),
            ));
        }
        let content = self.scanner.slice(start, self.scanner.pos()).to_string();
        if !content.is_empty() {
            let attr_name = if el.tag == "textarea" {
                "value"
            } else {
                "innerHTML"
            };
            el.attrs.push(AstNode::new(
                AstKind::Attribute(Box::new(AttributeNode {
                    name: attr_name.into(),
                    value: AstNode::new(AstKind::StringLiteral(content), content_loc),
                })),
                content_loc,
            ));
        }
        self.consume_closing_tag()
    }

    /// Parse a child list up to the element's closing tag.
    fn parse_jsx_children(
        &mut self,
        el: &mut ElementNode,
        raw: bool,
        elem_loc: Loc,
    ) -> ParseResult<()> {
        if raw {
            // v-raw: children are one opaque text run; no nested markup or
            // expressions are recognized.
            let close_tag = format!("</{}", el.tag);
            let text_loc = self.scanner.loc();
            let start = self.scanner.pos();
            while !self.scanner.is_eof() && !self.scanner.starts_with(&close_tag) {
                self.scanner.advance();
            }
            if self.scanner.is_eof() {
                return Err(ParseError::unterminated_tag(
                    &el.tag,
                    elem_loc,
                    self.scanner.source(),
                ));
            }
            let text = self.scanner.slice(start, self.scanner.pos()).to_string();
            if !text.is_empty() {
                el.children.push(AstNode::new(AstKind::Text(text), text_loc));
            }
            return self.consume_closing_tag();
        }

        loop {
            // Whitespace between sibling tags is insignificant; whitespace
            // adjacent to text or expression children is preserved.
            let run = self.scanner.peek_whitespace_run();
            if run > 0 {
                let after = self.scanner.char_at(run);
                if after.is_none() || after == Some('<') {
                    self.scanner.advance_by(run);
                }
            }

            if self.scanner.is_eof() {
                return Err(ParseError::unterminated_tag(
                    &el.tag,
                    elem_loc,
                    self.scanner.source(),
                ));
            }
            if self.scanner.starts_with("</") {
                break;
            }
            if self.scanner.starts_with(&self.open) {
                let expr = self.parse_jsx_expression()?;
                if let AstKind::Expression(e) = &expr.kind {
                    if !e.body.is_empty() {
                        el.children.push(expr);
                    }
                }
                continue;
            }
            if self.is_tag_start() {
                let node = self.scan_jsx()?;
                self.push_markup(&mut el.children, node)?;
                continue;
            }

            // Text run: up to the next markup, closing tag or delimiter.
            let text_loc = self.scanner.loc();
            let start = self.scanner.pos();
            while !self.scanner.is_eof()
                && !self.scanner.starts_with(&self.open)
                && !self.scanner.starts_with("</")
                && !self.is_tag_start()
            {
                self.scanner.advance();
            }
            let text = self.scanner.slice(start, self.scanner.pos()).to_string();
            if !text.is_empty() {
                el.children.push(AstNode::new(AstKind::Text(text), text_loc));
            }
        }

        self.consume_closing_tag()
    }

    /// Consume a closing tag. The name is consumed syntactically but not
    /// validated against the opening tag.
    fn consume_closing_tag(&mut self) -> ParseResult<()> {
        self.scanner.expect("</")?;
        self.scanner.consume_while(is_tag_name_char);
        self.scanner.skip_whitespace();
        self.scanner.expect(">")
    }

    /// Parse a delimiter-bounded expression.
    fn parse_jsx_expression(&mut self) -> ParseResult<AstNode> {
        let loc = self.scanner.loc();
        let open = self.open.clone();
        self.scanner.expect(&open)?;

        let mut crossed_newline = false;
        loop {
            while let Some(c) = self.scanner.peek() {
                if !c.is_whitespace() {
                    break;
                }
                if c == '\n' {
                    crossed_newline = true;
                }
                self.scanner.advance();
            }
            if self.scanner.starts_with("//") {
                while let Some(c) = self.scanner.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.scanner.advance();
                }
            } else if self.scanner.starts_with("/*") {
                self.scanner.advance_by(2);
                while !self.scanner.is_eof() && !self.scanner.starts_with("*/") {
                    self.scanner.advance();
                }
                self.scanner.consume("*/");
            } else {
                break;
            }
        }

        let unescaped = self.scanner.consume("=");

        // Continuation lines of an embedded script are re-aligned against
        // the first line's indentation column.
        let strip_spaces = if crossed_newline {
            self.scanner.loc().column as usize
        } else {
            0
        };

        let mut braces = 0isize;
        let body = self.parse_nodes(&mut braces, strip_spaces)?;

        if !self.scanner.starts_with(&self.close) {
            return Err(ParseError::unterminated_expression(
                loc,
                self.scanner.source(),
            ));
        }
        let close = self.close.clone();
        self.scanner.expect(&close)?;

        Ok(AstNode::new(
            AstKind::Expression(ExpressionNode { body, unescaped }),
            loc,
        ))
    }

    /// Append a markup node to a node list, splicing conditional branches
    /// into the preceding element's if-chain.
    fn push_markup(&self, nodes: &mut Vec<AstNode>, node: AstNode) -> ParseResult<()> {
        let branch = node.element().map_or(false, |el| {
            el.has_directive(Directive::ElseIf) || el.has_directive(Directive::Else)
        });
        if !branch {
            nodes.push(node);
            return Ok(());
        }

        let loc = node.loc;
        let name = node
            .element()
            .map(|el| {
                if el.has_directive(Directive::ElseIf) {
                    Directive::ElseIf.name()
                } else {
                    Directive::Else.name()
                }
            })
            .unwrap_or_default();

        // The predecessor is the nearest markup sibling; text, comments and
        // script fragments in between are ignored.
        let appended = match nodes.iter_mut().rev().find(|n| n.is_markup()) {
            Some(prev) => append_to_if_chain(prev, node).is_ok(),
            None => false,
        };
        if appended {
            Ok(())
        } else {
            Err(ParseError::missing_if_predecessor(
                name,
                loc,
                self.scanner.source(),
            ))
        }
    }
}

/// Element classification by tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Element,
    Component,
    Block,
    Include,
}

/// Walk to the tail of `node`'s if-chain and attach `branch` there.
///
/// Fails when `node` has no open chain: no conditional directive at all,
/// or a chain already closed by `v-else`.
fn append_to_if_chain(node: &mut AstNode, branch: AstNode) -> Result<(), AstNode> {
    let Some(el) = node.element_mut() else {
        return Err(branch);
    };
    if el.has_directive(Directive::Else) {
        return Err(branch);
    }
    let key = if el.has_directive(Directive::If) {
        Directive::If
    } else if el.has_directive(Directive::ElseIf) {
        Directive::ElseIf
    } else {
        return Err(branch);
    };
    let Some(dir_node) = el.directives.get_mut(&key) else {
        return Err(branch);
    };
    let AstKind::DirectiveIf(chain) = &mut dir_node.kind else {
        return Err(branch);
    };
    match &mut chain.next {
        Some(next) => append_to_if_chain(next, branch),
        slot @ None => {
            *slot = Some(Box::new(branch));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(source: &str) -> ParseResult<Vec<AstNode>> {
        parse(source, &ParserOptions::default())
    }

    #[test]
    fn test_parse_simple_element() {
        let nodes = parse_default("<div>hello</div>").unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0].kind {
            AstKind::Element(el) => {
                assert_eq!(el.tag.as_str(), "div");
                assert!(el.attrs.is_empty());
                assert!(el.directives.is_empty());
                assert_eq!(el.children.len(), 1);
                assert_eq!(el.children[0].kind, AstKind::Text("hello".to_string()));
            }
            other => panic!("Expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_component_and_block() {
        let nodes = parse_default("<Card /><t:layout /><b:body />").unwrap();
        assert!(matches!(nodes[0].kind, AstKind::Component(_)));
        assert!(matches!(nodes[1].kind, AstKind::Include(_)));
        assert!(matches!(nodes[2].kind, AstKind::Block(_)));
    }

    #[test]
    fn test_unknown_directive_prefix() {
        let err = parse_default("<q:thing />").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownDirectivePrefix);
    }

    #[test]
    fn test_if_chain_splice() {
        let nodes = parse_default("<div v-if={a}>A</div><div v-else>B</div>").unwrap();
        // The chain head is the only remaining node.
        assert_eq!(nodes.len(), 1);
        let el = nodes[0].element().unwrap();
        let dir = el.directive(Directive::If).unwrap();
        let AstKind::DirectiveIf(chain) = &dir.kind else {
            panic!("Expected if directive");
        };
        let next = chain.next.as_ref().expect("chain should link to v-else");
        let next_el = next.element().unwrap();
        assert!(next_el.has_directive(Directive::Else));
    }

    #[test]
    fn test_else_without_if_errors() {
        let err = parse_default("<div v-else>B</div>").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingIfPredecessor);
    }

    #[test]
    fn test_else_after_closed_chain_errors() {
        let err = parse_default(
            "<div v-if={a}>A</div><div v-else>B</div><div v-else>C</div>",
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingIfPredecessor);
    }

    #[test]
    fn test_unterminated_expression_reports_open_loc() {
        let err = parse_default("<div>{a + b").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnterminatedExpression);
        assert_eq!(err.loc, Loc::new(1, 5));
    }

    #[test]
    fn test_tag_start_inside_string_is_opaque() {
        let nodes = parse_default("const s = '<div>';").unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0].kind {
            AstKind::JsFragment(js) => assert_eq!(js.code, "const s = '<div>';"),
            other => panic!("Expected script fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_tag_start_inside_comment_is_opaque() {
        let nodes = parse_default("// <div>\nlet x = 1;").unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(matches!(nodes[0].kind, AstKind::JsFragment(_)));
    }

    #[test]
    fn test_import_is_hoisted() {
        let nodes = parse_default("import {Card} from './card';\n<div />").unwrap();
        assert_eq!(nodes.len(), 2);
        match &nodes[0].kind {
            AstKind::Import(code) => assert_eq!(code, "import {Card} from './card';"),
            other => panic!("Expected import, got {:?}", other),
        }
        assert!(matches!(nodes[1].kind, AstKind::Element(_)));
    }

    #[test]
    fn test_spread_attribute() {
        let nodes = parse_default("<div {...rest} id=\"a\" />").unwrap();
        let el = nodes[0].element().unwrap();
        assert_eq!(el.attrs.len(), 2);
        assert!(matches!(el.attrs[0].kind, AstKind::Expression(_)));
    }

    #[test]
    fn test_boolean_attribute_placeholder() {
        let nodes = parse_default("<input disabled />").unwrap();
        let el = nodes[0].element().unwrap();
        let attr = el.attr("disabled").unwrap();
        assert_eq!(attr.value.kind, AstKind::None);
    }

    #[test]
    fn test_key_attribute_sets_keyed() {
        let nodes = parse_default("<li key=\"a\">x</li>").unwrap();
        let el = nodes[0].element().unwrap();
        assert!(el.keyed);
        assert!(el.attr("key").is_some());
    }

    #[test]
    fn test_void_and_self_closing() {
        let nodes = parse_default("<div><br><img src=\"x.png\"></div>").unwrap();
        let el = nodes[0].element().unwrap();
        assert_eq!(el.children.len(), 2);
    }

    #[test]
    fn test_textarea_content_becomes_value() {
        let nodes = parse_default("<textarea>some {text}</textarea>").unwrap();
        let el = nodes[0].element().unwrap();
        let attr = el.attr("value").unwrap();
        assert_eq!(
            attr.value.kind,
            AstKind::StringLiteral("some {text}".to_string())
        );
        assert!(el.children.is_empty());
    }

    #[test]
    fn test_raw_children_are_opaque() {
        let nodes = parse_default("<div v-raw>{a}<span>b</span></div>").unwrap();
        let el = nodes[0].element().unwrap();
        assert_eq!(el.children.len(), 1);
        assert_eq!(
            el.children[0].kind,
            AstKind::Text("{a}<span>b</span>".to_string())
        );
    }

    #[test]
    fn test_whitespace_between_tags_trimmed() {
        let nodes = parse_default("<div>\n  <span>a</span>\n  <span>b</span>\n</div>").unwrap();
        let el = nodes[0].element().unwrap();
        assert_eq!(el.children.len(), 2);
        assert!(el.children.iter().all(|c| c.is_markup()));
    }

    #[test]
    fn test_whitespace_adjacent_to_expression_preserved() {
        let nodes = parse_default("<div><b>a</b> {x}</div>").unwrap();
        let el = nodes[0].element().unwrap();
        assert_eq!(el.children.len(), 3);
        assert_eq!(el.children[1].kind, AstKind::Text(" ".to_string()));
    }

    #[test]
    fn test_unescaped_expression() {
        let nodes = parse_default("<div>{= html}</div>").unwrap();
        let el = nodes[0].element().unwrap();
        match &el.children[0].kind {
            AstKind::Expression(e) => assert!(e.unescaped),
            other => panic!("Expected expression, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_delimiters() {
        let options = ParserOptions::with_delimiters("{{", "}}");
        let nodes = parse("<div>{{ name }}</div>", &options).unwrap();
        let el = nodes[0].element().unwrap();
        assert!(matches!(el.children[0].kind, AstKind::Expression(_)));
    }

    #[test]
    fn test_regex_literal_is_opaque() {
        let nodes = parse_default("const re = /<div>}/g;").unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0].kind {
            AstKind::JsFragment(js) => assert_eq!(js.code, "const re = /<div>}/g;"),
            other => panic!("Expected script fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_division_is_not_regex() {
        let nodes = parse_default("<div>{a / 2}</div>").unwrap();
        let el = nodes[0].element().unwrap();
        match &el.children[0].kind {
            AstKind::Expression(e) => match &e.body[0].kind {
                AstKind::JsFragment(js) => assert_eq!(js.code, "a / 2"),
                other => panic!("Expected script fragment, got {:?}", other),
            },
            other => panic!("Expected expression, got {:?}", other),
        }
    }

    #[test]
    fn test_comment_node() {
        let nodes = parse_default("<div><!-- note --></div>").unwrap();
        let el = nodes[0].element().unwrap();
        assert_eq!(el.children[0].kind, AstKind::Comment(" note ".to_string()));
    }

    #[test]
    fn test_unterminated_comment_errors() {
        let err = parse_default("<div><!-- note </div>").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnterminatedComment);
    }

    #[test]
    fn test_nested_braces_in_expression() {
        let nodes = parse_default("<div>{fn({a: 1})}</div>").unwrap();
        let el = nodes[0].element().unwrap();
        match &el.children[0].kind {
            AstKind::Expression(e) => match &e.body[0].kind {
                AstKind::JsFragment(js) => assert_eq!(js.code, "fn({a: 1})"),
                other => panic!("Expected script fragment, got {:?}", other),
            },
            other => panic!("Expected expression, got {:?}", other),
        }
    }

    #[test]
    fn test_node_locations_point_at_first_character() {
        let nodes = parse_default("<div>\n  {x}\n</div>").unwrap();
        let div = &nodes[0];
        assert_eq!(div.loc, Loc::new(1, 0));
        let el = div.element().unwrap();
        // The whitespace run before the expression is preserved as text
        // and starts right after the opening tag.
        assert_eq!(el.children[0].loc, Loc::new(1, 5));
        assert_eq!(el.children[1].loc, Loc::new(2, 2));
        match &el.children[1].kind {
            AstKind::Expression(e) => assert_eq!(e.body[0].loc, Loc::new(2, 3)),
            other => panic!("Expected expression, got {:?}", other),
        }
    }

    #[test]
    fn test_markup_inside_expression() {
        let nodes = parse_default("<div>{list.map(function(i) return <b>{i}</b>)}</div>").unwrap();
        let el = nodes[0].element().unwrap();
        let AstKind::Expression(e) = &el.children[0].kind else {
            panic!("Expected expression");
        };
        assert!(e.body.iter().any(|n| n.is_markup()));
    }
}
