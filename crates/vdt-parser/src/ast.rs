//! AST types for vdt templates.

use indexmap::IndexMap;
use smol_str::SmolStr;
use source_span::Loc;

/// A node in the template AST.
///
/// Every node records the location of the first character of its syntax in
/// the original source, for error reporting and source mapping by the code
/// generator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AstNode {
    /// The node payload, one variant per node kind.
    pub kind: AstKind,
    /// Source location of the node's first character.
    pub loc: Loc,
}

impl AstNode {
    /// Create a new node.
    pub fn new(kind: AstKind, loc: Loc) -> Self {
        Self { kind, loc }
    }

    /// Get the element payload if this is any markup node.
    pub fn element(&self) -> Option<&ElementNode> {
        match &self.kind {
            AstKind::Element(el)
            | AstKind::Component(el)
            | AstKind::Block(el)
            | AstKind::Include(el) => Some(el),
            _ => None,
        }
    }

    /// Get the element payload mutably if this is any markup node.
    pub fn element_mut(&mut self) -> Option<&mut ElementNode> {
        match &mut self.kind {
            AstKind::Element(el)
            | AstKind::Component(el)
            | AstKind::Block(el)
            | AstKind::Include(el) => Some(el),
            _ => None,
        }
    }

    /// Check if this is a markup node (element, component, block or include).
    pub fn is_markup(&self) -> bool {
        self.element().is_some()
    }
}

/// The tagged union of template node kinds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AstKind {
    /// A raw script fragment, passed through to the generated render code.
    JsFragment(JsFragment),
    /// A hoisted `import` statement, collected for placement before the
    /// generated render code.
    Import(String),
    /// A plain element (`<div>`).
    Element(Box<ElementNode>),
    /// A component (tag starting with an uppercase letter).
    Component(Box<ElementNode>),
    /// A block directive (`<b:name>`).
    Block(Box<ElementNode>),
    /// A template include directive (`<t:name>`).
    Include(Box<ElementNode>),
    /// An HTML comment, captured verbatim.
    Comment(String),
    /// A text run.
    Text(String),
    /// An attribute with its value node.
    Attribute(Box<AttributeNode>),
    /// A string literal attribute value.
    StringLiteral(String),
    /// A delimiter-bounded expression.
    Expression(ExpressionNode),
    /// The value of a conditional directive, linking to the next branch.
    DirectiveIf(Box<DirectiveIfNode>),
    /// Placeholder for a value-less (boolean true) attribute.
    None,
}

/// A raw script fragment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JsFragment {
    /// The script text, with the caller's base indentation stripped from
    /// each line.
    pub code: String,
    /// Leading spaces beyond the stripped base indentation, for call sites
    /// that re-indent the fragment relative to generated code.
    pub spaces: usize,
}

/// An element, component, block or include node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementNode {
    /// The tag name as written (including any `t:`/`b:` prefix).
    pub tag: SmolStr,
    /// Ordered attribute nodes. Holds `Attribute` nodes, plus bare
    /// `Expression` nodes for spread attributes.
    pub attrs: Vec<AstNode>,
    /// Directives routed out of the attribute list, keyed by name.
    pub directives: IndexMap<Directive, AstNode>,
    /// Child nodes. Conditional branches are spliced out of this list and
    /// reachable only through the chain head's `if` directive.
    pub children: Vec<AstNode>,
    /// True iff any `key` attribute is present on this element.
    pub keyed: bool,
}

impl ElementNode {
    /// Create an empty element with the given tag.
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            directives: IndexMap::new(),
            children: Vec::new(),
            keyed: false,
        }
    }

    /// Check if this element has a specific directive.
    pub fn has_directive(&self, directive: Directive) -> bool {
        self.directives.contains_key(&directive)
    }

    /// Get a directive's value node.
    pub fn directive(&self, directive: Directive) -> Option<&AstNode> {
        self.directives.get(&directive)
    }

    /// Find an attribute node by name.
    pub fn attr(&self, name: &str) -> Option<&AttributeNode> {
        self.attrs.iter().find_map(|node| match &node.kind {
            AstKind::Attribute(attr) if attr.name == name => Some(attr.as_ref()),
            _ => None,
        })
    }
}

/// An attribute and its value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeNode {
    /// Attribute name.
    pub name: SmolStr,
    /// Value node: `StringLiteral`, `Expression`, or `None` for a bare
    /// boolean attribute.
    pub value: AstNode,
}

/// A delimiter-bounded expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpressionNode {
    /// The expression body: script fragments interleaved with nested markup.
    pub body: Vec<AstNode>,
    /// True when the expression opened with `=`, opting out of
    /// auto-escaping in the generated code.
    pub unescaped: bool,
}

/// The value of a conditional directive.
///
/// `next` links an `if` node to its trailing `else-if`/`else` siblings,
/// which the parser splices out of the child list. The chain is strictly
/// forward-linked: each `next` is set at most once, from a node not yet in
/// the chain, so no cycle can form.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectiveIfNode {
    /// The condition expression. `None` kind for a bare `v-else`.
    pub condition: AstNode,
    /// The next branch element in the chain, if any.
    pub next: Option<Box<AstNode>>,
}

/// The closed set of recognized directive attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Directive {
    /// `v-if`
    If,
    /// `v-else-if`
    ElseIf,
    /// `v-else`
    Else,
    /// `v-for`
    For,
    /// `v-for-value`
    ForValue,
    /// `v-for-key`
    ForKey,
    /// `v-model`
    Model,
    /// `v-raw`: treat children as opaque text.
    Raw,
}

impl Directive {
    /// Map an attribute name to a directive, if it is one.
    pub fn from_attr_name(name: &str) -> Option<Self> {
        match name {
            "v-if" => Some(Self::If),
            "v-else-if" => Some(Self::ElseIf),
            "v-else" => Some(Self::Else),
            "v-for" => Some(Self::For),
            "v-for-value" => Some(Self::ForValue),
            "v-for-key" => Some(Self::ForKey),
            "v-model" => Some(Self::Model),
            "v-raw" => Some(Self::Raw),
            _ => None,
        }
    }

    /// The attribute name this directive is written as.
    pub fn name(&self) -> &'static str {
        match self {
            Self::If => "v-if",
            Self::ElseIf => "v-else-if",
            Self::Else => "v-else",
            Self::For => "v-for",
            Self::ForValue => "v-for-value",
            Self::ForKey => "v-for-key",
            Self::Model => "v-model",
            Self::Raw => "v-raw",
        }
    }

    /// Check if this directive is a branch of a conditional chain.
    pub fn is_conditional(&self) -> bool {
        matches!(self, Self::If | Self::ElseIf | Self::Else)
    }
}
