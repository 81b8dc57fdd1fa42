//! The virtual node model.
//!
//! A `VNode` is an immutable-per-render descriptor of one DOM node,
//! component or fragment, produced fresh on every render pass. The only
//! in-place mutation a previous-tree node ever receives is its DOM handle
//! at mount; ownership of that handle transfers to the next tree during
//! patch. Node kinds are a sum type with explicit capability predicates
//! rather than bit tests, so matches stay exhaustive.

use indexmap::IndexMap;
use smol_str::SmolStr;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::component::{ComponentSpec, InstanceHandle};
use crate::dom::NodeId;
use crate::events::EventHandler;
use crate::normalize::{normalize_children, ChildInput};

/// A key-unique, order-preserving prop bag. Prop diffing is
/// order-independent by key; insertion order only affects initial
/// attribute write order.
pub type Props = IndexMap<SmolStr, PropValue>;

/// A prop value.
#[derive(Clone)]
pub enum PropValue {
    /// Boolean attribute; false means absent.
    Bool(bool),
    /// Numeric attribute.
    Num(f64),
    /// String attribute.
    Str(String),
    /// Delegated event handler; the prop name carries the `ev-` prefix.
    Event(EventHandler),
}

impl PropValue {
    /// Render the value as an attribute string, or None when the prop does
    /// not materialize as an attribute.
    pub fn as_attribute(&self) -> Option<String> {
        match self {
            PropValue::Bool(true) => Some(String::new()),
            PropValue::Bool(false) => None,
            PropValue::Num(n) => Some(n.to_string()),
            PropValue::Str(s) => Some(s.clone()),
            PropValue::Event(_) => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Num(a), PropValue::Num(b)) => a == b,
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            // Handlers have no structural identity.
            (PropValue::Event(a), PropValue::Event(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(b) => write!(f, "Bool({})", b),
            PropValue::Num(n) => write!(f, "Num({})", n),
            PropValue::Str(s) => write!(f, "Str({:?})", s),
            PropValue::Event(_) => write!(f, "Event(..)"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Num(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

/// A sibling key used to match old/new entries across reorders.
///
/// `Pos` keys are the positional fallback assigned by the normalizer when a
/// keyed list has siblings without explicit keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Explicit string key.
    Str(SmolStr),
    /// Explicit integer key.
    Num(i64),
    /// Positional fallback key.
    Pos(usize),
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.into())
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Num(value)
    }
}

/// What a ref exposes once its owner is mounted.
#[derive(Clone)]
pub enum RefTarget {
    /// The mounted DOM node.
    Dom(NodeId),
    /// The component instance.
    Component(InstanceHandle),
}

/// A ref: exposes the mounted DOM node or component instance to the owner.
#[derive(Clone)]
pub enum Ref {
    /// Invoked with Some on mount and None on unmount.
    Callback(Rc<dyn Fn(Option<RefTarget>)>),
    /// Ref object filled on mount and cleared on unmount.
    Object(Rc<RefCell<Option<RefTarget>>>),
}

impl Ref {
    /// Create a callback ref.
    pub fn callback(f: impl Fn(Option<RefTarget>) + 'static) -> Self {
        Ref::Callback(Rc::new(f))
    }

    /// Create an empty ref object.
    pub fn object() -> Self {
        Ref::Object(Rc::new(RefCell::new(None)))
    }

    /// Deliver a target to the ref.
    pub(crate) fn attach(&self, target: Option<RefTarget>) {
        match self {
            Ref::Callback(f) => f(target),
            Ref::Object(slot) => *slot.borrow_mut() = target,
        }
    }

    /// Identity comparison; refs have no structural equality.
    pub(crate) fn same(&self, other: &Ref) -> bool {
        match (self, other) {
            (Ref::Callback(a), Ref::Callback(b)) => Rc::ptr_eq(a, b),
            (Ref::Object(a), Ref::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ref::Callback(_) => write!(f, "Ref::Callback"),
            Ref::Object(_) => write!(f, "Ref::Object"),
        }
    }
}

/// Canonical children representation, classified by shape.
#[derive(Debug, Clone, Default)]
pub enum Children {
    /// No children.
    #[default]
    None,
    /// A single text child, stored inline for the fast path.
    Text(String),
    /// Exactly one non-text child.
    Single(Box<VNode>),
    /// Multiple children, matched positionally.
    NonKeyed(Vec<VNode>),
    /// Multiple children, every one carrying a key.
    Keyed(Vec<VNode>),
}

impl Children {
    /// Check for the None shape.
    pub fn is_none(&self) -> bool {
        matches!(self, Children::None)
    }

    /// The child nodes as a slice, when the shape holds nodes.
    pub fn nodes(&self) -> &[VNode] {
        match self {
            Children::Single(node) => std::slice::from_ref(node),
            Children::NonKeyed(nodes) | Children::Keyed(nodes) => nodes,
            _ => &[],
        }
    }
}

/// Element capability flags, computed from the tag name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementFlags {
    /// `<input>`
    pub input: bool,
    /// `<select>`
    pub select: bool,
    /// `<textarea>`
    pub textarea: bool,
    /// SVG namespace element.
    pub svg: bool,
    /// Void element; never has children.
    pub void: bool,
    /// Text children are written without escaping.
    pub unescape_text: bool,
}

impl ElementFlags {
    /// Compute flags for a tag name.
    pub fn for_tag(tag: &str) -> Self {
        Self {
            input: tag == "input",
            select: tag == "select",
            textarea: tag == "textarea",
            svg: tag == "svg",
            void: matches!(
                tag,
                "area"
                    | "base"
                    | "br"
                    | "col"
                    | "embed"
                    | "hr"
                    | "img"
                    | "input"
                    | "link"
                    | "meta"
                    | "param"
                    | "source"
                    | "track"
                    | "wbr"
            ),
            unescape_text: false,
        }
    }

    /// Check if this is some kind of form control.
    pub fn is_form_control(&self) -> bool {
        self.input || self.select || self.textarea
    }
}

/// Payload of an element node.
#[derive(Debug, Clone)]
pub struct ElementVNode {
    /// Tag name.
    pub tag: SmolStr,
    /// Capability flags for the tag.
    pub flags: ElementFlags,
    /// Class attribute, kept out of the prop bag for the fast path.
    pub class_name: Option<String>,
    /// Prop bag.
    pub props: Props,
    /// Children.
    pub children: Children,
}

/// Payload of a component node.
#[derive(Clone)]
pub struct ComponentVNode {
    /// The component constructor; identity decides kind equality.
    pub spec: ComponentSpec,
    /// Props passed by the owner.
    pub props: Props,
    /// Children passed by the owner; the component reads them through its
    /// vnode rather than re-invoking the normalizer.
    pub children: Children,
    /// The persistent instance, set at mount and carried across patches.
    pub instance: Option<InstanceHandle>,
}

impl fmt::Debug for ComponentVNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentVNode")
            .field("spec", &self.spec.name())
            .field("props", &self.props)
            .finish()
    }
}

/// Payload of a fragment node.
///
/// A fragment mounts its children directly into the parent. Its trailing
/// anchor comment marks the end of the fragment's segment so sibling-level
/// moves and child-list growth stay position-correct.
#[derive(Debug, Clone)]
pub struct FragmentVNode {
    /// Children.
    pub children: Children,
    /// Trailing anchor comment node, created at mount.
    pub anchor: Option<NodeId>,
}

/// The node kind sum type.
#[derive(Debug, Clone)]
pub enum VNodeKind {
    /// A text node.
    Text(String),
    /// A common element.
    Element(Box<ElementVNode>),
    /// A stateful component.
    Component(Box<ComponentVNode>),
    /// A fragment: children without a wrapper element.
    Fragment(Box<FragmentVNode>),
}

/// A virtual node.
#[derive(Debug, Clone)]
pub struct VNode {
    /// The node payload.
    pub kind: VNodeKind,
    /// Sibling key, unique among siblings when diffing with keys.
    pub key: Option<Key>,
    /// Ref delivered after mount.
    pub node_ref: Option<Ref>,
    /// The resolved DOM handle; None until mounted. For components this is
    /// a snapshot — the instance's current root is authoritative.
    pub dom: Option<NodeId>,
}

impl VNode {
    fn new(kind: VNodeKind) -> Self {
        Self {
            kind,
            key: None,
            node_ref: None,
            dom: None,
        }
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(VNodeKind::Text(content.into()))
    }

    /// Create an element with no props or children.
    pub fn element(tag: impl Into<SmolStr>) -> Self {
        let tag = tag.into();
        let flags = ElementFlags::for_tag(&tag);
        Self::new(VNodeKind::Element(Box::new(ElementVNode {
            tag,
            flags,
            class_name: None,
            props: Props::new(),
            children: Children::None,
        })))
    }

    /// Create a component node.
    pub fn component(spec: ComponentSpec) -> Self {
        Self::new(VNodeKind::Component(Box::new(ComponentVNode {
            spec,
            props: Props::new(),
            children: Children::None,
            instance: None,
        })))
    }

    /// Create a fragment from arbitrary children input.
    pub fn fragment(children: impl Into<ChildInput>) -> Self {
        let children = match normalize_children(children.into()) {
            // Fragments have no container of their own; a text fast path
            // would clobber sibling nodes.
            Children::Text(text) => Children::Single(Box::new(VNode::text(text))),
            other => other,
        };
        Self::new(VNodeKind::Fragment(Box::new(FragmentVNode {
            children,
            anchor: None,
        })))
    }

    /// Set the sibling key.
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the ref.
    pub fn with_ref(mut self, node_ref: Ref) -> Self {
        self.node_ref = Some(node_ref);
        self
    }

    /// Set the class name (elements only).
    pub fn class_name(mut self, class: impl Into<String>) -> Self {
        if let VNodeKind::Element(el) = &mut self.kind {
            el.class_name = Some(class.into());
        }
        self
    }

    /// Add one prop (elements and components).
    pub fn prop(mut self, name: impl Into<SmolStr>, value: impl Into<PropValue>) -> Self {
        match &mut self.kind {
            VNodeKind::Element(el) => {
                el.props.insert(name.into(), value.into());
            }
            VNodeKind::Component(c) => {
                c.props.insert(name.into(), value.into());
            }
            _ => {}
        }
        self
    }

    /// Replace the whole prop bag (elements and components).
    pub fn props(mut self, props: Props) -> Self {
        match &mut self.kind {
            VNodeKind::Element(el) => el.props = props,
            VNodeKind::Component(c) => c.props = props,
            _ => {}
        }
        self
    }

    /// Set children from arbitrary input, normalized to canonical shape.
    pub fn children(mut self, children: impl Into<ChildInput>) -> Self {
        let normalized = normalize_children(children.into());
        match &mut self.kind {
            VNodeKind::Element(el) => el.children = normalized,
            VNodeKind::Component(c) => c.children = normalized,
            VNodeKind::Fragment(f) => {
                f.children = match normalized {
                    Children::Text(text) => Children::Single(Box::new(VNode::text(text))),
                    other => other,
                }
            }
            VNodeKind::Text(_) => {}
        }
        self
    }

    /// Check if this node is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, VNodeKind::Text(_))
    }

    /// Check if this node is some kind of element.
    pub fn is_element(&self) -> bool {
        matches!(self.kind, VNodeKind::Element(_))
    }

    /// Check if this node is a component.
    pub fn is_component(&self) -> bool {
        matches!(self.kind, VNodeKind::Component(_))
    }

    /// Check if this node is a fragment.
    pub fn is_fragment(&self) -> bool {
        matches!(self.kind, VNodeKind::Fragment(_))
    }

    /// Check whether two nodes are of the same fundamental kind, so that
    /// patch may diff them instead of replacing.
    pub fn same_kind(&self, other: &VNode) -> bool {
        match (&self.kind, &other.kind) {
            (VNodeKind::Text(_), VNodeKind::Text(_)) => true,
            (VNodeKind::Element(a), VNodeKind::Element(b)) => a.tag == b.tag,
            (VNodeKind::Fragment(_), VNodeKind::Fragment(_)) => true,
            (VNodeKind::Component(a), VNodeKind::Component(b)) => a.spec.same(&b.spec),
            _ => false,
        }
    }

    /// The first real DOM node rendered for this vnode, used for anchoring.
    ///
    /// For components the persistent instance is authoritative (its root
    /// may have been replaced after a deferred init); for fragments it is
    /// the first child, falling back to the trailing anchor.
    pub fn first_dom(&self) -> Option<NodeId> {
        match &self.kind {
            VNodeKind::Text(_) | VNodeKind::Element(_) => self.dom,
            VNodeKind::Component(c) => match &c.instance {
                Some(instance) => instance.current_dom(),
                None => self.dom,
            },
            VNodeKind::Fragment(f) => f
                .children
                .nodes()
                .first()
                .and_then(|child| child.first_dom())
                .or(f.anchor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_flags() {
        assert!(ElementFlags::for_tag("input").input);
        assert!(ElementFlags::for_tag("input").void);
        assert!(ElementFlags::for_tag("select").is_form_control());
        assert!(ElementFlags::for_tag("svg").svg);
        assert!(!ElementFlags::for_tag("div").void);
    }

    #[test]
    fn test_same_kind() {
        let div = VNode::element("div");
        let div2 = VNode::element("div");
        let span = VNode::element("span");
        let text = VNode::text("x");
        assert!(div.same_kind(&div2));
        assert!(!div.same_kind(&span));
        assert!(!div.same_kind(&text));
        assert!(VNode::fragment(()).same_kind(&VNode::fragment(())));
    }

    #[test]
    fn test_prop_value_eq() {
        assert_eq!(PropValue::from("a"), PropValue::from("a"));
        assert_ne!(PropValue::from("a"), PropValue::from("b"));
        let h: EventHandler = Rc::new(|_| {});
        assert_eq!(PropValue::Event(h.clone()), PropValue::Event(h.clone()));
        let other: EventHandler = Rc::new(|_| {});
        assert_ne!(PropValue::Event(h), PropValue::Event(other));
    }

    #[test]
    fn test_fragment_never_uses_text_shape() {
        let fragment = VNode::fragment("hello");
        let VNodeKind::Fragment(f) = &fragment.kind else {
            panic!("Expected fragment");
        };
        assert!(matches!(f.children, Children::Single(_)));
    }
}
