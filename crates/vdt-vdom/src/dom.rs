//! DOM environment as a capability interface.
//!
//! The reconciler never talks to a concrete document; it drives any
//! implementation of [`Dom`] through opaque [`NodeId`] handles. `MemoryDom`
//! is the in-crate headless implementation used by tests and non-browser
//! embeddings.

use indexmap::IndexMap;
use smol_str::SmolStr;
use std::cell::RefCell;
use std::rc::Rc;

/// The SVG namespace passed to [`Dom::create_element_ns`].
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// An opaque handle to a node owned by the DOM environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Tree-mutation capability required by the reconciler.
pub trait Dom {
    /// Create a detached element node.
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Create a detached element node in a namespace.
    fn create_element_ns(&mut self, tag: &str, ns: &str) -> NodeId;

    /// Create a detached text node.
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Create a detached comment node.
    fn create_comment(&mut self, text: &str) -> NodeId;

    /// Insert `node` into `parent` before `anchor`, or append when `anchor`
    /// is None. A node already attached elsewhere is moved.
    fn insert_before(&mut self, parent: NodeId, node: NodeId, anchor: Option<NodeId>);

    /// Remove `node` from `parent`.
    fn remove_child(&mut self, parent: NodeId, node: NodeId);

    /// Set an attribute.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Remove an attribute.
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Assign text content. On an element this replaces all children; on a
    /// text node it replaces the node's data. An empty string leaves an
    /// element with no children.
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Get a node's parent.
    fn parent(&self, node: NodeId) -> Option<NodeId>;
}

/// A node in the in-memory DOM.
#[derive(Debug, Clone)]
pub struct MemoryNode {
    /// The node payload.
    pub kind: MemoryNodeKind,
    /// Parent handle, if attached.
    pub parent: Option<NodeId>,
    /// Child handles in document order.
    pub children: Vec<NodeId>,
    /// Attributes, in insertion order.
    pub attributes: IndexMap<SmolStr, String>,
}

/// Node payload kinds.
#[derive(Debug, Clone)]
pub enum MemoryNodeKind {
    /// An element with a tag name.
    Element { tag: SmolStr },
    /// A text node.
    Text(String),
    /// A comment node.
    Comment(String),
}

/// Mutation counters, used by tests to bound reconciler work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomStats {
    /// Nodes created.
    pub created: usize,
    /// Insertions of nodes that were already attached (moves).
    pub moved: usize,
    /// Nodes removed.
    pub removed: usize,
}

#[derive(Debug, Default)]
struct Arena {
    nodes: Vec<MemoryNode>,
    stats: DomStats,
}

/// Headless in-memory DOM.
///
/// Cheap to clone: clones share the same arena, so a test can keep a handle
/// while the runtime owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryDom {
    arena: Rc<RefCell<Arena>>,
}

impl MemoryDom {
    /// Create an empty DOM.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached container element to mount into.
    pub fn create_root(&self) -> NodeId {
        self.alloc(MemoryNodeKind::Element { tag: "root".into() })
    }

    fn alloc(&self, kind: MemoryNodeKind) -> NodeId {
        let mut arena = self.arena.borrow_mut();
        arena.stats.created += 1;
        arena.nodes.push(MemoryNode {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: IndexMap::new(),
        });
        NodeId(arena.nodes.len() - 1)
    }

    /// Child handles of a node.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.arena.borrow().nodes[node.0].children.clone()
    }

    /// Tag name, for element nodes.
    pub fn tag(&self, node: NodeId) -> Option<SmolStr> {
        match &self.arena.borrow().nodes[node.0].kind {
            MemoryNodeKind::Element { tag } => Some(tag.clone()),
            _ => None,
        }
    }

    /// Attribute value.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.arena.borrow().nodes[node.0].attributes.get(name).cloned()
    }

    /// Mutation counters since the last reset.
    pub fn stats(&self) -> DomStats {
        self.arena.borrow().stats
    }

    /// Reset the mutation counters.
    pub fn reset_stats(&self) {
        self.arena.borrow_mut().stats = DomStats::default();
    }

    /// Serialize a subtree to HTML-ish text, for assertions.
    pub fn to_html(&self, node: NodeId) -> String {
        let arena = self.arena.borrow();
        let mut out = String::new();
        write_node(&arena, node, &mut out);
        out
    }

    /// Serialize only the children of a node.
    pub fn inner_html(&self, node: NodeId) -> String {
        let arena = self.arena.borrow();
        let mut out = String::new();
        for &child in &arena.nodes[node.0].children {
            write_node(&arena, child, &mut out);
        }
        out
    }

    fn detach(arena: &mut Arena, node: NodeId) {
        if let Some(parent) = arena.nodes[node.0].parent.take() {
            arena.nodes[parent.0].children.retain(|&c| c != node);
        }
    }
}

fn write_node(arena: &Arena, node: NodeId, out: &mut String) {
    let n = &arena.nodes[node.0];
    match &n.kind {
        MemoryNodeKind::Element { tag } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in &n.attributes {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(value);
                    out.push('"');
                }
            }
            out.push('>');
            for &child in &n.children {
                write_node(arena, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        MemoryNodeKind::Text(text) => out.push_str(text),
        MemoryNodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

impl Dom for MemoryDom {
    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(MemoryNodeKind::Element { tag: tag.into() })
    }

    fn create_element_ns(&mut self, tag: &str, _ns: &str) -> NodeId {
        // The in-memory tree does not distinguish namespaces.
        self.alloc(MemoryNodeKind::Element { tag: tag.into() })
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(MemoryNodeKind::Text(text.to_string()))
    }

    fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(MemoryNodeKind::Comment(text.to_string()))
    }

    fn insert_before(&mut self, parent: NodeId, node: NodeId, anchor: Option<NodeId>) {
        let mut arena = self.arena.borrow_mut();
        if arena.nodes[node.0].parent.is_some() {
            arena.stats.moved += 1;
        }
        MemoryDom::detach(&mut arena, node);
        let position = match anchor {
            Some(anchor) => arena.nodes[parent.0]
                .children
                .iter()
                .position(|&c| c == anchor)
                .unwrap_or(arena.nodes[parent.0].children.len()),
            None => arena.nodes[parent.0].children.len(),
        };
        arena.nodes[parent.0].children.insert(position, node);
        arena.nodes[node.0].parent = Some(parent);
    }

    fn remove_child(&mut self, parent: NodeId, node: NodeId) {
        let mut arena = self.arena.borrow_mut();
        if arena.nodes[node.0].parent == Some(parent) {
            MemoryDom::detach(&mut arena, node);
            arena.stats.removed += 1;
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.arena.borrow_mut().nodes[node.0]
            .attributes
            .insert(name.into(), value.to_string());
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.arena.borrow_mut().nodes[node.0]
            .attributes
            .shift_remove(name);
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        let is_text = {
            let arena = self.arena.borrow();
            matches!(arena.nodes[node.0].kind, MemoryNodeKind::Text(_))
        };
        if is_text {
            let mut arena = self.arena.borrow_mut();
            arena.nodes[node.0].kind = MemoryNodeKind::Text(text.to_string());
            return;
        }
        // Element: textContent assignment replaces all children. An empty
        // string leaves no child at all.
        let children: Vec<NodeId> = {
            let arena = self.arena.borrow();
            arena.nodes[node.0].children.clone()
        };
        {
            let mut arena = self.arena.borrow_mut();
            for child in children {
                arena.nodes[child.0].parent = None;
            }
            arena.nodes[node.0].children.clear();
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            let mut arena = self.arena.borrow_mut();
            arena.nodes[node.0].children.push(text_node);
            arena.nodes[text_node.0].parent = Some(node);
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.borrow().nodes[node.0].parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_and_serialize() {
        let mut dom = MemoryDom::new();
        let root = dom.create_root();
        let div = dom.create_element("div");
        dom.set_attribute(div, "class", "app");
        let text = dom.create_text("hi");
        dom.insert_before(div, text, None);
        dom.insert_before(root, div, None);
        assert_eq!(dom.inner_html(root), "<div class=\"app\">hi</div>");
    }

    #[test]
    fn test_insert_before_moves_attached_node() {
        let mut dom = MemoryDom::new();
        let root = dom.create_root();
        let a = dom.create_text("a");
        let b = dom.create_text("b");
        dom.insert_before(root, a, None);
        dom.insert_before(root, b, None);
        assert_eq!(dom.inner_html(root), "ab");
        dom.reset_stats();
        dom.insert_before(root, b, Some(a));
        assert_eq!(dom.inner_html(root), "ba");
        assert_eq!(dom.stats().moved, 1);
        assert_eq!(dom.stats().created, 0);
    }

    #[test]
    fn test_set_text_on_element_replaces_children() {
        let mut dom = MemoryDom::new();
        let root = dom.create_root();
        let span = dom.create_element("span");
        dom.insert_before(root, span, None);
        let inner = dom.create_text("x");
        dom.insert_before(span, inner, None);
        dom.set_text(span, "y");
        assert_eq!(dom.inner_html(root), "<span>y</span>");
        dom.set_text(span, "");
        assert_eq!(dom.children(span).len(), 0);
    }

    #[test]
    fn test_remove_child() {
        let mut dom = MemoryDom::new();
        let root = dom.create_root();
        let div = dom.create_element("div");
        dom.insert_before(root, div, None);
        dom.remove_child(root, div);
        assert_eq!(dom.children(root).len(), 0);
        assert_eq!(dom.parent(div), None);
    }
}
