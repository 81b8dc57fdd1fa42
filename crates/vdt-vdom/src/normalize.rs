//! Children normalization.
//!
//! Render code hands the reconciler loosely shaped children: nested
//! sequences, booleans and unit as "render nothing" placeholders, plain
//! strings and numbers as implicit text, and VNode values. This pass
//! flattens that input into the canonical [`Children`] shape the mount and
//! patch paths dispatch on.

use crate::vnode::{Children, Key, VNode, VNodeKind};

/// Loosely shaped children input accepted by VNode constructors.
#[derive(Debug, Clone)]
pub enum ChildInput {
    /// A ready VNode.
    Node(VNode),
    /// Implicit text.
    Text(String),
    /// Implicit text from a number.
    Num(f64),
    /// Render nothing; keeps `cond && node`-style expressions cheap.
    Bool(bool),
    /// Render nothing.
    Null,
    /// A nested sequence.
    List(Vec<ChildInput>),
}

impl From<VNode> for ChildInput {
    fn from(node: VNode) -> Self {
        ChildInput::Node(node)
    }
}

impl From<&str> for ChildInput {
    fn from(text: &str) -> Self {
        ChildInput::Text(text.to_string())
    }
}

impl From<String> for ChildInput {
    fn from(text: String) -> Self {
        ChildInput::Text(text)
    }
}

impl From<f64> for ChildInput {
    fn from(value: f64) -> Self {
        ChildInput::Num(value)
    }
}

impl From<bool> for ChildInput {
    fn from(value: bool) -> Self {
        ChildInput::Bool(value)
    }
}

impl From<()> for ChildInput {
    fn from(_: ()) -> Self {
        ChildInput::Null
    }
}

impl<T: Into<ChildInput>> From<Vec<T>> for ChildInput {
    fn from(items: Vec<T>) -> Self {
        ChildInput::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ChildInput>> From<Option<T>> for ChildInput {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => ChildInput::Null,
        }
    }
}

/// Flatten arbitrarily nested children input into the canonical shape.
///
/// Classification scans the flattened list: if any node carries a key the
/// list is keyed, and every sibling must carry one — missing keys get a
/// positional fallback and a development-time warning. Without any key the
/// list is matched positionally.
pub fn normalize_children(input: ChildInput) -> Children {
    let mut flat = Vec::new();
    flatten_into(input, &mut flat);

    match flat.len() {
        0 => Children::None,
        1 => {
            let node = flat.remove(0);
            let plain_text =
                node.is_text() && node.key.is_none() && node.node_ref.is_none();
            if plain_text {
                match node.kind {
                    VNodeKind::Text(text) => Children::Text(text),
                    _ => unreachable!(),
                }
            } else {
                Children::Single(Box::new(node))
            }
        }
        _ => {
            if flat.iter().any(|n| n.key.is_some()) {
                let mut missing = 0usize;
                for (index, node) in flat.iter_mut().enumerate() {
                    if node.key.is_none() {
                        node.key = Some(Key::Pos(index));
                        missing += 1;
                    }
                }
                if missing > 0 {
                    tracing::warn!(
                        missing,
                        "keyed children mixed with unkeyed siblings; \
                         falling back to positional keys"
                    );
                }
                Children::Keyed(flat)
            } else {
                Children::NonKeyed(flat)
            }
        }
    }
}

fn flatten_into(input: ChildInput, out: &mut Vec<VNode>) {
    match input {
        ChildInput::List(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        ChildInput::Node(node) => out.push(node),
        ChildInput::Text(text) => out.push(VNode::text(text)),
        ChildInput::Num(value) => out.push(VNode::text(value.to_string())),
        ChildInput::Bool(_) | ChildInput::Null => {}
    }
}
