//! Delegated event bookkeeping.
//!
//! The reconciler registers and unregisters handlers against an
//! [`EventRegistry`] as elements with event props mount, patch and unmount.
//! Dispatch itself (target lookup, bubbling) is the host's concern; the
//! default [`DelegationTable`] just keeps one logical table per event name.

use crate::dom::NodeId;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// An event delivered to a handler.
#[derive(Debug, Clone)]
pub struct Event {
    /// Event name (without the `ev-` prop prefix).
    pub name: SmolStr,
    /// The node the event targets.
    pub target: NodeId,
}

/// A delegated event handler.
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// Event-subscription capability required by the reconciler.
pub trait EventRegistry {
    /// Register a handler for `name` events on `node`, replacing any
    /// previous handler for that pair.
    fn register_delegated_event(&mut self, name: &str, node: NodeId, handler: EventHandler);

    /// Remove the handler for `name` events on `node`, if any.
    fn unregister_delegated_event(&mut self, name: &str, node: NodeId);
}

/// Prop-name prefix marking delegated event subscriptions (`ev-click`).
pub const EVENT_PROP_PREFIX: &str = "ev-";

/// Extract the event name from an event prop name.
pub fn event_prop_name(prop: &str) -> Option<&str> {
    prop.strip_prefix(EVENT_PROP_PREFIX)
}

#[derive(Default)]
struct Tables {
    by_event: FxHashMap<SmolStr, FxHashMap<NodeId, EventHandler>>,
}

/// Default event registry: one handler table per event name, scoped to the
/// runtime context that owns it.
///
/// Clones share the same tables, so a test can keep a handle while the
/// runtime owns another. Add/remove is safe in any traversal order;
/// children unmounting before their parents is the common case.
#[derive(Clone, Default)]
pub struct DelegationTable {
    tables: Rc<RefCell<Tables>>,
}

impl DelegationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the handler registered for an event name on a node.
    pub fn handler(&self, name: &str, node: NodeId) -> Option<EventHandler> {
        self.tables
            .borrow()
            .by_event
            .get(name)
            .and_then(|t| t.get(&node))
            .cloned()
    }

    /// Invoke the handler registered for `name` on `node`, if any.
    /// Returns true when a handler ran.
    pub fn emit(&self, name: &str, node: NodeId) -> bool {
        let handler = self.handler(name, node);
        match handler {
            Some(handler) => {
                handler(&Event {
                    name: name.into(),
                    target: node,
                });
                true
            }
            None => false,
        }
    }

    /// Total number of registered (event, node) pairs.
    pub fn len(&self) -> usize {
        self.tables
            .borrow()
            .by_event
            .values()
            .map(|t| t.len())
            .sum()
    }

    /// Check if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for DelegationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegationTable")
            .field("registered", &self.len())
            .finish()
    }
}

impl EventRegistry for DelegationTable {
    fn register_delegated_event(&mut self, name: &str, node: NodeId, handler: EventHandler) {
        self.tables
            .borrow_mut()
            .by_event
            .entry(name.into())
            .or_default()
            .insert(node, handler);
    }

    fn unregister_delegated_event(&mut self, name: &str, node: NodeId) {
        let mut tables = self.tables.borrow_mut();
        if let Some(table) = tables.by_event.get_mut(name) {
            table.remove(&node);
            if table.is_empty() {
                tables.by_event.remove(name);
            }
        }
    }
}
