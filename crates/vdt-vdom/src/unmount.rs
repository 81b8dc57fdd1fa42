//! Teardown: release refs, unregister delegated events, run component
//! teardown lifecycle, and remove DOM nodes.

use crate::component::{InstanceHandle, LifecycleState};
use crate::dom::NodeId;
use crate::events::event_prop_name;
use crate::runtime::{Runtime, RuntimeInner};
use crate::vnode::{PropValue, VNode, VNodeKind};

/// Tear down a mounted vnode tree and remove its DOM from `parent`.
pub(crate) fn unmount(rt: &Runtime, inner: &mut RuntimeInner, vnode: &VNode, parent: NodeId) {
    teardown(rt, inner, vnode);
    remove_dom(inner, vnode, parent);
}

/// Recursive cleanup without DOM removal: refs release, delegated events
/// unregister, component lifecycles run. Children are processed before
/// their parents.
fn teardown(rt: &Runtime, inner: &mut RuntimeInner, vnode: &VNode) {
    match &vnode.kind {
        VNodeKind::Text(_) => {}
        VNodeKind::Element(el) => {
            for child in el.children.nodes() {
                teardown(rt, inner, child);
            }
            if let Some(id) = vnode.dom {
                for (name, value) in &el.props {
                    if let Some(event) = event_prop_name(name) {
                        if matches!(value, PropValue::Event(_)) {
                            inner.events.unregister_delegated_event(event, id);
                        }
                    }
                }
            }
        }
        VNodeKind::Fragment(f) => {
            for child in f.children.nodes() {
                teardown(rt, inner, child);
            }
        }
        VNodeKind::Component(c) => {
            if let Some(handle) = &c.instance {
                teardown_component(rt, inner, handle);
            }
        }
    }
    if let Some(node_ref) = &vnode.node_ref {
        node_ref.attach(None);
    }
}

fn teardown_component(rt: &Runtime, inner: &mut RuntimeInner, handle: &InstanceHandle) {
    if !handle.is_alive() {
        return;
    }
    handle.borrow_mut().component.before_unmount();
    handle.borrow_mut().alive = false;
    {
        // The rendered subtree stays in the instance so DOM removal can
        // still find it; only its bookkeeping is released here.
        let instance = handle.borrow();
        if let Some(input) = &instance.last_input {
            teardown(rt, inner, input);
        }
    }
    let mut instance = handle.borrow_mut();
    instance.watchers.clear();
    instance.queued_notifications.clear();
    instance.state = LifecycleState::Unmounted;
    instance.component.unmounted();
}

/// Remove the DOM nodes a vnode contributed to `parent`. Nested elements
/// go away with their root; only list-level roots are removed explicitly.
fn remove_dom(inner: &mut RuntimeInner, vnode: &VNode, parent: NodeId) {
    match &vnode.kind {
        VNodeKind::Text(_) | VNodeKind::Element(_) => {
            if let Some(id) = vnode.dom {
                inner.dom.remove_child(parent, id);
            }
        }
        VNodeKind::Fragment(f) => {
            for child in f.children.nodes() {
                remove_dom(inner, child, parent);
            }
            if let Some(end) = f.anchor {
                inner.dom.remove_child(parent, end);
            }
        }
        VNodeKind::Component(c) => {
            let Some(handle) = &c.instance else { return };
            let (placeholder, pending) = {
                let instance = handle.borrow();
                (instance.placeholder, instance.pending_init)
            };
            if pending {
                if let Some(placeholder) = placeholder {
                    inner.dom.remove_child(parent, placeholder);
                }
                return;
            }
            let input = handle.borrow_mut().last_input.take();
            if let Some(input) = input {
                remove_dom(inner, &input, parent);
            }
        }
    }
}
