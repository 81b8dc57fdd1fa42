//! First render: materialize a vnode tree into real DOM nodes.

use crate::component::{ComponentInstance, InitResult, InstanceHandle, LifecycleState};
use crate::dom::{NodeId, SVG_NAMESPACE};
use crate::patch::apply_prop;
use crate::runtime::{Runtime, RuntimeInner};
use crate::vnode::{Children, Props, Ref, RefTarget, VNode, VNodeKind};

/// Mount `vnode` into `parent` before `anchor`, attaching the resulting
/// DOM handle onto the vnode. Refs and `mounted` hooks are queued and run
/// once the whole top-level operation completes, children before parents.
pub(crate) fn mount(
    rt: &Runtime,
    inner: &mut RuntimeInner,
    vnode: &mut VNode,
    parent: NodeId,
    anchor: Option<NodeId>,
) {
    if vnode.is_component() {
        mount_component(rt, inner, vnode, parent, anchor);
    } else {
        match &mut vnode.kind {
            VNodeKind::Text(text) => {
                let id = inner.dom.create_text(text);
                inner.dom.insert_before(parent, id, anchor);
                vnode.dom = Some(id);
            }
            VNodeKind::Element(el) => {
                let id = if el.flags.svg {
                    inner.dom.create_element_ns(&el.tag, SVG_NAMESPACE)
                } else {
                    inner.dom.create_element(&el.tag)
                };
                if let Some(class) = &el.class_name {
                    inner.dom.set_attribute(id, "class", class);
                }
                mount_props(inner, id, &el.props);
                inner.dom.insert_before(parent, id, anchor);
                if !el.flags.void {
                    mount_children(rt, inner, &mut el.children, id, None);
                }
                vnode.dom = Some(id);
            }
            VNodeKind::Fragment(f) => {
                mount_children(rt, inner, &mut f.children, parent, anchor);
                // Trailing anchor marks the end of the fragment's segment.
                let end = inner.dom.create_comment("");
                inner.dom.insert_before(parent, end, anchor);
                f.anchor = Some(end);
                vnode.dom = f
                    .children
                    .nodes()
                    .first()
                    .and_then(|child| child.first_dom())
                    .or(Some(end));
            }
            VNodeKind::Component(_) => unreachable!("handled above"),
        }
    }

    if let Some(node_ref) = &vnode.node_ref {
        queue_ref_attach(rt, node_ref.clone(), vnode);
    }
}

/// Queue a ref invocation for after the top-level mount completes, so refs
/// always observe fully attached DOM.
pub(crate) fn queue_ref_attach(rt: &Runtime, node_ref: Ref, vnode: &VNode) {
    let target = match &vnode.kind {
        VNodeKind::Component(c) => c.instance.clone().map(RefTarget::Component),
        _ => vnode.dom.map(RefTarget::Dom),
    };
    let Some(target) = target else { return };
    rt.enqueue(Box::new(move |_rt| node_ref.attach(Some(target))));
}

/// Mount canonical children into a container.
pub(crate) fn mount_children(
    rt: &Runtime,
    inner: &mut RuntimeInner,
    children: &mut Children,
    parent: NodeId,
    anchor: Option<NodeId>,
) {
    match children {
        Children::None => {}
        Children::Text(text) => inner.dom.set_text(parent, text),
        Children::Single(node) => mount(rt, inner, node, parent, anchor),
        Children::NonKeyed(nodes) | Children::Keyed(nodes) => {
            for node in nodes {
                mount(rt, inner, node, parent, anchor);
            }
        }
    }
}

fn mount_props(inner: &mut RuntimeInner, id: NodeId, props: &Props) {
    for (name, value) in props {
        apply_prop(inner, id, name, Some(value), None);
    }
}

fn mount_component(
    rt: &Runtime,
    inner: &mut RuntimeInner,
    vnode: &mut VNode,
    parent: NodeId,
    anchor: Option<NodeId>,
) {
    let (spec, props, children) = {
        let VNodeKind::Component(c) = &vnode.kind else {
            return;
        };
        (c.spec.clone(), c.props.clone(), c.children.clone())
    };

    let component = spec.instantiate();
    let mut merged = component.default_props();
    for (key, value) in props {
        merged.insert(key, value);
    }
    let mut instance = ComponentInstance::new(spec, component, merged, children, rt.downgrade());
    instance.parent_dom = Some(parent);
    let handle = InstanceHandle::new(instance);
    if let VNodeKind::Component(c) = &mut vnode.kind {
        c.instance = Some(handle.clone());
    }

    let init = handle.borrow_mut().component.init();
    match init {
        InitResult::Ready => {
            let first = first_render_and_mount(rt, inner, &handle, parent, anchor);
            vnode.dom = first;
            queue_mounted(rt, &handle);
        }
        InitResult::Pending(deferred) if deferred.is_settled() => {
            // Settled before mount got to look at it; treat as ready, but
            // keep the rejection-logging contract.
            deferred.on_settle(|result| {
                if let Err(message) = result {
                    tracing::error!(error = %message, "component init rejected; proceeding");
                }
            });
            let first = first_render_and_mount(rt, inner, &handle, parent, anchor);
            vnode.dom = first;
            queue_mounted(rt, &handle);
        }
        InitResult::Pending(deferred) => {
            let placeholder = inner.dom.create_comment("");
            inner.dom.insert_before(parent, placeholder, anchor);
            {
                let mut instance = handle.borrow_mut();
                instance.pending_init = true;
                instance.placeholder = Some(placeholder);
            }
            vnode.dom = Some(placeholder);
            let weak = handle.downgrade();
            deferred.on_settle(move |result| {
                // The owning vnode may be long gone; a dead instance makes
                // this a no-op.
                if let Some(handle) = weak.upgrade() {
                    resume_component(&handle, result);
                }
            });
        }
    }
}

/// Evaluate the first render and mount its output. Shared by the ready
/// path and the deferred-init resume path.
fn first_render_and_mount(
    rt: &Runtime,
    inner: &mut RuntimeInner,
    handle: &InstanceHandle,
    parent: NodeId,
    anchor: Option<NodeId>,
) -> Option<NodeId> {
    handle.borrow_mut().state = LifecycleState::Inited;
    let mut input = {
        let mut instance = handle.borrow_mut();
        let ComponentInstance {
            component,
            props,
            children,
            ..
        } = &mut *instance;
        component.render(props, children)
    };
    mount(rt, inner, &mut input, parent, anchor);
    let first = input.first_dom();
    let mut instance = handle.borrow_mut();
    instance.state = LifecycleState::Rendered;
    instance.vnode_dom = first;
    instance.last_input = Some(input);
    first
}

fn queue_mounted(rt: &Runtime, handle: &InstanceHandle) {
    let handle = handle.clone();
    rt.enqueue(Box::new(move |_rt| {
        let mut instance = handle.borrow_mut();
        if !instance.alive {
            return;
        }
        instance.state = LifecycleState::Mounted;
        instance.component.mounted();
    }));
}

/// Continuation for a deferred init: replay queued prop notifications,
/// render for real, and swap the output in for the placeholder.
fn resume_component(handle: &InstanceHandle, result: Result<(), String>) {
    if let Err(message) = &result {
        // Non-fatal: the component initializes anyway so the surrounding
        // tree is never blocked by one failing init.
        tracing::error!(error = %message, "component init rejected; proceeding");
    }
    if !handle.is_alive() {
        return;
    }
    let Some(rt) = handle.borrow().runtime.upgrade() else {
        return;
    };

    let queued = {
        let mut instance = handle.borrow_mut();
        instance.pending_init = false;
        std::mem::take(&mut instance.queued_notifications)
    };
    if !queued.is_empty() {
        handle.notify(&queued);
    }

    rt.enter();
    {
        let mut inner = rt.inner_mut();
        let (parent, placeholder) = {
            let mut instance = handle.borrow_mut();
            (instance.parent_dom, instance.placeholder.take())
        };
        if let Some(parent) = parent {
            first_render_and_mount(&rt, &mut inner, handle, parent, placeholder);
            if let Some(placeholder) = placeholder {
                inner.dom.remove_child(parent, placeholder);
            }
            queue_mounted(&rt, handle);
        }
    }
    rt.leave_and_flush();
}
